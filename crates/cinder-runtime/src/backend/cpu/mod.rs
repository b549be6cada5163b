//! CPU reference backend
//!
//! Reference implementation of the `Backend` trait. Device memory lives in
//! host hash maps, programs bind parsed entry points to native kernels, and
//! launches retire synchronously at submission while keeping the observable
//! contract of an in-order profiling queue: event timestamps are sealed only
//! by `finish`, and chained launches see each other's writes in submission
//! order.

mod compile;
mod kernels;

use crate::backend::{
    Backend, BufferHandle, EventHandle, KernelArg, KernelHandle, ParamKind, ParamSpec,
    ProgramHandle, WorkSize,
};
use crate::device::{DeviceInfo, DeviceType, PlatformInfo};
use crate::error::{Error, Result};
use kernels::{LaunchIo, NativeKernel, Resolved};
use std::collections::HashMap;
use std::time::Instant;

const DEVICE_MEMORY_BYTES: usize = 256 * 1024 * 1024;
const MAX_WORK_GROUP_SIZE: usize = 1024;
const DEVICE_NAME: &str = "Reference CPU";
const PLATFORM_NAME: &str = "Cinder Reference Platform";

/// Static description of the CPU reference platform
pub(crate) fn platform_info() -> PlatformInfo {
    PlatformInfo {
        name: PLATFORM_NAME.to_string(),
        vendor: "cinder".to_string(),
        devices: vec![DeviceInfo {
            name: DEVICE_NAME.to_string(),
            device_type: DeviceType::Cpu,
            global_memory_bytes: DEVICE_MEMORY_BYTES,
            max_work_group_size: MAX_WORK_GROUP_SIZE,
        }],
    }
}

#[derive(Debug, Clone, Copy)]
struct EventRecord {
    start_ticks: u64,
    end_ticks: u64,
    ready: bool,
}

/// CPU backend executing kernel entry points natively
pub struct CpuBackend {
    buffers: HashMap<u64, Vec<u8>>,
    next_buffer: u64,
    used_bytes: usize,
    programs: HashMap<u64, Vec<&'static NativeKernel>>,
    next_program: u64,
    kernels: HashMap<u64, &'static NativeKernel>,
    next_kernel: u64,
    events: Vec<EventRecord>,
    clock: Instant,
}

impl CpuBackend {
    pub fn new() -> Self {
        Self {
            buffers: HashMap::new(),
            next_buffer: 1,
            used_bytes: 0,
            programs: HashMap::new(),
            next_program: 1,
            kernels: HashMap::new(),
            next_kernel: 1,
            events: Vec::new(),
            clock: Instant::now(),
        }
    }

    /// Device clock reading in ticks (1 tick = 1 ns)
    fn ticks(&self) -> u64 {
        self.clock.elapsed().as_nanos() as u64
    }

    fn validate_geometry(&self, global: WorkSize, local: Option<WorkSize>) -> Result<()> {
        if global.x == 0 || global.y == 0 || global.z == 0 {
            return Err(Error::dispatch(format!(
                "global work size {global} has a zero extent"
            )));
        }
        if let Some(local) = local {
            if local.x == 0 || local.y == 0 || local.z == 0 {
                return Err(Error::dispatch(format!(
                    "local work size {local} has a zero extent"
                )));
            }
            if global.x % local.x != 0 || global.y % local.y != 0 || global.z % local.z != 0 {
                return Err(Error::dispatch(format!(
                    "local work size {local} does not divide global work size {global}"
                )));
            }
            if local.total() > MAX_WORK_GROUP_SIZE {
                return Err(Error::dispatch(format!(
                    "local work size {local} exceeds the work-group limit of {MAX_WORK_GROUP_SIZE}"
                )));
            }
        }
        Ok(())
    }

    fn resolve_args(
        &self,
        params: &[ParamSpec],
        args: &[KernelArg],
    ) -> Result<(LaunchIo, Vec<Option<BufferHandle>>)> {
        if params.len() != args.len() {
            return Err(Error::dispatch(format!(
                "expected {} arguments, got {}",
                params.len(),
                args.len()
            )));
        }
        let mut resolved = Vec::with_capacity(args.len());
        let mut bindings = Vec::with_capacity(args.len());
        for (idx, (arg, spec)) in args.iter().zip(params).enumerate() {
            match (arg, spec.kind) {
                (
                    KernelArg::Buffer {
                        handle, len, elem, ..
                    },
                    ParamKind::Global { elem: want, dir },
                ) => {
                    if *elem != want {
                        return Err(Error::dispatch(format!(
                            "argument {idx} (`{}`): expected {want} buffer, got {elem}",
                            spec.name
                        )));
                    }
                    let bytes = self
                        .buffers
                        .get(&handle.id())
                        .ok_or(Error::InvalidBufferHandle(handle.id()))?;
                    if bytes.len() != len * elem.size_bytes() {
                        return Err(Error::dispatch(format!(
                            "argument {idx} (`{}`): binding of {len} {elem} elements \
                             disagrees with a {}-byte allocation",
                            spec.name,
                            bytes.len()
                        )));
                    }
                    resolved.push(Resolved::Buf {
                        bytes: bytes.clone(),
                        elem: *elem,
                        dir,
                        dirty: false,
                    });
                    bindings.push(Some(*handle));
                }
                (KernelArg::I32(v), ParamKind::ScalarI32) => {
                    resolved.push(Resolved::Scalar(*v));
                    bindings.push(None);
                }
                _ => {
                    return Err(Error::dispatch(format!(
                        "argument {idx} (`{}`): kind does not match the entry signature",
                        spec.name
                    )));
                }
            }
        }
        Ok((LaunchIo { args: resolved }, bindings))
    }
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for CpuBackend {
    fn device_info(&self) -> DeviceInfo {
        platform_info().devices.remove(0)
    }

    fn memory_capacity(&self) -> usize {
        DEVICE_MEMORY_BYTES
    }

    fn nanos_per_tick(&self) -> u64 {
        1
    }

    fn allocate_buffer(&mut self, size: usize) -> Result<BufferHandle> {
        if size == 0 {
            return Err(Error::AllocationFailure(
                "zero-size allocation".to_string(),
            ));
        }
        let available = DEVICE_MEMORY_BYTES - self.used_bytes;
        if size > available {
            return Err(Error::AllocationFailure(format!(
                "requested {size} bytes, {available} of {DEVICE_MEMORY_BYTES} available"
            )));
        }
        let id = self.next_buffer;
        self.next_buffer += 1;
        self.buffers.insert(id, vec![0u8; size]);
        self.used_bytes += size;
        tracing::debug!(handle = id, size, "allocated device buffer");
        Ok(BufferHandle::new(id))
    }

    fn free_buffer(&mut self, handle: BufferHandle) -> Result<()> {
        match self.buffers.remove(&handle.id()) {
            Some(bytes) => {
                self.used_bytes -= bytes.len();
                Ok(())
            }
            None => Err(Error::InvalidBufferHandle(handle.id())),
        }
    }

    fn copy_to_buffer(&mut self, handle: BufferHandle, data: &[u8]) -> Result<()> {
        let buf = self
            .buffers
            .get_mut(&handle.id())
            .ok_or(Error::InvalidBufferHandle(handle.id()))?;
        if data.len() > buf.len() {
            return Err(Error::BufferSizeMismatch {
                expected: buf.len(),
                actual: data.len(),
            });
        }
        buf[..data.len()].copy_from_slice(data);
        Ok(())
    }

    fn copy_from_buffer(&self, handle: BufferHandle, data: &mut [u8]) -> Result<()> {
        let buf = self
            .buffers
            .get(&handle.id())
            .ok_or(Error::InvalidBufferHandle(handle.id()))?;
        if data.len() > buf.len() {
            return Err(Error::ReadbackFailure(format!(
                "requested {} bytes from a {}-byte buffer",
                data.len(),
                buf.len()
            )));
        }
        data.copy_from_slice(&buf[..data.len()]);
        Ok(())
    }

    fn buffer_size(&self, handle: BufferHandle) -> Result<usize> {
        self.buffers
            .get(&handle.id())
            .map(Vec::len)
            .ok_or(Error::InvalidBufferHandle(handle.id()))
    }

    #[tracing::instrument(skip(self, source), fields(source_len = source.len()))]
    fn build_program(&mut self, source: &str) -> Result<ProgramHandle> {
        let decls = compile::parse_entry_points(source).map_err(Error::build)?;
        let mut entries = Vec::with_capacity(decls.len());
        for decl in &decls {
            let native = kernels::lookup(&decl.name).ok_or_else(|| {
                Error::build(format!(
                    "no device implementation for entry point `{}`",
                    decl.name
                ))
            })?;
            if native.params.len() != decl.param_count {
                return Err(Error::build(format!(
                    "entry point `{}` declares {} parameters, device implementation expects {}",
                    decl.name,
                    decl.param_count,
                    native.params.len()
                )));
            }
            entries.push(native);
        }
        let id = self.next_program;
        self.next_program += 1;
        self.programs.insert(id, entries);
        tracing::debug!(program = id, entry_points = decls.len(), "built program");
        Ok(ProgramHandle(id))
    }

    fn entry_point(&mut self, program: ProgramHandle, name: &str) -> Result<KernelHandle> {
        let entries = self
            .programs
            .get(&program.id())
            .ok_or_else(|| Error::dispatch(format!("invalid program handle {}", program.id())))?;
        let native = entries
            .iter()
            .find(|k| k.name == name)
            .copied()
            .ok_or_else(|| Error::EntryPointNotFound(name.to_string()))?;
        let id = self.next_kernel;
        self.next_kernel += 1;
        self.kernels.insert(id, native);
        Ok(KernelHandle(id))
    }

    fn entry_params(&self, kernel: KernelHandle) -> Result<Vec<ParamSpec>> {
        self.kernels
            .get(&kernel.id())
            .map(|k| k.params.to_vec())
            .ok_or_else(|| Error::dispatch(format!("invalid kernel handle {}", kernel.id())))
    }

    #[tracing::instrument(skip(self, args), fields(kernel = kernel.id(), %global))]
    fn enqueue_kernel(
        &mut self,
        kernel: KernelHandle,
        global: WorkSize,
        local: Option<WorkSize>,
        args: &[KernelArg],
    ) -> Result<EventHandle> {
        let native = *self
            .kernels
            .get(&kernel.id())
            .ok_or_else(|| Error::dispatch(format!("invalid kernel handle {}", kernel.id())))?;
        self.validate_geometry(global, local)?;
        let (mut io, bindings) = self.resolve_args(native.params, args)?;

        let start_ticks = self.ticks();
        (native.run)(global, &mut io)?;
        let end_ticks = self.ticks();

        for (resolved, binding) in io.args.iter().zip(&bindings) {
            if let (
                Resolved::Buf {
                    bytes, dirty: true, ..
                },
                Some(handle),
            ) = (resolved, binding)
            {
                // allocation length is unchanged, validated during resolve
                if let Some(buf) = self.buffers.get_mut(&handle.id()) {
                    buf.copy_from_slice(bytes);
                }
            }
        }

        self.events.push(EventRecord {
            start_ticks,
            end_ticks,
            ready: false,
        });
        let event = EventHandle((self.events.len() - 1) as u64);
        tracing::debug!(kernel = native.name, event = event.id(), "launch retired");
        Ok(event)
    }

    fn finish(&mut self) -> Result<()> {
        for event in &mut self.events {
            event.ready = true;
        }
        tracing::debug!(events = self.events.len(), "queue drained");
        Ok(())
    }

    fn event_timestamps(&self, event: EventHandle) -> Result<(u64, u64)> {
        let record = self
            .events
            .get(event.id() as usize)
            .ok_or_else(|| Error::dispatch(format!("invalid event handle {}", event.id())))?;
        if !record.ready {
            return Err(Error::EventNotReady);
        }
        Ok((record.start_ticks, record.end_ticks))
    }
}
