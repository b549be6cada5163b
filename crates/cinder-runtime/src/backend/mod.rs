//! Backend trait and handle types for kernel execution
//!
//! A backend owns device memory, compiles kernel source into launchable
//! entry points, and retires launches through an in-order queue with
//! profiled events.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                    Backend Trait                    │
//! │  - buffer management (allocate/free/copy)           │
//! │  - build_program() / entry_point()                  │
//! │  - enqueue_kernel() → EventHandle                   │
//! │  - finish() seals event timestamps                  │
//! └────────────────────────┬────────────────────────────┘
//!                          │
//!              ┌───────────┴───────────┐
//!              ▼                       ▼
//!        ┌───────────┐          ┌───────────┐
//!        │    CPU    │          │  (future) │
//!        │  Backend  │          │  targets  │
//!        └───────────┘          └───────────┘
//! ```

pub(crate) mod cpu;

pub use cpu::CpuBackend;

use crate::buffer::AccessMode;
use crate::device::DeviceInfo;
use crate::error::Result;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Shared, lock-guarded backend as held by an execution context
pub type SharedBackend = Arc<RwLock<Box<dyn Backend + Send + Sync>>>;

/// Handle to an allocated device buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u64);

impl BufferHandle {
    pub const fn new(id: u64) -> Self {
        BufferHandle(id)
    }

    pub const fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for BufferHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "buf{}", self.0)
    }
}

/// Handle to a compiled program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub u64);

impl ProgramHandle {
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Handle to a launchable entry point within a compiled program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KernelHandle(pub u64);

impl KernelHandle {
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Handle to a profiling event recorded at launch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventHandle(pub u64);

impl EventHandle {
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Global (or local) work extents for a launch
///
/// Unused trailing dimensions stay at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkSize {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl WorkSize {
    pub const fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }

    /// 1D extents
    pub const fn d1(x: usize) -> Self {
        Self { x, y: 1, z: 1 }
    }

    /// 2D extents
    pub const fn d2(x: usize, y: usize) -> Self {
        Self { x, y, z: 1 }
    }

    /// Total number of work items
    pub const fn total(&self) -> usize {
        self.x * self.y * self.z
    }
}

impl fmt::Display for WorkSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Element type of a global-memory kernel parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElemType {
    I32,
    F32,
}

impl ElemType {
    pub const fn size_bytes(self) -> usize {
        match self {
            ElemType::I32 | ElemType::F32 => 4,
        }
    }
}

impl fmt::Display for ElemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElemType::I32 => write!(f, "i32"),
            ElemType::F32 => write!(f, "f32"),
        }
    }
}

/// Data-flow direction of a kernel parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamDir {
    In,
    Out,
}

/// Kind of a kernel parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Pointer into global memory
    Global { elem: ElemType, dir: ParamDir },
    /// Scalar passed by value
    ScalarI32,
}

/// One parameter of an entry point signature
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
}

/// Argument supplied to a launch, matched positionally against `ParamSpec`s
#[derive(Debug, Clone, Copy)]
pub enum KernelArg {
    /// Device buffer binding
    Buffer {
        handle: BufferHandle,
        access: AccessMode,
        len: usize,
        elem: ElemType,
    },
    /// Scalar by value
    I32(i32),
}

/// Backend trait for kernel execution
///
/// Launches submitted through `enqueue_kernel` retire in submission order.
/// Event timestamps become readable only after `finish`.
pub trait Backend {
    /// Description of the device this backend drives
    fn device_info(&self) -> DeviceInfo;

    /// Total device memory available for buffer allocation
    fn memory_capacity(&self) -> usize;

    /// Duration of one device clock tick in nanoseconds
    fn nanos_per_tick(&self) -> u64;

    /// Allocate a buffer of the given size in bytes
    fn allocate_buffer(&mut self, size: usize) -> Result<BufferHandle>;

    /// Free a previously allocated buffer
    fn free_buffer(&mut self, handle: BufferHandle) -> Result<()>;

    /// Copy host data into a buffer; sizes must match exactly
    fn copy_to_buffer(&mut self, handle: BufferHandle, data: &[u8]) -> Result<()>;

    /// Copy buffer contents back to host; sizes must match exactly
    fn copy_from_buffer(&self, handle: BufferHandle, data: &mut [u8]) -> Result<()>;

    /// Size of a buffer in bytes
    fn buffer_size(&self, handle: BufferHandle) -> Result<usize>;

    /// Build kernel source into a program, surfacing the build log on failure
    fn build_program(&mut self, source: &str) -> Result<ProgramHandle>;

    /// Look up a named entry point in a compiled program
    fn entry_point(&mut self, program: ProgramHandle, name: &str) -> Result<KernelHandle>;

    /// Parameter signature of an entry point
    fn entry_params(&self, kernel: KernelHandle) -> Result<Vec<ParamSpec>>;

    /// Submit a launch; returns the profiling event for this launch
    fn enqueue_kernel(
        &mut self,
        kernel: KernelHandle,
        global: WorkSize,
        local: Option<WorkSize>,
        args: &[KernelArg],
    ) -> Result<EventHandle>;

    /// Block until all submitted launches retire and seal their timestamps
    fn finish(&mut self) -> Result<()>;

    /// Start/end timestamps of a retired launch, in device ticks
    fn event_timestamps(&self, event: EventHandle) -> Result<(u64, u64)>;
}
