//! Typed device buffers
//!
//! `Buffer<T>` is a typed, exclusively owned view of a device allocation.
//! The device allocation is freed when the buffer is dropped, on every exit
//! path. Access modes gate kernel-side use only; the host may always upload
//! to or read back from a buffer it owns.

use crate::backend::{BufferHandle, ElemType, KernelArg, SharedBackend};
use crate::context::ExecutionContext;
use crate::error::{Error, Result};
use std::fmt;
use std::marker::PhantomData;

/// How kernels may touch a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessMode {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

impl AccessMode {
    /// Whether a kernel may bind this buffer to an input parameter
    pub const fn allows_kernel_read(self) -> bool {
        !matches!(self, AccessMode::WriteOnly)
    }

    /// Whether a kernel may bind this buffer to an output parameter
    pub const fn allows_kernel_write(self) -> bool {
        !matches!(self, AccessMode::ReadOnly)
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessMode::ReadOnly => write!(f, "read-only"),
            AccessMode::WriteOnly => write!(f, "write-only"),
            AccessMode::ReadWrite => write!(f, "read-write"),
        }
    }
}

/// Element types kernels understand
pub trait KernelElem: bytemuck::Pod {
    const ELEM: ElemType;
}

impl KernelElem for i32 {
    const ELEM: ElemType = ElemType::I32;
}

impl KernelElem for f32 {
    const ELEM: ElemType = ElemType::F32;
}

/// Typed handle to a device buffer of `len` elements of `T`
///
/// The byte size of the allocation is always `len * size_of::<T>()`.
pub struct Buffer<T: bytemuck::Pod> {
    handle: BufferHandle,
    len: usize,
    access: AccessMode,
    backend: SharedBackend,
    _marker: PhantomData<T>,
}

impl<T: bytemuck::Pod> Buffer<T> {
    /// Allocate a zero-initialised buffer of `len` elements
    pub fn zeroed(ctx: &ExecutionContext, len: usize, access: AccessMode) -> Result<Self> {
        let backend = ctx.backend();
        let size = len * std::mem::size_of::<T>();
        let handle = backend.write().allocate_buffer(size)?;
        tracing::debug!(%handle, len, size, %access, "buffer allocated");
        Ok(Self {
            handle,
            len,
            access,
            backend,
            _marker: PhantomData,
        })
    }

    /// Allocate and upload in one step
    pub fn from_slice(ctx: &ExecutionContext, access: AccessMode, data: &[T]) -> Result<Self> {
        let buffer = Self::zeroed(ctx, data.len(), access)?;
        buffer.write(data)?;
        Ok(buffer)
    }

    /// Upload host data; the slice must cover the whole buffer
    #[tracing::instrument(skip(self, data), fields(handle = %self.handle, len = self.len))]
    pub fn write(&self, data: &[T]) -> Result<()> {
        if data.len() != self.len {
            return Err(Error::BufferSizeMismatch {
                expected: self.len,
                actual: data.len(),
            });
        }
        self.backend
            .write()
            .copy_to_buffer(self.handle, bytemuck::cast_slice(data))
    }

    /// Blocking device-to-host copy into `out`
    #[tracing::instrument(skip(self, out), fields(handle = %self.handle, len = self.len))]
    pub fn read_back(&self, out: &mut [T]) -> Result<()> {
        if out.len() != self.len {
            return Err(Error::BufferSizeMismatch {
                expected: self.len,
                actual: out.len(),
            });
        }
        self.backend
            .read()
            .copy_from_buffer(self.handle, bytemuck::cast_slice_mut(out))
    }

    /// Read the whole buffer into a freshly allocated `Vec`
    pub fn to_vec(&self) -> Result<Vec<T>> {
        let mut out = vec![<T as bytemuck::Zeroable>::zeroed(); self.len];
        self.read_back(&mut out)?;
        Ok(out)
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Size of the device allocation in bytes
    pub fn size_bytes(&self) -> usize {
        self.len * std::mem::size_of::<T>()
    }

    pub fn access(&self) -> AccessMode {
        self.access
    }

    pub fn handle(&self) -> BufferHandle {
        self.handle
    }
}

impl<T: KernelElem> Buffer<T> {
    /// Bind this buffer as a kernel argument
    pub fn arg(&self) -> KernelArg {
        KernelArg::Buffer {
            handle: self.handle,
            access: self.access,
            len: self.len,
            elem: T::ELEM,
        }
    }
}

impl<T: bytemuck::Pod> Drop for Buffer<T> {
    fn drop(&mut self) {
        // freeing a buffer the backend no longer knows is a no-op here
        let _ = self.backend.write().free_buffer(self.handle);
    }
}

impl<T: bytemuck::Pod> fmt::Debug for Buffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("handle", &self.handle)
            .field("len", &self.len)
            .field("access", &self.access)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{select_device, DeviceTypeFilter};

    fn ctx() -> ExecutionContext {
        let device = select_device(DeviceTypeFilter::Any).unwrap();
        ExecutionContext::new(&device).unwrap()
    }

    #[test]
    fn test_size_invariant_holds() {
        let ctx = ctx();
        for len in [1usize, 7, 16, 1024] {
            let f = Buffer::<f32>::zeroed(&ctx, len, AccessMode::ReadWrite).unwrap();
            assert_eq!(f.len(), len);
            assert_eq!(f.size_bytes(), len * 4);
            assert_eq!(
                ctx.backend().read().buffer_size(f.handle()).unwrap(),
                f.size_bytes()
            );

            let i = Buffer::<i32>::zeroed(&ctx, len, AccessMode::ReadOnly).unwrap();
            assert_eq!(i.size_bytes(), len * std::mem::size_of::<i32>());
        }
    }

    #[test]
    fn test_upload_roundtrip() {
        let ctx = ctx();
        let data: Vec<i32> = (0..64).collect();
        let buf = Buffer::from_slice(&ctx, AccessMode::ReadOnly, &data).unwrap();
        assert_eq!(buf.to_vec().unwrap(), data);
    }

    #[test]
    fn test_zeroed_starts_zeroed() {
        let ctx = ctx();
        let buf = Buffer::<f32>::zeroed(&ctx, 16, AccessMode::ReadWrite).unwrap();
        assert!(buf.to_vec().unwrap().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_host_slice_length_must_match() {
        let ctx = ctx();
        let buf = Buffer::<f32>::zeroed(&ctx, 8, AccessMode::ReadWrite).unwrap();
        assert!(matches!(
            buf.write(&[0.0; 4]),
            Err(Error::BufferSizeMismatch {
                expected: 8,
                actual: 4
            })
        ));
        let mut small = [0.0f32; 4];
        assert!(matches!(
            buf.read_back(&mut small),
            Err(Error::BufferSizeMismatch { .. })
        ));
    }

    #[test]
    fn test_zero_length_allocation_fails() {
        let ctx = ctx();
        let err = Buffer::<f32>::zeroed(&ctx, 0, AccessMode::ReadWrite).unwrap_err();
        assert!(matches!(err, Error::AllocationFailure(_)));
    }

    #[test]
    fn test_drop_releases_device_allocation() {
        let ctx = ctx();
        let handle = {
            let buf = Buffer::<f32>::zeroed(&ctx, 16, AccessMode::ReadWrite).unwrap();
            buf.handle()
        };
        assert!(matches!(
            ctx.backend().read().buffer_size(handle),
            Err(Error::InvalidBufferHandle(_))
        ));
    }

    #[test]
    fn test_access_mode_gates() {
        assert!(AccessMode::ReadOnly.allows_kernel_read());
        assert!(!AccessMode::ReadOnly.allows_kernel_write());
        assert!(!AccessMode::WriteOnly.allows_kernel_read());
        assert!(AccessMode::WriteOnly.allows_kernel_write());
        assert!(AccessMode::ReadWrite.allows_kernel_read());
        assert!(AccessMode::ReadWrite.allows_kernel_write());
    }

    #[test]
    fn test_host_may_read_write_only_buffers() {
        // write-only gates kernels, not host read-back
        let ctx = ctx();
        let buf = Buffer::<i32>::zeroed(&ctx, 4, AccessMode::WriteOnly).unwrap();
        assert_eq!(buf.to_vec().unwrap(), vec![0; 4]);
    }
}
