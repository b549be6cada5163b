//! Execution context binding a selected device to a live backend
//!
//! Every buffer, program, and pipeline operation takes the context
//! explicitly. Nothing in the runtime reaches for global state, so two
//! contexts on the same process never interfere.

use crate::backend::{Backend, CpuBackend, SharedBackend};
use crate::device::{Device, DeviceType};
use crate::error::{Error, Result};
use parking_lot::RwLock;
use std::sync::Arc;

/// A live backend instance for a selected device
pub struct ExecutionContext {
    device: Device,
    backend: SharedBackend,
}

impl ExecutionContext {
    /// Instantiate the backend that drives `device`
    pub fn new(device: &Device) -> Result<Self> {
        let backend: Box<dyn Backend + Send + Sync> = match device.device_type() {
            DeviceType::Cpu => Box::new(CpuBackend::new()),
            other => return Err(Error::no_device(other)),
        };
        tracing::debug!(device = %device, "execution context created");
        Ok(Self {
            device: device.clone(),
            backend: Arc::new(RwLock::new(backend)),
        })
    }

    /// The device this context drives
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Shared handle to the backend
    pub fn backend(&self) -> SharedBackend {
        Arc::clone(&self.backend)
    }

    /// Duration of one device clock tick in nanoseconds
    pub fn nanos_per_tick(&self) -> u64 {
        self.backend.read().nanos_per_tick()
    }

    /// Total device memory available for buffer allocation
    pub fn memory_capacity(&self) -> usize {
        self.backend.read().memory_capacity()
    }
}
