//! Platform and device enumeration
//!
//! Devices are discovered per platform in a deterministic order. Selection
//! walks platforms first, then each platform's devices, and returns the
//! first device accepted by the filter. The CPU reference platform is
//! always present, so `DeviceTypeFilter::Any` never fails on a healthy
//! build; narrower filters can.

use crate::error::{Error, Result};
use std::fmt;

/// Category a device advertises itself as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceType {
    Cpu,
    Gpu,
    Accelerator,
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceType::Cpu => write!(f, "cpu"),
            DeviceType::Gpu => write!(f, "gpu"),
            DeviceType::Accelerator => write!(f, "accelerator"),
        }
    }
}

/// Filter applied during device selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceTypeFilter {
    /// Accept the first device of any type
    Any,
    /// Accept only devices of the given type
    Only(DeviceType),
}

impl DeviceTypeFilter {
    /// Whether a device of the given type passes this filter
    pub fn matches(&self, device_type: DeviceType) -> bool {
        match self {
            DeviceTypeFilter::Any => true,
            DeviceTypeFilter::Only(wanted) => *wanted == device_type,
        }
    }
}

impl fmt::Display for DeviceTypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceTypeFilter::Any => write!(f, "any"),
            DeviceTypeFilter::Only(t) => write!(f, "{t}"),
        }
    }
}

/// Static description of a single device
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub name: String,
    pub device_type: DeviceType,
    pub global_memory_bytes: usize,
    pub max_work_group_size: usize,
}

/// A platform and the devices it exposes
#[derive(Debug, Clone)]
pub struct PlatformInfo {
    pub name: String,
    pub vendor: String,
    pub devices: Vec<DeviceInfo>,
}

/// A device chosen by selection, addressable for context creation
#[derive(Debug, Clone)]
pub struct Device {
    pub platform_index: usize,
    pub device_index: usize,
    pub platform_name: String,
    pub info: DeviceInfo,
}

impl Device {
    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn device_type(&self) -> DeviceType {
        self.info.device_type
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] on {}",
            self.info.name, self.info.device_type, self.platform_name
        )
    }
}

/// Enumerate every available platform
///
/// Order is deterministic across calls. The CPU reference platform is
/// always the first entry.
pub fn enumerate_platforms() -> Vec<PlatformInfo> {
    vec![crate::backend::cpu::platform_info()]
}

/// Select the first device passing `filter`, in platform-then-device order
pub fn select_device(filter: DeviceTypeFilter) -> Result<Device> {
    select_from(&enumerate_platforms(), filter)
}

/// Pure selection over an explicit platform list
///
/// An empty list, a platform list with no devices, or a filter nothing
/// satisfies all yield `NoDeviceFound` without touching any device.
pub fn select_from(platforms: &[PlatformInfo], filter: DeviceTypeFilter) -> Result<Device> {
    for (pi, platform) in platforms.iter().enumerate() {
        for (di, info) in platform.devices.iter().enumerate() {
            if filter.matches(info.device_type) {
                tracing::debug!(
                    platform = %platform.name,
                    device = %info.name,
                    device_type = %info.device_type,
                    "selected device"
                );
                return Ok(Device {
                    platform_index: pi,
                    device_index: di,
                    platform_name: platform.name.clone(),
                    info: info.clone(),
                });
            }
        }
    }
    Err(Error::no_device(filter))
}
