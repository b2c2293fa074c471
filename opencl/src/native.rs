/*!
Native Query Boundary

Opaque OpenCL handles and the trait the device model uses to query them.
Enumeration layers either hand in a live OpenCL library
([`OpenClLibrary`](crate::OpenClLibrary)) or capability numbers they already
queried ([`StaticDeviceInfo`]).
*/

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ffi::c_void;
use std::num::NonZeroUsize;

use crate::constants::*;
use crate::topology::PciTopology;
use crate::vendor::OclVendor;
use crate::{OclError, Result};

/// Non-null `cl_device_id`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceId(NonZeroUsize);

impl DeviceId {
    /// Wrap a raw handle. Returns `None` for a null pointer.
    pub fn from_raw(ptr: *mut c_void) -> Option<Self> {
        Self::new(ptr as usize)
    }

    pub fn new(value: usize) -> Option<Self> {
        NonZeroUsize::new(value).map(Self)
    }

    pub fn as_raw(&self) -> *mut c_void {
        self.0.get() as *mut c_void
    }
}

/// Non-null `cl_platform_id`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlatformId(NonZeroUsize);

impl PlatformId {
    /// Wrap a raw handle. Returns `None` for a null pointer.
    pub fn from_raw(ptr: *mut c_void) -> Option<Self> {
        Self::new(ptr as usize)
    }

    pub fn new(value: usize) -> Option<Self> {
        NonZeroUsize::new(value).map(Self)
    }

    pub fn as_raw(&self) -> *mut c_void {
        self.0.get() as *mut c_void
    }
}

/// Device properties queried during construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceParam {
    Name,
    Vendor,
    Extensions,
    BoardNameAmd,
    MaxComputeUnits,
    MaxClockFrequency,
    GlobalMemSize,
    MaxMemAllocSize,
    TopologyAmd,
    PciBusIdNv,
    PciSlotIdNv,
}

impl DeviceParam {
    /// `cl_device_info` code
    pub fn code(&self) -> u32 {
        match self {
            Self::Name => CL_DEVICE_NAME,
            Self::Vendor => CL_DEVICE_VENDOR,
            Self::Extensions => CL_DEVICE_EXTENSIONS,
            Self::BoardNameAmd => CL_DEVICE_BOARD_NAME_AMD,
            Self::MaxComputeUnits => CL_DEVICE_MAX_COMPUTE_UNITS,
            Self::MaxClockFrequency => CL_DEVICE_MAX_CLOCK_FREQUENCY,
            Self::GlobalMemSize => CL_DEVICE_GLOBAL_MEM_SIZE,
            Self::MaxMemAllocSize => CL_DEVICE_MAX_MEM_ALLOC_SIZE,
            Self::TopologyAmd => CL_DEVICE_TOPOLOGY_AMD,
            Self::PciBusIdNv => CL_DEVICE_PCI_BUS_ID_NV,
            Self::PciSlotIdNv => CL_DEVICE_PCI_SLOT_ID_NV,
        }
    }
}

/// Platform properties queried during construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformParam {
    Name,
    Vendor,
}

impl PlatformParam {
    /// `cl_platform_info` code
    pub fn code(&self) -> u32 {
        match self {
            Self::Name => CL_PLATFORM_NAME,
            Self::Vendor => CL_PLATFORM_VENDOR,
        }
    }
}

/// Source of native device information.
///
/// Implementations must be independent per device so that several models can
/// be constructed concurrently.
pub trait DeviceInfoSource: Send + Sync {
    fn device_string(&self, device: DeviceId, param: DeviceParam) -> Result<String>;

    fn device_u32(&self, device: DeviceId, param: DeviceParam) -> Result<u32>;

    fn device_u64(&self, device: DeviceId, param: DeviceParam) -> Result<u64>;

    fn platform_string(&self, platform: PlatformId, param: PlatformParam) -> Result<String>;

    /// PCI location of the device. Only vendors exposing a topology
    /// extension can answer; the default handles the NVIDIA extension.
    fn topology(&self, device: DeviceId, vendor: OclVendor) -> Result<PciTopology> {
        match vendor {
            OclVendor::Nvidia => nvidia_topology(self, device),
            _ => Err(OclError::NativeQuery(format!(
                "no topology extension for {} devices",
                vendor
            ))),
        }
    }
}

pub(crate) fn nvidia_topology<S: DeviceInfoSource + ?Sized>(
    source: &S,
    device: DeviceId,
) -> Result<PciTopology> {
    let bus = source.device_u32(device, DeviceParam::PciBusIdNv)?;
    let slot = source.device_u32(device, DeviceParam::PciSlotIdNv)?;
    Ok(PciTopology::from_nvidia(bus, slot))
}

/// Capability numbers of one device, as already queried by an enumeration
/// layer. Missing values behave like failed native queries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceRecord {
    pub name: Option<String>,
    pub vendor: Option<String>,
    pub extensions: Option<String>,
    pub board: Option<String>,
    pub compute_units: Option<u32>,
    pub clock_mhz: Option<u32>,
    pub global_mem_size: Option<u64>,
    pub max_mem_alloc_size: Option<u64>,
    pub topology: Option<PciTopology>,
}

impl DeviceRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = Some(vendor.into());
        self
    }

    pub fn with_extensions(mut self, extensions: impl Into<String>) -> Self {
        self.extensions = Some(extensions.into());
        self
    }

    pub fn with_board(mut self, board: impl Into<String>) -> Self {
        self.board = Some(board.into());
        self
    }

    pub fn with_compute_units(mut self, compute_units: u32) -> Self {
        self.compute_units = Some(compute_units);
        self
    }

    pub fn with_clock(mut self, clock_mhz: u32) -> Self {
        self.clock_mhz = Some(clock_mhz);
        self
    }

    pub fn with_global_mem_size(mut self, bytes: u64) -> Self {
        self.global_mem_size = Some(bytes);
        self
    }

    pub fn with_max_mem_alloc_size(mut self, bytes: u64) -> Self {
        self.max_mem_alloc_size = Some(bytes);
        self
    }

    pub fn with_topology(mut self, topology: PciTopology) -> Self {
        self.topology = Some(topology);
        self
    }
}

/// In-memory [`DeviceInfoSource`]
#[derive(Debug, Clone, Default)]
pub struct StaticDeviceInfo {
    devices: HashMap<DeviceId, DeviceRecord>,
    platforms: HashMap<PlatformId, String>,
}

impl StaticDeviceInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device(mut self, device: DeviceId, record: DeviceRecord) -> Self {
        self.devices.insert(device, record);
        self
    }

    pub fn with_platform(mut self, platform: PlatformId, vendor: impl Into<String>) -> Self {
        self.platforms.insert(platform, vendor.into());
        self
    }

    fn record(&self, device: DeviceId) -> Result<&DeviceRecord> {
        self.devices
            .get(&device)
            .ok_or_else(|| OclError::NativeQuery(format!("unknown device {:?}", device)))
    }
}

fn missing(param: DeviceParam) -> OclError {
    OclError::NativeQuery(format!("{:?} not reported", param))
}

impl DeviceInfoSource for StaticDeviceInfo {
    fn device_string(&self, device: DeviceId, param: DeviceParam) -> Result<String> {
        let record = self.record(device)?;
        let value = match param {
            DeviceParam::Name => record.name.as_ref(),
            DeviceParam::Vendor => record.vendor.as_ref(),
            DeviceParam::Extensions => record.extensions.as_ref(),
            DeviceParam::BoardNameAmd => record.board.as_ref(),
            _ => None,
        };

        value.cloned().ok_or_else(|| missing(param))
    }

    fn device_u32(&self, device: DeviceId, param: DeviceParam) -> Result<u32> {
        let record = self.record(device)?;
        let value = match param {
            DeviceParam::MaxComputeUnits => record.compute_units,
            DeviceParam::MaxClockFrequency => record.clock_mhz,
            DeviceParam::PciBusIdNv => record.topology.map(|t| t.bus()),
            DeviceParam::PciSlotIdNv => record.topology.map(|t| (t.device() << 3) | t.function()),
            _ => None,
        };

        value.ok_or_else(|| missing(param))
    }

    fn device_u64(&self, device: DeviceId, param: DeviceParam) -> Result<u64> {
        let record = self.record(device)?;
        let value = match param {
            DeviceParam::GlobalMemSize => record.global_mem_size,
            DeviceParam::MaxMemAllocSize => record.max_mem_alloc_size,
            _ => None,
        };

        value.ok_or_else(|| missing(param))
    }

    fn platform_string(&self, platform: PlatformId, param: PlatformParam) -> Result<String> {
        match param {
            PlatformParam::Vendor => self.platforms.get(&platform).cloned().ok_or_else(|| {
                OclError::NativeQuery(format!("unknown platform {:?}", platform))
            }),
            PlatformParam::Name => Err(OclError::NativeQuery("platform name not reported".to_string())),
        }
    }

    fn topology(&self, device: DeviceId, _vendor: OclVendor) -> Result<PciTopology> {
        self.record(device)?
            .topology
            .ok_or_else(|| OclError::NativeQuery("topology not reported".to_string()))
    }
}
