/*!
OpenCL Device Model

Identity and limits of one OpenCL device, queried once at enumeration time
and never mutated afterwards.
*/

use serde::Serialize;

use crate::architecture::{ArchitectureClassifier, OclArchitecture};
use crate::constants::DEFAULT_COMPUTE_UNITS;
use crate::native::{DeviceId, DeviceInfoSource, DeviceParam, PlatformId, PlatformParam};
use crate::threads::{OclThreads, ThreadConfig};
use crate::topology::PciTopology;
use crate::vendor::OclVendor;
use crate::workload::Workload;
use crate::Result;

#[derive(Debug, Clone, Serialize)]
pub struct OclDevice {
    index: u32,
    #[serde(skip)]
    id: Option<DeviceId>,
    #[serde(skip)]
    platform: Option<PlatformId>,
    platform_vendor: String,
    platform_vendor_id: OclVendor,
    board: Option<String>,
    name: String,
    vendor: String,
    vendor_id: OclVendor,
    extensions: String,
    max_mem_alloc_size: u64,
    global_mem_size: u64,
    compute_units: u32,
    clock: u32,
    topology: PciTopology,
    architecture: OclArchitecture,
}

impl OclDevice {
    /// Query a device using the built-in architecture table.
    ///
    /// Never fails: a missing handle yields an invalid model (see
    /// [`is_valid`](Self::is_valid)) and failed queries fall back to defaults.
    pub fn new(
        index: u32,
        id: Option<DeviceId>,
        platform: Option<PlatformId>,
        source: &dyn DeviceInfoSource,
    ) -> Self {
        Self::with_classifier(index, id, platform, source, &ArchitectureClassifier::default())
    }

    /// Query a device, classifying its architecture with `classifier`
    pub fn with_classifier(
        index: u32,
        id: Option<DeviceId>,
        platform: Option<PlatformId>,
        source: &dyn DeviceInfoSource,
        classifier: &ArchitectureClassifier,
    ) -> Self {
        let (device_id, platform_id) = match (id, platform) {
            (Some(device_id), Some(platform_id)) => (device_id, platform_id),
            _ => {
                log::warn!("OpenCL device #{} has a null device or platform handle", index);
                return Self::invalid(index, id, platform);
            }
        };

        let platform_vendor = or_default(index, "platform vendor", source.platform_string(platform_id, PlatformParam::Vendor));
        let name = or_default(index, "name", source.device_string(device_id, DeviceParam::Name));
        let vendor = or_default(index, "vendor", source.device_string(device_id, DeviceParam::Vendor));
        let extensions = or_default(index, "extensions", source.device_string(device_id, DeviceParam::Extensions));
        let max_mem_alloc_size = or_default(index, "max alloc size", source.device_u64(device_id, DeviceParam::MaxMemAllocSize));
        let global_mem_size = or_default(index, "global memory", source.device_u64(device_id, DeviceParam::GlobalMemSize));
        let clock = or_default(index, "clock", source.device_u32(device_id, DeviceParam::MaxClockFrequency));

        let compute_units = source
            .device_u32(device_id, DeviceParam::MaxComputeUnits)
            .unwrap_or(0)
            .max(DEFAULT_COMPUTE_UNITS);

        let vendor_id = OclVendor::from_vendor_string(&vendor);
        let platform_vendor_id = OclVendor::from_vendor_string(&platform_vendor);

        let board = match vendor_id {
            OclVendor::Amd => source
                .device_string(device_id, DeviceParam::BoardNameAmd)
                .ok()
                .map(|board| board.trim().to_string())
                .filter(|board| !board.is_empty()),
            _ => None,
        };

        let topology = or_default(index, "topology", source.topology(device_id, vendor_id));
        let name = name.trim().to_string();
        let architecture = classifier.classify(&name);

        log::debug!(
            "OpenCL device #{}: {} ({}), {} CU, {} bytes allocatable",
            index,
            name,
            architecture,
            compute_units,
            max_mem_alloc_size.min(global_mem_size)
        );

        Self {
            index,
            id: Some(device_id),
            platform: Some(platform_id),
            platform_vendor,
            platform_vendor_id,
            board,
            name,
            vendor,
            vendor_id,
            extensions,
            max_mem_alloc_size,
            global_mem_size,
            compute_units,
            clock,
            topology,
            architecture,
        }
    }

    fn invalid(index: u32, id: Option<DeviceId>, platform: Option<PlatformId>) -> Self {
        Self {
            index,
            id,
            platform,
            platform_vendor: String::new(),
            platform_vendor_id: OclVendor::Unknown,
            board: None,
            name: String::new(),
            vendor: String::new(),
            vendor_id: OclVendor::Unknown,
            extensions: String::new(),
            max_mem_alloc_size: 0,
            global_mem_size: 0,
            compute_units: DEFAULT_COMPUTE_UNITS,
            clock: 0,
            topology: PciTopology::default(),
            architecture: OclArchitecture::Unknown,
        }
    }

    /// Both native handles are present
    pub fn is_valid(&self) -> bool {
        self.id.is_some() && self.platform.is_some()
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn id(&self) -> Option<DeviceId> {
        self.id
    }

    pub fn platform(&self) -> Option<PlatformId> {
        self.platform
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Board name, falling back to the device name when none was reported
    pub fn board(&self) -> &str {
        self.board.as_deref().unwrap_or(&self.name)
    }

    /// Board name exactly as reported
    pub fn board_name(&self) -> Option<&str> {
        self.board.as_deref()
    }

    /// `"board (name)"`, or just the name when no board was reported
    pub fn printable_name(&self) -> String {
        match &self.board {
            Some(board) => format!("{} ({})", board, self.name),
            None => self.name.clone(),
        }
    }

    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    pub fn vendor_id(&self) -> OclVendor {
        self.vendor_id
    }

    pub fn platform_vendor(&self) -> &str {
        &self.platform_vendor
    }

    pub fn platform_vendor_id(&self) -> OclVendor {
        self.platform_vendor_id
    }

    pub fn extensions(&self) -> &str {
        &self.extensions
    }

    pub fn has_extension(&self, extension: &str) -> bool {
        self.extensions.split_whitespace().any(|e| e == extension)
    }

    pub fn architecture(&self) -> OclArchitecture {
        self.architecture
    }

    /// Always at least 1
    pub fn compute_units(&self) -> u32 {
        self.compute_units
    }

    /// Max clock frequency in MHz, 0 when unreported
    pub fn clock(&self) -> u32 {
        self.clock
    }

    pub fn global_mem_size(&self) -> u64 {
        self.global_mem_size
    }

    pub fn max_mem_alloc_size(&self) -> u64 {
        self.max_mem_alloc_size
    }

    /// Memory ceiling: the tighter of the single allocation and global limits
    pub fn free_mem_size(&self) -> u64 {
        self.max_mem_alloc_size.min(self.global_mem_size)
    }

    pub fn topology(&self) -> &PciTopology {
        &self.topology
    }

    /// Launch configurations for `workload` on this device
    pub fn generate(&self, workload: &Workload, explicit: Option<&ThreadConfig>) -> Result<OclThreads> {
        crate::generator::generate(self, workload, explicit)
    }
}

fn or_default<T: Default>(index: u32, what: &str, result: Result<T>) -> T {
    result.unwrap_or_else(|e| {
        log::debug!("OpenCL device #{}: {} unavailable ({}), using default", index, what, e);
        T::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::BYTES_PER_GB;
    use crate::native::{DeviceRecord, StaticDeviceInfo};

    fn handles() -> (DeviceId, PlatformId) {
        (DeviceId::new(0x10).unwrap(), PlatformId::new(0x20).unwrap())
    }

    fn vega_source() -> StaticDeviceInfo {
        let (id, platform) = handles();
        StaticDeviceInfo::new()
            .with_platform(platform, "Advanced Micro Devices, Inc.")
            .with_device(
                id,
                DeviceRecord::new("Vega 20 XTX")
                    .with_vendor("Advanced Micro Devices, Inc.")
                    .with_board("Radeon VII")
                    .with_extensions("cl_khr_fp64 cl_amd_device_attribute_query")
                    .with_compute_units(60)
                    .with_clock(1800)
                    .with_global_mem_size(8 * BYTES_PER_GB)
                    .with_max_mem_alloc_size(2 * BYTES_PER_GB)
                    .with_topology(PciTopology::new(0x0b, 0, 0)),
            )
    }

    #[test]
    fn test_construct_full_device() {
        let (id, platform) = handles();
        let device = OclDevice::new(0, Some(id), Some(platform), &vega_source());

        assert!(device.is_valid());
        assert_eq!(device.architecture(), OclArchitecture::Vega20);
        assert_eq!(device.compute_units(), 60);
        assert_eq!(device.free_mem_size(), 2 * BYTES_PER_GB);
        assert_eq!(device.vendor_id(), OclVendor::Amd);
        assert_eq!(device.platform_vendor_id(), OclVendor::Amd);
        assert_eq!(device.board(), "Radeon VII");
        assert_eq!(device.printable_name(), "Radeon VII (Vega 20 XTX)");
        assert_eq!(device.clock(), 1800);
        assert_eq!(device.topology().to_string(), "0b:00.0");
        assert!(device.has_extension("cl_khr_fp64"));
        assert!(!device.has_extension("cl_khr_fp"));
    }

    #[test]
    fn test_null_handles_produce_invalid_model() {
        let (id, platform) = handles();
        let source = vega_source();

        let device = OclDevice::new(3, None, Some(platform), &source);
        assert!(!device.is_valid());
        assert_eq!(device.index(), 3);
        assert_eq!(device.compute_units(), 1);

        let device = OclDevice::new(4, Some(id), None, &source);
        assert!(!device.is_valid());
    }

    #[test]
    fn test_failed_queries_use_defaults() {
        let (id, platform) = handles();
        let source = StaticDeviceInfo::new()
            .with_device(id, DeviceRecord::new("Experimental ASIC v9").with_compute_units(0));

        let device = OclDevice::new(1, Some(id), Some(platform), &source);
        assert!(device.is_valid());
        assert_eq!(device.compute_units(), 1);
        assert_eq!(device.architecture(), OclArchitecture::Unknown);
        assert_eq!(device.vendor_id(), OclVendor::Unknown);
        assert_eq!(device.platform_vendor(), "");
        assert_eq!(device.free_mem_size(), 0);
        assert!(!device.topology().is_valid());
    }

    #[test]
    fn test_board_falls_back_to_name() {
        let (id, platform) = handles();
        let source = StaticDeviceInfo::new().with_device(
            id,
            DeviceRecord::new("GeForce GTX 1080")
                .with_vendor("NVIDIA Corporation")
                .with_board("ignored for non-AMD devices"),
        );

        let device = OclDevice::new(0, Some(id), Some(platform), &source);
        assert_eq!(device.board_name(), None);
        assert_eq!(device.board(), "GeForce GTX 1080");
        assert_eq!(device.printable_name(), "GeForce GTX 1080");
    }

    #[test]
    fn test_custom_classifier() {
        use crate::architecture::FragmentRule;

        let (id, platform) = handles();
        let classifier = ArchitectureClassifier::with_rules(vec![FragmentRule::new(
            "experimental asic",
            OclArchitecture::Navi21,
        )])
        .unwrap();
        let source = StaticDeviceInfo::new().with_device(id, DeviceRecord::new("Experimental ASIC v9"));

        let device = OclDevice::with_classifier(0, Some(id), Some(platform), &source, &classifier);
        assert_eq!(device.architecture(), OclArchitecture::Navi21);
    }
}
