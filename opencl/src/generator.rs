/*!
Launch Configuration Generator

Derives launch configurations from a device model and a workload:
- memory ceiling check (device excluded when one work item does not fit)
- compute-unit based intensity, capped by memory
- architecture worksize / unroll defaults, overridable by explicit config
- one launch per workload partition, in partition order
*/

use serde::Serialize;

use crate::architecture::OclArchitecture;
use crate::config::OclConfig;
use crate::constants::*;
use crate::device::OclDevice;
use crate::threads::{OclThread, OclThreads, ThreadConfig};
use crate::workload::Workload;
use crate::{OclError, Result};

/// Per-architecture launch defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArchTuning {
    /// Work items scheduled per compute unit
    pub cu_multiplier: u32,
    pub worksize: u32,
    pub unroll: u32,
}

const GENERIC_TUNING: ArchTuning = ArchTuning {
    cu_multiplier: DEFAULT_CU_MULTIPLIER,
    worksize: DEFAULT_WORKSIZE,
    unroll: DEFAULT_UNROLL,
};

const GCN4_TUNING: ArchTuning = ArchTuning {
    cu_multiplier: 128,
    worksize: 8,
    unroll: 8,
};

const VEGA_TUNING: ArchTuning = ArchTuning {
    cu_multiplier: 256,
    worksize: 16,
    unroll: 8,
};

const APU_TUNING: ArchTuning = ArchTuning {
    cu_multiplier: 64,
    worksize: 8,
    unroll: 4,
};

const RDNA_TUNING: ArchTuning = ArchTuning {
    cu_multiplier: 256,
    worksize: 32,
    unroll: 4,
};

/// Launch defaults for an architecture
pub const fn tuning(architecture: OclArchitecture) -> ArchTuning {
    match architecture {
        OclArchitecture::Baffin
        | OclArchitecture::Ellesmere
        | OclArchitecture::Polaris
        | OclArchitecture::Lexa => GCN4_TUNING,
        OclArchitecture::Vega10 | OclArchitecture::Vega20 => VEGA_TUNING,
        OclArchitecture::Raven => APU_TUNING,
        OclArchitecture::Navi10
        | OclArchitecture::Navi12
        | OclArchitecture::Navi14
        | OclArchitecture::Navi21 => RDNA_TUNING,
        OclArchitecture::Unknown => GENERIC_TUNING,
    }
}

/// Generate launch configurations for `workload` on `device`.
///
/// Fields set in `explicit` are used verbatim; only the memory ceiling check
/// still applies to them.
pub fn generate(
    device: &OclDevice,
    workload: &Workload,
    explicit: Option<&ThreadConfig>,
) -> Result<OclThreads> {
    if !device.is_valid() {
        return Err(OclError::InvalidDevice {
            index: device.index(),
        });
    }

    let available = device.free_mem_size();
    let footprint = workload.per_unit_footprint();

    if available < footprint {
        log::warn!(
            "OpenCL device #{} skipped for {}: {} bytes allocatable, {} required",
            device.index(),
            workload.algorithm(),
            available,
            footprint
        );
        return Err(OclError::IncompatibleDevice {
            index: device.index(),
            available,
            required: footprint,
        });
    }

    let partitions = workload.partitions().max(1);
    let defaults = tuning(device.architecture());

    let worksize = explicit.and_then(|c| c.worksize).unwrap_or(defaults.worksize);
    let unroll = explicit.and_then(|c| c.unroll).unwrap_or(defaults.unroll);
    let affinity = explicit.and_then(|c| c.affinity);

    let intensity = match explicit.and_then(|c| c.intensity) {
        Some(intensity) => intensity,
        None => derive_intensity(device, footprint, partitions, defaults.cu_multiplier, worksize)?,
    };

    let mut threads = OclThreads::new();
    for partition in 0..partitions {
        threads.add(OclThread {
            index: device.index(),
            partition,
            intensity,
            worksize,
            unroll,
            affinity,
        });
    }

    log::info!(
        "OpenCL device #{} ({}): {} x intensity {} worksize {} unroll {} for {}",
        device.index(),
        device.architecture(),
        partitions,
        intensity,
        worksize,
        unroll,
        workload.algorithm()
    );

    Ok(threads)
}

/// Work items per partition: compute units scaled by the architecture
/// multiplier, capped so that `intensity * footprint` fits both the single
/// allocation limit and this partition's share of global memory.
///
/// Every partition gets at least one work item, so a partition count above
/// the device's compute baseline oversubscribes it (logged at warn).
fn derive_intensity(
    device: &OclDevice,
    footprint: u64,
    partitions: u32,
    cu_multiplier: u32,
    worksize: u32,
) -> Result<u32> {
    let partitions = partitions as u64;
    let ceiling = device
        .max_mem_alloc_size()
        .min(device.global_mem_size() / partitions);

    let memory_cap = match footprint {
        0 => u64::MAX,
        footprint => ceiling / footprint,
    };

    if memory_cap == 0 {
        log::warn!(
            "OpenCL device #{} cannot fit {} partitions of {} bytes",
            device.index(),
            partitions,
            footprint
        );
        return Err(OclError::IncompatibleDevice {
            index: device.index(),
            available: ceiling,
            required: footprint,
        });
    }

    let device_baseline = device.compute_units() as u64 * cu_multiplier as u64;
    if partitions > device_baseline {
        log::warn!(
            "OpenCL device #{}: {} partitions exceed its {} schedulable work items, each partition gets 1",
            device.index(),
            partitions,
            device_baseline
        );
    }

    let baseline = (device_baseline / partitions).max(1);
    let mut intensity = baseline.min(memory_cap);

    let worksize = worksize as u64;
    if worksize > 0 && intensity >= worksize {
        intensity -= intensity % worksize;
    }

    Ok(u32::try_from(intensity).unwrap_or(u32::MAX))
}

/// Launches planned for one device
#[derive(Debug, Clone, Serialize)]
pub struct PlannedDevice {
    pub index: u32,
    pub threads: OclThreads,
}

/// A device excluded from the run, with the reason
#[derive(Debug)]
pub struct SkippedDevice {
    pub index: u32,
    pub error: OclError,
}

/// Outcome of planning a workload across all enumerated devices
#[derive(Debug, Default)]
pub struct DevicePlan {
    pub planned: Vec<PlannedDevice>,
    pub skipped: Vec<SkippedDevice>,
}

impl DevicePlan {
    /// All launches, ordered by device index then partition
    pub fn threads(&self) -> impl Iterator<Item = &OclThread> {
        self.planned.iter().flat_map(|device| device.threads.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.planned.is_empty()
    }
}

/// Plan `workload` on every device. Invalid and incompatible devices are
/// reported in [`DevicePlan::skipped`] without affecting the others.
pub fn plan_devices(devices: &[OclDevice], workload: &Workload, config: &OclConfig) -> DevicePlan {
    let mut plan = DevicePlan::default();

    if !config.enabled {
        log::info!("OpenCL backend disabled, no devices planned");
        return plan;
    }

    let mut ordered: Vec<&OclDevice> = devices.iter().collect();
    ordered.sort_by_key(|device| device.index());

    for device in ordered {
        let explicit = config.threads_for(workload.algorithm(), device.index());

        match generate(device, workload, explicit) {
            Ok(threads) => plan.planned.push(PlannedDevice {
                index: device.index(),
                threads,
            }),
            Err(error) => {
                log::info!("OpenCL device #{} skipped: {}", device.index(), error);
                plan.skipped.push(SkippedDevice {
                    index: device.index(),
                    error,
                });
            }
        }
    }

    plan
}
