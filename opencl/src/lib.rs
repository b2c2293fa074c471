/*!
# TabAgent OpenCL Device Model

Models OpenCL compute devices and plans kernel launches for them.

## Features

- Immutable per-device capability model, queried once at enumeration time
- Architecture classification from vendor device names (GCN4, Vega, RDNA)
- Launch configuration generation bounded by device memory
- Explicit per-device overrides from JSON or TOML configuration

## Example

```rust
use tabagent_opencl::{DeviceId, DeviceRecord, OclDevice, PlatformId, StaticDeviceInfo, Workload};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let id = DeviceId::new(1).ok_or("null device")?;
    let platform = PlatformId::new(1).ok_or("null platform")?;

    let source = StaticDeviceInfo::new().with_device(
        id,
        DeviceRecord::new("gfx906")
            .with_compute_units(60)
            .with_global_mem_size(16 << 30)
            .with_max_mem_alloc_size(4 << 30),
    );

    let device = OclDevice::new(0, Some(id), Some(platform), &source);
    println!("Architecture: {}", device.architecture());

    let threads = device.generate(&Workload::new("cn/r", 2 << 20), None)?;
    for thread in &threads {
        println!("intensity {} worksize {}", thread.intensity, thread.worksize);
    }

    Ok(())
}
```
*/

pub mod architecture;
pub mod config;
pub mod constants;
pub mod device;
pub mod error;
pub mod generator;
pub mod loader;
pub mod native;
pub mod threads;
pub mod topology;
pub mod vendor;
pub mod workload;

pub use architecture::{classify, ArchitectureClassifier, FragmentRule, OclArchitecture};
pub use config::OclConfig;
pub use device::OclDevice;
pub use error::{OclError, Result};
pub use generator::{generate, plan_devices, tuning, ArchTuning, DevicePlan, PlannedDevice, SkippedDevice};
pub use loader::OpenClLibrary;
pub use native::{DeviceId, DeviceInfoSource, DeviceParam, DeviceRecord, PlatformId, PlatformParam, StaticDeviceInfo};
pub use threads::{OclThread, OclThreads, ThreadConfig};
pub use topology::PciTopology;
pub use vendor::OclVendor;
pub use workload::Workload;
