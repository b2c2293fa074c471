/*!
PCI Bus Topology

Physical location of a device. Only used to identify and group devices,
never for sizing.
*/

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct PciTopology {
    bus: u32,
    device: u32,
    function: u32,
    valid: bool,
}

impl PciTopology {
    pub fn new(bus: u32, device: u32, function: u32) -> Self {
        Self {
            bus,
            device,
            function,
            valid: true,
        }
    }

    /// Build from the NVIDIA bus id / slot id extension pair
    pub fn from_nvidia(bus: u32, slot: u32) -> Self {
        Self::new(bus, (slot >> 3) & 0xff, slot & 7)
    }

    /// Decode a raw `cl_device_topology_amd` value. Only PCIe topologies
    /// are understood.
    pub fn from_amd_raw(raw: &[u8]) -> Option<Self> {
        if raw.len() < CL_DEVICE_TOPOLOGY_AMD_SIZE {
            return None;
        }

        let kind = u32::from_ne_bytes([raw[0], raw[1], raw[2], raw[3]]);
        if kind != CL_DEVICE_TOPOLOGY_TYPE_PCIE_AMD {
            return None;
        }

        Some(Self::new(
            raw[AMD_TOPOLOGY_BUS_OFFSET] as u32,
            raw[AMD_TOPOLOGY_DEVICE_OFFSET] as u32,
            raw[AMD_TOPOLOGY_FUNCTION_OFFSET] as u32,
        ))
    }

    pub fn bus(&self) -> u32 {
        self.bus
    }

    pub fn device(&self) -> u32 {
        self.device
    }

    pub fn function(&self) -> u32 {
        self.function
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

impl fmt::Display for PciTopology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.valid {
            return write!(f, "n/a");
        }

        write!(f, "{:02x}:{:02x}.{:01x}", self.bus, self.device, self.function)
    }
}
