//! Workload selector
//!
//! The algorithm catalog lives elsewhere; this only carries what launch
//! planning needs to know about one algorithm.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Workload {
    algorithm: String,
    per_unit_footprint: u64,
    partitions: u32,
}

impl Workload {
    /// `per_unit_footprint` is the number of device bytes one work item needs
    pub fn new(algorithm: impl Into<String>, per_unit_footprint: u64) -> Self {
        Self {
            algorithm: algorithm.into(),
            per_unit_footprint,
            partitions: 1,
        }
    }

    /// Split each device into `partitions` independent launches (at least 1)
    pub fn with_partitions(mut self, partitions: u32) -> Self {
        self.partitions = partitions.max(1);
        self
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn per_unit_footprint(&self) -> u64 {
        self.per_unit_footprint
    }

    pub fn partitions(&self) -> u32 {
        self.partitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partitions_never_zero() {
        let workload = Workload::new("rx/0", 2 << 20).with_partitions(0);
        assert_eq!(workload.partitions(), 1);
        assert_eq!(workload.algorithm(), "rx/0");
        assert_eq!(workload.per_unit_footprint(), 2 << 20);
    }
}
