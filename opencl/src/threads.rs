/*!
Launch Configurations

`ThreadConfig` is what a user may write in configuration; `OclThread` is a
fully resolved launch for one partition of one device.
*/

use serde::{Deserialize, Serialize};

use crate::constants::{MAX_UNROLL, MAX_WORKSIZE};
use crate::{OclError, Result};

/// Explicit per-device overrides. Every field that is set is used verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreadConfig {
    /// Device index the override applies to
    pub index: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub intensity: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub worksize: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub unroll: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub affinity: Option<i64>,
}

impl ThreadConfig {
    pub fn new(index: u32) -> Self {
        Self {
            index,
            ..Self::default()
        }
    }

    pub fn with_intensity(mut self, intensity: u32) -> Self {
        self.intensity = Some(intensity);
        self
    }

    pub fn with_worksize(mut self, worksize: u32) -> Self {
        self.worksize = Some(worksize);
        self
    }

    pub fn with_unroll(mut self, unroll: u32) -> Self {
        self.unroll = Some(unroll);
        self
    }

    pub fn with_affinity(mut self, affinity: i64) -> Self {
        self.affinity = Some(affinity);
        self
    }

    /// Reject values no kernel can be launched with
    pub fn validate(&self) -> Result<()> {
        if self.intensity == Some(0) {
            return Err(OclError::Config(format!("device #{}: intensity must be > 0", self.index)));
        }

        if let Some(worksize) = self.worksize {
            if worksize == 0 || worksize > MAX_WORKSIZE {
                return Err(OclError::Config(format!(
                    "device #{}: worksize must be in 1..={}",
                    self.index, MAX_WORKSIZE
                )));
            }
        }

        if let Some(unroll) = self.unroll {
            if unroll == 0 || unroll > MAX_UNROLL {
                return Err(OclError::Config(format!(
                    "device #{}: unroll must be in 1..={}",
                    self.index, MAX_UNROLL
                )));
            }
        }

        Ok(())
    }
}

/// One resolved launch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OclThread {
    /// Device index
    pub index: u32,
    /// Partition of the device this launch covers
    pub partition: u32,
    /// Work items per dispatch
    pub intensity: u32,
    /// Work-group size
    pub worksize: u32,
    pub unroll: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affinity: Option<i64>,
}

/// Launches for one device, in scheduling order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OclThreads {
    threads: Vec<OclThread>,
}

impl OclThreads {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, thread: OclThread) {
        self.threads.push(thread);
    }

    pub fn len(&self) -> usize {
        self.threads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }

    pub fn get(&self, partition: usize) -> Option<&OclThread> {
        self.threads.get(partition)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OclThread> {
        self.threads.iter()
    }

    pub fn as_slice(&self) -> &[OclThread] {
        &self.threads
    }

    /// Total work items across all partitions
    pub fn total_intensity(&self) -> u64 {
        self.threads.iter().map(|t| t.intensity as u64).sum()
    }
}

impl IntoIterator for OclThreads {
    type Item = OclThread;
    type IntoIter = std::vec::IntoIter<OclThread>;

    fn into_iter(self) -> Self::IntoIter {
        self.threads.into_iter()
    }
}

impl<'a> IntoIterator for &'a OclThreads {
    type Item = &'a OclThread;
    type IntoIter = std::slice::Iter<'a, OclThread>;

    fn into_iter(self) -> Self::IntoIter {
        self.threads.iter()
    }
}
