//! OpenCL backend configuration.
//!
//! ```toml
//! enabled = true
//!
//! [[threads."cn/r"]]
//! index = 0
//! intensity = 896
//! worksize = 8
//!
//! [[architectures]]
//! fragment = "gfx1030"
//! architecture = "navi21"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::architecture::{ArchitectureClassifier, FragmentRule};
use crate::threads::ThreadConfig;
use crate::{OclError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OclConfig {
    /// Plan launches at all
    pub enabled: bool,

    /// Explicit launch overrides, keyed by algorithm
    pub threads: BTreeMap<String, Vec<ThreadConfig>>,

    /// Replacement for the built-in architecture fragment table
    #[serde(skip_serializing_if = "Option::is_none")]
    pub architectures: Option<Vec<FragmentRule>>,
}

impl Default for OclConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threads: BTreeMap::new(),
            architectures: None,
        }
    }
}

impl OclConfig {
    /// Load configuration from a file (TOML by extension, JSON otherwise)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let config: Self = if is_toml(path) {
            toml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };

        config.validate()?;
        log::debug!("Loaded OpenCL config from {}", path.display());
        Ok(config)
    }

    /// Save configuration to a file (TOML by extension, JSON otherwise)
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        let content = if is_toml(path) {
            toml::to_string_pretty(self)?
        } else {
            serde_json::to_string_pretty(self)?
        };

        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        for (algorithm, threads) in &self.threads {
            let mut seen = BTreeSet::new();
            for thread in threads {
                thread
                    .validate()
                    .map_err(|e| OclError::Config(format!("{}: {}", algorithm, e)))?;

                // One override per device; a later entry would never be used
                if !seen.insert(thread.index) {
                    return Err(OclError::Config(format!(
                        "{}: duplicate override for device #{}",
                        algorithm, thread.index
                    )));
                }
            }
        }

        if let Some(rules) = &self.architectures {
            ArchitectureClassifier::with_rules(rules.clone())?;
        }

        Ok(())
    }

    /// Explicit override for `device_index` running `algorithm`, if any.
    /// [`validate`](Self::validate) guarantees at most one per device.
    pub fn threads_for(&self, algorithm: &str, device_index: u32) -> Option<&ThreadConfig> {
        self.threads
            .get(algorithm)?
            .iter()
            .find(|thread| thread.index == device_index)
    }

    pub fn set_threads(&mut self, algorithm: impl Into<String>, threads: Vec<ThreadConfig>) {
        self.threads.insert(algorithm.into(), threads);
    }

    /// Classifier built from the configured table, or the built-in one
    pub fn classifier(&self) -> Result<ArchitectureClassifier> {
        match &self.architectures {
            Some(rules) => ArchitectureClassifier::with_rules(rules.clone()),
            None => Ok(ArchitectureClassifier::default()),
        }
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("toml")
}
