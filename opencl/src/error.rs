use thiserror::Error;

/// Errors that can occur while modelling OpenCL devices or planning launches
#[derive(Debug, Error)]
pub enum OclError {
    #[error("OpenCL device #{index} has no native device or platform handle")]
    InvalidDevice { index: u32 },

    #[error(
        "OpenCL device #{index} is incompatible: {available} bytes allocatable, {required} bytes required per unit"
    )]
    IncompatibleDevice {
        index: u32,
        available: u64,
        required: u64,
    },

    #[error("Native query failed: {0}")]
    NativeQuery(String),

    #[error("Failed to load OpenCL library: {0}")]
    LibraryLoad(String),

    #[error("Missing OpenCL symbol: {0}")]
    MissingSymbol(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

impl OclError {
    /// True when the error only excludes one device from the run.
    pub fn is_device_exclusion(&self) -> bool {
        matches!(
            self,
            Self::InvalidDevice { .. } | Self::IncompatibleDevice { .. }
        )
    }

    /// Index of the device this error is attributed to, if any.
    pub fn device_index(&self) -> Option<u32> {
        match self {
            Self::InvalidDevice { index } | Self::IncompatibleDevice { index, .. } => Some(*index),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, OclError>;
