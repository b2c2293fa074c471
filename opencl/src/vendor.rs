/*!
OpenCL Vendor Classification

Maps vendor strings reported by devices and platforms to a closed set of
vendors.
*/

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OclVendor {
    #[default]
    Unknown,
    Amd,
    Nvidia,
    Intel,
    Apple,
}

impl OclVendor {
    /// Classify a vendor string (`CL_DEVICE_VENDOR` / `CL_PLATFORM_VENDOR`)
    pub fn from_vendor_string(vendor: &str) -> Self {
        let vendor_lower = vendor.to_lowercase();

        if vendor_lower.contains(VENDOR_KEYWORD_AMD_FULL) || has_word(&vendor_lower, VENDOR_KEYWORD_AMD) {
            Self::Amd
        } else if vendor_lower.contains(VENDOR_KEYWORD_NVIDIA) {
            Self::Nvidia
        } else if vendor_lower.contains(VENDOR_KEYWORD_INTEL) {
            Self::Intel
        } else if vendor_lower.contains(VENDOR_KEYWORD_APPLE) {
            Self::Apple
        } else {
            Self::Unknown
        }
    }
}

/// `word` appears as a whole alphanumeric token of `text`
fn has_word(text: &str, word: &str) -> bool {
    text.split(|c: char| !c.is_alphanumeric()).any(|token| token == word)
}

impl fmt::Display for OclVendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Amd => write!(f, "AMD"),
            Self::Nvidia => write!(f, "NVIDIA"),
            Self::Intel => write!(f, "Intel"),
            Self::Apple => write!(f, "Apple"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}
