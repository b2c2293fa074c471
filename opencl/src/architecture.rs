/*!
GPU Architecture Classification

Derives the architecture family of a device from the name it reports. Names
are matched case-insensitively against an ordered table of fragments; the
first fragment contained in the name wins, so more specific fragments must be
listed before the looser ones they contain.
*/

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::*;
use crate::{OclError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OclArchitecture {
    #[default]
    Unknown,

    // GCN4
    Baffin,
    Ellesmere,
    Polaris,
    Lexa,

    // GCN5
    Vega10,
    Vega20,
    Raven,

    // RDNA
    Navi10,
    Navi12,
    Navi14,
    Navi21,
}

impl OclArchitecture {
    pub const ALL: [OclArchitecture; 12] = [
        Self::Unknown,
        Self::Baffin,
        Self::Ellesmere,
        Self::Polaris,
        Self::Lexa,
        Self::Vega10,
        Self::Vega20,
        Self::Raven,
        Self::Navi10,
        Self::Navi12,
        Self::Navi14,
        Self::Navi21,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Baffin => "baffin",
            Self::Ellesmere => "ellesmere",
            Self::Polaris => "polaris",
            Self::Lexa => "lexa",
            Self::Vega10 => "vega_10",
            Self::Vega20 => "vega_20",
            Self::Raven => "raven",
            Self::Navi10 => "navi_10",
            Self::Navi12 => "navi_12",
            Self::Navi14 => "navi_14",
            Self::Navi21 => "navi_21",
        }
    }

    pub fn is_rdna(&self) -> bool {
        matches!(self, Self::Navi10 | Self::Navi12 | Self::Navi14 | Self::Navi21)
    }
}

impl fmt::Display for OclArchitecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Built-in fragment table, newest and most specific first.
///
/// A bare "vega" that matched nothing more specific is taken to be Vega 10.
pub const DEFAULT_FRAGMENTS: &[(&str, OclArchitecture)] = &[
    (FRAGMENT_GFX1030, OclArchitecture::Navi21),
    (FRAGMENT_NAVI_21, OclArchitecture::Navi21),
    (FRAGMENT_NAVI21, OclArchitecture::Navi21),
    (FRAGMENT_SIENNA_CICHLID, OclArchitecture::Navi21),
    (FRAGMENT_GFX1012, OclArchitecture::Navi14),
    (FRAGMENT_NAVI_14, OclArchitecture::Navi14),
    (FRAGMENT_NAVI14, OclArchitecture::Navi14),
    (FRAGMENT_GFX1011, OclArchitecture::Navi12),
    (FRAGMENT_NAVI_12, OclArchitecture::Navi12),
    (FRAGMENT_NAVI12, OclArchitecture::Navi12),
    (FRAGMENT_GFX1010, OclArchitecture::Navi10),
    (FRAGMENT_NAVI_10, OclArchitecture::Navi10),
    (FRAGMENT_NAVI10, OclArchitecture::Navi10),
    (FRAGMENT_GFX906, OclArchitecture::Vega20),
    (FRAGMENT_GFX907, OclArchitecture::Vega20),
    (FRAGMENT_VEGA_20, OclArchitecture::Vega20),
    (FRAGMENT_VEGA20, OclArchitecture::Vega20),
    (FRAGMENT_VEGA_II, OclArchitecture::Vega20),
    (FRAGMENT_GFX902, OclArchitecture::Raven),
    (FRAGMENT_GFX903, OclArchitecture::Raven),
    (FRAGMENT_RAVEN, OclArchitecture::Raven),
    (FRAGMENT_VEGA_3_GRAPHICS, OclArchitecture::Raven),
    (FRAGMENT_VEGA_6_GRAPHICS, OclArchitecture::Raven),
    (FRAGMENT_VEGA_8_GRAPHICS, OclArchitecture::Raven),
    (FRAGMENT_VEGA_9_GRAPHICS, OclArchitecture::Raven),
    (FRAGMENT_VEGA_10_GRAPHICS, OclArchitecture::Raven),
    (FRAGMENT_VEGA_11_GRAPHICS, OclArchitecture::Raven),
    (FRAGMENT_GFX900, OclArchitecture::Vega10),
    (FRAGMENT_GFX901, OclArchitecture::Vega10),
    (FRAGMENT_VEGA_10, OclArchitecture::Vega10),
    (FRAGMENT_VEGA10, OclArchitecture::Vega10),
    (FRAGMENT_VEGA, OclArchitecture::Vega10),
    (FRAGMENT_GFX804, OclArchitecture::Lexa),
    (FRAGMENT_LEXA, OclArchitecture::Lexa),
    (FRAGMENT_BAFFIN, OclArchitecture::Baffin),
    (FRAGMENT_ELLESMERE, OclArchitecture::Ellesmere),
    (FRAGMENT_GFX803, OclArchitecture::Polaris),
    (FRAGMENT_POLARIS, OclArchitecture::Polaris),
];

/// Classify a device name against the built-in table
pub fn classify(name: &str) -> OclArchitecture {
    first_match(name, DEFAULT_FRAGMENTS.iter().map(|(fragment, arch)| (*fragment, *arch)))
}

fn first_match<'a>(
    name: &str,
    mut rules: impl Iterator<Item = (&'a str, OclArchitecture)>,
) -> OclArchitecture {
    let name_lower = name.to_lowercase();

    match rules.find(|(fragment, _)| name_lower.contains(fragment)) {
        Some((_, arch)) => arch,
        None => {
            log::debug!("No architecture fragment matches {:?}", name);
            OclArchitecture::Unknown
        }
    }
}

/// One entry of a fragment table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentRule {
    pub fragment: String,
    pub architecture: OclArchitecture,
}

impl FragmentRule {
    pub fn new(fragment: impl Into<String>, architecture: OclArchitecture) -> Self {
        Self {
            fragment: fragment.into(),
            architecture,
        }
    }
}

/// Ordered fragment table, either the built-in one or one supplied by
/// configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchitectureClassifier {
    rules: Vec<FragmentRule>,
}

impl Default for ArchitectureClassifier {
    fn default() -> Self {
        Self {
            rules: DEFAULT_FRAGMENTS
                .iter()
                .map(|(fragment, arch)| FragmentRule::new(*fragment, *arch))
                .collect(),
        }
    }
}

impl ArchitectureClassifier {
    /// Build a classifier from a custom table.
    ///
    /// Fragments are lowercased. The table is rejected if a fragment is empty
    /// or if an earlier fragment is contained in a later one, since the later
    /// rule could then never match.
    pub fn with_rules(rules: Vec<FragmentRule>) -> Result<Self> {
        let rules: Vec<FragmentRule> = rules
            .into_iter()
            .map(|rule| FragmentRule::new(rule.fragment.trim().to_lowercase(), rule.architecture))
            .collect();

        validate_rules(&rules)?;
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[FragmentRule] {
        &self.rules
    }

    pub fn classify(&self, name: &str) -> OclArchitecture {
        first_match(
            name,
            self.rules.iter().map(|rule| (rule.fragment.as_str(), rule.architecture)),
        )
    }
}

fn validate_rules(rules: &[FragmentRule]) -> Result<()> {
    for (i, rule) in rules.iter().enumerate() {
        if rule.fragment.is_empty() {
            return Err(OclError::Config(format!("fragment #{} is empty", i)));
        }

        if let Some(shadowed) = rules[i + 1..]
            .iter()
            .find(|later| later.fragment.contains(&rule.fragment))
        {
            return Err(OclError::Config(format!(
                "fragment {:?} shadows later fragment {:?}",
                rule.fragment, shadowed.fragment
            )));
        }
    }

    Ok(())
}
