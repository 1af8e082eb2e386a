//! Default values injected into impact function construction.
//!
//! Collects the demographic ratios and the relief schedule into a single
//! [`ImpactDefaults`] resource. Functions receive it explicitly when they are
//! built rather than reading process-wide state, so a caller can register a
//! function against a different profile without touching anything global.

use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::needs::{default_minimum_needs, NeedParameter};

/// Where a needs profile comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    pub profile: String,
    pub description: String,
}

impl Default for Provenance {
    fn default() -> Self {
        Self {
            profile: "BNPB_en".to_string(),
            description: "The minimum needs are based on BNPB Perka 7/2008.".to_string(),
        }
    }
}

/// Demographic split of an affected population.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DemographicRatios {
    pub youth_ratio: f64,
    pub adult_ratio: f64,
    pub elderly_ratio: f64,
}

impl Default for DemographicRatios {
    fn default() -> Self {
        Self {
            youth_ratio: 0.263,
            adult_ratio: 0.659,
            elderly_ratio: 0.078,
        }
    }
}

impl DemographicRatios {
    /// Age ratios must partition the population.
    pub fn age_ratios_are_consistent(&self) -> bool {
        let sum = self.youth_ratio + self.adult_ratio + self.elderly_ratio;
        (sum - 1.0).abs() < 1e-6
    }
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ImpactDefaults {
    pub ratios: DemographicRatios,
    pub minimum_needs: NeedsProfile,
    pub provenance: Provenance,
}

/// The needs schedule applied when a function does not override it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeedsProfile(pub Vec<NeedParameter>);

impl Default for NeedsProfile {
    fn default() -> Self {
        Self(default_minimum_needs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ratios_are_consistent() {
        let ratios = DemographicRatios::default();
        assert!(ratios.age_ratios_are_consistent());
    }

    #[test]
    fn test_inconsistent_ratios_detected() {
        let ratios = DemographicRatios {
            youth_ratio: 0.5,
            ..Default::default()
        };
        assert!(!ratios.age_ratios_are_consistent());
    }

    #[test]
    fn test_defaults_roundtrip_json() {
        let defaults = ImpactDefaults::default();
        let json = serde_json::to_string(&defaults).unwrap();
        let back: ImpactDefaults = serde_json::from_str(&json).unwrap();
        assert_eq!(back.provenance, defaults.provenance);
        assert_eq!(back.minimum_needs.0.len(), 5);
    }
}
