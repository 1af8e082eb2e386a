//! Parameters of the categorical hazard population function.
//!
//! The parameter set is a typed struct whose field order is the order the
//! parameters are presented and serialized in. Postprocessor toggles are an
//! ordered list, each with an optional ordered list of named values.
//! Callers may override any field before execution, either directly or by
//! merging a JSON object with [`CategoricalHazardParams::apply_json`].

use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_HIGH_THRESHOLD, DEFAULT_LOW_THRESHOLD, DEFAULT_MEDIUM_THRESHOLD};
use crate::defaults::{ImpactDefaults, Provenance};
use crate::error::ImpactError;
use crate::needs::{NeedParameter, NeedRecord};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedValue {
    pub name: String,
    pub value: f64,
}

impl NamedValue {
    pub fn new(name: &str, value: f64) -> Self {
        Self {
            name: name.to_string(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostprocessorConfig {
    pub name: String,
    pub on: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Vec<NamedValue>>,
}

impl PostprocessorConfig {
    pub fn enabled(name: &str) -> Self {
        Self {
            name: name.to_string(),
            on: true,
            params: None,
        }
    }

    pub fn param(&self, name: &str) -> Option<f64> {
        self.params
            .as_ref()?
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value)
    }
}

/// Hazard codes bound to each severity tier. A code of exactly 0 disables
/// its tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            low: DEFAULT_LOW_THRESHOLD,
            medium: DEFAULT_MEDIUM_THRESHOLD,
            high: DEFAULT_HIGH_THRESHOLD,
        }
    }
}

impl Thresholds {
    /// Codes of the tiers that are switched on, high first.
    pub fn enabled(&self) -> impl Iterator<Item = f64> {
        [self.high, self.medium, self.low]
            .into_iter()
            .filter(|&t| t != 0.0)
    }

    pub fn all_disabled(&self) -> bool {
        self.enabled().next().is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalHazardParams {
    pub low_thresholds: f64,
    pub medium_thresholds: f64,
    pub high_thresholds: f64,
    pub postprocessors: Vec<PostprocessorConfig>,
    #[serde(rename = "minimum needs")]
    pub minimum_needs: Vec<NeedParameter>,
    pub provenance: Provenance,
}

impl CategoricalHazardParams {
    pub fn from_defaults(defaults: &ImpactDefaults) -> Self {
        let thresholds = Thresholds::default();
        let ratios = defaults.ratios;
        Self {
            low_thresholds: thresholds.low,
            medium_thresholds: thresholds.medium,
            high_thresholds: thresholds.high,
            postprocessors: vec![
                PostprocessorConfig::enabled("Gender"),
                PostprocessorConfig {
                    name: "Age".to_string(),
                    on: true,
                    params: Some(vec![
                        NamedValue::new("youth_ratio", ratios.youth_ratio),
                        NamedValue::new("adult_ratio", ratios.adult_ratio),
                        NamedValue::new("elderly_ratio", ratios.elderly_ratio),
                    ]),
                },
                PostprocessorConfig::enabled("MinimumNeeds"),
            ],
            minimum_needs: defaults.minimum_needs.0.clone(),
            provenance: defaults.provenance.clone(),
        }
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            low: self.low_thresholds,
            medium: self.medium_thresholds,
            high: self.high_thresholds,
        }
    }

    pub fn set_thresholds(&mut self, thresholds: Thresholds) {
        self.low_thresholds = thresholds.low;
        self.medium_thresholds = thresholds.medium;
        self.high_thresholds = thresholds.high;
    }

    pub fn postprocessor(&self, name: &str) -> Option<&PostprocessorConfig> {
        self.postprocessors.iter().find(|p| p.name == name)
    }

    /// Serialized needs schedule for the needs service.
    pub fn needs_schedule(&self) -> Vec<NeedRecord> {
        self.minimum_needs
            .iter()
            .map(NeedParameter::serialize)
            .collect()
    }

    /// Parameter names in presentation order.
    pub fn names(&self) -> Vec<String> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    /// Merge top-level keys of a JSON object into this parameter set.
    ///
    /// Unknown keys and values of the wrong shape are rejected and leave the
    /// parameters untouched.
    pub fn apply_json(&mut self, overrides: &serde_json::Value) -> Result<(), ImpactError> {
        let serde_json::Value::Object(patch) = overrides else {
            return Err(ImpactError::InsufficientParameters(
                "parameter overrides must be a JSON object".to_string(),
            ));
        };
        let mut current = match serde_json::to_value(&*self) {
            Ok(serde_json::Value::Object(map)) => map,
            Ok(_) | Err(_) => {
                return Err(ImpactError::InsufficientParameters(
                    "parameters could not be serialized".to_string(),
                ))
            }
        };
        for (key, value) in patch {
            if !current.contains_key(key) {
                return Err(ImpactError::InsufficientParameters(format!(
                    "unknown parameter '{key}'"
                )));
            }
            current.insert(key.clone(), value.clone());
        }
        let merged: CategoricalHazardParams =
            serde_json::from_value(serde_json::Value::Object(current)).map_err(|e| {
                ImpactError::InsufficientParameters(format!("invalid parameter value: {e}"))
            })?;
        for need in &merged.minimum_needs {
            need.validate()?;
        }
        *self = merged;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params() -> CategoricalHazardParams {
        CategoricalHazardParams::from_defaults(&ImpactDefaults::default())
    }

    #[test]
    fn test_default_thresholds() {
        let t = params().thresholds();
        assert_eq!((t.low, t.medium, t.high), (1.0, 2.0, 3.0));
        assert_eq!(t.enabled().collect::<Vec<_>>(), vec![3.0, 2.0, 1.0]);
    }

    #[test]
    fn test_zero_threshold_disables_tier() {
        let t = Thresholds {
            low: 0.0,
            medium: 2.0,
            high: 3.0,
        };
        assert_eq!(t.enabled().collect::<Vec<_>>(), vec![3.0, 2.0]);
        assert!(!t.all_disabled());
        let none = Thresholds {
            low: 0.0,
            medium: 0.0,
            high: 0.0,
        };
        assert!(none.all_disabled());
    }

    #[test]
    fn test_parameter_order_is_stable() {
        assert_eq!(
            params().names(),
            [
                "low_thresholds",
                "medium_thresholds",
                "high_thresholds",
                "postprocessors",
                "minimum needs",
                "provenance"
            ]
        );
        let p = params();
        let names: Vec<&str> = p
            .postprocessors
            .iter()
            .map(|config| config.name.as_str())
            .collect();
        assert_eq!(names, ["Gender", "Age", "MinimumNeeds"]);
    }

    #[test]
    fn test_age_postprocessor_uses_injected_ratios() {
        let mut defaults = ImpactDefaults::default();
        defaults.ratios.youth_ratio = 0.3;
        let p = CategoricalHazardParams::from_defaults(&defaults);
        let age = p.postprocessor("Age").unwrap();
        assert_eq!(age.param("youth_ratio"), Some(0.3));
        assert_eq!(age.param("missing"), None);
        assert!(p.postprocessor("Gender").unwrap().params.is_none());
    }

    #[test]
    fn test_apply_json_overrides_thresholds() {
        let mut p = params();
        p.apply_json(&json!({"low_thresholds": 0.0, "high_thresholds": 5.0}))
            .unwrap();
        assert_eq!(p.low_thresholds, 0.0);
        assert_eq!(p.medium_thresholds, 2.0);
        assert_eq!(p.high_thresholds, 5.0);
    }

    #[test]
    fn test_apply_json_rejects_unknown_key() {
        let mut p = params();
        let before = p.clone();
        let err = p.apply_json(&json!({"very_high_thresholds": 4.0})).unwrap_err();
        assert!(matches!(err, ImpactError::InsufficientParameters(_)));
        assert_eq!(p, before);
    }

    #[test]
    fn test_apply_json_rejects_wrong_type() {
        let mut p = params();
        assert!(p.apply_json(&json!({"low_thresholds": "one"})).is_err());
        assert!(p.apply_json(&json!([1, 2, 3])).is_err());
        assert_eq!(p.low_thresholds, 1.0);
    }

    #[test]
    fn test_apply_json_rejects_inverted_need_bounds() {
        let mut p = params();
        let before = p.clone();
        let mut needs = serde_json::to_value(&p.minimum_needs).unwrap();
        needs[0]["minimum_allowed"] = json!(10.0);
        needs[0]["maximum_allowed"] = json!(1.0);
        let err = p.apply_json(&json!({"minimum needs": needs})).unwrap_err();
        assert!(matches!(err, ImpactError::InsufficientParameters(_)));
        assert!(format!("{err}").contains("Rice"), "got: {err}");
        assert_eq!(p, before);
        assert_eq!(p.needs_schedule()[0].value, 2.8);
    }

    #[test]
    fn test_apply_json_accepts_valid_need_override() {
        let mut p = params();
        let mut needs = serde_json::to_value(&p.minimum_needs).unwrap();
        needs[0]["value"] = json!(3.0);
        p.apply_json(&json!({"minimum needs": needs})).unwrap();
        assert_eq!(p.needs_schedule()[0].value, 3.0);
    }

    #[test]
    fn test_needs_schedule_follows_minimum_needs() {
        let p = params();
        let schedule = p.needs_schedule();
        assert_eq!(schedule.len(), p.minimum_needs.len());
        assert_eq!(schedule[0].name, "Rice");
    }
}
