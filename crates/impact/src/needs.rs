//! Minimum needs of affected people (food, water, shelter kits, toilets).
//!
//! A needs schedule is an ordered list of per-person allowances. The needs
//! service turns a head count into absolute amounts, grouped by how often they
//! must be supplied ("weekly", "single").

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ImpactError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeedUnit {
    pub name: String,
    pub plural: String,
    pub abbreviation: String,
}

impl NeedUnit {
    pub fn new(name: &str, plural: &str, abbreviation: &str) -> Self {
        Self {
            name: name.to_string(),
            plural: plural.to_string(),
            abbreviation: abbreviation.to_string(),
        }
    }
}

/// One configurable allowance in a needs schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeedParameter {
    pub name: String,
    pub description: String,
    pub unit: NeedUnit,
    pub frequency: String,
    /// Amount per person per `frequency`.
    pub value: f64,
    pub minimum_allowed: f64,
    pub maximum_allowed: f64,
}

impl NeedParameter {
    /// Bounds must be finite and ordered, and the value finite.
    pub fn validate(&self) -> Result<(), ImpactError> {
        let finite = self.value.is_finite()
            && self.minimum_allowed.is_finite()
            && self.maximum_allowed.is_finite();
        if !finite || self.minimum_allowed > self.maximum_allowed {
            return Err(ImpactError::InsufficientParameters(format!(
                "minimum need '{}' has value {} outside bounds [{}, {}]",
                self.name, self.value, self.minimum_allowed, self.maximum_allowed
            )));
        }
        Ok(())
    }

    /// The flat record handed to a [`NeedsCalculator`]. The value is pulled
    /// into the allowed range; inverted bounds resolve to the maximum.
    pub fn serialize(&self) -> NeedRecord {
        NeedRecord {
            name: self.name.clone(),
            unit_abbreviation: self.unit.abbreviation.clone(),
            frequency: self.frequency.clone(),
            value: self
                .value
                .max(self.minimum_allowed)
                .min(self.maximum_allowed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeedRecord {
    pub name: String,
    pub unit_abbreviation: String,
    pub frequency: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeedAmount {
    #[serde(rename = "table name")]
    pub table_name: String,
    pub amount: u64,
}

/// Amounts for one supply frequency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyNeeds {
    pub frequency: String,
    pub resources: Vec<NeedAmount>,
}

/// Needs grouped by frequency, in first-appearance order of the schedule.
///
/// Serialized as an object keyed by frequency label, e.g.
/// `{"weekly": [{"table name": "Rice [kg]", "amount": 280}]}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TotalNeeds(pub Vec<FrequencyNeeds>);

impl Serialize for TotalNeeds {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for group in &self.0 {
            map.serialize_entry(&group.frequency, &group.resources)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for TotalNeeds {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TotalNeedsVisitor;

        impl<'de> Visitor<'de> for TotalNeedsVisitor {
            type Value = TotalNeeds;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map from frequency to needed resources")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<TotalNeeds, A::Error> {
                let mut needs = TotalNeeds::default();
                while let Some((frequency, resources)) =
                    access.next_entry::<String, Vec<NeedAmount>>()?
                {
                    needs.0.push(FrequencyNeeds {
                        frequency,
                        resources,
                    });
                }
                Ok(needs)
            }
        }

        deserializer.deserialize_map(TotalNeedsVisitor)
    }
}

impl TotalNeeds {
    pub fn frequencies(&self) -> impl Iterator<Item = &FrequencyNeeds> {
        self.0.iter()
    }

    pub fn get(&self, frequency: &str) -> Option<&[NeedAmount]> {
        self.0
            .iter()
            .find(|f| f.frequency == frequency)
            .map(|f| f.resources.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn push(&mut self, frequency: &str, amount: NeedAmount) {
        match self.0.iter_mut().find(|f| f.frequency == frequency) {
            Some(group) => group.resources.push(amount),
            None => self.0.push(FrequencyNeeds {
                frequency: frequency.to_string(),
                resources: vec![amount],
            }),
        }
    }
}

/// Computes what a number of affected people need.
pub trait NeedsCalculator: Send + Sync {
    fn compute(&self, total_impacted: u64, schedule: &[NeedRecord]) -> TotalNeeds;
}

/// Linear per-capita needs, rounded up to whole units.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerCapitaNeeds;

impl NeedsCalculator for PerCapitaNeeds {
    fn compute(&self, total_impacted: u64, schedule: &[NeedRecord]) -> TotalNeeds {
        let mut needs = TotalNeeds::default();
        for record in schedule {
            let exact = total_impacted as f64 * record.value;
            // products like 100 * 0.07 land a hair above the whole number
            let whole = if (exact - exact.round()).abs() < 1e-9 {
                exact.round()
            } else {
                exact.ceil()
            };
            let amount = whole.max(0.0) as u64;
            needs.push(
                &record.frequency,
                NeedAmount {
                    table_name: format!("{} [{}]", record.name, record.unit_abbreviation),
                    amount,
                },
            );
        }
        needs
    }
}

/// The default relief schedule.
pub fn default_minimum_needs() -> Vec<NeedParameter> {
    let kg = NeedUnit::new("kilogram", "kilograms", "kg");
    let litre = NeedUnit::new("litre", "litres", "l");
    let unit = NeedUnit::new("unit", "units", "unit");
    vec![
        NeedParameter {
            name: "Rice".to_string(),
            description: "Rice per person per week".to_string(),
            unit: kg,
            frequency: "weekly".to_string(),
            value: 2.8,
            minimum_allowed: 0.0,
            maximum_allowed: 100.0,
        },
        NeedParameter {
            name: "Drinking Water".to_string(),
            description: "Drinking water per person per week".to_string(),
            unit: litre.clone(),
            frequency: "weekly".to_string(),
            value: 17.5,
            minimum_allowed: 0.0,
            maximum_allowed: 150.0,
        },
        NeedParameter {
            name: "Clean Water".to_string(),
            description: "Washing and cooking water per person per week".to_string(),
            unit: litre,
            frequency: "weekly".to_string(),
            value: 67.0,
            minimum_allowed: 0.0,
            maximum_allowed: 200.0,
        },
        NeedParameter {
            name: "Family Kits".to_string(),
            description: "Hygiene kits, one per family of five".to_string(),
            unit: unit.clone(),
            frequency: "weekly".to_string(),
            value: 0.2,
            minimum_allowed: 0.0,
            maximum_allowed: 1.0,
        },
        NeedParameter {
            name: "Toilets".to_string(),
            description: "One toilet per 20 people".to_string(),
            unit,
            frequency: "single".to_string(),
            value: 0.05,
            minimum_allowed: 0.0,
            maximum_allowed: 1.0,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule() -> Vec<NeedRecord> {
        default_minimum_needs().iter().map(NeedParameter::serialize).collect()
    }

    #[test]
    fn test_needs_group_by_frequency_in_order() {
        let needs = PerCapitaNeeds.compute(100, &schedule());
        let freqs: Vec<&str> = needs.frequencies().map(|f| f.frequency.as_str()).collect();
        assert_eq!(freqs, ["weekly", "single"]);
        assert_eq!(needs.get("weekly").unwrap().len(), 4);
        assert_eq!(needs.get("single").unwrap().len(), 1);
    }

    #[test]
    fn test_needs_amounts_round_up() {
        let needs = PerCapitaNeeds.compute(90, &schedule());
        let weekly = needs.get("weekly").unwrap();
        assert_eq!(weekly[0].table_name, "Rice [kg]");
        assert_eq!(weekly[0].amount, 252);
        assert_eq!(weekly[1].amount, 1_575);
        assert_eq!(weekly[2].amount, 6_030);
        assert_eq!(weekly[3].amount, 18);
        // 90 * 0.05 = 4.5 toilets → 5
        assert_eq!(needs.get("single").unwrap()[0].amount, 5);
    }

    #[test]
    fn test_needs_for_nobody_are_zero() {
        let needs = PerCapitaNeeds.compute(0, &schedule());
        assert!(needs
            .frequencies()
            .flat_map(|f| f.resources.iter())
            .all(|r| r.amount == 0));
    }

    #[test]
    fn test_empty_schedule_gives_no_needs() {
        assert!(PerCapitaNeeds.compute(1_000, &[]).is_empty());
    }

    #[test]
    fn test_serialize_clamps_value() {
        let mut param = default_minimum_needs().remove(0);
        param.value = 500.0;
        assert_eq!(param.serialize().value, 100.0);
    }

    #[test]
    fn test_inverted_bounds_do_not_panic() {
        let mut param = default_minimum_needs().remove(0);
        param.minimum_allowed = 10.0;
        param.maximum_allowed = 1.0;
        assert!(param.validate().is_err());
        assert_eq!(param.serialize().value, 1.0);
    }

    #[test]
    fn test_validate_rejects_non_finite_values() {
        let mut param = default_minimum_needs().remove(0);
        assert!(param.validate().is_ok());
        param.value = f64::NAN;
        assert!(matches!(
            param.validate(),
            Err(ImpactError::InsufficientParameters(_))
        ));
    }

    #[test]
    fn test_total_needs_json_is_keyed_by_frequency() {
        let needs = PerCapitaNeeds.compute(100, &schedule());
        let json = serde_json::to_value(&needs).unwrap();
        let groups = json.as_object().unwrap();
        let keys: Vec<&str> = groups.keys().map(String::as_str).collect();
        assert_eq!(keys, ["weekly", "single"]);
        assert_eq!(json["weekly"][0]["table name"], "Rice [kg]");
        assert_eq!(json["weekly"][0]["amount"], 280);
        assert_eq!(json["single"].as_array().unwrap().len(), 1);

        let back: TotalNeeds = serde_json::from_value(json).unwrap();
        assert_eq!(back, needs);
    }

    #[test]
    fn test_need_amount_json_key() {
        let json = serde_json::to_string(&NeedAmount {
            table_name: "Rice [kg]".to_string(),
            amount: 3,
        })
        .unwrap();
        assert!(json.contains("\"table name\""), "got: {json}");
    }
}
