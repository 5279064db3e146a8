//! Static per-type module definitions.
//!
//! A [`Catalog`] is immutable once built. Reloading means building a new
//! catalog and swapping the shared reference held by the editor.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, ParamError};

/// Per-day resource rates of a module type. For the life-support type these are
/// the production rates at nominal load; `energy_kw` is always a power draw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceRates {
    pub o2_kg_day: f64,
    pub h2o_kg_day: f64,
    pub food_kg_day: f64,
    pub energy_kw: f64,
}

/// A stored parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Boolean(bool),
    Number(f64),
    Choice(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ParamKind {
    Number { default: f64, min: f64, max: f64 },
    Choice { default: String, choices: Vec<String> },
    Boolean { default: bool },
}

/// Typed descriptor for one type-specific parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamDescriptor {
    pub id: String,
    #[serde(flatten)]
    pub kind: ParamKind,
}

impl ParamDescriptor {
    pub fn number(id: &str, default: f64, min: f64, max: f64) -> Self {
        Self {
            id: id.to_string(),
            kind: ParamKind::Number { default, min, max },
        }
    }

    pub fn choice(id: &str, default: &str, choices: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            kind: ParamKind::Choice {
                default: default.to_string(),
                choices: choices.iter().map(|c| c.to_string()).collect(),
            },
        }
    }

    pub fn boolean(id: &str, default: bool) -> Self {
        Self {
            id: id.to_string(),
            kind: ParamKind::Boolean { default },
        }
    }

    pub fn default_value(&self) -> ParamValue {
        match &self.kind {
            ParamKind::Number { default, .. } => ParamValue::Number(*default),
            ParamKind::Choice { default, .. } => ParamValue::Choice(default.clone()),
            ParamKind::Boolean { default } => ParamValue::Boolean(*default),
        }
    }

    /// Check a value against this descriptor's kind and bounds.
    pub fn check(&self, value: &ParamValue) -> Result<(), ParamError> {
        match (&self.kind, value) {
            (ParamKind::Number { min, max, .. }, ParamValue::Number(v)) => {
                if v.is_finite() && *v >= *min && *v <= *max {
                    Ok(())
                } else {
                    Err(ParamError::OutOfBounds {
                        id: self.id.clone(),
                        value: *v,
                        min: *min,
                        max: *max,
                    })
                }
            }
            (ParamKind::Choice { choices, .. }, ParamValue::Choice(v)) => {
                if choices.iter().any(|c| c == v) {
                    Ok(())
                } else {
                    Err(ParamError::InvalidChoice {
                        id: self.id.clone(),
                        value: v.clone(),
                    })
                }
            }
            (ParamKind::Boolean { .. }, ParamValue::Boolean(_)) => Ok(()),
            (kind, _) => Err(ParamError::WrongKind {
                id: self.id.clone(),
                expected: match kind {
                    ParamKind::Number { .. } => "number",
                    ParamKind::Choice { .. } => "choice",
                    ParamKind::Boolean { .. } => "boolean",
                },
            }),
        }
    }
}

/// Definition of one module type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleTypeDef {
    pub key: String,
    pub name: String,
    /// Reference volume used to size new instances.
    pub reference_volume_m3: f64,
    /// Minimum net habitable volume this function needs.
    pub min_volume_m3: f64,
    pub mass_kg: f64,
    #[serde(default)]
    pub rates: ResourceRates,
    /// Crew supported per installed unit (life support only).
    #[serde(default)]
    pub crew_capacity: f64,
    #[serde(default)]
    pub params: Vec<ParamDescriptor>,
}

impl ModuleTypeDef {
    pub fn new(key: &str, name: &str, reference_volume_m3: f64, min_volume_m3: f64, mass_kg: f64) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            reference_volume_m3,
            min_volume_m3,
            mass_kg,
            rates: ResourceRates::default(),
            crew_capacity: 0.0,
            params: Vec::new(),
        }
    }

    pub fn with_rates(mut self, o2: f64, h2o: f64, food: f64, energy_kw: f64) -> Self {
        self.rates = ResourceRates {
            o2_kg_day: o2,
            h2o_kg_day: h2o,
            food_kg_day: food,
            energy_kw,
        };
        self
    }

    pub fn with_crew_capacity(mut self, crew: f64) -> Self {
        self.crew_capacity = crew;
        self
    }

    pub fn with_param(mut self, param: ParamDescriptor) -> Self {
        self.params.push(param);
        self
    }

    pub fn param(&self, id: &str) -> Option<&ParamDescriptor> {
        self.params.iter().find(|p| p.id == id)
    }
}

/// Ordered, immutable set of module type definitions.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    types: Vec<ModuleTypeDef>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog; the first definition of a duplicated key wins.
    pub fn new(types: Vec<ModuleTypeDef>) -> Self {
        let mut kept = Vec::with_capacity(types.len());
        let mut index = HashMap::new();
        for def in types {
            if index.contains_key(&def.key) {
                log::warn!("Duplicate module type '{}' ignored", def.key);
                continue;
            }
            index.insert(def.key.clone(), kept.len());
            kept.push(def);
        }
        Self { types: kept, index }
    }

    pub fn lookup(&self, type_key: &str) -> Result<&ModuleTypeDef, CatalogError> {
        self.index
            .get(type_key)
            .map(|&i| &self.types[i])
            .ok_or_else(|| CatalogError::NotFound(type_key.to_string()))
    }

    pub fn contains(&self, type_key: &str) -> bool {
        self.index.contains_key(type_key)
    }

    /// Definitions in load order.
    pub fn list(&self) -> std::slice::Iter<'_, ModuleTypeDef> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// The default module set for lunar and martian surface habitats.
    pub fn baseline() -> Self {
        Self::new(vec![
            ModuleTypeDef::new("eclss", "ECLSS (Life Support)", 12.0, 8.0, 1800.0)
                .with_rates(3.36, 10.0, 0.0, 1.5)
                .with_crew_capacity(4.0)
                .with_param(ParamDescriptor::choice("loop", "closed", &["open", "closed"])),
            ModuleTypeDef::new("crew_quarters", "Crew Quarters", 10.0, 7.0, 900.0)
                .with_rates(0.0, 0.0, 0.0, 0.2)
                .with_param(ParamDescriptor::number("bunks", 2.0, 1.0, 4.0))
                .with_param(ParamDescriptor::boolean("privacy_curtain", true)),
            ModuleTypeDef::new("hygiene", "Hygiene + UWMS", 5.0, 4.0, 600.0)
                .with_rates(0.0, 0.0, 0.0, 0.3),
            ModuleTypeDef::new("galley", "Galley", 12.0, 9.0, 800.0)
                .with_rates(0.0, 0.0, 0.0, 0.6)
                .with_param(ParamDescriptor::choice(
                    "oven",
                    "convection",
                    &["convection", "induction"],
                )),
            ModuleTypeDef::new("medical", "Medical", 9.0, 6.0, 700.0)
                .with_rates(0.0, 0.0, 0.0, 0.4)
                .with_param(ParamDescriptor::boolean("isolation", false)),
            ModuleTypeDef::new("airlock", "Airlock", 8.0, 6.0, 1200.0)
                .with_rates(0.0, 0.0, 0.0, 0.5)
                .with_param(ParamDescriptor::number("suit_ports", 2.0, 0.0, 4.0)),
            ModuleTypeDef::new("exercise", "Exercise", 15.0, 10.0, 500.0)
                .with_rates(0.0, 0.0, 0.0, 0.4),
            ModuleTypeDef::new("stowage", "Stowage", 6.0, 3.0, 300.0)
                .with_rates(0.0, 0.0, 0.0, 0.05),
            ModuleTypeDef::new("workstation", "Workstation", 7.0, 5.0, 400.0)
                .with_rates(0.0, 0.0, 0.0, 0.3),
        ])
    }
}
