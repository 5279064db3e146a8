use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::shell::ShellSpec;

/// Masses of the three crew consumables, in kilograms (or kg/day for rates).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consumables {
    pub o2: f64,
    pub h2o: f64,
    pub food: f64,
}

impl Consumables {
    pub fn new(o2: f64, h2o: f64, food: f64) -> Self {
        Self { o2, h2o, food }
    }
}

/// Daylight/night cycle and power storage of a surface site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentProfile {
    pub id: String,
    pub daylight_hours: f64,
    pub night_hours: f64,
    /// Mean solar generation while the sun is up.
    pub solar_kw_mean_daylight: f64,
    pub battery_capacity_kwh: f64,
}

impl EnvironmentProfile {
    pub fn new(id: &str, daylight_hours: f64, night_hours: f64, solar_kw: f64, battery_kwh: f64) -> Self {
        Self {
            id: id.to_string(),
            daylight_hours,
            night_hours,
            solar_kw_mean_daylight: solar_kw,
            battery_capacity_kwh: battery_kwh,
        }
    }
}

/// Two module types that should sit close to each other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjacencyRule {
    pub a: String,
    pub b: String,
}

impl AdjacencyRule {
    pub fn new(a: &str, b: &str) -> Self {
        Self {
            a: a.to_string(),
            b: b.to_string(),
        }
    }
}

/// Global tunables shared by the editor, the simulator and the scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalParams {
    pub cabin_height_m: f64,
    pub module_min_edge_m: f64,
    pub module_max_edge_m: f64,
    pub forbid_overlap: bool,
    pub adjacency_threshold_m: f64,
    pub mass_ref_kg: f64,
    pub ref_days_normalization: f64,
    pub horizon_days: u32,
    pub initial_stores: Consumables,
    pub per_crew_rates: Consumables,
    pub eclss_type_key: String,
    pub default_crew: u32,
    pub default_environment: String,
    pub default_shell: ShellSpec,
    pub adjacency_rules: Vec<AdjacencyRule>,
    pub environments: Vec<EnvironmentProfile>,
}

impl Default for GlobalParams {
    fn default() -> Self {
        Self {
            cabin_height_m: 2.5,
            module_min_edge_m: 1.2,
            module_max_edge_m: 6.0,
            forbid_overlap: false,
            adjacency_threshold_m: 3.0,
            mass_ref_kg: 8000.0,
            ref_days_normalization: 30.0,
            horizon_days: 365,
            initial_stores: Consumables::new(50.0, 200.0, 100.0),
            per_crew_rates: Consumables::new(0.84, 3.0, 0.62),
            eclss_type_key: "eclss".to_string(),
            default_crew: 2,
            default_environment: "moon_south_pole".to_string(),
            default_shell: ShellSpec::ellipse(10.0, 7.0, 3.0),
            adjacency_rules: vec![
                AdjacencyRule::new("hygiene", "crew_quarters"),
                AdjacencyRule::new("medical", "airlock"),
            ],
            environments: vec![
                EnvironmentProfile::new("moon_south_pole", 12.0, 12.0, 5.0, 50.0),
                EnvironmentProfile::new("moon_equator", 354.0 / 29.5, 354.0 / 29.5, 6.0, 80.0),
                EnvironmentProfile::new("mars_surface", 12.3, 12.3, 3.5, 60.0),
            ],
        }
    }
}

impl GlobalParams {
    pub fn environment(&self, id: &str) -> Option<&EnvironmentProfile> {
        self.environments.iter().find(|e| e.id == id)
    }

    /// The environment used when a requested profile is unknown: the default
    /// profile, else a 12 h / 12 h, 5 kW, 50 kWh site.
    pub fn environment_or_default(&self, id: &str) -> EnvironmentProfile {
        self.environment(id)
            .or_else(|| self.environment(&self.default_environment))
            .cloned()
            .unwrap_or_else(|| EnvironmentProfile::new(id, 12.0, 12.0, 5.0, 50.0))
    }
}

/// Explicit configuration injected into the editor and simulator. Shared as
/// `Arc<HabitatConfig>`; a reload swaps the whole reference.
#[derive(Debug, Clone, Default)]
pub struct HabitatConfig {
    pub catalog: Catalog,
    pub params: GlobalParams,
}

impl HabitatConfig {
    pub fn new(catalog: Catalog, params: GlobalParams) -> Self {
        Self { catalog, params }
    }

    pub fn baseline() -> Self {
        Self::new(Catalog::baseline(), GlobalParams::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_deserialize_with_defaults() {
        let params: GlobalParams =
            serde_json::from_str(r#"{"cabin_height_m": 3.0, "forbid_overlap": true}"#).unwrap();
        assert_eq!(params.cabin_height_m, 3.0);
        assert!(params.forbid_overlap);
        assert_eq!(params.horizon_days, 365);
        assert_eq!(params.adjacency_rules.len(), 2);
    }

    #[test]
    fn test_environment_fallback() {
        let params = GlobalParams::default();
        assert_eq!(params.environment_or_default("mars_surface").id, "mars_surface");
        assert_eq!(params.environment_or_default("titan").id, "moon_south_pole");
    }
}
