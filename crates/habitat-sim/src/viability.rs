//! Day-stepped resource viability.
//!
//! Each simulated day the crew draws O2, water and food, installed life
//! support produces them in proportion to its load, and the site's solar
//! array and battery must carry the habitat's power draw through the night.
//! The run ends when a store is exhausted or the horizon is reached.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use habitat_core::{Catalog, Consumables, EnvironmentProfile, HabitatConfig, LayoutState};

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LimitingFactor {
    O2,
    H2O,
    Food,
    Energy,
    /// Survived the whole horizon.
    Horizon,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViabilityResult {
    pub days_survived: u32,
    pub limiting_reason: LimitingFactor,
    pub final_stores: Consumables,
    pub final_battery_kwh: f64,
}

/// Everything a run depends on. Borrowed, never mutated.
#[derive(Debug, Clone)]
pub struct ViabilityInput<'a> {
    pub crew: u32,
    pub environment: &'a EnvironmentProfile,
    /// Installed units per module type key.
    pub installed: &'a BTreeMap<String, u32>,
    pub catalog: &'a Catalog,
    pub eclss_type_key: &'a str,
    pub per_crew: Consumables,
    pub initial_stores: Consumables,
    pub horizon_days: u32,
}

/// Load factor of installed life support. Zero crew, zero units or zero
/// nominal capacity all mean no production.
fn eclss_scale(units: u32, crew: u32, nominal_capacity: f64) -> f64 {
    if units == 0 || crew == 0 || nominal_capacity <= 0.0 {
        return 0.0;
    }
    (units as f64 * crew as f64) / nominal_capacity
}

/// Continuous power draw of everything installed, in kW.
fn power_demand_kw(installed: &BTreeMap<String, u32>, catalog: &Catalog) -> f64 {
    installed
        .iter()
        .filter_map(|(key, &count)| match catalog.lookup(key) {
            Ok(def) => Some(count as f64 * def.rates.energy_kw),
            Err(_) => {
                log::debug!("Module type '{}' not in catalog, no power draw", key);
                None
            }
        })
        .sum()
}

/// Run the simulation. Deterministic: identical inputs give identical results.
pub fn simulate(input: &ViabilityInput) -> ViabilityResult {
    let crew = input.crew as f64;
    let demand = Consumables::new(
        crew * input.per_crew.o2,
        crew * input.per_crew.h2o,
        crew * input.per_crew.food,
    );

    let units = input.installed.get(input.eclss_type_key).copied().unwrap_or(0);
    let production = match input.catalog.lookup(input.eclss_type_key) {
        Ok(eclss) => {
            let scale = eclss_scale(units, input.crew, eclss.crew_capacity);
            Consumables::new(
                eclss.rates.o2_kg_day * scale,
                eclss.rates.h2o_kg_day * scale,
                eclss.rates.food_kg_day * scale,
            )
        }
        Err(_) => Consumables::default(),
    };

    let env = input.environment;
    let power_kw = power_demand_kw(input.installed, input.catalog);
    let generation_kwh = env.solar_kw_mean_daylight * env.daylight_hours;

    let mut stores = input.initial_stores;
    let mut battery = env.battery_capacity_kwh;
    let mut day = 0;

    let limiting = loop {
        if day >= input.horizon_days {
            break LimitingFactor::Horizon;
        }

        stores.o2 += production.o2 - demand.o2;
        stores.h2o += production.h2o - demand.h2o;
        stores.food += production.food - demand.food;
        if stores.o2 <= 0.0 {
            break LimitingFactor::O2;
        }
        if stores.h2o <= 0.0 {
            break LimitingFactor::H2O;
        }
        if stores.food <= 0.0 {
            break LimitingFactor::Food;
        }

        let after_day = env
            .battery_capacity_kwh
            .min(battery + generation_kwh - power_kw * env.daylight_hours);
        let after_night = after_day - power_kw * env.night_hours;
        if after_night < 0.0 {
            break LimitingFactor::Energy;
        }
        battery = after_night;

        day += 1;
    };

    ViabilityResult {
        days_survived: day,
        limiting_reason: limiting,
        final_stores: stores,
        final_battery_kwh: battery,
    }
}

/// Runs [`simulate`] over layout snapshots using the injected configuration.
#[derive(Debug, Clone)]
pub struct ViabilitySimulator {
    config: Arc<HabitatConfig>,
}

impl ViabilitySimulator {
    pub fn new(config: Arc<HabitatConfig>) -> Self {
        Self { config }
    }

    pub fn reload_config(&mut self, config: Arc<HabitatConfig>) {
        self.config = config;
    }

    /// Simulate a layout snapshot. Reads only the snapshot it is given.
    pub fn simulate_layout(&self, layout: &LayoutState) -> ViabilityResult {
        let params = &self.config.params;
        let environment = params.environment_or_default(&layout.environment_id);
        let installed = layout.installed_counts();
        let result = simulate(&ViabilityInput {
            crew: layout.crew_count,
            environment: &environment,
            installed: &installed,
            catalog: &self.config.catalog,
            eclss_type_key: &params.eclss_type_key,
            per_crew: params.per_crew_rates,
            initial_stores: params.initial_stores,
            horizon_days: params.horizon_days,
        });
        log::debug!(
            "Viability: {} days, limited by {:?}",
            result.days_survived,
            result.limiting_reason
        );
        result
    }
}
