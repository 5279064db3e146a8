//! Composite layout score.
//!
//! Five metrics in [0, 1] are multiplied together, so any single metric at
//! zero sends the final score to zero.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use habitat_core::config::AdjacencyRule;
use habitat_core::{HabitatConfig, LayoutState, ModuleInstance};

use crate::viability::{LimitingFactor, ViabilityResult, ViabilitySimulator};

/// Floor for the used-volume divisor, in m³.
const MIN_USED_VOLUME_M3: f64 = 1e-3;
/// Floor for the total-mass divisor, in kg.
const MIN_TOTAL_MASS_KG: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub collision_metric: f64,
    pub nhv_metric: f64,
    pub adjacency_metric: f64,
    pub mass_metric: f64,
    pub survival_metric: f64,
    /// 0..=100.
    pub final_score: f64,

    pub collisions: usize,
    pub used_volume_m3: f64,
    pub min_required_volume_m3: f64,
    pub adjacency_checks: usize,
    pub adjacency_satisfied: usize,
    pub total_mass_kg: f64,
    pub days_survived: u32,
    pub limiting_reason: LimitingFactor,
}

/// Multiply the five metrics into a 0..=100 score.
pub fn compose(collision: f64, adjacency: f64, nhv: f64, survival: f64, mass: f64) -> f64 {
    (collision * adjacency * nhv * survival * mass).clamp(0.0, 1.0) * 100.0
}

fn collision_metric(collisions: usize, item_count: usize) -> f64 {
    if item_count == 0 {
        return 1.0;
    }
    (1.0 - collisions as f64 / item_count as f64).clamp(0.0, 1.0)
}

/// `(checks, satisfied)` over the rules whose two types are both installed. A
/// rule is judged on the first instance of each type in draw order.
fn adjacency_counts(modules: &[ModuleInstance], rules: &[AdjacencyRule], threshold: f64) -> (usize, usize) {
    let first = |key: &str| modules.iter().find(|m| m.type_key == key);
    let mut checks = 0;
    let mut satisfied = 0;
    for rule in rules {
        if let (Some(a), Some(b)) = (first(rule.a.as_str()), first(rule.b.as_str())) {
            checks += 1;
            if a.position.distance_to(&b.position) <= threshold {
                satisfied += 1;
            }
        }
    }
    (checks, satisfied)
}

/// Score a layout against an already computed viability result.
pub fn score_layout(layout: &LayoutState, config: &HabitatConfig, viability: &ViabilityResult) -> ScoreBreakdown {
    let params = &config.params;
    let modules = &layout.modules;

    let collisions = layout.collision_count();
    let collision = collision_metric(collisions, modules.len());

    let cabin_height = params.cabin_height_m;
    let used_volume: f64 = modules.iter().map(|m| m.area() * cabin_height).sum();
    let mut min_required = 0.0;
    let mut total_mass = 0.0;
    for m in modules {
        if let Ok(def) = config.catalog.lookup(&m.type_key) {
            min_required += def.min_volume_m3;
            total_mass += def.mass_kg;
        }
    }
    let nhv = (min_required / used_volume.max(MIN_USED_VOLUME_M3)).clamp(0.0, 1.0);

    let (checks, ok) = adjacency_counts(modules, &params.adjacency_rules, params.adjacency_threshold_m);
    let adjacency = if checks == 0 { 1.0 } else { ok as f64 / checks as f64 };

    let mass = (params.mass_ref_kg / total_mass.max(MIN_TOTAL_MASS_KG)).clamp(0.0, 1.0);

    let survival = if params.ref_days_normalization > 0.0 {
        (viability.days_survived as f64 / params.ref_days_normalization).clamp(0.0, 1.0)
    } else {
        1.0
    };

    ScoreBreakdown {
        collision_metric: collision,
        nhv_metric: nhv,
        adjacency_metric: adjacency,
        mass_metric: mass,
        survival_metric: survival,
        final_score: compose(collision, adjacency, nhv, survival, mass),
        collisions,
        used_volume_m3: used_volume,
        min_required_volume_m3: min_required,
        adjacency_checks: checks,
        adjacency_satisfied: ok,
        total_mass_kg: total_mass,
        days_survived: viability.days_survived,
        limiting_reason: viability.limiting_reason,
    }
}

/// Simulates and scores layouts with one shared configuration.
#[derive(Debug, Clone)]
pub struct ScoreAggregator {
    config: Arc<HabitatConfig>,
    simulator: ViabilitySimulator,
}

impl ScoreAggregator {
    pub fn new(config: Arc<HabitatConfig>) -> Self {
        Self {
            simulator: ViabilitySimulator::new(config.clone()),
            config,
        }
    }

    pub fn reload_config(&mut self, config: Arc<HabitatConfig>) {
        self.simulator.reload_config(config.clone());
        self.config = config;
    }

    pub fn simulator(&self) -> &ViabilitySimulator {
        &self.simulator
    }

    pub fn evaluate(&self, layout: &LayoutState) -> ScoreBreakdown {
        let viability = self.simulator.simulate_layout(layout);
        score_layout(layout, &self.config, &viability)
    }
}
