//! # Habitat Sim
//!
//! Deterministic resource-viability simulation and the composite layout
//! score. Everything here reads deep-copied layout snapshots and never
//! touches the live editor state.

pub mod scenario;
pub mod score;
pub mod viability;

pub use scenario::{ScenarioError, ScenarioSlots};
pub use score::{score_layout, ScoreAggregator, ScoreBreakdown};
pub use viability::{simulate, LimitingFactor, ViabilityInput, ViabilityResult, ViabilitySimulator};
