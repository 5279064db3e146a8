use std::collections::BTreeMap;

use thiserror::Error;

use habitat_core::LayoutState;

use crate::viability::{ViabilityResult, ViabilitySimulator};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScenarioError {
    #[error("scenario slot '{0}' is empty")]
    EmptySlot(String),
}

/// Named what-if slots, each holding its own deep copy of a layout.
///
/// Slots never share state with the live layout or with each other, so a
/// slot can be simulated at any time without touching the editor.
#[derive(Debug, Clone, Default)]
pub struct ScenarioSlots {
    slots: BTreeMap<String, LayoutState>,
}

impl ScenarioSlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `layout` in `slot`, replacing what was there.
    pub fn snapshot(&mut self, slot: &str, layout: LayoutState) {
        log::info!("Scenario '{}' saved with {} modules", slot, layout.modules.len());
        self.slots.insert(slot.to_string(), layout);
    }

    pub fn get(&self, slot: &str) -> Option<&LayoutState> {
        self.slots.get(slot)
    }

    pub fn clear(&mut self, slot: &str) -> bool {
        self.slots.remove(slot).is_some()
    }

    pub fn slot_names(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(|k| k.as_str())
    }

    pub fn simulate(&self, slot: &str, simulator: &ViabilitySimulator) -> Result<ViabilityResult, ScenarioError> {
        let layout = self
            .slots
            .get(slot)
            .ok_or_else(|| ScenarioError::EmptySlot(slot.to_string()))?;
        Ok(simulator.simulate_layout(layout))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use habitat_core::{HabitatConfig, LayoutEditor};

    #[test]
    fn test_slots_are_isolated_from_live_layout() {
        let config = Arc::new(HabitatConfig::baseline());
        let simulator = ViabilitySimulator::new(config.clone());
        let mut editor = LayoutEditor::new(config);
        editor.insert("eclss", 1).unwrap();

        let mut slots = ScenarioSlots::new();
        slots.snapshot("A", editor.scenario_snapshot());
        let with_eclss = slots.simulate("A", &simulator).unwrap();

        editor.reset().unwrap();
        slots.snapshot("B", editor.scenario_snapshot());
        let without = slots.simulate("B", &simulator).unwrap();

        // Slot A still reflects the layout at snapshot time.
        assert_eq!(slots.simulate("A", &simulator).unwrap(), with_eclss);
        assert!(with_eclss.days_survived > without.days_survived);
        assert_eq!(slots.slot_names().collect::<Vec<_>>(), vec!["A", "B"]);
    }

    #[test]
    fn test_empty_slot() {
        let simulator = ViabilitySimulator::new(Arc::new(HabitatConfig::baseline()));
        let mut slots = ScenarioSlots::new();
        assert_eq!(
            slots.simulate("A", &simulator),
            Err(ScenarioError::EmptySlot("A".to_string()))
        );
        slots.snapshot("A", LayoutState::default());
        assert!(slots.clear("A"));
        assert!(!slots.clear("A"));
    }
}
