//! One designer's editing session.
//!
//! The session owns the editor, the scorer and the scenario slots. Intents
//! are applied one at a time; after any successful change to the committed
//! layout the score is recomputed before `dispatch` returns.

use std::sync::Arc;

use habitat_core::{
    GestureStep, HabitatConfig, InstanceId, LayoutEditor, LayoutError, ModuleInstance, Placement,
    ShellReport,
};
use habitat_io::{export_json, import_for};
use habitat_sim::{ScenarioSlots, ScoreAggregator, ScoreBreakdown, ViabilityResult};

use crate::error::SessionError;
use crate::frame::{Frame, FrameGesture, FrameViolation};
use crate::intent::Intent;

/// What a successfully dispatched intent did.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Applied,
    Inserted(Placement),
    Removed(ModuleInstance),
    Shell(ShellReport),
    Gesture(GestureStep),
    /// Undo, redo and gesture commit report whether anything changed.
    Changed(bool),
    Simulated(ViabilityResult),
}

pub struct Session {
    editor: LayoutEditor,
    aggregator: ScoreAggregator,
    slots: ScenarioSlots,
    selection: Option<InstanceId>,
    score: ScoreBreakdown,
}

impl Session {
    pub fn new(config: Arc<HabitatConfig>) -> Self {
        let editor = LayoutEditor::new(config.clone());
        let aggregator = ScoreAggregator::new(config);
        let score = aggregator.evaluate(editor.state());
        Self {
            editor,
            aggregator,
            slots: ScenarioSlots::new(),
            selection: None,
            score,
        }
    }

    pub fn editor(&self) -> &LayoutEditor {
        &self.editor
    }

    pub fn slots(&self) -> &ScenarioSlots {
        &self.slots
    }

    pub fn selection(&self) -> Option<InstanceId> {
        self.selection
    }

    pub fn score(&self) -> &ScoreBreakdown {
        &self.score
    }

    pub fn dispatch(&mut self, intent: Intent) -> Result<Outcome, SessionError> {
        log::debug!("Dispatching {:?}", intent);
        let rescore = intent.mutates_layout();
        let result = self.apply(intent);
        match &result {
            Ok(_) if rescore => self.rescore(),
            Ok(_) => {}
            Err(err) => log::warn!("Intent rejected: {}", err),
        }
        result
    }

    fn apply(&mut self, intent: Intent) -> Result<Outcome, SessionError> {
        let editor = &mut self.editor;
        let outcome = match intent {
            Intent::Insert { type_key, floor } => {
                let placement = editor.insert(&type_key, floor)?;
                self.selection = Some(placement.id);
                Outcome::Inserted(placement)
            }
            Intent::Move { id, dx, dy } => {
                editor.move_by(&id, dx, dy)?;
                Outcome::Applied
            }
            Intent::Resize { id, handle, dx, dy } => {
                editor.resize(&id, handle, dx, dy)?;
                Outcome::Applied
            }
            Intent::Rotate { id, degrees } => {
                editor.rotate(&id, degrees)?;
                Outcome::Applied
            }
            Intent::SetProperty { id, key, value } => {
                editor.set_property(&id, &key, value)?;
                Outcome::Applied
            }
            Intent::SetFloor { id, floor } => {
                editor.set_floor(&id, floor)?;
                Outcome::Applied
            }
            Intent::SetLocked { id, locked } => {
                editor.set_locked(&id, locked)?;
                Outcome::Applied
            }
            Intent::Remove { id } => Outcome::Removed(editor.remove(&id)?),
            Intent::ApplyShell { shell } => Outcome::Shell(editor.apply_shell(shell)?),
            Intent::SetCrew { crew_count } => {
                editor.set_crew(crew_count)?;
                Outcome::Applied
            }
            Intent::SetEnvironment { environment_id } => {
                editor.set_environment(&environment_id)?;
                Outcome::Applied
            }
            Intent::Undo => Outcome::Changed(editor.undo()?),
            Intent::Redo => Outcome::Changed(editor.redo()?),
            Intent::Reset => {
                editor.reset()?;
                Outcome::Applied
            }
            Intent::BeginGesture { id, mode, pointer } => {
                editor.begin_gesture(&id, mode, pointer)?;
                self.selection = Some(id);
                Outcome::Applied
            }
            Intent::UpdateGesture { pointer } => Outcome::Gesture(editor.update_gesture(pointer)?),
            Intent::CommitGesture => Outcome::Changed(editor.commit_gesture()?),
            Intent::CancelGesture => {
                editor.cancel_gesture()?;
                Outcome::Applied
            }
            Intent::Select { id } => {
                if let Some(id) = id {
                    if editor.module(&id).is_none() {
                        return Err(LayoutError::InstanceNotFound(id).into());
                    }
                }
                self.selection = id;
                Outcome::Applied
            }
            Intent::SnapshotScenario { scenario_id } => {
                self.slots.snapshot(&scenario_id, editor.scenario_snapshot());
                Outcome::Applied
            }
            Intent::Simulate { scenario_id } => {
                Outcome::Simulated(self.slots.simulate(&scenario_id, self.aggregator.simulator())?)
            }
        };
        self.drop_stale_selection();
        Ok(outcome)
    }

    fn drop_stale_selection(&mut self) {
        if let Some(id) = self.selection {
            if self.editor.module(&id).is_none() {
                self.selection = None;
            }
        }
    }

    fn rescore(&mut self) {
        self.score = self.aggregator.evaluate(self.editor.state());
        log::debug!(
            "Score {:.1} ({} days, limited by {:?})",
            self.score.final_score,
            self.score.days_survived,
            self.score.limiting_reason
        );
    }

    /// Swap in a reloaded catalog/parameter set everywhere at once.
    pub fn reload_config(&mut self, config: Arc<HabitatConfig>) {
        self.editor.reload_config(config.clone());
        self.aggregator.reload_config(config);
        self.rescore();
    }

    pub fn export_document(&self) -> Result<String, SessionError> {
        Ok(export_json(self.editor.state())?)
    }

    /// Replace the live layout with a document. History and selection reset.
    /// Instances of unknown types or with non-conforming values are kept and
    /// flagged.
    pub fn import_document(&mut self, json: &str) -> Result<(), SessionError> {
        let state = import_for(json, self.editor.config())?;
        self.editor.load_state(state)?;
        self.selection = None;
        self.rescore();
        Ok(())
    }

    pub fn frame(&self) -> Frame {
        Frame {
            layout: self.editor.state().clone(),
            selection: self.selection,
            gesture: self
                .editor
                .gesture()
                .active()
                .map(|(id, mode)| FrameGesture { id, mode }),
            violations: self
                .editor
                .violations()
                .iter()
                .map(|(id, err)| FrameViolation {
                    id: *id,
                    reason: err.to_string(),
                })
                .collect(),
            score: self.score.clone(),
            undo_label: self.editor.history().undo_description().map(str::to_string),
            redo_label: self.editor.history().redo_description().map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use habitat_core::{Catalog, GlobalParams, Point, ValidationError};
    use habitat_io::DocumentError;

    fn session() -> Session {
        Session::new(Arc::new(HabitatConfig::baseline()))
    }

    #[test]
    fn test_insert_selects_and_rescores() {
        let mut s = session();
        let before = s.score().total_mass_kg;
        let outcome = s
            .dispatch(Intent::Insert {
                type_key: "galley".into(),
                floor: 1,
            })
            .unwrap();
        let Outcome::Inserted(placement) = outcome else {
            panic!("expected an insert outcome");
        };
        assert_eq!(s.selection(), Some(placement.id));
        assert!(s.score().total_mass_kg > before);
    }

    #[test]
    fn test_remove_clears_selection() {
        let mut s = session();
        s.dispatch(Intent::Insert {
            type_key: "stowage".into(),
            floor: 1,
        })
        .unwrap();
        let id = s.selection().unwrap();
        s.dispatch(Intent::Remove { id }).unwrap();
        assert_eq!(s.selection(), None);
        assert_eq!(s.score().total_mass_kg, 0.0);
    }

    #[test]
    fn test_select_unknown_instance() {
        let mut s = session();
        let err = s
            .dispatch(Intent::Select {
                id: Some(uuid::Uuid::new_v4()),
            })
            .unwrap_err();
        assert!(matches!(err, SessionError::Layout(LayoutError::InstanceNotFound(_))));
    }

    #[test]
    fn test_score_waits_for_gesture_commit() {
        let mut s = session();
        s.dispatch(Intent::Insert {
            type_key: "hygiene".into(),
            floor: 1,
        })
        .unwrap();
        let hygiene = s.selection().unwrap();
        s.dispatch(Intent::Insert {
            type_key: "crew_quarters".into(),
            floor: 1,
        })
        .unwrap();
        let quarters = s.selection().unwrap();
        s.dispatch(Intent::Move {
            id: quarters,
            dx: 5.0,
            dy: 0.0,
        })
        .unwrap();
        assert_eq!(s.score().adjacency_satisfied, 0);

        s.dispatch(Intent::BeginGesture {
            id: hygiene,
            mode: habitat_core::GestureMode::Move,
            pointer: Point::new(0.0, 0.0),
        })
        .unwrap();
        s.dispatch(Intent::UpdateGesture {
            pointer: Point::new(3.5, 0.0),
        })
        .unwrap();
        assert!(s.frame().gesture.is_some());
        assert_eq!(s.score().adjacency_satisfied, 0);

        let outcome = s.dispatch(Intent::CommitGesture).unwrap();
        assert_eq!(outcome, Outcome::Changed(true));
        assert_eq!(s.score().adjacency_satisfied, 1);
        assert_eq!(s.frame().undo_label.as_deref(), Some("Move module"));
    }

    #[test]
    fn test_simulate_empty_slot() {
        let mut s = session();
        let err = s
            .dispatch(Intent::Simulate {
                scenario_id: "A".into(),
            })
            .unwrap_err();
        assert!(matches!(err, SessionError::Scenario(_)));
    }

    #[test]
    fn test_reload_flags_instances_and_rescores() {
        let mut s = session();
        s.dispatch(Intent::Insert {
            type_key: "crew_quarters".into(),
            floor: 1,
        })
        .unwrap();
        let quarters = s.selection().unwrap();
        s.dispatch(Intent::Insert {
            type_key: "galley".into(),
            floor: 1,
        })
        .unwrap();
        let galley = s.selection().unwrap();
        assert!((s.score().total_mass_kg - 1700.0).abs() < 1e-9);

        let catalog = Catalog::new(
            Catalog::baseline()
                .list()
                .filter(|d| d.key != "galley")
                .cloned()
                .collect(),
        );
        let mut params = GlobalParams::default();
        params.module_max_edge_m = 1.5;
        s.reload_config(Arc::new(HabitatConfig::new(catalog, params)));

        let frame = s.frame();
        assert_eq!(frame.layout.modules.len(), 2);
        assert!(frame.is_flagged(&quarters));
        assert!(frame.is_flagged(&galley));
        assert!(matches!(
            s.editor().violations().get(&galley),
            Some(ValidationError::UnknownType { .. })
        ));
        assert!(matches!(
            s.editor().violations().get(&quarters),
            Some(ValidationError::SizeOutOfBounds { .. })
        ));
        // Only the quarters still count toward mass.
        assert!((s.score().total_mass_kg - 900.0).abs() < 1e-9);
    }

    #[test]
    fn test_import_checks_site_and_flags_foreign_modules() {
        let mut s = session();
        let id = uuid::Uuid::new_v4();
        let doc = |environment: &str| {
            format!(
                r#"{{
                    "schemaVersion": 1,
                    "environmentId": "{environment}",
                    "crewCount": 2,
                    "shell": {{"shape": "ellipse", "semiA": 10.0, "semiB": 7.0, "height": 3.0, "floorCount": 1, "floorGap": 2.5}},
                    "modules": [{{
                        "id": "{id}",
                        "typeKey": "sauna",
                        "floor": 1,
                        "position": {{"x": 0.0, "y": 0.0}},
                        "width": 2.0,
                        "depth": 2.0,
                        "rotation": 0.0,
                        "params": {{"bogus": true}}
                    }}]
                }}"#
            )
        };

        let err = s.import_document(&doc("titan")).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Document(DocumentError::UnknownEnvironment(_))
        ));
        assert_eq!(s.editor().state().environment_id, "moon_south_pole");

        s.import_document(&doc("mars_surface")).unwrap();
        assert_eq!(s.editor().state().environment_id, "mars_surface");
        assert!(s.frame().is_flagged(&id));
        assert!(matches!(
            s.editor().violations().get(&id),
            Some(ValidationError::UnknownType { .. })
        ));
    }
}
