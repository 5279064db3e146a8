//! The spatial constraint engine.
//!
//! [`LayoutEditor`] owns the live [`LayoutState`] and applies every mutation
//! atomically: a proposal is built off to the side, validated, and only then
//! swapped in. Committed actions push the prior state to the history stack;
//! gesture steps never do.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::catalog::ParamValue;
use crate::config::{GlobalParams, HabitatConfig};
use crate::error::{LayoutError, ValidationError};
use crate::gesture::{Drag, GestureMode, GestureState, GestureStep};
use crate::geometry::Point;
use crate::history::HistoryStack;
use crate::module::{InstanceId, ModuleInstance, ResizeHandle};
use crate::shell::ShellSpec;
use crate::spatial::{overlapping_pairs, SpatialIndex};

const SIZE_EPSILON: f64 = 1e-9;

/// Everything the designer edits. Deep-copied for history and scenario slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutState {
    pub shell: ShellSpec,
    pub crew_count: u32,
    pub environment_id: String,
    /// Draw order; irrelevant to validity.
    pub modules: Vec<ModuleInstance>,
}

impl Default for LayoutState {
    fn default() -> Self {
        Self::from_params(&GlobalParams::default())
    }
}

impl LayoutState {
    /// An empty layout using the configured default shell, crew and site.
    pub fn from_params(params: &GlobalParams) -> Self {
        Self {
            shell: params.default_shell.clone(),
            crew_count: params.default_crew,
            environment_id: params.default_environment.clone(),
            modules: Vec::new(),
        }
    }

    pub fn module(&self, id: &InstanceId) -> Option<&ModuleInstance> {
        self.modules.iter().find(|m| m.id == *id)
    }

    fn index_of(&self, id: &InstanceId) -> Option<usize> {
        self.modules.iter().position(|m| m.id == *id)
    }

    /// Number of installed units per module type.
    pub fn installed_counts(&self) -> BTreeMap<String, u32> {
        let mut counts = BTreeMap::new();
        for m in &self.modules {
            *counts.entry(m.type_key.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Unordered overlapping same-floor pairs.
    pub fn collision_count(&self) -> usize {
        overlapping_pairs(&self.modules).len()
    }
}

/// Result of an insert: the new id and, if the default placement is not
/// valid, why. The instance is kept either way.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub id: InstanceId,
    pub violation: Option<ValidationError>,
}

/// Instances a shell change made invalid, or whose reason changed with it.
/// They are retained, never deleted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShellReport {
    pub invalid: Vec<(InstanceId, ValidationError)>,
}

pub struct LayoutEditor {
    config: Arc<HabitatConfig>,
    state: LayoutState,
    history: HistoryStack<LayoutState>,
    gesture: GestureState,
    violations: BTreeMap<InstanceId, ValidationError>,
}

impl LayoutEditor {
    pub fn new(config: Arc<HabitatConfig>) -> Self {
        let state = LayoutState::from_params(&config.params);
        Self::with_state(config, state)
    }

    pub fn with_state(config: Arc<HabitatConfig>, state: LayoutState) -> Self {
        let mut editor = Self {
            config,
            state,
            history: HistoryStack::new(),
            gesture: GestureState::Idle,
            violations: BTreeMap::new(),
        };
        editor.refresh_violations();
        editor
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn state(&self) -> &LayoutState {
        &self.state
    }

    pub fn config(&self) -> &Arc<HabitatConfig> {
        &self.config
    }

    pub fn module(&self, id: &InstanceId) -> Option<&ModuleInstance> {
        self.state.module(id)
    }

    /// Instances currently violating a constraint, with the reason.
    pub fn violations(&self) -> &BTreeMap<InstanceId, ValidationError> {
        &self.violations
    }

    pub fn is_valid(&self, id: &InstanceId) -> bool {
        !self.violations.contains_key(id)
    }

    pub fn gesture(&self) -> &GestureState {
        &self.gesture
    }

    pub fn history(&self) -> &HistoryStack<LayoutState> {
        &self.history
    }

    /// A deep copy for what-if evaluation; never aliases the live state.
    pub fn scenario_snapshot(&self) -> LayoutState {
        self.state.clone()
    }

    /// Swap in a reloaded catalog/parameter set and re-check every instance.
    pub fn reload_config(&mut self, config: Arc<HabitatConfig>) {
        log::info!(
            "Configuration reloaded: {} module types",
            config.catalog.len()
        );
        self.config = config;
        self.refresh_violations();
    }

    // ── Validation ───────────────────────────────────────────────────

    fn edge_bounds(&self) -> (f64, f64) {
        let p = &self.config.params;
        let lo = p.module_min_edge_m.min(p.module_max_edge_m);
        let hi = p.module_max_edge_m.max(p.module_min_edge_m);
        (lo, hi)
    }

    /// Check a proposed instance against the shell, the other occupants of its
    /// floor and the size bounds.
    pub fn validate_placement(&self, candidate: &ModuleInstance) -> Result<(), ValidationError> {
        let shell = &self.state.shell;
        let floor_count = shell.sanitized().floor_count;
        if candidate.floor == 0 || candidate.floor > floor_count {
            return Err(ValidationError::FloorOutOfRange {
                floor: candidate.floor,
                floor_count,
            });
        }

        let footprint = candidate.footprint();
        if !shell.contains_footprint(candidate.floor, &footprint) {
            return Err(ValidationError::OutsideShell {
                id: candidate.id,
                floor: candidate.floor,
            });
        }

        if self.config.params.forbid_overlap {
            let index = SpatialIndex::for_floor(&self.state.modules, candidate.floor);
            for entry in index.query_bbox(&footprint.bbox()) {
                let other = &self.state.modules[entry.module_index];
                if other.id != candidate.id && footprint.overlaps(&other.footprint()) {
                    return Err(ValidationError::Overlap {
                        id: candidate.id,
                        other: other.id,
                        floor: candidate.floor,
                    });
                }
            }
        }

        let (min, max) = self.edge_bounds();
        let in_bounds = |v: f64| v >= min - SIZE_EPSILON && v <= max + SIZE_EPSILON;
        if !in_bounds(candidate.width) || !in_bounds(candidate.depth) {
            return Err(ValidationError::SizeOutOfBounds {
                id: candidate.id,
                width: candidate.width,
                depth: candidate.depth,
                min,
                max,
            });
        }
        Ok(())
    }

    /// The instance's type is in the catalog and its values conform to the
    /// type's descriptors. Imports and config reloads can break either.
    fn check_definition(&self, module: &ModuleInstance) -> Result<(), ValidationError> {
        let def = self
            .config
            .catalog
            .lookup(&module.type_key)
            .map_err(|_| ValidationError::UnknownType {
                id: module.id,
                type_key: module.type_key.clone(),
            })?;
        module
            .check_params(def)
            .map_err(|error| ValidationError::InvalidParameter { id: module.id, error })
    }

    fn refresh_violations(&mut self) {
        let mut violations = BTreeMap::new();
        for m in &self.state.modules {
            let checked = self
                .check_definition(m)
                .and_then(|()| self.validate_placement(m));
            if let Err(err) = checked {
                violations.insert(m.id, err);
            }
        }
        self.violations = violations;
    }

    // ── Committed mutations ──────────────────────────────────────────

    fn ensure_idle(&self) -> Result<(), LayoutError> {
        if self.gesture.is_active() {
            return Err(LayoutError::GestureActive);
        }
        Ok(())
    }

    /// The current instance, if it exists and may be edited.
    fn editable(&self, id: &InstanceId) -> Result<&ModuleInstance, LayoutError> {
        let module = self
            .state
            .module(id)
            .ok_or(LayoutError::InstanceNotFound(*id))?;
        if module.locked {
            return Err(LayoutError::Locked(*id));
        }
        Ok(module)
    }

    fn commit(&mut self, label: &str, before: LayoutState) {
        self.history.commit(label, before);
        self.refresh_violations();
        log::debug!("Committed '{}' ({} modules)", label, self.state.modules.len());
    }

    /// Validate `candidate` and swap it in for the instance with the same id.
    fn replace_validated(&mut self, label: &str, candidate: ModuleInstance) -> Result<(), LayoutError> {
        if let Err(err) = self.validate_placement(&candidate) {
            log::warn!("{} rejected: {}", label, err);
            return Err(err.into());
        }
        let index = self
            .state
            .index_of(&candidate.id)
            .ok_or(LayoutError::InstanceNotFound(candidate.id))?;
        let before = self.state.clone();
        self.state.modules[index] = candidate;
        self.commit(label, before);
        Ok(())
    }

    /// Place a new instance of `type_key` at the centre of `floor`, sized from
    /// the type's reference volume. A floor outside the stack is kept and
    /// flagged like any other invalid placement.
    pub fn insert(&mut self, type_key: &str, floor: u32) -> Result<Placement, LayoutError> {
        self.ensure_idle()?;
        let def = self.config.catalog.lookup(type_key)?;
        let cabin_height = self.config.params.cabin_height_m.max(0.1);
        let (min, max) = self.edge_bounds();
        let edge = (def.reference_volume_m3.max(0.0) / cabin_height)
            .sqrt()
            .clamp(min, max);
        let instance = ModuleInstance::new(def, floor, edge);
        let label = format!("Insert {}", def.name);

        let violation = self.validate_placement(&instance).err();
        if let Some(err) = &violation {
            log::warn!("Inserted {} is not validly placed: {}", type_key, err);
        }
        let id = instance.id;
        let before = self.state.clone();
        self.state.modules.push(instance);
        self.commit(&label, before);
        Ok(Placement { id, violation })
    }

    pub fn move_by(&mut self, id: &InstanceId, dx: f64, dy: f64) -> Result<(), LayoutError> {
        self.ensure_idle()?;
        let candidate = self.editable(id)?.translated(dx, dy);
        self.replace_validated("Move module", candidate)
    }

    pub fn resize(&mut self, id: &InstanceId, handle: ResizeHandle, dx: f64, dy: f64) -> Result<(), LayoutError> {
        self.ensure_idle()?;
        let candidate = self.editable(id)?.resized(handle, dx, dy);
        self.replace_validated("Resize module", candidate)
    }

    /// Set the absolute rotation in degrees.
    pub fn rotate(&mut self, id: &InstanceId, degrees: f64) -> Result<(), LayoutError> {
        self.ensure_idle()?;
        let candidate = self.editable(id)?.rotated_to(degrees);
        self.replace_validated("Rotate module", candidate)
    }

    pub fn set_property(&mut self, id: &InstanceId, key: &str, value: ParamValue) -> Result<(), LayoutError> {
        self.ensure_idle()?;
        let current = self.editable(id)?;
        let def = self.config.catalog.lookup(&current.type_key)?;
        let candidate = current.with_param(def, key, value)?;
        self.replace_validated("Set property", candidate)
    }

    /// Move an instance to another floor, checked against that floor's occupants.
    pub fn set_floor(&mut self, id: &InstanceId, floor: u32) -> Result<(), LayoutError> {
        self.ensure_idle()?;
        let mut candidate = self.editable(id)?.clone();
        candidate.floor = floor;
        self.replace_validated("Change floor", candidate)
    }

    pub fn set_locked(&mut self, id: &InstanceId, locked: bool) -> Result<(), LayoutError> {
        self.ensure_idle()?;
        let index = self
            .state
            .index_of(id)
            .ok_or(LayoutError::InstanceNotFound(*id))?;
        if self.state.modules[index].locked == locked {
            return Ok(());
        }
        let before = self.state.clone();
        self.state.modules[index].locked = locked;
        self.commit(if locked { "Lock module" } else { "Unlock module" }, before);
        Ok(())
    }

    /// Delete an instance. Always allowed, locked or not.
    pub fn remove(&mut self, id: &InstanceId) -> Result<ModuleInstance, LayoutError> {
        self.ensure_idle()?;
        let index = self
            .state
            .index_of(id)
            .ok_or(LayoutError::InstanceNotFound(*id))?;
        let before = self.state.clone();
        let removed = self.state.modules.remove(index);
        self.commit("Remove module", before);
        Ok(removed)
    }

    /// Replace the shell and re-check every instance. Instances that no longer
    /// fit are kept and reported.
    pub fn apply_shell(&mut self, spec: ShellSpec) -> Result<ShellReport, LayoutError> {
        self.ensure_idle()?;
        let spec = spec.sanitized();
        spec.validate()?;
        let before = self.state.clone();
        let previous = self.violations.clone();
        self.state.shell = spec;
        self.commit("Apply shell", before);

        let invalid: Vec<(InstanceId, ValidationError)> = self
            .violations
            .iter()
            .filter(|(id, err)| previous.get(id) != Some(err))
            .map(|(id, err)| (*id, err.clone()))
            .collect();
        if !invalid.is_empty() {
            log::warn!("{} modules no longer fit the new shell", invalid.len());
        }
        Ok(ShellReport { invalid })
    }

    pub fn set_crew(&mut self, crew_count: u32) -> Result<(), LayoutError> {
        self.ensure_idle()?;
        if self.state.crew_count == crew_count {
            return Ok(());
        }
        let before = self.state.clone();
        self.state.crew_count = crew_count;
        self.commit("Set crew", before);
        Ok(())
    }

    pub fn set_environment(&mut self, environment_id: &str) -> Result<(), LayoutError> {
        self.ensure_idle()?;
        if self.config.params.environment(environment_id).is_none() {
            return Err(LayoutError::UnknownEnvironment(environment_id.to_string()));
        }
        if self.state.environment_id == environment_id {
            return Ok(());
        }
        let before = self.state.clone();
        self.state.environment_id = environment_id.to_string();
        self.commit("Set environment", before);
        Ok(())
    }

    /// Remove every module, keeping shell, crew and environment.
    pub fn reset(&mut self) -> Result<(), LayoutError> {
        self.ensure_idle()?;
        let before = self.state.clone();
        self.state.modules.clear();
        self.commit("Reset layout", before);
        Ok(())
    }

    /// Replace the whole state (document import). History starts over.
    pub fn load_state(&mut self, state: LayoutState) -> Result<(), LayoutError> {
        self.ensure_idle()?;
        if self.config.params.environment(&state.environment_id).is_none() {
            return Err(LayoutError::UnknownEnvironment(state.environment_id));
        }
        self.state = state;
        self.history.clear();
        self.refresh_violations();
        log::info!(
            "Loaded layout with {} modules ({} invalid)",
            self.state.modules.len(),
            self.violations.len()
        );
        Ok(())
    }

    // ── Undo / Redo ──────────────────────────────────────────────────

    pub fn undo(&mut self) -> Result<bool, LayoutError> {
        self.ensure_idle()?;
        match self.history.undo(self.state.clone()) {
            Some(previous) => {
                self.state = previous;
                self.refresh_violations();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn redo(&mut self) -> Result<bool, LayoutError> {
        self.ensure_idle()?;
        match self.history.redo(self.state.clone()) {
            Some(next) => {
                self.state = next;
                self.refresh_violations();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ── Gestures ─────────────────────────────────────────────────────

    pub fn begin_gesture(&mut self, id: &InstanceId, mode: GestureMode, pointer: Point) -> Result<(), LayoutError> {
        self.ensure_idle()?;
        let origin = self.editable(id)?.clone();
        self.gesture = GestureState::Dragging(Box::new(Drag {
            id: *id,
            mode,
            anchor: pointer,
            origin,
            origin_snapshot: self.state.clone(),
            rejected_steps: 0,
        }));
        Ok(())
    }

    /// Feed a pointer position to the active gesture. Valid proposals become
    /// live immediately; invalid ones leave the last valid state in place.
    pub fn update_gesture(&mut self, pointer: Point) -> Result<GestureStep, LayoutError> {
        let candidate = match &self.gesture {
            GestureState::Dragging(drag) => drag.propose(pointer),
            GestureState::Idle => return Err(LayoutError::NoGesture),
        };
        match self.validate_placement(&candidate) {
            Ok(()) => {
                let index = self
                    .state
                    .index_of(&candidate.id)
                    .ok_or(LayoutError::InstanceNotFound(candidate.id))?;
                self.state.modules[index] = candidate;
                Ok(GestureStep::Accepted)
            }
            Err(err) => {
                if let GestureState::Dragging(drag) = &mut self.gesture {
                    drag.rejected_steps += 1;
                }
                Ok(GestureStep::Rejected(err))
            }
        }
    }

    /// Finish the gesture. Returns whether anything changed (and so was
    /// written to history).
    pub fn commit_gesture(&mut self) -> Result<bool, LayoutError> {
        let drag = match std::mem::take(&mut self.gesture) {
            GestureState::Dragging(drag) => *drag,
            GestureState::Idle => return Err(LayoutError::NoGesture),
        };
        let changed = self.state.module(&drag.id) != Some(&drag.origin);
        if changed {
            self.commit(drag.mode.label(), drag.origin_snapshot);
        } else {
            self.refresh_violations();
        }
        if drag.rejected_steps > 0 {
            log::debug!("Gesture finished with {} rejected steps", drag.rejected_steps);
        }
        Ok(changed)
    }

    /// Abort the gesture and put the module back where it started.
    pub fn cancel_gesture(&mut self) -> Result<(), LayoutError> {
        let drag = match std::mem::take(&mut self.gesture) {
            GestureState::Dragging(drag) => *drag,
            GestureState::Idle => return Err(LayoutError::NoGesture),
        };
        if let Some(index) = self.state.index_of(&drag.id) {
            self.state.modules[index] = drag.origin;
        }
        self.refresh_violations();
        Ok(())
    }
}
