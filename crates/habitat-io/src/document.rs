use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use habitat_core::geometry::normalize_angle;
use habitat_core::{HabitatConfig, LayoutState, ModuleInstance, ShellSpec};

use crate::error::DocumentError;

pub const SCHEMA_VERSION: u32 = 1;

/// The persisted layout document.
///
/// Instance ids are kept as written. If a document repeats an id, later
/// occurrences get a fresh id so the loaded layout stays consistent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDocument {
    pub schema_version: u32,
    pub environment_id: String,
    pub crew_count: u32,
    pub shell: ShellSpec,
    pub modules: Vec<ModuleInstance>,
}

impl LayoutDocument {
    pub fn from_state(state: &LayoutState) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            environment_id: state.environment_id.clone(),
            crew_count: state.crew_count,
            shell: state.shell.clone(),
            modules: state.modules.clone(),
        }
    }

    pub fn into_state(self) -> Result<LayoutState, DocumentError> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(DocumentError::UnsupportedVersion(self.schema_version));
        }
        let mut seen = HashSet::new();
        let mut modules = self.modules;
        for m in &mut modules {
            if !seen.insert(m.id) {
                let fresh = Uuid::new_v4();
                log::warn!("Duplicate module id {} replaced with {}", m.id, fresh);
                m.id = fresh;
                seen.insert(fresh);
            }
            m.rotation = normalize_angle(m.rotation);
        }
        log::info!("Imported layout with {} modules", modules.len());
        Ok(LayoutState {
            shell: self.shell,
            crew_count: self.crew_count,
            environment_id: self.environment_id,
            modules,
        })
    }

    pub fn to_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(json)?)
    }
}

pub fn export_json(state: &LayoutState) -> Result<String, DocumentError> {
    LayoutDocument::from_state(state).to_json()
}

pub fn import_json(json: &str) -> Result<LayoutState, DocumentError> {
    LayoutDocument::from_json(json)?.into_state()
}

/// Import a document for use under `config`. The environment must be one of
/// its profiles; instances are flagged later by the editor, not refused here.
pub fn import_for(json: &str, config: &HabitatConfig) -> Result<LayoutState, DocumentError> {
    let state = import_json(json)?;
    if config.params.environment(&state.environment_id).is_none() {
        log::warn!("Document names unknown environment '{}'", state.environment_id);
        return Err(DocumentError::UnknownEnvironment(state.environment_id));
    }
    Ok(state)
}
