use serde::{Deserialize, Serialize};

use habitat_core::{GestureMode, InstanceId, LayoutState};
use habitat_sim::ScoreBreakdown;

/// An instance the renderer should highlight, with the reason to surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameViolation {
    pub id: InstanceId,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameGesture {
    pub id: InstanceId,
    pub mode: GestureMode,
}

/// Everything the rendering layer needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub layout: LayoutState,
    pub selection: Option<InstanceId>,
    pub gesture: Option<FrameGesture>,
    pub violations: Vec<FrameViolation>,
    pub score: ScoreBreakdown,
    pub undo_label: Option<String>,
    pub redo_label: Option<String>,
}

impl Frame {
    pub fn is_flagged(&self, id: &InstanceId) -> bool {
        self.violations.iter().any(|v| v.id == *id)
    }
}
