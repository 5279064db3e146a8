//! Interactive gesture state machine.
//!
//! A gesture turns a stream of pointer positions into proposals for one
//! module. Proposals are always derived from the module as it was when the
//! gesture began plus the cumulative pointer delta, so the module can snap
//! back to tracking after passing through invalid positions.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::geometry::Point;
use crate::layout::LayoutState;
use crate::module::{InstanceId, ModuleInstance, ResizeHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "handle", rename_all = "lowercase")]
pub enum GestureMode {
    Move,
    Resize(ResizeHandle),
    Rotate,
}

impl GestureMode {
    pub fn label(&self) -> &'static str {
        match self {
            GestureMode::Move => "Move module",
            GestureMode::Resize(_) => "Resize module",
            GestureMode::Rotate => "Rotate module",
        }
    }
}

/// An in-progress drag.
#[derive(Debug, Clone)]
pub struct Drag {
    pub id: InstanceId,
    pub mode: GestureMode,
    /// Pointer position at gesture start.
    pub anchor: Point,
    /// The module as it was when the gesture began.
    pub origin: ModuleInstance,
    /// Full layout before the gesture, committed to history on success.
    pub origin_snapshot: LayoutState,
    pub rejected_steps: u32,
}

impl Drag {
    /// The module the pointer at `pointer` asks for.
    pub fn propose(&self, pointer: Point) -> ModuleInstance {
        let dx = pointer.x - self.anchor.x;
        let dy = pointer.y - self.anchor.y;
        match self.mode {
            GestureMode::Move => self.origin.translated(dx, dy),
            GestureMode::Resize(handle) => self.origin.resized(handle, dx, dy),
            GestureMode::Rotate => {
                let center = self.origin.position;
                let turn = pointer.bearing_from(&center) - self.anchor.bearing_from(&center);
                self.origin.rotated_to(self.origin.rotation + turn)
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Dragging(Box<Drag>),
}

impl GestureState {
    pub fn is_active(&self) -> bool {
        matches!(self, GestureState::Dragging(_))
    }

    /// Module and mode of the active drag, for display.
    pub fn active(&self) -> Option<(InstanceId, GestureMode)> {
        match self {
            GestureState::Idle => None,
            GestureState::Dragging(drag) => Some((drag.id, drag.mode)),
        }
    }
}

/// Result of feeding one pointer update to the active gesture.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureStep {
    Accepted,
    /// The module stays at its last valid state; tracking continues.
    Rejected(ValidationError),
}
