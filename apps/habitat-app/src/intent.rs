//! Intents emitted by the rendering/input layer.

use serde::{Deserialize, Serialize};

use habitat_core::{GestureMode, InstanceId, ParamValue, Point, ResizeHandle, ShellSpec};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Intent {
    Insert { type_key: String, floor: u32 },
    Move { id: InstanceId, dx: f64, dy: f64 },
    Resize { id: InstanceId, handle: ResizeHandle, dx: f64, dy: f64 },
    Rotate { id: InstanceId, degrees: f64 },
    SetProperty { id: InstanceId, key: String, value: ParamValue },
    SetFloor { id: InstanceId, floor: u32 },
    SetLocked { id: InstanceId, locked: bool },
    Remove { id: InstanceId },
    ApplyShell { shell: ShellSpec },
    SetCrew { crew_count: u32 },
    SetEnvironment { environment_id: String },
    Undo,
    Redo,
    Reset,
    BeginGesture { id: InstanceId, mode: GestureMode, pointer: Point },
    UpdateGesture { pointer: Point },
    CommitGesture,
    CancelGesture,
    /// `None` clears the selection.
    Select { id: Option<InstanceId> },
    SnapshotScenario { scenario_id: String },
    Simulate { scenario_id: String },
}

impl Intent {
    /// Whether a successful dispatch may have changed the committed layout.
    pub fn mutates_layout(&self) -> bool {
        !matches!(
            self,
            Intent::BeginGesture { .. }
                | Intent::UpdateGesture { .. }
                | Intent::Select { .. }
                | Intent::SnapshotScenario { .. }
                | Intent::Simulate { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_wire_format() {
        let json = r#"{"type":"insert","typeKey":"galley","floor":1}"#;
        let intent: Intent = serde_json::from_str(json).unwrap();
        assert_eq!(
            intent,
            Intent::Insert {
                type_key: "galley".to_string(),
                floor: 1
            }
        );

        let json = r#"{"type":"simulate","scenarioId":"A"}"#;
        let intent: Intent = serde_json::from_str(json).unwrap();
        assert_eq!(intent, Intent::Simulate { scenario_id: "A".to_string() });

        let intent: Intent = serde_json::from_str(r#"{"type":"undo"}"#).unwrap();
        assert_eq!(intent, Intent::Undo);
    }

    #[test]
    fn test_gesture_intent_roundtrip() {
        let intent = Intent::BeginGesture {
            id: uuid::Uuid::new_v4(),
            mode: GestureMode::Resize(ResizeHandle::Ne),
            pointer: Point::new(1.0, 2.0),
        };
        let json = serde_json::to_string(&intent).unwrap();
        assert_eq!(serde_json::from_str::<Intent>(&json).unwrap(), intent);
    }

    #[test]
    fn test_mutating_intents() {
        assert!(Intent::Undo.mutates_layout());
        assert!(Intent::CommitGesture.mutates_layout());
        assert!(!Intent::Select { id: None }.mutates_layout());
        assert!(!Intent::UpdateGesture { pointer: Point::new(0.0, 0.0) }.mutates_layout());
    }
}
