use std::sync::Arc;

use habitat_app::{Intent, Outcome, Session, SessionError};
use habitat_core::{
    HabitatConfig, InstanceId, LayoutError, Point, ShellSpec, ValidationError,
};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn session() -> Session {
    init();
    Session::new(Arc::new(HabitatConfig::baseline()))
}

fn insert(s: &mut Session, type_key: &str) -> InstanceId {
    match s.dispatch(Intent::Insert {
        type_key: type_key.to_string(),
        floor: 1,
    }) {
        Ok(Outcome::Inserted(placement)) => placement.id,
        other => panic!("insert failed: {:?}", other),
    }
}

#[test]
fn test_move_outside_ellipse_is_rejected() {
    let mut s = session();
    let id = insert(&mut s, "stowage");
    let before = s.editor().module(&id).unwrap().clone();

    // Corner lands at x = 10.5 on a 10 x 7 ellipse.
    let half = before.width / 2.0;
    let err = s
        .dispatch(Intent::Move {
            id,
            dx: 10.5 - half,
            dy: 0.0,
        })
        .unwrap_err();
    assert!(matches!(
        err,
        SessionError::Layout(LayoutError::Validation(ValidationError::OutsideShell { .. }))
    ));
    assert_eq!(s.editor().module(&id), Some(&before));

    s.dispatch(Intent::Move { id, dx: 8.0, dy: 0.0 }).unwrap();
    assert!((s.editor().module(&id).unwrap().position.x - 8.0).abs() < 1e-9);
}

#[test]
fn test_score_collapses_when_crew_cannot_survive() {
    let mut s = session();
    insert(&mut s, "crew_quarters");
    // 60 crew breathe 50.4 kg of O2 a day against a 50 kg store.
    s.dispatch(Intent::SetCrew { crew_count: 60 }).unwrap();
    let score = s.score();
    assert_eq!(score.days_survived, 0);
    assert_eq!(score.collision_metric, 1.0);
    assert_eq!(score.mass_metric, 1.0);
    assert_eq!(score.survival_metric, 0.0);
    assert_eq!(score.final_score, 0.0);
}

#[test]
fn test_shrinking_shell_flags_but_keeps_modules() {
    let mut s = session();
    let id = insert(&mut s, "crew_quarters");
    s.dispatch(Intent::Move { id, dx: 8.0, dy: 0.0 }).unwrap();
    assert!(s.frame().violations.is_empty());

    let outcome = s
        .dispatch(Intent::ApplyShell {
            shell: ShellSpec::ellipse(5.0, 4.0, 3.0),
        })
        .unwrap();
    let Outcome::Shell(report) = outcome else {
        panic!("expected a shell report");
    };
    assert_eq!(report.invalid.len(), 1);
    assert_eq!(report.invalid[0].0, id);

    let frame = s.frame();
    assert_eq!(frame.layout.modules.len(), 1);
    assert!(frame.is_flagged(&id));

    s.dispatch(Intent::Undo).unwrap();
    assert!(s.frame().violations.is_empty());
    s.dispatch(Intent::Redo).unwrap();
    assert!(s.frame().is_flagged(&id));
}

#[test]
fn test_undo_everything_then_redo_everything() {
    let mut s = session();
    let initial = s.editor().state().clone();

    let galley = insert(&mut s, "galley");
    let medical = insert(&mut s, "medical");
    s.dispatch(Intent::Move {
        id: galley,
        dx: -3.0,
        dy: 1.0,
    })
    .unwrap();
    s.dispatch(Intent::Rotate {
        id: medical,
        degrees: 30.0,
    })
    .unwrap();
    s.dispatch(Intent::SetEnvironment {
        environment_id: "mars_surface".to_string(),
    })
    .unwrap();
    let last = s.editor().state().clone();
    let last_score = s.score().clone();

    for _ in 0..5 {
        assert_eq!(s.dispatch(Intent::Undo).unwrap(), Outcome::Changed(true));
    }
    assert_eq!(s.editor().state(), &initial);
    assert_eq!(s.dispatch(Intent::Undo).unwrap(), Outcome::Changed(false));

    for _ in 0..5 {
        assert_eq!(s.dispatch(Intent::Redo).unwrap(), Outcome::Changed(true));
    }
    assert_eq!(s.editor().state(), &last);
    assert_eq!(s.score(), &last_score);
}

#[test]
fn test_edits_refused_during_gesture() {
    let mut s = session();
    let id = insert(&mut s, "workstation");
    s.dispatch(Intent::BeginGesture {
        id,
        mode: habitat_core::GestureMode::Move,
        pointer: Point::new(0.0, 0.0),
    })
    .unwrap();
    let err = s.dispatch(Intent::Undo).unwrap_err();
    assert!(matches!(err, SessionError::Layout(LayoutError::GestureActive)));

    s.dispatch(Intent::UpdateGesture {
        pointer: Point::new(2.0, 1.0),
    })
    .unwrap();
    s.dispatch(Intent::CancelGesture).unwrap();
    let m = s.editor().module(&id).unwrap();
    assert_eq!(m.position, Point::new(0.0, 0.0));
    assert!(s.frame().gesture.is_none());
}

#[test]
fn test_scenarios_are_independent_of_live_edits() {
    let mut s = session();
    insert(&mut s, "eclss");
    s.dispatch(Intent::SnapshotScenario {
        scenario_id: "with-eclss".to_string(),
    })
    .unwrap();
    s.dispatch(Intent::Reset).unwrap();

    let Outcome::Simulated(result) = s
        .dispatch(Intent::Simulate {
            scenario_id: "with-eclss".to_string(),
        })
        .unwrap()
    else {
        panic!("expected a simulation result");
    };
    assert!(result.days_survived > s.score().days_survived);
}

#[test]
fn test_document_roundtrip_between_sessions() {
    let mut s = session();
    let id = insert(&mut s, "crew_quarters");
    s.dispatch(Intent::SetProperty {
        id,
        key: "bunks".to_string(),
        value: habitat_core::ParamValue::Number(3.0),
    })
    .unwrap();
    s.dispatch(Intent::SetLocked { id, locked: true }).unwrap();
    let json = s.export_document().unwrap();

    let mut other = session();
    other.import_document(&json).unwrap();
    assert_eq!(other.editor().state(), s.editor().state());
    assert_eq!(other.score(), s.score());
    assert!(!other.editor().can_undo());

    let err = other
        .dispatch(Intent::Move { id, dx: 1.0, dy: 0.0 })
        .unwrap_err();
    assert!(matches!(err, SessionError::Layout(LayoutError::Locked(_))));
}
