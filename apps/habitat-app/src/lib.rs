//! # Habitat App
//!
//! The boundary between the layout core and a rendering/input front end.
//! Front ends send [`Intent`]s to a [`Session`] and draw the [`Frame`] it
//! hands back; every failure comes back as a value.

pub mod error;
pub mod frame;
pub mod intent;
pub mod session;

pub use error::SessionError;
pub use frame::{Frame, FrameGesture, FrameViolation};
pub use intent::Intent;
pub use session::{Outcome, Session};

/// Install the process logger. Honours `RUST_LOG`, defaulting to `info`.
/// Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).try_init();
}
