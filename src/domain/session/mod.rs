//! Session lifecycle states

mod state;

pub use state::{PlayerState, RecorderState, SessionStatus};
