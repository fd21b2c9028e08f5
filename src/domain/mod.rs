//! Domain layer - Core business logic
//!
//! Contains value objects, session states, and domain errors.
//! This layer has no dependencies on audio devices or the host bridge.

pub mod config;
pub mod error;
pub mod media;
pub mod recording;
pub mod session;

// Re-export common types
pub use config::AppConfig;
pub use error::*;
pub use media::{MediaPath, PlaybackEvent, PLAYBACK_EVENT};
pub use recording::{Duration, FileSize};
pub use session::{PlayerState, RecorderState, SessionStatus};
