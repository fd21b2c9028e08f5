//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the session controller
//! and the native audio stack, the host event channel and config storage.

pub mod config;
pub mod events;
pub mod native;
pub mod player;
pub mod recorder;

// Re-export common types
pub use config::ConfigStore;
pub use events::EventEmitter;
pub use native::{MediaBackend, NativeError};
pub use player::{CompletionListener, MediaPlayer};
pub use recorder::{InfoListener, MediaRecorder, RecorderInfo};
