//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces,
//! integrating with cpal, rodio, hound and the XDG config location.

pub mod backend;
pub mod config;
pub mod events;
pub mod playback;
pub mod recording;

// Re-export adapters
pub use backend::NativeBackend;
pub use config::XdgConfigStore;
pub use events::{BroadcastEmitter, EmittedEvent};
pub use playback::RodioPlayer;
pub use recording::CpalRecorder;
