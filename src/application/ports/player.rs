//! Playback port interfaces

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use super::native::NativeError;

/// Invoked once when a started player drains its source.
/// May be called from a native thread.
pub type CompletionListener = Arc<dyn Fn() + Send + Sync>;

/// Port for a native player handle.
///
/// Lifecycle: created -> `set_data_source` -> `prepare` -> `start`
/// <-> `pause` -> `stop` -> `release`. Queries are cheap and never block.
#[async_trait]
pub trait MediaPlayer: Send + Sync {
    /// Point the player at a file; fails if it cannot be opened
    fn set_data_source(&self, path: &Path) -> Result<(), NativeError>;

    /// Register the completion listener (replaces any previous one)
    fn set_completion_listener(&self, listener: CompletionListener);

    /// Decode headers and open the output device
    async fn prepare(&self) -> Result<(), NativeError>;

    /// Start or continue playback
    fn start(&self) -> Result<(), NativeError>;

    fn pause(&self) -> Result<(), NativeError>;

    fn is_playing(&self) -> bool;

    /// Current position in milliseconds (0 before prepare)
    fn current_position_ms(&self) -> u64;

    /// Source length in milliseconds (0 if unknown)
    fn duration_ms(&self) -> u64;

    fn seek_to_ms(&self, position_ms: u64) -> Result<(), NativeError>;

    fn stop(&self) -> Result<(), NativeError>;

    /// Free every native resource; the handle is unusable afterwards
    fn release(&self) -> Result<(), NativeError>;
}
