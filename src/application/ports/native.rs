//! Native backend port: factory for recorder and player handles

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use super::player::MediaPlayer;
use super::recorder::MediaRecorder;
use crate::domain::config::RecorderSettings;

/// Failure reported by a native recorder or player.
///
/// `Display` is the bare message; it is forwarded verbatim in rejections.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NativeError {
    /// File could not be opened, created or decoded
    #[error("{0}")]
    Io(String),

    /// Call made in a lifecycle state that does not allow it
    #[error("{0}")]
    IllegalState(String),

    /// Audio device missing or refusing the configuration
    #[error("{0}")]
    Device(String),

    /// Requested behaviour is not available for this source or device
    #[error("{0}")]
    Unsupported(String),
}

/// Port creating native media handles
pub trait MediaBackend: Send + Sync + 'static {
    /// Create a recorder writing to `output`, configured for microphone
    /// input. Nothing is opened until `prepare`.
    fn create_recorder(
        &self,
        output: &Path,
        settings: &RecorderSettings,
    ) -> Result<Arc<dyn MediaRecorder>, NativeError>;

    /// Create an idle player with no data source
    fn create_player(&self) -> Arc<dyn MediaPlayer>;
}
