//! Recording port interfaces

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use super::native::NativeError;

/// Informational conditions reported by a running recorder.
/// These are logged, never surfaced to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderInfo {
    /// Backend-specific condition with an extra code
    Unknown(i32),
    /// Configured max duration reached; capture has stopped
    MaxDurationReached,
    /// Configured max file size reached; capture has stopped
    MaxFileSizeReached,
}

impl fmt::Display for RecorderInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(extra) => write!(f, "unknown recorder condition ({})", extra),
            Self::MaxDurationReached => write!(f, "max duration reached"),
            Self::MaxFileSizeReached => write!(f, "max file size reached"),
        }
    }
}

/// Listener for recorder info conditions.
/// May be invoked from the capture thread.
pub type InfoListener = Arc<dyn Fn(RecorderInfo) + Send + Sync>;

/// Port for a native recorder handle.
///
/// Lifecycle: created -> `prepare` -> `start` -> `stop` -> `release`.
#[async_trait]
pub trait MediaRecorder: Send + Sync {
    /// Register the info listener (replaces any previous one)
    fn set_info_listener(&self, listener: InfoListener);

    /// Open the output target and check the input device
    async fn prepare(&self) -> Result<(), NativeError>;

    /// Begin capturing
    async fn start(&self) -> Result<(), NativeError>;

    /// Stop capturing and finalize the output file
    async fn stop(&self) -> Result<(), NativeError>;

    /// Free every native resource; the handle is unusable afterwards
    async fn release(&self) -> Result<(), NativeError>;
}
