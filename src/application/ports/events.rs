//! Event emission port

use crate::domain::media::PlaybackEvent;

/// Port for pushing one-way notifications to the host runtime.
///
/// `emit` is called while session state is locked; implementations must
/// not block.
pub trait EventEmitter: Send + Sync + 'static {
    fn emit(&self, name: &str, event: &PlaybackEvent);
}
