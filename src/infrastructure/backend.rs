//! Native media backend: cpal capture and rodio playback

use std::path::Path;
use std::sync::Arc;

use crate::application::ports::{MediaBackend, MediaPlayer, MediaRecorder, NativeError};
use crate::domain::config::RecorderSettings;

use super::playback::RodioPlayer;
use super::recording::CpalRecorder;

/// Backend handing out handles bound to the default audio devices
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeBackend;

impl NativeBackend {
    pub fn new() -> Self {
        Self
    }
}

impl MediaBackend for NativeBackend {
    fn create_recorder(
        &self,
        output: &Path,
        settings: &RecorderSettings,
    ) -> Result<Arc<dyn MediaRecorder>, NativeError> {
        if output.is_dir() {
            return Err(NativeError::Io(format!(
                "{}: is a directory",
                output.display()
            )));
        }
        Ok(Arc::new(CpalRecorder::new(output, *settings)))
    }

    fn create_player(&self) -> Arc<dyn MediaPlayer> {
        Arc::new(RodioPlayer::new())
    }
}
