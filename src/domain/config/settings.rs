//! Resolved runtime settings handed to the session controller and adapters

use std::path::PathBuf;
use std::time::Duration as StdDuration;

use crate::domain::recording::{Duration, FileSize};

pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;
pub const DEFAULT_CHANNELS: u16 = 1;
pub const DEFAULT_PROGRESS_INTERVAL_MS: u64 = 1000;

/// How a new recorder is configured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecorderSettings {
    pub sample_rate: u32,
    pub channels: u16,
    /// Capture stops and `MaxDurationReached` is reported past this
    pub max_duration: Option<Duration>,
    /// Capture stops and `MaxFileSizeReached` is reported past this
    pub max_file_size: Option<FileSize>,
}

impl Default for RecorderSettings {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            channels: DEFAULT_CHANNELS,
            max_duration: None,
            max_file_size: None,
        }
    }
}

/// Position timer behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackSettings {
    pub progress_interval_ms: u64,
    /// Keep emitting progress (with frozen values) while paused
    pub progress_while_paused: bool,
}

impl PlaybackSettings {
    pub fn progress_interval(&self) -> StdDuration {
        StdDuration::from_millis(self.progress_interval_ms)
    }
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            progress_interval_ms: DEFAULT_PROGRESS_INTERVAL_MS,
            progress_while_paused: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    /// Location the `DEFAULT` sentinel resolves to
    pub default_path: PathBuf,
    pub recorder: RecorderSettings,
    pub playback: PlaybackSettings,
}

impl SessionSettings {
    /// Defaults with an explicit sentinel location
    pub fn with_default_path(default_path: impl Into<PathBuf>) -> Self {
        Self {
            default_path: default_path.into(),
            recorder: RecorderSettings::default(),
            playback: PlaybackSettings::default(),
        }
    }
}
