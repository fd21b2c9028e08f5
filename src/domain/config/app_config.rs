//! Application configuration value object

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::settings::{
    PlaybackSettings, RecorderSettings, SessionSettings, DEFAULT_CHANNELS,
    DEFAULT_PROGRESS_INTERVAL_MS, DEFAULT_SAMPLE_RATE,
};
use crate::domain::recording::{Duration, FileSize};

/// File name used for the `DEFAULT` recording target
pub const DEFAULT_RECORDING_FILE: &str = "sound.wav";

/// Recorder section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecorderConfig {
    pub sample_rate: Option<u32>,
    pub channels: Option<u16>,
    pub max_duration: Option<String>,
    pub max_file_size: Option<String>,
}

/// Playback section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    pub progress_interval_ms: Option<u64>,
    pub progress_while_paused: Option<bool>,
}

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub default_path: Option<String>,
    pub socket_path: Option<String>,
    pub recorder: Option<RecorderConfig>,
    pub playback: Option<PlaybackConfig>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            default_path: Some(default_recording_path().to_string_lossy().to_string()),
            socket_path: None,
            recorder: Some(RecorderConfig {
                sample_rate: Some(DEFAULT_SAMPLE_RATE),
                channels: Some(DEFAULT_CHANNELS),
                max_duration: None,
                max_file_size: None,
            }),
            playback: Some(PlaybackConfig {
                progress_interval_ms: Some(DEFAULT_PROGRESS_INTERVAL_MS),
                progress_while_paused: Some(true),
            }),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            default_path: other.default_path.or(self.default_path),
            socket_path: other.socket_path.or(self.socket_path),
            recorder: match (self.recorder, other.recorder) {
                (Some(b), Some(o)) => Some(RecorderConfig {
                    sample_rate: o.sample_rate.or(b.sample_rate),
                    channels: o.channels.or(b.channels),
                    max_duration: o.max_duration.or(b.max_duration),
                    max_file_size: o.max_file_size.or(b.max_file_size),
                }),
                (b, o) => o.or(b),
            },
            playback: match (self.playback, other.playback) {
                (Some(b), Some(o)) => Some(PlaybackConfig {
                    progress_interval_ms: o.progress_interval_ms.or(b.progress_interval_ms),
                    progress_while_paused: o.progress_while_paused.or(b.progress_while_paused),
                }),
                (b, o) => o.or(b),
            },
        }
    }

    /// Get the `DEFAULT` target, or the platform data dir location if not set
    pub fn default_path_or_default(&self) -> PathBuf {
        self.default_path
            .as_ref()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_recording_path)
    }

    /// Get the recorder settings; invalid limits are treated as unset
    pub fn recorder_settings(&self) -> RecorderSettings {
        let section = self.recorder.clone().unwrap_or_default();
        RecorderSettings {
            sample_rate: section
                .sample_rate
                .filter(|&rate| rate > 0)
                .unwrap_or(DEFAULT_SAMPLE_RATE),
            channels: section
                .channels
                .filter(|&ch| ch > 0)
                .unwrap_or(DEFAULT_CHANNELS),
            max_duration: section
                .max_duration
                .as_deref()
                .and_then(|s| s.parse::<Duration>().ok()),
            max_file_size: section
                .max_file_size
                .as_deref()
                .and_then(|s| s.parse::<FileSize>().ok()),
        }
    }

    /// Get the playback settings
    pub fn playback_settings(&self) -> PlaybackSettings {
        let section = self.playback.clone().unwrap_or_default();
        PlaybackSettings {
            progress_interval_ms: section
                .progress_interval_ms
                .filter(|&ms| ms > 0)
                .unwrap_or(DEFAULT_PROGRESS_INTERVAL_MS),
            progress_while_paused: section.progress_while_paused.unwrap_or(true),
        }
    }

    /// Everything the session controller needs
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            default_path: self.default_path_or_default(),
            recorder: self.recorder_settings(),
            playback: self.playback_settings(),
        }
    }
}

/// Platform location used for the `DEFAULT` sentinel
pub fn default_recording_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("recplay")
        .join(DEFAULT_RECORDING_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_have_expected_values() {
        let config = AppConfig::defaults();
        assert!(config
            .default_path
            .as_deref()
            .unwrap()
            .ends_with(DEFAULT_RECORDING_FILE));
        assert!(config.socket_path.is_none());
        let recorder = config.recorder.as_ref().unwrap();
        assert_eq!(recorder.sample_rate, Some(44_100));
        assert_eq!(recorder.channels, Some(1));
        let playback = config.playback.as_ref().unwrap();
        assert_eq!(playback.progress_interval_ms, Some(1000));
        assert_eq!(playback.progress_while_paused, Some(true));
    }

    #[test]
    fn empty_has_all_none() {
        let config = AppConfig::empty();
        assert!(config.default_path.is_none());
        assert!(config.recorder.is_none());
        assert!(config.playback.is_none());
    }

    #[test]
    fn merge_other_takes_precedence() {
        let base = AppConfig {
            default_path: Some("/base.wav".to_string()),
            socket_path: Some("/run/base.sock".to_string()),
            ..AppConfig::defaults()
        };
        let other = AppConfig {
            default_path: Some("/other.wav".to_string()),
            recorder: Some(RecorderConfig {
                max_duration: Some("30s".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let merged = base.merge(other);

        assert_eq!(merged.default_path, Some("/other.wav".to_string()));
        assert_eq!(merged.socket_path, Some("/run/base.sock".to_string()));
        let recorder = merged.recorder.unwrap();
        assert_eq!(recorder.max_duration, Some("30s".to_string()));
        assert_eq!(recorder.sample_rate, Some(44_100));
    }

    #[test]
    fn merge_preserves_base_when_other_is_none() {
        let base = AppConfig {
            playback: Some(PlaybackConfig {
                progress_while_paused: Some(false),
                ..Default::default()
            }),
            ..Default::default()
        };
        let merged = base.merge(AppConfig::empty());
        assert_eq!(
            merged.playback.unwrap().progress_while_paused,
            Some(false)
        );
    }

    #[test]
    fn recorder_settings_parse_limits() {
        let config = AppConfig {
            recorder: Some(RecorderConfig {
                sample_rate: Some(16_000),
                channels: Some(2),
                max_duration: Some("1m".to_string()),
                max_file_size: Some("2MB".to_string()),
            }),
            ..Default::default()
        };
        let settings = config.recorder_settings();
        assert_eq!(settings.sample_rate, 16_000);
        assert_eq!(settings.channels, 2);
        assert_eq!(settings.max_duration.map(|d| d.as_secs()), Some(60));
        assert_eq!(settings.max_file_size.map(|s| s.as_bytes()), Some(2 << 20));
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = AppConfig {
            recorder: Some(RecorderConfig {
                sample_rate: Some(0),
                max_duration: Some("forever".to_string()),
                ..Default::default()
            }),
            playback: Some(PlaybackConfig {
                progress_interval_ms: Some(0),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(config.recorder_settings().sample_rate, DEFAULT_SAMPLE_RATE);
        assert!(config.recorder_settings().max_duration.is_none());
        assert_eq!(
            config.playback_settings().progress_interval_ms,
            DEFAULT_PROGRESS_INTERVAL_MS
        );
    }

    #[test]
    fn blank_default_path_uses_platform_location() {
        let config = AppConfig {
            default_path: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(config.default_path_or_default(), default_recording_path());
    }

    #[test]
    fn session_settings_use_configured_default_path() {
        let config = AppConfig {
            default_path: Some("/srv/take.wav".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.session_settings().default_path,
            PathBuf::from("/srv/take.wav")
        );
    }
}
