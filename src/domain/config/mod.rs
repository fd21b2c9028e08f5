//! Configuration value objects

mod app_config;
mod settings;

pub use app_config::{
    default_recording_path, AppConfig, PlaybackConfig, RecorderConfig, DEFAULT_RECORDING_FILE,
};
pub use settings::{
    PlaybackSettings, RecorderSettings, SessionSettings, DEFAULT_CHANNELS,
    DEFAULT_PROGRESS_INTERVAL_MS, DEFAULT_SAMPLE_RATE,
};
