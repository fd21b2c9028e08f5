//! Shared app plumbing: exit codes and layered configuration

use std::env;

use crate::application::ports::ConfigStore;
use crate::domain::config::{AppConfig, RecorderConfig};
use crate::domain::recording::{Duration, FileSize};
use crate::infrastructure::XdgConfigStore;

use super::args::DaemonArgs;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

pub const ENV_DEFAULT_PATH: &str = "RECPLAY_DEFAULT_PATH";
pub const ENV_SOCKET: &str = "RECPLAY_SOCKET";

/// Config overrides taken from the command line
pub fn cli_config(socket: Option<String>, daemon: Option<&DaemonArgs>) -> AppConfig {
    let daemon = daemon.cloned().unwrap_or_default();
    let recorder = if daemon.max_duration.is_some() || daemon.max_file_size.is_some() {
        Some(RecorderConfig {
            max_duration: daemon.max_duration,
            max_file_size: daemon.max_file_size,
            ..Default::default()
        })
    } else {
        None
    };

    AppConfig {
        default_path: daemon.default_path,
        socket_path: socket,
        recorder,
        playback: None,
    }
}

/// Reject limits that would otherwise be silently ignored
pub fn validate_limits(config: &AppConfig) -> Result<(), String> {
    let Some(recorder) = config.recorder.as_ref() else {
        return Ok(());
    };
    if let Some(value) = recorder.max_duration.as_deref() {
        value
            .parse::<Duration>()
            .map_err(|e| format!("Invalid max-duration: {}", e))?;
    }
    if let Some(value) = recorder.max_file_size.as_deref() {
        value
            .parse::<FileSize>()
            .map_err(|e| format!("Invalid max-file-size: {}", e))?;
    }
    Ok(())
}

fn env_config() -> AppConfig {
    AppConfig {
        default_path: env::var(ENV_DEFAULT_PATH).ok().filter(|s| !s.is_empty()),
        socket_path: env::var(ENV_SOCKET).ok().filter(|s| !s.is_empty()),
        ..Default::default()
    }
}

/// Load and merge configuration from file, env, and CLI
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    let store = XdgConfigStore::new();
    let file_config = store.load().await.unwrap_or_else(|_| AppConfig::empty());

    // Merge: defaults < file < env < cli
    AppConfig::defaults()
        .merge(file_config)
        .merge(env_config())
        .merge(cli_config)
}
