//! Config command handler

use crate::application::ports::ConfigStore;
use crate::domain::config::{AppConfig, PlaybackConfig, RecorderConfig};
use crate::domain::error::ConfigError;
use crate::domain::recording::{Duration, FileSize};

use super::args::{is_valid_config_key, ConfigAction, VALID_CONFIG_KEYS};
use super::presenter::Presenter;

const NOT_SET: &str = "(not set)";

/// Handle config subcommand
pub async fn handle_config_command<S: ConfigStore>(
    action: ConfigAction,
    store: &S,
    presenter: &Presenter,
) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Init => handle_init(store, presenter).await,
        ConfigAction::Set { key, value } => handle_set(store, presenter, &key, &value).await,
        ConfigAction::Get { key } => handle_get(store, presenter, &key).await,
        ConfigAction::List => handle_list(store, presenter).await,
        ConfigAction::Path => handle_path(store, presenter),
    }
}

async fn handle_init<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    store.init().await?;
    presenter.success(&format!(
        "Config file created at: {}",
        store.path().display()
    ));
    Ok(())
}

fn check_key(key: &str) -> Result<(), ConfigError> {
    if is_valid_config_key(key) {
        return Ok(());
    }
    Err(ConfigError::ValidationError {
        key: key.to_string(),
        message: format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
    })
}

fn invalid(key: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        key: key.to_string(),
        message: message.into(),
    }
}

async fn handle_set<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;
    let mut config = store.load().await?;
    apply_value(&mut config, key, value)?;
    store.save(&config).await?;
    presenter.success(&format!("{} = {}", key, value));
    Ok(())
}

/// Validate `value` and store it under `key`
fn apply_value(config: &mut AppConfig, key: &str, value: &str) -> Result<(), ConfigError> {
    match key {
        "default_path" => config.default_path = Some(value.to_string()),
        "socket_path" => config.socket_path = Some(value.to_string()),
        "recorder.sample_rate" => {
            let rate = value
                .parse::<u32>()
                .ok()
                .filter(|&rate| rate > 0)
                .ok_or_else(|| invalid(key, "Value must be a positive integer (Hz)"))?;
            recorder_mut(config).sample_rate = Some(rate);
        }
        "recorder.channels" => {
            let channels = match value {
                "1" => 1,
                "2" => 2,
                _ => return Err(invalid(key, "Value must be 1 or 2")),
            };
            recorder_mut(config).channels = Some(channels);
        }
        "recorder.max_duration" => {
            value
                .parse::<Duration>()
                .map_err(|e| invalid(key, e.to_string()))?;
            recorder_mut(config).max_duration = Some(value.to_string());
        }
        "recorder.max_file_size" => {
            value
                .parse::<FileSize>()
                .map_err(|e| invalid(key, e.to_string()))?;
            recorder_mut(config).max_file_size = Some(value.to_string());
        }
        "playback.progress_interval_ms" => {
            let ms = value
                .parse::<u64>()
                .ok()
                .filter(|&ms| ms > 0)
                .ok_or_else(|| invalid(key, "Value must be a positive number of milliseconds"))?;
            playback_mut(config).progress_interval_ms = Some(ms);
        }
        "playback.progress_while_paused" => {
            let flag =
                parse_bool(value).map_err(|_| invalid(key, "Value must be 'true' or 'false'"))?;
            playback_mut(config).progress_while_paused = Some(flag);
        }
        _ => return Err(invalid(key, "Unknown key")),
    }
    Ok(())
}

fn recorder_mut(config: &mut AppConfig) -> &mut RecorderConfig {
    config.recorder.get_or_insert_with(RecorderConfig::default)
}

fn playback_mut(config: &mut AppConfig) -> &mut PlaybackConfig {
    config.playback.get_or_insert_with(PlaybackConfig::default)
}

/// Current value of `key`, if set
fn lookup(config: &AppConfig, key: &str) -> Option<String> {
    let recorder = config.recorder.as_ref();
    let playback = config.playback.as_ref();
    match key {
        "default_path" => config.default_path.clone(),
        "socket_path" => config.socket_path.clone(),
        "recorder.sample_rate" => recorder.and_then(|r| r.sample_rate).map(|v| v.to_string()),
        "recorder.channels" => recorder.and_then(|r| r.channels).map(|v| v.to_string()),
        "recorder.max_duration" => recorder.and_then(|r| r.max_duration.clone()),
        "recorder.max_file_size" => recorder.and_then(|r| r.max_file_size.clone()),
        "playback.progress_interval_ms" => playback
            .and_then(|p| p.progress_interval_ms)
            .map(|v| v.to_string()),
        "playback.progress_while_paused" => playback
            .and_then(|p| p.progress_while_paused)
            .map(|v| v.to_string()),
        _ => None,
    }
}

async fn handle_get<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;
    let config = store.load().await?;
    presenter.output(lookup(&config, key).as_deref().unwrap_or(NOT_SET));
    Ok(())
}

async fn handle_list<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let config = store.load().await?;
    for key in VALID_CONFIG_KEYS {
        presenter.key_value(key, lookup(&config, key).as_deref().unwrap_or(NOT_SET));
    }
    Ok(())
}

fn handle_path<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    presenter.output(&store.path().to_string_lossy());
    Ok(())
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, ()> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::XdgConfigStore;

    #[test]
    fn parse_bool_values() {
        assert_eq!(parse_bool("true"), Ok(true));
        assert_eq!(parse_bool("false"), Ok(false));
        assert_eq!(parse_bool("yes"), Ok(true));
        assert_eq!(parse_bool("no"), Ok(false));
        assert_eq!(parse_bool("1"), Ok(true));
        assert_eq!(parse_bool("0"), Ok(false));
        assert!(parse_bool("invalid").is_err());
    }

    #[test]
    fn apply_recorder_values() {
        let mut config = AppConfig::empty();
        apply_value(&mut config, "recorder.sample_rate", "16000").unwrap();
        apply_value(&mut config, "recorder.channels", "2").unwrap();
        apply_value(&mut config, "recorder.max_duration", "2m30s").unwrap();
        apply_value(&mut config, "recorder.max_file_size", "10MB").unwrap();

        let recorder = config.recorder.as_ref().unwrap();
        assert_eq!(recorder.sample_rate, Some(16_000));
        assert_eq!(recorder.channels, Some(2));
        assert_eq!(lookup(&config, "recorder.max_duration").as_deref(), Some("2m30s"));
        assert_eq!(lookup(&config, "recorder.max_file_size").as_deref(), Some("10MB"));
    }

    #[test]
    fn apply_rejects_invalid_values() {
        let mut config = AppConfig::empty();
        assert!(apply_value(&mut config, "recorder.sample_rate", "0").is_err());
        assert!(apply_value(&mut config, "recorder.channels", "6").is_err());
        assert!(apply_value(&mut config, "recorder.max_duration", "forever").is_err());
        assert!(apply_value(&mut config, "recorder.max_file_size", "lots").is_err());
        assert!(apply_value(&mut config, "playback.progress_interval_ms", "-5").is_err());
        assert!(apply_value(&mut config, "playback.progress_while_paused", "maybe").is_err());
        assert_eq!(config, AppConfig::empty());
    }

    #[test]
    fn apply_playback_values() {
        let mut config = AppConfig::empty();
        apply_value(&mut config, "playback.progress_interval_ms", "250").unwrap();
        apply_value(&mut config, "playback.progress_while_paused", "no").unwrap();
        assert_eq!(
            lookup(&config, "playback.progress_interval_ms").as_deref(),
            Some("250")
        );
        assert_eq!(
            lookup(&config, "playback.progress_while_paused").as_deref(),
            Some("false")
        );
    }

    #[test]
    fn lookup_unset_key_is_none() {
        assert!(lookup(&AppConfig::empty(), "default_path").is_none());
    }

    #[tokio::test]
    async fn set_persists_through_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = XdgConfigStore::with_path(dir.path().join("config.toml"));
        let presenter = Presenter::new();

        handle_config_command(
            ConfigAction::Set {
                key: "default_path".to_string(),
                value: "/srv/take.wav".to_string(),
            },
            &store,
            &presenter,
        )
        .await
        .unwrap();

        let config = store.load().await.unwrap();
        assert_eq!(config.default_path.as_deref(), Some("/srv/take.wav"));
    }

    #[tokio::test]
    async fn unknown_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = XdgConfigStore::with_path(dir.path().join("config.toml"));
        let err = handle_config_command(
            ConfigAction::Get {
                key: "api_key".to_string(),
            },
            &store,
            &Presenter::new(),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("Unknown key"));
    }
}
