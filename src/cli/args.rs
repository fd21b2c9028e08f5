//! CLI argument definitions using Clap

use clap::{Parser, Subcommand};

/// Recplay - audio record/playback session bridge
#[derive(Parser, Debug)]
#[command(name = "recplay")]
#[command(version)]
#[command(about = "Record and play audio through a session daemon with playback position events")]
#[command(long_about = None)]
pub struct Cli {
    /// Bridge socket path (overrides config and RECPLAY_SOCKET)
    #[arg(long, global = true, value_name = "PATH")]
    pub socket: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the session daemon in the foreground
    Daemon(DaemonArgs),
    /// Start recording to PATH (or the DEFAULT location)
    StartRecord {
        /// Target file, `DEFAULT`, or a file:// URI
        path: Option<String>,
    },
    /// Stop the current recording
    StopRecord,
    /// Start playing PATH (or the DEFAULT location)
    StartPlay {
        /// Source file, `DEFAULT`, or a file:// URI
        path: Option<String>,
    },
    /// Resume paused playback
    Resume,
    /// Pause playback
    Pause,
    /// Seek playback to SECONDS from the start
    Seek {
        #[arg(allow_negative_numbers = true)]
        seconds: i64,
    },
    /// Stop playback and release the player
    StopPlay,
    /// Show recorder and player state
    Status,
    /// Print playback position events until interrupted
    Listen {
        /// Print raw event frames as JSON lines
        #[arg(long)]
        json: bool,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Daemon options
#[derive(clap::Args, Debug, Clone, Default)]
pub struct DaemonArgs {
    /// Location the `DEFAULT` sentinel resolves to
    #[arg(long, value_name = "PATH")]
    pub default_path: Option<String>,

    /// Stop recordings automatically after TIME (e.g., 30s, 5m)
    #[arg(long, value_name = "TIME")]
    pub max_duration: Option<String>,

    /// Stop recordings automatically past SIZE (e.g., 10MB)
    #[arg(long, value_name = "SIZE")]
    pub max_file_size: Option<String>,
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "default_path",
    "socket_path",
    "recorder.sample_rate",
    "recorder.channels",
    "recorder.max_duration",
    "recorder.max_file_size",
    "playback.progress_interval_ms",
    "playback.progress_while_paused",
];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}
