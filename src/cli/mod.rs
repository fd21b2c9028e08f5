//! CLI layer - Command-line interface
//!
//! Contains argument parsing, the bridge protocol and its socket transport,
//! output formatting, signal handling, and the daemon and client runners.

pub mod app;
pub mod args;
pub mod bridge;
pub mod bridge_cmd;
pub mod config_cmd;
pub mod daemon_app;
pub mod ipc;
pub mod pid_file;
pub mod presenter;
pub mod protocol;
pub mod signals;

// Re-export commonly used types
pub use app::{EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE_ERROR};
pub use args::{Cli, Commands, ConfigAction, DaemonArgs};
pub use bridge::{Bridge, BridgeHandler, Reply};
pub use daemon_app::run_daemon;
pub use presenter::Presenter;
