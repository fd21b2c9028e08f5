//! Recplay CLI entry point

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use recplay::cli::{
    app::{cli_config, load_merged_config, validate_limits, EXIT_ERROR, EXIT_USAGE_ERROR},
    args::{Cli, Commands},
    bridge_cmd::{run_call, run_listen, BridgeCall},
    config_cmd::handle_config_command,
    daemon_app::run_daemon,
    ipc::SocketPath,
    presenter::Presenter,
};
use recplay::infrastructure::XdgConfigStore;

/// `RUST_LOG` overrides `default_filter`
fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let daemon = matches!(cli.command, Commands::Daemon(_));
    init_tracing(if daemon { "recplay=info" } else { "recplay=warn" });
    let mut presenter = Presenter::new();

    match cli.command {
        Commands::Config { action } => {
            let store = XdgConfigStore::new();
            if let Err(e) = handle_config_command(action, &store, &presenter).await {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            ExitCode::SUCCESS
        }
        Commands::Daemon(args) => {
            let config = load_merged_config(cli_config(cli.socket, Some(&args))).await;
            if let Err(e) = validate_limits(&config) {
                presenter.error(&e);
                return ExitCode::from(EXIT_USAGE_ERROR);
            }
            run_daemon(config).await
        }
        Commands::Listen { json } => {
            let config = load_merged_config(cli_config(cli.socket, None)).await;
            let socket = SocketPath::from_config(config.socket_path.as_deref());
            run_listen(json, socket, &mut presenter).await
        }
        command => {
            let Some(call) = BridgeCall::from_command(&command) else {
                return ExitCode::from(EXIT_USAGE_ERROR);
            };
            let config = load_merged_config(cli_config(cli.socket, None)).await;
            let socket = SocketPath::from_config(config.socket_path.as_deref());
            run_call(call, socket, &mut presenter).await
        }
    }
}
