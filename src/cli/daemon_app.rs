//! Daemon app runner

use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info};

use crate::domain::config::AppConfig;
use crate::infrastructure::NativeBackend;

use super::app::{EXIT_ERROR, EXIT_SUCCESS};
use super::bridge::{Bridge, BridgeHandler};
use super::ipc::{create_ipc_server, IpcServer, SocketPath};
use super::pid_file::{PidFile, PidFileError};
use super::presenter::Presenter;
use super::signals::DaemonSignalHandler;

/// Run daemon mode until SIGINT/SIGTERM
pub async fn run_daemon(config: AppConfig) -> ExitCode {
    let presenter = Presenter::new();

    // Acquire PID file
    let pid_file = PidFile::new();
    if let Err(e) = pid_file.acquire() {
        match e {
            PidFileError::AlreadyRunning(pid) => {
                presenter.error(&format!("Another daemon is already running (PID: {})", pid));
            }
            _ => {
                presenter.error(&e.to_string());
            }
        }
        return ExitCode::from(EXIT_ERROR);
    }

    let mut signals = match DaemonSignalHandler::new() {
        Ok(s) => s,
        Err(e) => {
            presenter.error(&format!("Failed to setup signal handler: {}", e));
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let socket_path = SocketPath::from_config(config.socket_path.as_deref());
    let mut server = create_ipc_server(socket_path);
    if let Err(e) = server.bind() {
        presenter.error(&format!("Failed to bind socket {}: {}", server.path(), e));
        return ExitCode::from(EXIT_ERROR);
    }

    let settings = config.session_settings();
    info!(
        "Session settings: default path {}, {} Hz x{}, progress every {} ms",
        settings.default_path.display(),
        settings.recorder.sample_rate,
        settings.recorder.channels,
        settings.playback.progress_interval_ms
    );
    let bridge = Arc::new(Bridge::new(NativeBackend::new(), settings));

    presenter.daemon_status("Started, waiting for requests...");
    presenter.info(&format!(
        "PID: {} | Socket: {} | SIGINT/SIGTERM: exit",
        std::process::id(),
        server.path()
    ));

    let server = Arc::new(server);
    let handler: Arc<dyn BridgeHandler> = bridge.clone();
    let mut server_task = {
        let server = Arc::clone(&server);
        tokio::spawn(async move { server.run(handler).await })
    };

    let clean = tokio::select! {
        signal = signals.recv() => {
            match signal {
                Some(signal) => info!("Received {}, shutting down", signal),
                None => info!("Signal channel closed, shutting down"),
            }
            true
        }
        result = &mut server_task => {
            match result {
                Ok(Ok(())) => true,
                Ok(Err(e)) => {
                    error!("Socket server failed: {}", e);
                    presenter.error(&format!("Socket server failed: {}", e));
                    false
                }
                Err(e) => {
                    error!("Socket server task failed: {}", e);
                    false
                }
            }
        }
    };

    presenter.daemon_status("Shutting down...");
    server_task.abort();
    bridge.controller().shutdown().await;
    server.cleanup();
    let _ = pid_file.release();

    if clean {
        ExitCode::from(EXIT_SUCCESS)
    } else {
        ExitCode::from(EXIT_ERROR)
    }
}
