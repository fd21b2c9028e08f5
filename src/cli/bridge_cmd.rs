//! Client commands - send bridge requests to the running daemon

use std::io;
use std::process::ExitCode;

use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

use crate::domain::error::Operation;
use crate::domain::media::DEFAULT_SENTINEL;

use super::app::{EXIT_ERROR, EXIT_SUCCESS};
use super::args::Commands;
use super::ipc::{create_ipc_client, BridgeConnection, IpcClient, SocketPath};
use super::presenter::Presenter;
use super::protocol::{Outcome, ServerMessage, METHOD_STATUS, METHOD_SUBSCRIBE};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("No daemon running at {0}. Start with: recplay daemon")]
    NotRunning(String),

    #[error("Failed to communicate with daemon: {0}")]
    Io(#[from] io::Error),

    #[error("Daemon closed the connection")]
    Closed,
}

/// One request line derived from a client subcommand
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeCall {
    pub method: &'static str,
    pub args: Vec<Value>,
}

impl BridgeCall {
    fn new(method: &'static str, args: Vec<Value>) -> Self {
        Self { method, args }
    }

    /// Request for a client subcommand; `None` for local-only commands
    pub fn from_command(command: &Commands) -> Option<Self> {
        let path = |p: &Option<String>| vec![json!(p.as_deref().unwrap_or(DEFAULT_SENTINEL))];
        let call = match command {
            Commands::StartRecord { path: p } => Self::new(Operation::StartRecord.as_str(), path(p)),
            Commands::StopRecord => Self::new(Operation::StopRecord.as_str(), vec![]),
            Commands::StartPlay { path: p } => Self::new(Operation::StartPlay.as_str(), path(p)),
            Commands::Resume => Self::new(Operation::Resume.as_str(), vec![]),
            Commands::Pause => Self::new(Operation::PausePlay.as_str(), vec![]),
            Commands::Seek { seconds } => Self::new(Operation::SeekTo.as_str(), vec![json!(seconds)]),
            Commands::StopPlay => Self::new(Operation::StopPlay.as_str(), vec![]),
            Commands::Status => Self::new(METHOD_STATUS, vec![]),
            Commands::Daemon(_) | Commands::Listen { .. } | Commands::Config { .. } => {
                return None;
            }
        };
        Some(call)
    }

    /// Calls that may take a moment while the device opens
    fn is_slow(&self) -> bool {
        self.method == Operation::StartRecord.as_str() || self.method == Operation::StartPlay.as_str()
    }
}

async fn connect(socket: SocketPath) -> Result<impl BridgeConnection, ClientError> {
    let client = create_ipc_client(socket.clone());
    if !client.is_daemon_running() {
        return Err(ClientError::NotRunning(socket.path().display().to_string()));
    }
    Ok(client.connect().await?)
}

/// Send one request and print its settlement.
/// Resolved values go to stdout; rejections exit non-zero.
pub async fn run_call(call: BridgeCall, socket: SocketPath, presenter: &mut Presenter) -> ExitCode {
    let mut connection = match connect(socket).await {
        Ok(connection) => connection,
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    };

    if call.is_slow() {
        presenter.start_spinner(&format!("{}...", call.method));
    }
    debug!("Calling {} {:?}", call.method, call.args);
    let response = connection.call(call.method, call.args).await;
    presenter.stop_spinner();

    match response {
        Ok(response) => match response.outcome {
            Outcome::Resolved { value } => {
                presenter.output(&value);
                ExitCode::from(EXIT_SUCCESS)
            }
            Outcome::Rejected { code, message } => {
                presenter.rejection(&code, &message);
                ExitCode::from(EXIT_ERROR)
            }
        },
        Err(e) => {
            presenter.error(&ClientError::from(e).to_string());
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Subscribe to playback events and print them until Ctrl+C
pub async fn run_listen(json: bool, socket: SocketPath, presenter: &mut Presenter) -> ExitCode {
    match listen(json, socket, presenter).await {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            presenter.clear_playback();
            presenter.error(&e.to_string());
            ExitCode::from(EXIT_ERROR)
        }
    }
}

async fn listen(json: bool, socket: SocketPath, presenter: &mut Presenter) -> Result<(), ClientError> {
    let mut connection = connect(socket).await?;
    let response = connection.call(METHOD_SUBSCRIBE, vec![]).await?;
    if let Outcome::Rejected { code, message } = response.outcome {
        presenter.rejection(&code, &message);
        return Err(ClientError::Closed);
    }
    if !json {
        presenter.info("Listening for playback events (Ctrl+C to stop)");
    }

    loop {
        let message = tokio::select! {
            message = connection.next_message() => message?,
            _ = tokio::signal::ctrl_c() => {
                presenter.clear_playback();
                return Ok(());
            }
        };

        match message {
            Some(ServerMessage::Event(frame)) => {
                if json {
                    let line = ServerMessage::Event(frame)
                        .to_line()
                        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
                    presenter.output(&line);
                } else {
                    presenter.show_playback(&frame.payload);
                }
            }
            Some(ServerMessage::Response(_)) => {}
            None => return Err(ClientError::Closed),
        }
    }
}
