//! Unix Domain Socket transport for the bridge
//!
//! Used on Linux and macOS.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{BridgeConnection, IpcClient, IpcServer};
use crate::cli::bridge::{BridgeHandler, Reply};
use crate::cli::protocol::{
    EventFrame, ProtocolError, Request, Response, ServerMessage, METHOD_SUBSCRIBE,
};
use crate::infrastructure::EmittedEvent;

const SOCKET_FILE: &str = "recplay.sock";

/// Socket path resolver
#[derive(Debug, Clone)]
pub struct SocketPath {
    path: PathBuf,
}

impl SocketPath {
    /// Create socket path, preferring XDG_RUNTIME_DIR
    pub fn new() -> Self {
        let path = std::env::var("XDG_RUNTIME_DIR")
            .map(|dir| PathBuf::from(dir).join(SOCKET_FILE))
            .unwrap_or_else(|_| std::env::temp_dir().join(SOCKET_FILE));
        Self { path }
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Configured path if set, the runtime-dir default otherwise
    pub fn from_config(configured: Option<&str>) -> Self {
        configured
            .filter(|p| !p.is_empty())
            .map(Self::with_path)
            .unwrap_or_default()
    }

    /// Get the socket path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if socket file exists
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Remove socket file if it exists
    pub fn cleanup(&self) -> io::Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

impl Default for SocketPath {
    fn default() -> Self {
        Self::new()
    }
}

/// Unix Domain Socket server for bridge requests
pub struct UnixSocketServer {
    socket_path: SocketPath,
    listener: Option<UnixListener>,
}

impl UnixSocketServer {
    pub fn new(socket_path: SocketPath) -> Self {
        Self {
            socket_path,
            listener: None,
        }
    }
}

impl Drop for UnixSocketServer {
    fn drop(&mut self) {
        self.cleanup();
    }
}

#[async_trait]
impl IpcServer for UnixSocketServer {
    fn bind(&mut self) -> io::Result<()> {
        // Remove stale socket file if it exists
        self.socket_path.cleanup()?;
        if let Some(parent) = self.socket_path.path().parent() {
            std::fs::create_dir_all(parent)?;
        }

        let listener = UnixListener::bind(self.socket_path.path())?;
        self.listener = Some(listener);
        Ok(())
    }

    fn path(&self) -> String {
        self.socket_path.path().to_string_lossy().to_string()
    }

    async fn run(&self, handler: Arc<dyn BridgeHandler>) -> io::Result<()> {
        let listener = self
            .listener
            .as_ref()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "Socket not bound"))?;

        loop {
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    let handler = Arc::clone(&handler);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, handler).await {
                            warn!("Socket connection error: {}", e);
                        }
                    });
                }
                Err(e) => {
                    warn!("Socket accept error: {}", e);
                }
            }
        }
    }

    fn cleanup(&self) {
        let _ = self.socket_path.cleanup();
    }
}

/// Serve one client.
///
/// Requests are dispatched one at a time in arrival order. Only the
/// preparation wait of a `startPlay` is settled off the read loop, so a
/// following `stopPlay` still gets through.
async fn handle_connection(stream: UnixStream, handler: Arc<dyn BridgeHandler>) -> io::Result<()> {
    let (reader, writer) = stream.into_split();
    let (out_tx, out_rx) = mpsc::unbounded_channel::<ServerMessage>();
    let writer_task = tokio::spawn(write_messages(writer, out_rx));

    let mut lines = BufReader::new(reader).lines();
    let mut forwarder: Option<JoinHandle<()>> = None;

    let served = serve_requests(&mut lines, handler.as_ref(), &out_tx, &mut forwarder).await;

    debug!("Bridge client finished sending");
    if let Some(forwarder) = forwarder.take() {
        forwarder.abort();
    }
    drop(out_tx);
    // Flush responses still in flight
    let _ = writer_task.await;
    served
}

async fn serve_requests(
    lines: &mut Lines<BufReader<OwnedReadHalf>>,
    handler: &dyn BridgeHandler,
    out_tx: &mpsc::UnboundedSender<ServerMessage>,
    forwarder: &mut Option<JoinHandle<()>>,
) -> io::Result<()> {
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let request = match Request::parse(line) {
            Ok(request) => request,
            Err(e) => {
                let response = Response::from_protocol_error(Request::salvage_id(line), &e);
                let _ = out_tx.send(ServerMessage::Response(response));
                continue;
            }
        };

        if request.method == METHOD_SUBSCRIBE && forwarder.is_none() {
            *forwarder = Some(tokio::spawn(forward_events(
                handler.subscribe(),
                out_tx.clone(),
            )));
        }

        match handler.dispatch(request).await {
            Reply::Now(response) => {
                let _ = out_tx.send(ServerMessage::Response(response));
            }
            later => {
                let out_tx = out_tx.clone();
                tokio::spawn(async move {
                    let response = later.settle().await;
                    let _ = out_tx.send(ServerMessage::Response(response));
                });
            }
        }
    }
    Ok(())
}

async fn write_messages(
    mut writer: OwnedWriteHalf,
    mut messages: mpsc::UnboundedReceiver<ServerMessage>,
) {
    while let Some(message) = messages.recv().await {
        let line = match message.to_line() {
            Ok(line) => line,
            Err(e) => {
                warn!("Failed to encode message: {}", e);
                continue;
            }
        };
        if writer.write_all(format!("{}\n", line).as_bytes()).await.is_err()
            || writer.flush().await.is_err()
        {
            break;
        }
    }
}

async fn forward_events(
    mut events: broadcast::Receiver<EmittedEvent>,
    out_tx: mpsc::UnboundedSender<ServerMessage>,
) {
    loop {
        match events.recv().await {
            Ok(event) => {
                let frame = ServerMessage::Event(EventFrame {
                    event: event.name,
                    payload: event.payload,
                });
                if out_tx.send(frame).is_err() {
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("Subscriber lagged, {} event(s) dropped", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// Open connection to the daemon
pub struct UnixBridgeConnection {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
    next_id: u64,
}

#[async_trait]
impl BridgeConnection for UnixBridgeConnection {
    async fn send(&mut self, method: &str, args: Vec<serde_json::Value>) -> io::Result<u64> {
        self.next_id += 1;
        let request = Request::new(self.next_id, method, args);
        let line = request.to_line().map_err(to_io)?;
        self.writer
            .write_all(format!("{}\n", line).as_bytes())
            .await?;
        self.writer.flush().await?;
        Ok(request.id)
    }

    async fn next_message(&mut self) -> io::Result<Option<ServerMessage>> {
        loop {
            let Some(line) = self.lines.next_line().await? else {
                return Ok(None);
            };
            if line.trim().is_empty() {
                continue;
            }
            return ServerMessage::parse(&line).map(Some).map_err(to_io);
        }
    }
}

fn to_io(e: ProtocolError) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, e)
}

/// Unix Domain Socket client for the bridge
pub struct UnixSocketClient {
    socket_path: SocketPath,
}

impl UnixSocketClient {
    pub fn new(socket_path: SocketPath) -> Self {
        Self { socket_path }
    }
}

#[async_trait]
impl IpcClient for UnixSocketClient {
    type Connection = UnixBridgeConnection;

    fn is_daemon_running(&self) -> bool {
        self.socket_path.exists()
    }

    async fn connect(&self) -> io::Result<UnixBridgeConnection> {
        let stream = UnixStream::connect(self.socket_path.path()).await?;
        let (reader, writer) = stream.into_split();
        Ok(UnixBridgeConnection {
            lines: BufReader::new(reader).lines(),
            writer,
            next_id: 0,
        })
    }
}
