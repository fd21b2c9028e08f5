//! IPC (Inter-Process Communication) module for the bridge
//!
//! Unix Domain Sockets on Linux and macOS.

#[cfg(unix)]
mod unix_socket;

#[cfg(unix)]
pub use unix_socket::{SocketPath, UnixBridgeConnection, UnixSocketClient, UnixSocketServer};

use std::io;
use std::sync::Arc;

use serde_json::Value;

use super::bridge::BridgeHandler;
use super::protocol::{Response, ServerMessage};

/// Trait for IPC servers that expose the bridge
#[async_trait::async_trait]
pub trait IpcServer: Send + Sync {
    /// Bind to the IPC endpoint
    fn bind(&mut self) -> io::Result<()>;

    /// Get the path/name of the IPC endpoint
    fn path(&self) -> String;

    /// Accept connections and settle their requests with `handler`.
    /// Runs until the task is dropped.
    async fn run(&self, handler: Arc<dyn BridgeHandler>) -> io::Result<()>;

    /// Cleanup IPC resources
    fn cleanup(&self);
}

/// Client side of one bridge connection
#[async_trait::async_trait]
pub trait BridgeConnection: Send {
    /// Send a request; returns its id
    async fn send(&mut self, method: &str, args: Vec<Value>) -> io::Result<u64>;

    /// Next response or event; `None` once the daemon hangs up
    async fn next_message(&mut self) -> io::Result<Option<ServerMessage>>;

    /// Send a request and wait for its response, skipping events
    async fn call(&mut self, method: &str, args: Vec<Value>) -> io::Result<Response> {
        let id = self.send(method, args).await?;
        while let Some(message) = self.next_message().await? {
            if let ServerMessage::Response(response) = message {
                if response.id == id {
                    return Ok(response);
                }
            }
        }
        Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "Daemon closed the connection",
        ))
    }
}

/// Trait for IPC clients that talk to the daemon
#[async_trait::async_trait]
pub trait IpcClient: Send + Sync {
    type Connection: BridgeConnection;

    /// Check if daemon appears to be running (endpoint exists)
    fn is_daemon_running(&self) -> bool;

    async fn connect(&self) -> io::Result<Self::Connection>;
}

/// Create the IPC server for the current platform
#[cfg(unix)]
pub fn create_ipc_server(socket_path: SocketPath) -> UnixSocketServer {
    UnixSocketServer::new(socket_path)
}

/// Create the IPC client for the current platform
#[cfg(unix)]
pub fn create_ipc_client(socket_path: SocketPath) -> UnixSocketClient {
    UnixSocketClient::new(socket_path)
}
