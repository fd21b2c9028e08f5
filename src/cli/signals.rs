//! Signal handling for daemon mode

use std::fmt;

use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tracing::info;

/// OS signals that end the daemon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonSignal {
    /// SIGINT (Ctrl+C)
    Interrupt,
    /// SIGTERM
    Terminate,
}

impl DaemonSignal {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Interrupt => "SIGINT",
            Self::Terminate => "SIGTERM",
        }
    }
}

impl fmt::Display for DaemonSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Daemon signal handler
///
/// Listens for SIGINT/SIGTERM and delivers them as [`DaemonSignal`]s.
pub struct DaemonSignalHandler {
    receiver: mpsc::Receiver<DaemonSignal>,
}

impl DaemonSignalHandler {
    /// Create a handler and start listening for shutdown signals
    pub fn new() -> Result<Self, std::io::Error> {
        let (tx, rx) = mpsc::channel(4);

        for (kind, daemon_signal) in [
            (SignalKind::interrupt(), DaemonSignal::Interrupt),
            (SignalKind::terminate(), DaemonSignal::Terminate),
        ] {
            let mut stream = signal(kind)?;
            let tx = tx.clone();
            tokio::spawn(async move {
                while stream.recv().await.is_some() {
                    info!("Received {} (shutdown)", daemon_signal);
                    if tx.send(daemon_signal).await.is_err() {
                        break;
                    }
                }
            });
        }

        Ok(Self { receiver: rx })
    }

    /// Wait for the next signal
    pub async fn recv(&mut self) -> Option<DaemonSignal> {
        self.receiver.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn daemon_signal_names() {
        assert_eq!(DaemonSignal::Interrupt.to_string(), "SIGINT");
        assert_eq!(DaemonSignal::Terminate.to_string(), "SIGTERM");
    }

    #[tokio::test]
    async fn handler_installs() {
        assert!(DaemonSignalHandler::new().is_ok());
    }
}
