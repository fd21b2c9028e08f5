//! Bridge dispatcher: maps protocol requests onto the session controller

use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::application::ports::MediaBackend;
use crate::application::{MediaSessionController, PlayStart};
use crate::domain::config::SessionSettings;
use crate::domain::error::Operation;
use crate::infrastructure::{BroadcastEmitter, EmittedEvent};

use super::protocol::{Command, Request, Response, SUBSCRIBED};

/// Answer to one request: settled in place, or still waiting on a
/// background task
#[derive(Debug)]
pub enum Reply {
    Now(Response),
    Later { id: u64, task: JoinHandle<Response> },
}

impl Reply {
    /// Wait for the response, however it is delivered
    pub async fn settle(self) -> Response {
        match self {
            Reply::Now(response) => response,
            Reply::Later { id, task } => task.await.unwrap_or_else(|e| {
                Response::rejected(id, Operation::StartPlay.as_str(), e.to_string())
            }),
        }
    }
}

/// Request handler seen by the IPC server
#[async_trait]
pub trait BridgeHandler: Send + Sync {
    /// Run one request up to the point where it would wait on a device.
    ///
    /// Requests on one connection are dispatched strictly in order.
    async fn dispatch(&self, request: Request) -> Reply;

    /// Settle one request
    async fn handle(&self, request: Request) -> Response {
        self.dispatch(request).await.settle().await
    }

    /// New receiver for emitted events
    fn subscribe(&self) -> broadcast::Receiver<EmittedEvent>;
}

/// Session controller exposed over the bridge
pub struct Bridge<B> {
    controller: MediaSessionController<B, BroadcastEmitter>,
    events: BroadcastEmitter,
}

impl<B: MediaBackend> Bridge<B> {
    pub fn new(backend: B, settings: SessionSettings) -> Self {
        let events = BroadcastEmitter::default();
        Self {
            controller: MediaSessionController::new(backend, events.clone(), settings),
            events,
        }
    }

    pub fn controller(&self) -> &MediaSessionController<B, BroadcastEmitter> {
        &self.controller
    }

    async fn run(&self, id: u64, command: Command) -> Reply {
        let result = match command {
            Command::StartRecord(path) => self.controller.start_record(&path).await,
            Command::StopRecord => self.controller.stop_record().await,
            Command::StartPlay(path) => match self.controller.begin_play(&path).await {
                Ok(PlayStart::Resumed(value)) => Ok(value),
                Ok(PlayStart::Preparing(pending)) => {
                    let task = tokio::spawn(async move {
                        Response::from_session(id, pending.finish().await)
                    });
                    return Reply::Later { id, task };
                }
                Err(e) => Err(e),
            },
            Command::Resume => self.controller.resume().await,
            Command::PausePlay => self.controller.pause_play().await,
            Command::SeekTo(seconds) => self.controller.seek_to(seconds).await,
            Command::StopPlay => self.controller.stop_play().await,
            Command::Status => Ok(self.controller.status().await.to_string()),
            Command::Subscribe => Ok(SUBSCRIBED.to_string()),
        };
        Reply::Now(Response::from_session(id, result))
    }
}

#[async_trait]
impl<B: MediaBackend> BridgeHandler for Bridge<B> {
    async fn dispatch(&self, request: Request) -> Reply {
        let command = match Command::from_request(&request) {
            Ok(command) => command,
            Err(e) => {
                warn!("Rejecting request {}: {}", request.id, e);
                return Reply::Now(Response::from_protocol_error(request.id, &e));
            }
        };
        debug!("Request {}: {:?}", request.id, command);
        self.run(request.id, command).await
    }

    fn subscribe(&self) -> broadcast::Receiver<EmittedEvent> {
        self.events.subscribe()
    }
}
