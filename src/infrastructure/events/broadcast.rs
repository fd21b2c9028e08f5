//! Fan-out emitter over a tokio broadcast channel
//!
//! Every connected listener gets its own receiver. Emitting with no
//! listener attached is not an error; the event is dropped.

use tokio::sync::broadcast;
use tracing::trace;

use crate::application::ports::EventEmitter;
use crate::domain::media::PlaybackEvent;

/// Buffered events per listener before a slow one starts lagging
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Named event as delivered to listeners
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedEvent {
    pub name: String,
    pub payload: PlaybackEvent,
}

#[derive(Debug, Clone)]
pub struct BroadcastEmitter {
    tx: broadcast::Sender<EmittedEvent>,
}

impl BroadcastEmitter {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EmittedEvent> {
        self.tx.subscribe()
    }

    pub fn listener_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for BroadcastEmitter {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl EventEmitter for BroadcastEmitter {
    fn emit(&self, name: &str, event: &PlaybackEvent) {
        let delivered = self
            .tx
            .send(EmittedEvent {
                name: name.to_string(),
                payload: *event,
            })
            .unwrap_or(0);
        trace!(
            "{} {}/{}ms -> {} listener(s)",
            name,
            event.current_position,
            event.duration,
            delivered
        );
    }
}
