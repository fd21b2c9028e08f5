//! Event emitter adapters

mod broadcast;

pub use broadcast::{BroadcastEmitter, EmittedEvent, DEFAULT_EVENT_CAPACITY};
