//! Media value objects

mod path;
mod playback_event;

pub use path::{file_uri, MediaPath, DEFAULT_SENTINEL, FILE_URI_PREFIX};
pub use playback_event::{PlaybackEvent, PLAYBACK_EVENT};
