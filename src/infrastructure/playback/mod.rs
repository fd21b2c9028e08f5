//! Playback infrastructure module
//!
//! Decodes WAV/MP3/FLAC/Vorbis sources with rodio and plays them on the
//! default output device.

mod rodio_player;

pub use rodio_player::RodioPlayer;
