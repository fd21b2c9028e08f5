//! Recording infrastructure module
//!
//! Captures the default microphone with cpal and writes 16-bit PCM WAV.

mod cpal_recorder;

pub use cpal_recorder::CpalRecorder;
