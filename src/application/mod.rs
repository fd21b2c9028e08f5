//! Application layer - Use cases and port interfaces
//!
//! Contains the media session controller and the trait definitions
//! for the native audio stack it drives.

pub mod controller;
pub mod ports;

// Re-export use cases
pub use controller::{MediaSessionController, PendingPlay, PlayStart};
