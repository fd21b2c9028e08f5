//! Recplay - audio record/playback session bridge
//!
//! A long-running daemon owns at most one recorder and one player and
//! exposes seven operations (`startRecord`, `stopRecord`, `startPlay`,
//! `resume`, `pausePlay`, `seekTo`, `stopPlay`) over a line-delimited JSON
//! socket. While a player exists, an `rn-playback` event carrying duration
//! and position is pushed to subscribers once per second.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Media paths, playback events, session state, config and errors
//! - **Application**: The session controller and port interfaces (traits)
//! - **Infrastructure**: Adapter implementations (cpal, hound, rodio, XDG config)
//! - **CLI**: Argument parsing, the bridge protocol, socket transport and signal handling

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
