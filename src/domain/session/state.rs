//! Recorder and player lifecycle states

use std::fmt;

/// Recorder handle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RecorderState {
    #[default]
    Absent,
    Active,
}

impl RecorderState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Active => "active",
        }
    }
}

impl fmt::Display for RecorderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Player handle state.
///
/// State machine:
///   ABSENT -> PREPARING (start_play)
///   PREPARING -> PLAYING (preparation completed)
///   PREPARING -> ABSENT (preparation failed, stop_play)
///   PLAYING <-> PAUSED (pause_play / resume, start_play while paused)
///   PLAYING | PAUSED -> ABSENT (stop_play, natural completion)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlayerState {
    #[default]
    Absent,
    Preparing,
    Playing,
    Paused,
}

impl PlayerState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Preparing => "preparing",
            Self::Playing => "playing",
            Self::Paused => "paused",
        }
    }

    /// A handle exists in this state
    pub const fn has_handle(&self) -> bool {
        !matches!(self, Self::Absent)
    }
}

impl fmt::Display for PlayerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Snapshot of both handles, reported by the bridge `status` request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionStatus {
    pub recorder: RecorderState,
    pub player: PlayerState,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "recorder={} player={}", self.recorder, self.player)
    }
}
