//! Domain error types

use std::fmt;

use thiserror::Error;

/// Error when parsing a duration string
#[derive(Debug, Clone, Error)]
#[error("Invalid duration format: \"{input}\". Expected format: <number>s, <number>m, or <number>m<number>s (e.g., 30s, 1m, 2m30s)")]
pub struct DurationParseError {
    pub input: String,
}

/// Error when configuration fails
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    #[error("Invalid config value for '{key}': {message}")]
    ValidationError { key: String, message: String },

    #[error("Config file already exists at: {0}")]
    AlreadyExists(String),
}

/// Bridge operations. The wire name doubles as the rejection code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    StartRecord,
    StopRecord,
    StartPlay,
    Resume,
    PausePlay,
    SeekTo,
    StopPlay,
}

impl Operation {
    /// All operations, in protocol order
    pub const ALL: [Operation; 7] = [
        Self::StartRecord,
        Self::StopRecord,
        Self::StartPlay,
        Self::Resume,
        Self::PausePlay,
        Self::SeekTo,
        Self::StopPlay,
    ];

    /// Get the wire name of the operation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::StartRecord => "startRecord",
            Self::StopRecord => "stopRecord",
            Self::StartPlay => "startPlay",
            Self::Resume => "resume",
            Self::PausePlay => "pausePlay",
            Self::SeekTo => "seekTo",
            Self::StopPlay => "stopPlay",
        }
    }

    /// Look up an operation by wire name
    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == name)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Recorder-side rejection
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RecordError {
    pub operation: Operation,
    pub message: String,
}

impl RecordError {
    pub fn new(operation: Operation, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }
}

/// Player-side rejection
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct PlayError {
    pub operation: Operation,
    pub message: String,
}

impl PlayError {
    pub fn new(operation: Operation, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }
}

/// Rejection returned by every session operation.
///
/// `Display` is the message alone; the operation tag is available through
/// [`SessionError::code`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    Play(#[from] PlayError),
}

impl SessionError {
    /// The rejecting operation
    pub fn operation(&self) -> Operation {
        match self {
            Self::Record(e) => e.operation,
            Self::Play(e) => e.operation,
        }
    }

    /// Rejection code (the operation's wire name)
    pub fn code(&self) -> &'static str {
        self.operation().as_str()
    }

    /// The verbatim rejection message
    pub fn message(&self) -> &str {
        match self {
            Self::Record(e) => &e.message,
            Self::Play(e) => &e.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_wire_names() {
        assert_eq!(Operation::StartRecord.as_str(), "startRecord");
        assert_eq!(Operation::PausePlay.to_string(), "pausePlay");
        assert_eq!(Operation::from_wire("seekTo"), Some(Operation::SeekTo));
        assert_eq!(Operation::from_wire("seek_to"), None);
    }

    #[test]
    fn session_error_exposes_code_and_message() {
        let err: SessionError = PlayError::new(Operation::StopPlay, "mediaPlayer is null.").into();
        assert_eq!(err.code(), "stopPlay");
        assert_eq!(err.message(), "mediaPlayer is null.");
        assert_eq!(err.to_string(), "mediaPlayer is null.");
    }

    #[test]
    fn record_error_converts() {
        let err: SessionError = RecordError::new(Operation::StopRecord, "recorder is null.").into();
        assert!(matches!(err, SessionError::Record(_)));
        assert_eq!(err.operation(), Operation::StopRecord);
    }
}
