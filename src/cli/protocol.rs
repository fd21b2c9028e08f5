//! Line-delimited JSON protocol spoken over the bridge socket
//!
//! ```text
//! -> {"id":1,"method":"startPlay","args":["DEFAULT"]}
//! <- {"id":1,"status":"resolved","value":"file:///.../sound.wav"}
//! <- {"event":"rn-playback","payload":{"duration":5000,"current_position":1000}}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::domain::error::{Operation, SessionError};
use crate::domain::media::{PlaybackEvent, DEFAULT_SENTINEL};

/// Rejection code for failures of the bridge itself
pub const BRIDGE_CODE: &str = "bridge";

pub const METHOD_SUBSCRIBE: &str = "subscribe";
pub const METHOD_STATUS: &str = "status";
pub const SUBSCRIBED: &str = "subscribed";

/// Errors decoding or interpreting a request line
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Malformed request: {0}")]
    Malformed(String),

    #[error("Unknown method: {0}")]
    UnknownMethod(String),

    #[error("Invalid argument for {method}: {message}")]
    InvalidArgument { method: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub id: u64,
    pub method: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Value>,
}

impl Request {
    pub fn new(id: u64, method: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            id,
            method: method.into(),
            args,
        }
    }

    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(line).map_err(|e| ProtocolError::Malformed(e.to_string()))
    }

    /// Best-effort id of a line that failed to parse, so the rejection can
    /// still be correlated
    pub fn salvage_id(line: &str) -> u64 {
        serde_json::from_str::<Value>(line)
            .ok()
            .and_then(|v| v.get("id").and_then(Value::as_u64))
            .unwrap_or(0)
    }

    pub fn to_line(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(|e| ProtocolError::Malformed(e.to_string()))
    }
}

/// Decoded request ready for dispatch
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    StartRecord(String),
    StopRecord,
    StartPlay(String),
    Resume,
    PausePlay,
    SeekTo(i64),
    StopPlay,
    Status,
    Subscribe,
}

impl Command {
    /// Interpret a request. A missing path argument means `DEFAULT`.
    pub fn from_request(request: &Request) -> Result<Self, ProtocolError> {
        match request.method.as_str() {
            METHOD_SUBSCRIBE => return Ok(Self::Subscribe),
            METHOD_STATUS => return Ok(Self::Status),
            _ => {}
        }

        let operation = Operation::from_wire(&request.method)
            .ok_or_else(|| ProtocolError::UnknownMethod(request.method.clone()))?;

        let command = match operation {
            Operation::StartRecord => Self::StartRecord(path_arg(request)?),
            Operation::StopRecord => Self::StopRecord,
            Operation::StartPlay => Self::StartPlay(path_arg(request)?),
            Operation::Resume => Self::Resume,
            Operation::PausePlay => Self::PausePlay,
            Operation::SeekTo => Self::SeekTo(seconds_arg(request)?),
            Operation::StopPlay => Self::StopPlay,
        };
        Ok(command)
    }
}

fn invalid(request: &Request, message: impl Into<String>) -> ProtocolError {
    ProtocolError::InvalidArgument {
        method: request.method.clone(),
        message: message.into(),
    }
}

fn path_arg(request: &Request) -> Result<String, ProtocolError> {
    match request.args.first() {
        None | Some(Value::Null) => Ok(DEFAULT_SENTINEL.to_string()),
        Some(Value::String(path)) => Ok(path.clone()),
        Some(other) => Err(invalid(request, format!("expected a path, got {}", other))),
    }
}

fn seconds_arg(request: &Request) -> Result<i64, ProtocolError> {
    let value = request
        .args
        .first()
        .ok_or_else(|| invalid(request, "missing seconds"))?;
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f.trunc() as i64))
        .ok_or_else(|| invalid(request, format!("expected seconds, got {}", value)))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    Resolved { value: String },
    Rejected { code: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub id: u64,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl Response {
    pub fn resolved(id: u64, value: impl Into<String>) -> Self {
        Self {
            id,
            outcome: Outcome::Resolved {
                value: value.into(),
            },
        }
    }

    pub fn rejected(id: u64, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id,
            outcome: Outcome::Rejected {
                code: code.into(),
                message: message.into(),
            },
        }
    }

    pub fn from_session(id: u64, result: Result<String, SessionError>) -> Self {
        match result {
            Ok(value) => Self::resolved(id, value),
            Err(e) => Self::rejected(id, e.code(), e.message()),
        }
    }

    pub fn from_protocol_error(id: u64, error: &ProtocolError) -> Self {
        Self::rejected(id, BRIDGE_CODE, error.to_string())
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.outcome, Outcome::Resolved { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventFrame {
    pub event: String,
    pub payload: PlaybackEvent,
}

/// Anything the daemon writes to a connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServerMessage {
    Response(Response),
    Event(EventFrame),
}

impl ServerMessage {
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(line).map_err(|e| ProtocolError::Malformed(e.to_string()))
    }

    pub fn to_line(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(|e| ProtocolError::Malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(method: &str, args: Vec<Value>) -> Request {
        Request::new(7, method, args)
    }

    #[test]
    fn start_play_defaults_to_sentinel() {
        let command = Command::from_request(&request("startPlay", vec![])).unwrap();
        assert_eq!(command, Command::StartPlay("DEFAULT".to_string()));
    }

    #[test]
    fn start_record_takes_path() {
        let command =
            Command::from_request(&request("startRecord", vec![json!("/tmp/a.wav")])).unwrap();
        assert_eq!(command, Command::StartRecord("/tmp/a.wav".to_string()));
    }

    #[test]
    fn seek_accepts_integers_and_floats() {
        assert_eq!(
            Command::from_request(&request("seekTo", vec![json!(5)])).unwrap(),
            Command::SeekTo(5)
        );
        assert_eq!(
            Command::from_request(&request("seekTo", vec![json!(2.9)])).unwrap(),
            Command::SeekTo(2)
        );
        assert!(Command::from_request(&request("seekTo", vec![])).is_err());
        assert!(Command::from_request(&request("seekTo", vec![json!("soon")])).is_err());
    }

    #[test]
    fn unknown_method_is_rejected() {
        let err = Command::from_request(&request("explode", vec![])).unwrap_err();
        assert!(matches!(err, ProtocolError::UnknownMethod(_)));
        let response = Response::from_protocol_error(7, &err);
        assert_eq!(
            serde_json::to_value(response).unwrap(),
            json!({"id": 7, "status": "rejected", "code": "bridge", "message": "Unknown method: explode"})
        );
    }

    #[test]
    fn resolved_response_shape() {
        let line = ServerMessage::Response(Response::resolved(1, "stopped player"))
            .to_line()
            .unwrap();
        assert_eq!(line, r#"{"id":1,"status":"resolved","value":"stopped player"}"#);
    }

    #[test]
    fn event_frame_shape() {
        let frame = ServerMessage::Event(EventFrame {
            event: "rn-playback".to_string(),
            payload: PlaybackEvent::finished(5000),
        });
        assert_eq!(
            serde_json::to_value(&frame).unwrap(),
            json!({"event": "rn-playback", "payload": {"duration": 5000, "current_position": 5000, "justFinished": 1}})
        );
    }

    #[test]
    fn server_messages_parse_back() {
        let rejected =
            ServerMessage::parse(r#"{"id":2,"status":"rejected","code":"stopRecord","message":"recorder is null."}"#)
                .unwrap();
        assert_eq!(
            rejected,
            ServerMessage::Response(Response::rejected(2, "stopRecord", "recorder is null."))
        );

        let event = ServerMessage::parse(
            r#"{"event":"rn-playback","payload":{"duration":5000,"current_position":1000}}"#,
        )
        .unwrap();
        assert!(matches!(event, ServerMessage::Event(frame) if frame.payload.current_position == 1000));
    }

    #[test]
    fn salvage_id_from_bad_request() {
        assert_eq!(Request::salvage_id(r#"{"id":9,"method":3}"#), 9);
        assert_eq!(Request::salvage_id("not json"), 0);
    }
}
