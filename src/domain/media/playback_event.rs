//! Playback progress event payload

use serde::{Deserialize, Serialize};

/// Name of the event channel playback progress is pushed to
pub const PLAYBACK_EVENT: &str = "rn-playback";

/// Progress notification emitted about once a second during playback,
/// and once more with `justFinished = 1` when playback completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackEvent {
    /// Total length of the source in milliseconds
    pub duration: u64,
    /// Playback position in milliseconds
    pub current_position: u64,
    #[serde(
        rename = "justFinished",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub just_finished: Option<u8>,
}

impl PlaybackEvent {
    /// Periodic progress update
    pub fn progress(duration: u64, current_position: u64) -> Self {
        Self {
            duration,
            current_position,
            just_finished: None,
        }
    }

    /// Final event: position pinned to the duration
    pub fn finished(duration: u64) -> Self {
        Self {
            duration,
            current_position: duration,
            just_finished: Some(1),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.just_finished == Some(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_omits_just_finished() {
        let json = serde_json::to_value(PlaybackEvent::progress(5000, 1000)).unwrap();
        assert_eq!(json, serde_json::json!({"duration": 5000, "current_position": 1000}));
    }

    #[test]
    fn finished_pins_position_to_duration() {
        let event = PlaybackEvent::finished(4200);
        assert!(event.is_finished());
        let json = serde_json::to_value(event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"duration": 4200, "current_position": 4200, "justFinished": 1})
        );
    }

    #[test]
    fn parses_host_payload() {
        let event: PlaybackEvent =
            serde_json::from_str(r#"{"duration":10,"current_position":3}"#).unwrap();
        assert_eq!(event, PlaybackEvent::progress(10, 3));
    }
}
