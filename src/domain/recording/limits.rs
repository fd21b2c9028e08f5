//! Recording limit value objects

use std::fmt;
use std::str::FromStr;
use std::time::Duration as StdDuration;

use thiserror::Error;

use crate::domain::error::DurationParseError;

/// Value object representing a recording time limit.
/// Parsed from "30s", "1m", "2m30s"; never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Duration {
    milliseconds: u64,
}

impl Duration {
    pub const fn from_millis(ms: u64) -> Self {
        Self { milliseconds: ms }
    }

    pub const fn from_secs(secs: u64) -> Self {
        Self {
            milliseconds: secs * 1000,
        }
    }

    pub const fn as_secs(&self) -> u64 {
        self.milliseconds / 1000
    }

    pub const fn as_millis(&self) -> u64 {
        self.milliseconds
    }

    pub const fn as_std(&self) -> StdDuration {
        StdDuration::from_millis(self.milliseconds)
    }
}

impl FromStr for Duration {
    type Err = DurationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DurationParseError {
            input: s.to_string(),
        };
        let input = s.trim().to_ascii_lowercase();

        // "2m30s" -> ("2", "30s"); "45s" -> no minutes part
        let (minutes, rest) = match input.split_once('m') {
            Some((m, rest)) => (parse_component(m).ok_or_else(invalid)?, rest),
            None => (0, input.as_str()),
        };

        let seconds = if rest.is_empty() {
            0
        } else {
            let digits = rest.strip_suffix('s').ok_or_else(invalid)?;
            parse_component(digits).ok_or_else(invalid)?
        };

        if input.is_empty() || (minutes == 0 && seconds == 0) {
            return Err(invalid());
        }

        Ok(Self::from_secs(minutes * 60 + seconds))
    }
}

fn parse_component(digits: &str) -> Option<u64> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let minutes = self.as_secs() / 60;
        let seconds = self.as_secs() % 60;

        match (minutes, seconds) {
            (0, s) => write!(f, "{}s", s),
            (m, 0) => write!(f, "{}m", m),
            (m, s) => write!(f, "{}m{}s", m, s),
        }
    }
}

/// Error when parsing a file size string
#[derive(Debug, Clone, Error)]
#[error("Invalid file size: \"{input}\". Expected bytes or a KB/MB/GB suffix (e.g., 4096, 512KB, 10MB)")]
pub struct FileSizeParseError {
    pub input: String,
}

/// Value object representing a recording size limit in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FileSize {
    bytes: u64,
}

impl FileSize {
    pub const fn from_bytes(bytes: u64) -> Self {
        Self { bytes }
    }

    pub const fn as_bytes(&self) -> u64 {
        self.bytes
    }
}

impl FromStr for FileSize {
    type Err = FileSizeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || FileSizeParseError {
            input: s.to_string(),
        };
        let input = s.trim().to_ascii_uppercase();

        let (digits, multiplier) = [("GB", 1u64 << 30), ("MB", 1 << 20), ("KB", 1 << 10), ("B", 1)]
            .into_iter()
            .find_map(|(suffix, mult)| input.strip_suffix(suffix).map(|d| (d.trim(), mult)))
            .unwrap_or((input.as_str(), 1));

        let value = parse_component(digits).ok_or_else(invalid)?;
        let bytes = value.checked_mul(multiplier).ok_or_else(invalid)?;
        if bytes == 0 {
            return Err(invalid());
        }

        Ok(Self { bytes })
    }
}

impl fmt::Display for FileSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.bytes;
        if b >= 1 << 30 && b % (1 << 30) == 0 {
            write!(f, "{}GB", b >> 30)
        } else if b >= 1 << 20 && b % (1 << 20) == 0 {
            write!(f, "{}MB", b >> 20)
        } else if b >= 1 << 10 && b % (1 << 10) == 0 {
            write!(f, "{}KB", b >> 10)
        } else {
            write!(f, "{}", b)
        }
    }
}
