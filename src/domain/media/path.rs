//! Media path value object (sentinel resolution)

use std::fmt;
use std::path::{Path, PathBuf};

/// Reserved path value meaning "use the default file location"
pub const DEFAULT_SENTINEL: &str = "DEFAULT";

/// Prefix used for file URIs handed back to the host
pub const FILE_URI_PREFIX: &str = "file://";

/// A caller-supplied media path: either the sentinel or an explicit path.
///
/// Only the exact string `DEFAULT` is the sentinel; anything else,
/// including `default` or a blank string, is used verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaPath {
    Default,
    Explicit(String),
}

impl MediaPath {
    /// Classify a raw path argument
    pub fn parse(raw: &str) -> Self {
        if raw == DEFAULT_SENTINEL {
            Self::Default
        } else {
            Self::Explicit(raw.to_string())
        }
    }

    /// Check whether this is the sentinel
    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }

    /// Resolve to a filesystem path, given the configured default location
    pub fn resolve(&self, default_location: &Path) -> PathBuf {
        match self {
            Self::Default => default_location.to_path_buf(),
            Self::Explicit(path) => PathBuf::from(path),
        }
    }

    /// `file://` URI of the resolved path (what `startRecord` resolves with)
    pub fn file_uri(&self, default_location: &Path) -> String {
        file_uri(&self.resolve(default_location))
    }

    /// Value `startPlay` resolves with: a file URI for the sentinel,
    /// the caller's string untouched otherwise
    pub fn playback_value(&self, default_location: &Path) -> String {
        match self {
            Self::Default => file_uri(default_location),
            Self::Explicit(path) => path.clone(),
        }
    }
}

impl fmt::Display for MediaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "{}", DEFAULT_SENTINEL),
            Self::Explicit(path) => write!(f, "{}", path),
        }
    }
}

impl From<&str> for MediaPath {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

/// Build a `file://` URI for a path
pub fn file_uri(path: &Path) -> String {
    format!("{}{}", FILE_URI_PREFIX, path.display())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOCATION: &str = "/var/lib/recplay/sound.wav";

    #[test]
    fn sentinel_is_exact_match() {
        assert!(MediaPath::parse("DEFAULT").is_default());
        assert!(!MediaPath::parse("default").is_default());
        assert!(!MediaPath::parse(" DEFAULT").is_default());
        assert!(!MediaPath::parse("").is_default());
    }

    #[test]
    fn resolve_default_uses_location() {
        let path = MediaPath::parse("DEFAULT");
        assert_eq!(path.resolve(Path::new(LOCATION)), PathBuf::from(LOCATION));
    }

    #[test]
    fn resolve_explicit_is_verbatim() {
        let path = MediaPath::parse("/tmp/take 1.wav");
        assert_eq!(path.resolve(Path::new(LOCATION)), PathBuf::from("/tmp/take 1.wav"));
    }

    #[test]
    fn record_value_is_always_a_uri() {
        let location = Path::new(LOCATION);
        assert_eq!(
            MediaPath::parse("DEFAULT").file_uri(location),
            "file:///var/lib/recplay/sound.wav"
        );
        assert_eq!(MediaPath::parse("/tmp/a.wav").file_uri(location), "file:///tmp/a.wav");
    }

    #[test]
    fn playback_value_keeps_explicit_paths_untouched() {
        let location = Path::new(LOCATION);
        assert_eq!(
            MediaPath::parse("DEFAULT").playback_value(location),
            "file:///var/lib/recplay/sound.wav"
        );
        assert_eq!(MediaPath::parse("/tmp/a.wav").playback_value(location), "/tmp/a.wav");
    }

    #[test]
    fn display_round_trips_raw_value() {
        assert_eq!(MediaPath::parse("DEFAULT").to_string(), "DEFAULT");
        assert_eq!(MediaPath::parse("x.wav").to_string(), "x.wav");
    }
}
