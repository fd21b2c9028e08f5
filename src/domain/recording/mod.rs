//! Recording value objects

mod limits;

pub use limits::{Duration, FileSize, FileSizeParseError};
