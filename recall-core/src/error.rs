//! Error types for recall.

use thiserror::Error;

/// Errors that can occur while loading a feed and laying out a week.
#[derive(Error, Debug)]
pub enum RecallError {
    #[error("Invalid date or date-time value: {0}")]
    InvalidTemporalInput(String),

    #[error("Event is missing required property {0}")]
    MissingProperty(String),

    #[error("Invalid recurrence rule: {0}")]
    Recurrence(String),

    #[error("Feed exceeds the limit of {max_lines} lines")]
    FeedTooLarge { max_lines: usize },

    #[error("ICS parse error: {0}")]
    FeedParse(String),

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("Could not fetch feed: {0}")]
    Fetch(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for recall operations.
pub type RecallResult<T> = Result<T, RecallError>;
