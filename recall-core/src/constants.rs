/// Converts minutes into ruler (display) units.
pub const HEIGHT_RATIO: f64 = 0.05;

/// Unfilled portion at the bottom of each block, in minutes.
pub const SPACER_MINUTES: f64 = 1.0;

/// Feeds longer than this many lines are rejected.
pub const MAX_LINES: usize = 2048;

/// Byte allowance per permitted line, so a body without newlines is bounded too.
pub const MAX_BYTES_PER_LINE: usize = 4096;

/// Request-level timeout for feed downloads.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const DAYS_IN_WEEK: i64 = 7;

pub const SECONDS_PER_DAY: i64 = 86_400;
