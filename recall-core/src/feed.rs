//! Fetching a feed and turning it into a finished week view.
//!
//! The feed is read through a [`LineBoundedBuffer`], so a hostile or endless
//! body is abandoned as soon as it crosses the line ceiling and no parsing
//! happens in that case.

use std::io::BufRead;
use std::path::Path;
use std::time::Duration;

use chrono::NaiveDate;
use chrono_tz::Tz;
use icalendar::parser::{Calendar, read_calendar, unfold};

use crate::constants::{DEFAULT_TIMEOUT_SECS, MAX_BYTES_PER_LINE, MAX_LINES};
use crate::error::{RecallError, RecallResult};
use crate::overlap;
use crate::ruler::Ruler;
use crate::time::parse_timezone;
use crate::week::Week;

/// Tunables for [`FeedLoader`].
#[derive(Debug, Clone)]
pub struct FeedOptions {
    pub max_lines: usize,
    pub timeout: Duration,
}

impl Default for FeedOptions {
    fn default() -> Self {
        FeedOptions {
            max_lines: MAX_LINES,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Outcome of a bounded read.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundedText {
    Complete(String),
    OverLimit { max_lines: usize },
}

impl BoundedText {
    pub fn into_text(self) -> RecallResult<String> {
        match self {
            BoundedText::Complete(text) => Ok(text),
            BoundedText::OverLimit { max_lines } => Err(RecallError::FeedTooLarge { max_lines }),
        }
    }
}

/// Accumulates raw bytes while counting lines, refusing anything past `max_lines`
/// or past `max_lines * MAX_BYTES_PER_LINE` bytes.
#[derive(Debug)]
pub struct LineBoundedBuffer {
    max_lines: usize,
    max_bytes: usize,
    bytes: Vec<u8>,
    newlines: usize,
}

impl LineBoundedBuffer {
    pub fn new(max_lines: usize) -> Self {
        LineBoundedBuffer {
            max_lines,
            max_bytes: max_lines.saturating_mul(MAX_BYTES_PER_LINE),
            bytes: Vec::new(),
            newlines: 0,
        }
    }

    /// Append a chunk. Returns `false` once the ceiling has been crossed;
    /// the caller should stop reading then.
    pub fn push(&mut self, chunk: &[u8]) -> bool {
        if self.is_over_limit() {
            return false;
        }

        self.newlines += chunk.iter().filter(|&&b| b == b'\n').count();
        self.bytes.extend_from_slice(chunk);

        !self.is_over_limit()
    }

    /// Lines seen so far, counting an unterminated last line.
    pub fn lines(&self) -> usize {
        let partial = self.bytes.last().is_some_and(|&b| b != b'\n');
        self.newlines + usize::from(partial)
    }

    fn is_over_limit(&self) -> bool {
        self.lines() > self.max_lines || self.bytes.len() > self.max_bytes
    }

    pub fn finish(self) -> BoundedText {
        if self.is_over_limit() {
            BoundedText::OverLimit {
                max_lines: self.max_lines,
            }
        } else {
            BoundedText::Complete(String::from_utf8_lossy(&self.bytes).into_owned())
        }
    }
}

/// Read `reader` to the end or until it exceeds `max_lines`, whichever comes first.
pub fn read_bounded<R: BufRead>(mut reader: R, max_lines: usize) -> RecallResult<BoundedText> {
    let mut buffer = LineBoundedBuffer::new(max_lines);

    loop {
        let chunk = reader.fill_buf()?;
        if chunk.is_empty() {
            break;
        }
        let len = chunk.len();
        let within = buffer.push(chunk);
        reader.consume(len);

        if !within {
            break;
        }
    }

    Ok(buffer.finish())
}

/// The hour ruler together with a laid-out week.
#[derive(Debug, Clone)]
pub struct WeekView {
    pub ruler: Ruler,
    pub week: Week,
}

/// Loads a feed and lays out one week of it.
pub struct FeedLoader {
    options: FeedOptions,
    http: reqwest::Client,
}

impl FeedLoader {
    pub fn new(options: FeedOptions) -> RecallResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("recall/", env!("CARGO_PKG_VERSION")))
            .timeout(options.timeout)
            .build()
            .map_err(|e| RecallError::Fetch(e.to_string()))?;

        Ok(FeedLoader { options, http })
    }

    pub fn options(&self) -> &FeedOptions {
        &self.options
    }

    /// Fetch `url` and lay out the week starting at `start`.
    ///
    /// `tz_override` must be an IANA name when given; otherwise the feed's
    /// X-WR-TIMEZONE is used, falling back to UTC.
    pub async fn load(
        &self,
        url: &str,
        start: NaiveDate,
        tz_override: Option<&str>,
    ) -> RecallResult<WeekView> {
        let tz = tz_override.map(parse_timezone).transpose()?;
        let text = self.fetch(url).await?;
        build_view(&text, start, tz)
    }

    /// Same as [`Self::load`] for a feed stored on disk.
    pub fn load_file(
        &self,
        path: &Path,
        start: NaiveDate,
        tz_override: Option<&str>,
    ) -> RecallResult<WeekView> {
        let tz = tz_override.map(parse_timezone).transpose()?;
        let file = std::fs::File::open(path)?;
        let text = read_bounded(std::io::BufReader::new(file), self.options.max_lines)?.into_text()?;
        build_view(&text, start, tz)
    }

    async fn fetch(&self, url: &str) -> RecallResult<String> {
        let url = match url.strip_prefix("webcal://") {
            Some(rest) => format!("https://{rest}"),
            None => url.to_string(),
        };

        let mut response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| RecallError::Fetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(RecallError::Fetch(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        let mut buffer = LineBoundedBuffer::new(self.options.max_lines);
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| RecallError::Fetch(e.to_string()))?
        {
            if !buffer.push(&chunk) {
                tracing::warn!(url = %url, max_lines = self.options.max_lines, "Feed too large, aborting download");
                break;
            }
        }

        buffer.finish().into_text()
    }
}

/// Parse feed text and lay out the week starting at `start`.
pub fn build_view(text: &str, start: NaiveDate, tz: Option<Tz>) -> RecallResult<WeekView> {
    Ok(WeekView {
        ruler: Ruler::new(),
        week: build_week(text, start, tz)?,
    })
}

/// Parse feed text, add every VEVENT to a week in `tz` (or the feed's own
/// zone), then resolve overlaps.
pub fn build_week(text: &str, start: NaiveDate, tz: Option<Tz>) -> RecallResult<Week> {
    let unfolded = unfold(text);
    let calendar = read_calendar(&unfolded).map_err(|e| RecallError::FeedParse(e.to_string()))?;

    if calendar.properties.is_empty() && calendar.components.is_empty() {
        return Err(RecallError::FeedParse("no calendar data".to_string()));
    }

    let tz = tz.unwrap_or_else(|| calendar_timezone(&calendar));
    let mut week = Week::new(start, tz)?;

    for vevent in calendar.components.iter().filter(|c| c.name == "VEVENT") {
        week.add_event(vevent)?;
    }

    overlap::resolve(&mut week);

    tracing::info!(
        start = %start,
        timezone = %tz,
        events = week.events().len(),
        rows = week.days().iter().map(|d| d.rows.len()).sum::<usize>(),
        "Week laid out"
    );

    Ok(week)
}

/// The feed's declared default timezone, or UTC.
fn calendar_timezone(calendar: &Calendar) -> Tz {
    let declared = calendar
        .properties
        .iter()
        .find(|p| p.name == "X-WR-TIMEZONE")
        .map(|p| p.val.to_string());

    match declared.as_deref().map(parse_timezone) {
        Some(Ok(tz)) => tz,
        Some(Err(_)) => {
            tracing::debug!(declared = ?declared, "Unrecognized X-WR-TIMEZONE, using UTC");
            Tz::UTC
        }
        None => Tz::UTC,
    }
}
