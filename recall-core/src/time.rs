//! Normalization of iCalendar date and date-time values into one target timezone.
//!
//! Every instant that is later compared (occurrences, window bounds, day
//! midnights) goes through [`normalize`] exactly once, at ingestion.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use icalendar::{CalendarDateTime, DatePerhapsTime};

use crate::error::{RecallError, RecallResult};

/// A date or date-time as it appears in a calendar, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum TemporalValue {
    /// All-day value (VALUE=DATE)
    Date(NaiveDate),
    /// UTC time (trailing `Z`)
    Utc(DateTime<Utc>),
    /// Floating time, no zone attached
    Floating(NaiveDateTime),
    /// Wall-clock time in a named zone (TZID parameter)
    Zoned { datetime: NaiveDateTime, tzid: String },
}

impl TemporalValue {
    /// Parse a bare ICS value such as `20240105`, `20240105T100000` or `20240105T100000Z`.
    pub fn from_ics_str(s: &str) -> RecallResult<Self> {
        let s = s.trim();

        if let Some(utc) = s.strip_suffix('Z') {
            return NaiveDateTime::parse_from_str(utc, "%Y%m%dT%H%M%S")
                .map(|dt| TemporalValue::Utc(dt.and_utc()))
                .map_err(|_| RecallError::InvalidTemporalInput(s.to_string()));
        }

        if s.contains('T') {
            return NaiveDateTime::parse_from_str(s, "%Y%m%dT%H%M%S")
                .map(TemporalValue::Floating)
                .map_err(|_| RecallError::InvalidTemporalInput(s.to_string()));
        }

        NaiveDate::parse_from_str(s, "%Y%m%d")
            .map(TemporalValue::Date)
            .map_err(|_| RecallError::InvalidTemporalInput(s.to_string()))
    }

    pub fn is_date(&self) -> bool {
        matches!(self, TemporalValue::Date(_))
    }
}

impl From<DatePerhapsTime> for TemporalValue {
    fn from(dpt: DatePerhapsTime) -> Self {
        match dpt {
            DatePerhapsTime::Date(d) => TemporalValue::Date(d),
            DatePerhapsTime::DateTime(cal_dt) => match cal_dt {
                CalendarDateTime::Utc(dt) => TemporalValue::Utc(dt),
                CalendarDateTime::Floating(naive) => TemporalValue::Floating(naive),
                CalendarDateTime::WithTimezone { date_time, tzid } => TemporalValue::Zoned {
                    datetime: date_time,
                    tzid,
                },
            },
        }
    }
}

/// Convert a calendar value into an instant in `tz`.
///
/// Zone-aware values are converted. Floating values and dates are interpreted
/// as wall-clock time in `tz`; a date becomes midnight of that day.
pub fn normalize(value: &TemporalValue, tz: Tz) -> RecallResult<DateTime<Tz>> {
    let instant = match value {
        TemporalValue::Date(d) => localize(d.and_time(NaiveTime::default()), tz),
        TemporalValue::Utc(dt) => dt.with_timezone(&tz),
        TemporalValue::Floating(naive) => localize(*naive, tz),
        TemporalValue::Zoned { datetime, tzid } => match tzid.parse::<Tz>() {
            Ok(source) => localize(*datetime, source).with_timezone(&tz),
            Err(_) => {
                tracing::warn!(tzid = %tzid, target = %tz, "Unknown TZID, reading as target timezone");
                localize(*datetime, tz)
            }
        },
    };

    Ok(instant)
}

/// Parse an ICS value and normalize it in one step.
pub fn normalize_str(s: &str, tz: Tz) -> RecallResult<DateTime<Tz>> {
    normalize(&TemporalValue::from_ics_str(s)?, tz)
}

/// Look up an IANA timezone name such as `Europe/Berlin`.
pub fn parse_timezone(name: &str) -> RecallResult<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| RecallError::UnknownTimezone(name.to_string()))
}

/// Attach `tz` to a wall-clock time without shifting it.
///
/// Ambiguous times (clocks going back) resolve to standard time, the later
/// of the two. Times inside a gap (clocks going forward) are read with the
/// offset in force before the gap.
pub fn localize(naive: NaiveDateTime, tz: Tz) -> DateTime<Tz> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(_, later) => later,
        LocalResult::None => {
            // A day earlier is safely before the transition in every zone
            let offset = tz
                .offset_from_utc_datetime(&(naive - Duration::days(1)))
                .fix();
            let utc = naive - Duration::seconds(i64::from(offset.local_minus_utc()));
            tz.from_utc_datetime(&utc)
        }
    }
}
