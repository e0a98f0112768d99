//! A single VEVENT, normalized into the week's timezone.

use chrono::{DateTime, Duration, NaiveDate};
use chrono_tz::Tz;
use icalendar::DatePerhapsTime;
use icalendar::parser::{Component, Property};

use crate::error::{RecallError, RecallResult};
use crate::recurrence::RecurrenceRule;
use crate::time::{TemporalValue, normalize};

/// A parsed calendar event. `end == start + duration` always holds.
#[derive(Debug, Clone)]
pub struct Event {
    pub summary: String,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    pub duration: Duration,
    pub recurrence: Option<RecurrenceRule>,
}

impl Event {
    /// Parse a VEVENT. Recurrences are expanded inside `[window_start, window_end]`.
    pub fn parse(
        vevent: &Component,
        window_start: DateTime<Tz>,
        window_end: DateTime<Tz>,
        tz: Tz,
    ) -> RecallResult<Self> {
        let summary = vevent
            .find_prop("SUMMARY")
            .map(|p| p.val.to_string())
            .unwrap_or_else(|| "(No title)".to_string());

        let dtstart = vevent
            .find_prop("DTSTART")
            .ok_or_else(|| RecallError::MissingProperty("DTSTART".to_string()))?;
        let start_value = temporal_value(dtstart)?;
        let start = normalize(&start_value, tz)?;

        let (end, duration) = if let Some(dtend) = vevent.find_prop("DTEND") {
            let end = normalize(&temporal_value(dtend)?, tz)?;
            (end, end - start)
        } else if let Some(prop) = vevent.find_prop("DURATION") {
            let duration = parse_duration(prop.val.as_ref())?;
            (start + duration, duration)
        } else if start_value.is_date() {
            // RFC 5545: a date-only DTSTART without an end lasts one day
            (start + Duration::days(1), Duration::days(1))
        } else {
            (start, Duration::zero())
        };

        if duration < Duration::zero() {
            return Err(RecallError::InvalidTemporalInput(format!(
                "event '{summary}' ends before it starts"
            )));
        }

        let recurrence = vevent
            .find_prop("RRULE")
            .map(|p| RecurrenceRule::new(p.val.as_ref(), start, window_start, window_end))
            .transpose()?;

        Ok(Event {
            summary,
            start,
            end,
            duration,
            recurrence,
        })
    }

    /// Instants at which this event happens on `date`.
    ///
    /// The event's own start comes first. Recurrence occurrences follow, minus
    /// the one that repeats the start itself, so a recurring event never lands
    /// twice on its first day.
    pub fn occurrences_on(&self, date: NaiveDate) -> impl Iterator<Item = DateTime<Tz>> + '_ {
        let start = self.start;
        let own = (start.date_naive() == date).then_some(start);
        let recurring = self
            .recurrence
            .iter()
            .flat_map(move |rule| rule.occurrences_on(date))
            .filter(move |o| *o != start);

        own.into_iter().chain(recurring)
    }

    /// Lasts at most one day. Also true for exactly one day, together with [`Self::is_all_day`].
    pub fn is_single_day(&self) -> bool {
        self.duration <= Duration::days(1)
    }

    /// Lasts at least one day.
    pub fn is_all_day(&self) -> bool {
        self.duration >= Duration::days(1)
    }
}

fn temporal_value(prop: &Property) -> RecallResult<TemporalValue> {
    DatePerhapsTime::try_from(prop)
        .map(TemporalValue::from)
        .map_err(|_| {
            RecallError::InvalidTemporalInput(format!("{}:{}", prop.name.as_ref(), prop.val.as_ref()))
        })
}

/// Parse an ISO 8601 DURATION value (`PT1H30M`, `P1D`, `P2W`).
fn parse_duration(value: &str) -> RecallResult<Duration> {
    let value = value.trim();
    if value.starts_with('-') {
        return Err(RecallError::InvalidTemporalInput(format!(
            "negative duration {value}"
        )));
    }

    let parsed = iso8601::duration(value.trim_start_matches('+'))
        .map_err(|_| RecallError::InvalidTemporalInput(format!("duration {value}")))?;
    let std_duration: std::time::Duration = parsed.into();

    Duration::from_std(std_duration)
        .map_err(|_| RecallError::InvalidTemporalInput(format!("duration {value}")))
}
