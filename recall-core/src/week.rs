//! Seven consecutive days and the rows laid out on them.
//!
//! Rows are filled in two passes: [`Week::add_event`] sets the vertical
//! metrics, then [`crate::overlap::resolve`] sets the horizontal ones.

use chrono::{DateTime, Duration, NaiveDate, Timelike};
use chrono_tz::Tz;
use icalendar::parser::Component;

use crate::constants::{DAYS_IN_WEEK, HEIGHT_RATIO, SPACER_MINUTES};
use crate::error::RecallResult;
use crate::event::Event;
use crate::time::{TemporalValue, normalize};

/// Index of an event inside the [`Week`] that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventId(pub usize);

/// One occurrence of an event placed on a day.
#[derive(Debug, Clone)]
pub struct Row {
    pub event: EventId,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    /// Distance from midnight, in ruler units
    pub offset: f64,
    /// Height, in ruler units
    pub extent: f64,
    /// Events sharing screen space with this row, ordered by start time of day
    pub overlap_group: Vec<EventId>,
    /// Percent of the day column
    pub left: f64,
    /// Percent of the day column
    pub width: f64,
}

#[derive(Debug, Clone)]
pub struct Day {
    pub date: NaiveDate,
    pub midnight: DateTime<Tz>,
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone)]
pub struct Week {
    pub timezone: Tz,
    pub(crate) days: Vec<Day>,
    pub(crate) events: Vec<Event>,
}

impl Week {
    /// Seven days starting at `start_date`, each stamped at midnight in `tz`.
    pub fn new(start_date: NaiveDate, tz: Tz) -> RecallResult<Self> {
        let days = (0..DAYS_IN_WEEK)
            .map(|offset| {
                let date = start_date + Duration::days(offset);
                Ok(Day {
                    date,
                    midnight: normalize(&TemporalValue::Date(date), tz)?,
                    rows: Vec::new(),
                })
            })
            .collect::<RecallResult<Vec<_>>>()?;

        Ok(Week {
            timezone: tz,
            days,
            events: Vec::new(),
        })
    }

    pub fn days(&self) -> &[Day] {
        &self.days
    }

    pub fn day(&self, date: NaiveDate) -> Option<&Day> {
        self.days.iter().find(|d| d.date == date)
    }

    pub fn first_day(&self) -> DateTime<Tz> {
        self.days[0].midnight
    }

    pub fn last_day(&self) -> DateTime<Tz> {
        self.days[self.days.len() - 1].midnight
    }

    pub fn event(&self, id: EventId) -> &Event {
        &self.events[id.0]
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Events that were ingested but have no rows because they span a day or more.
    pub fn all_day_events(&self) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(|e| e.is_all_day())
    }

    /// Parse a VEVENT and place one row per occurrence on each day of the week.
    ///
    /// All-day events are kept in [`Self::events`] but get no rows. Rows running
    /// past midnight are neither clipped nor continued on the next day.
    pub fn add_event(&mut self, vevent: &Component) -> RecallResult<EventId> {
        let window_end = self.last_day() + Duration::days(1);
        let event = Event::parse(vevent, self.first_day(), window_end, self.timezone)?;
        let id = EventId(self.events.len());

        if event.is_all_day() {
            tracing::debug!(summary = %event.summary, "All-day event gets no rows");
        } else {
            let duration_minutes = event.duration.num_seconds() as f64 / 60.0;
            let extent = ruler_units(adjust_duration(duration_minutes));

            for day in &mut self.days {
                for occurrence in event.occurrences_on(day.date) {
                    let offset_minutes = occurrence.hour() * 60 + occurrence.minute();
                    day.rows.push(Row {
                        event: id,
                        start: occurrence,
                        end: occurrence + event.duration,
                        offset: ruler_units(f64::from(offset_minutes)),
                        extent,
                        overlap_group: Vec::new(),
                        left: 0.0,
                        width: 0.0,
                    });
                }
            }
        }

        self.events.push(event);
        Ok(id)
    }
}

/// Convert minutes into ruler units.
pub fn ruler_units(minutes: f64) -> f64 {
    minutes * HEIGHT_RATIO
}

/// Leave a small gap under each block. Blocks no longer than the gap keep their length.
pub fn adjust_duration(minutes: f64) -> f64 {
    if minutes > SPACER_MINUTES {
        minutes - SPACER_MINUTES
    } else {
        minutes
    }
}
