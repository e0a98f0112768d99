//! RRULE expansion bounded to a window.
//!
//! Occurrences are computed once, when the rule is built, and then queried by
//! date as many times as needed.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use rrule::{RRule, Unvalidated};

use crate::error::{RecallError, RecallResult};
use crate::time::normalize_str;

/// Upper bound handed to the rrule iterator. A minutely rule over eight days
/// stays well below it.
const MAX_OCCURRENCES: u16 = u16::MAX;

/// A recurrence rule anchored at an event start, expanded inside a window.
#[derive(Debug, Clone)]
pub struct RecurrenceRule {
    pub expression: String,
    pub anchor: DateTime<Tz>,
    pub after: DateTime<Tz>,
    pub before: DateTime<Tz>,
    occurrences: Vec<DateTime<Tz>>,
}

impl RecurrenceRule {
    pub fn new(
        expression: &str,
        anchor: DateTime<Tz>,
        after: DateTime<Tz>,
        before: DateTime<Tz>,
    ) -> RecallResult<Self> {
        let occurrences = expand(Some(expression), anchor, after, before)?;

        Ok(RecurrenceRule {
            expression: expression.to_string(),
            anchor,
            after,
            before,
            occurrences,
        })
    }

    /// All expanded occurrences, in chronological order.
    pub fn occurrences(&self) -> &[DateTime<Tz>] {
        &self.occurrences
    }

    /// Occurrences whose local date is `date`.
    pub fn occurrences_on(&self, date: NaiveDate) -> impl Iterator<Item = DateTime<Tz>> + '_ {
        self.occurrences
            .iter()
            .copied()
            .filter(move |o| o.date_naive() == date)
    }
}

/// Expand `expression` anchored at `anchor` into the occurrences that fall in
/// `[after, before]`, both ends included. Results are in the anchor's timezone.
///
/// A missing expression yields no occurrences.
pub fn expand(
    expression: Option<&str>,
    anchor: DateTime<Tz>,
    after: DateTime<Tz>,
    before: DateTime<Tz>,
) -> RecallResult<Vec<DateTime<Tz>>> {
    let Some(expression) = expression else {
        return Ok(Vec::new());
    };

    let tz = anchor.timezone();
    let (expression, until) = until_to_utc(expression, tz)?;

    // rrule refuses an UNTIL earlier than DTSTART; such a rule simply never fires
    if until.is_some_and(|until| until < anchor.with_timezone(&Utc)) {
        return Ok(Vec::new());
    }

    let rrule: RRule<Unvalidated> = expression
        .parse()
        .map_err(|e| RecallError::Recurrence(format!("{expression}: {e}")))?;

    let rrule_tz = rrule::Tz::Tz(tz);
    let rrule_set = rrule
        .build(anchor.with_timezone(&rrule_tz))
        .map_err(|e| RecallError::Recurrence(format!("{expression}: {e}")))?;

    // after/before are exclusive, widen by a second to include the bounds
    let after = (after - Duration::seconds(1)).with_timezone(&rrule_tz);
    let before = (before + Duration::seconds(1)).with_timezone(&rrule_tz);

    let result = rrule_set.after(after).before(before).all(MAX_OCCURRENCES);
    if result.limited {
        tracing::warn!(
            rule = %expression,
            count = result.dates.len(),
            "Recurrence expansion truncated"
        );
    }

    Ok(result
        .dates
        .iter()
        .map(|dt| dt.with_timezone(&tz))
        .collect())
}

/// Rewrite the UNTIL part of a rule as an absolute UTC time.
///
/// rrule requires UNTIL in UTC whenever DTSTART carries a timezone, while
/// feeds commonly use a bare date or a floating time.
fn until_to_utc(expression: &str, tz: Tz) -> RecallResult<(String, Option<DateTime<Utc>>)> {
    let mut until = None;
    let mut parts = Vec::new();

    for part in expression.trim().split(';').filter(|p| !p.is_empty()) {
        match part.split_once('=') {
            Some((key, value)) if key.eq_ignore_ascii_case("UNTIL") => {
                let utc = normalize_str(value, tz)?.with_timezone(&Utc);
                parts.push(format!("UNTIL={}", utc.format("%Y%m%dT%H%M%SZ")));
                until = Some(utc);
            }
            _ => parts.push(part.to_string()),
        }
    }

    Ok((parts.join(";"), until))
}
