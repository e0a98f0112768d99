//! Horizontal layout of rows that share time on the same day.
//!
//! Each row collects the events it collides with (itself included), sorted by
//! start time of day. A row takes the slot matching its rank in that group.
//! Every row but the last is drawn 1.7 slots wide so stacked events peek out
//! from under each other.
//!
//! The collision test and the past-midnight clamp are deliberately loose:
//! they look at the event's own start and end rather than the occurrence,
//! and only test whether an endpoint of one interval lies inside the other.

use chrono::{NaiveTime, Timelike};

use crate::constants::SECONDS_PER_DAY;
use crate::event::Event;
use crate::week::{EventId, Week};

/// Width multiplier for rows that are not last in their group.
const STACKED_WIDTH_FACTOR: f64 = 1.7;

/// Fill `overlap_group`, `left` and `width` on every row of the week.
pub fn resolve(week: &mut Week) {
    let Week { days, events, .. } = week;

    for day in days.iter_mut() {
        let spans: Vec<(EventId, NaiveTime, NaiveTime)> = day
            .rows
            .iter()
            .map(|row| {
                let (start, end) = start_end(&events[row.event.0]);
                (row.event, start, end)
            })
            .collect();

        for (outer, &(outer_id, o_start, o_end)) in day.rows.iter_mut().zip(&spans) {
            let mut group: Vec<EventId> = spans
                .iter()
                .filter(|&&(_, i_start, i_end)| {
                    (i_end >= o_start && o_start >= i_start) || (i_end >= o_end && o_end >= i_start)
                })
                .map(|&(id, _, _)| id)
                .collect();
            group.sort_by_key(|id| events[id.0].start.time());

            let idx = group.iter().position(|id| *id == outer_id).unwrap_or(0);
            let is_last = group.last() == Some(&outer_id);

            // Whole percents: 3 rows get 33% slots, not 33.3%
            let slot = (100 / group.len().max(1)) as f64;
            outer.left = slot * idx as f64;
            outer.width = if is_last {
                slot
            } else {
                slot * STACKED_WIDTH_FACTOR
            };
            outer.overlap_group = group;
        }
    }
}

/// Start and end time of day of an event. The end is pinned to the last
/// instant of the day when start plus duration reaches midnight, and never
/// falls before the start, so every span contains its own start.
fn start_end(event: &Event) -> (NaiveTime, NaiveTime) {
    let start = event.start.time();
    let start_secs = i64::from(start.num_seconds_from_midnight());

    let end = if start_secs + event.duration.num_seconds() >= SECONDS_PER_DAY {
        end_of_day()
    } else {
        // Clocks going back can put the wall-clock end before the start
        event.end.time().max(start)
    };

    (start, end)
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::week::Row;
    use chrono::{Datelike, NaiveDate};
    use icalendar::parser::{read_calendar, unfold};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn build_week(bodies: &[&str]) -> Week {
        let mut ics = String::from("BEGIN:VCALENDAR\nVERSION:2.0\nPRODID:TEST\n");
        for body in bodies {
            ics.push_str(&format!("BEGIN:VEVENT\n{body}\nEND:VEVENT\n"));
        }
        ics.push_str("END:VCALENDAR\n");

        let mut week = Week::new(date(1), chrono_tz::UTC).unwrap();
        let unfolded = unfold(&ics);
        let calendar = read_calendar(&unfolded).expect("Should parse calendar");
        for vevent in calendar.components.iter().filter(|c| c.name == "VEVENT") {
            week.add_event(vevent).expect("Should add event");
        }
        resolve(&mut week);
        week
    }

    fn row_for<'a>(week: &'a Week, d: u32, summary: &str) -> &'a Row {
        week.day(date(d))
            .unwrap()
            .rows
            .iter()
            .find(|r| week.event(r.event).summary == summary)
            .expect("Should have row")
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_single_row_fills_the_column() {
        let week = build_week(&["UID:1\nSUMMARY:A\nDTSTART:20240102T090000Z\nDTEND:20240102T100000Z"]);
        let row = row_for(&week, 2, "A");

        assert_eq!(row.overlap_group, vec![row.event]);
        assert!(approx(row.left, 0.0));
        assert!(approx(row.width, 100.0));
    }

    #[test]
    fn test_two_overlapping_rows() {
        let week = build_week(&[
            "UID:1\nSUMMARY:A\nDTSTART:20240102T090000Z\nDTEND:20240102T100000Z",
            "UID:2\nSUMMARY:B\nDTSTART:20240102T093000Z\nDTEND:20240102T103000Z",
        ]);
        let a = row_for(&week, 2, "A");
        let b = row_for(&week, 2, "B");

        assert_eq!(a.overlap_group.len(), 2);
        assert_eq!(b.overlap_group.len(), 2);
        assert_eq!(a.overlap_group, b.overlap_group);
        assert!(approx(a.left, 0.0));
        assert!(approx(a.width, 85.0));
        assert!(approx(b.left, 50.0));
        assert!(approx(b.width, 50.0));
    }

    #[test]
    fn test_disjoint_rows_each_fill_the_column() {
        let week = build_week(&[
            "UID:1\nSUMMARY:A\nDTSTART:20240102T090000Z\nDTEND:20240102T100000Z",
            "UID:2\nSUMMARY:B\nDTSTART:20240102T110000Z\nDTEND:20240102T120000Z",
        ]);

        for summary in ["A", "B"] {
            let row = row_for(&week, 2, summary);
            assert_eq!(row.overlap_group.len(), 1);
            assert!(approx(row.width, 100.0));
        }
    }

    #[test]
    fn test_touching_rows_count_as_overlapping() {
        // B starts exactly when A ends: the endpoint test is inclusive
        let week = build_week(&[
            "UID:1\nSUMMARY:A\nDTSTART:20240102T090000Z\nDTEND:20240102T100000Z",
            "UID:2\nSUMMARY:B\nDTSTART:20240102T100000Z\nDTEND:20240102T110000Z",
        ]);

        assert_eq!(row_for(&week, 2, "A").overlap_group.len(), 2);
        assert_eq!(row_for(&week, 2, "B").overlap_group.len(), 2);
    }

    #[test]
    fn test_three_way_group_widths() {
        let week = build_week(&[
            "UID:1\nSUMMARY:A\nDTSTART:20240102T090000Z\nDTEND:20240102T100000Z",
            "UID:2\nSUMMARY:B\nDTSTART:20240102T093000Z\nDTEND:20240102T103000Z",
            "UID:3\nSUMMARY:C\nDTSTART:20240102T094500Z\nDTEND:20240102T104500Z",
        ]);

        let expected = [("A", 0.0, 56.1), ("B", 33.0, 56.1), ("C", 66.0, 33.0)];
        for (summary, left, width) in expected {
            let row = row_for(&week, 2, summary);
            assert_eq!(row.overlap_group.len(), 3, "group of {summary}");
            assert!(approx(row.left, left), "left of {summary}");
            assert!(approx(row.width, width), "width of {summary}");
        }
    }

    #[test]
    fn test_enclosing_row_misses_enclosed_row() {
        // Neither endpoint of A falls inside B, so A does not see B, while B sees A
        let week = build_week(&[
            "UID:1\nSUMMARY:A\nDTSTART:20240102T080000Z\nDTEND:20240102T120000Z",
            "UID:2\nSUMMARY:B\nDTSTART:20240102T090000Z\nDTEND:20240102T100000Z",
        ]);

        let a = row_for(&week, 2, "A");
        assert_eq!(a.overlap_group.len(), 1);
        assert!(approx(a.width, 100.0));

        let b = row_for(&week, 2, "B");
        assert_eq!(b.overlap_group.len(), 2);
        assert!(approx(b.left, 50.0));
        assert!(approx(b.width, 50.0));
    }

    #[test]
    fn test_past_midnight_end_is_clamped() {
        let week = build_week(&[
            "UID:1\nSUMMARY:Late\nDTSTART:20240102T230000Z\nDURATION:PT2H",
            "UID:2\nSUMMARY:Night\nDTSTART:20240102T233000Z\nDURATION:PT15M",
        ]);

        // Night only reaches Late because Late's end is pinned to 23:59:59
        let night = row_for(&week, 2, "Night");
        assert_eq!(night.overlap_group.len(), 2);
        assert!(approx(night.left, 50.0));
        assert!(approx(night.width, 50.0));

        let late = row_for(&week, 2, "Late");
        assert_eq!(late.overlap_group.len(), 1);
    }

    #[test]
    fn test_event_ending_at_midnight_fills_the_column() {
        let week = build_week(&["UID:1\nSUMMARY:Late\nDTSTART:20240102T230000Z\nDTEND:20240103T000000Z"]);
        let late = row_for(&week, 2, "Late");

        assert_eq!(late.overlap_group, vec![late.event]);
        assert!(approx(late.left, 0.0));
        assert!(approx(late.width, 100.0));
    }

    #[test]
    fn test_event_ending_at_midnight_next_to_later_event() {
        let week = build_week(&[
            "UID:1\nSUMMARY:Late\nDTSTART:20240102T230000Z\nDTEND:20240103T000000Z",
            "UID:2\nSUMMARY:Night\nDTSTART:20240102T233000Z\nDURATION:PT15M",
        ]);

        let late = row_for(&week, 2, "Late");
        assert_eq!(late.overlap_group, vec![late.event]);
        assert!(approx(late.left, 0.0));
        assert!(approx(late.width, 100.0));

        let night = row_for(&week, 2, "Night");
        assert_eq!(night.overlap_group, vec![late.event, night.event]);
        assert!(approx(night.left, 50.0));
        assert!(approx(night.width, 50.0));
    }

    #[test]
    fn test_every_row_is_in_its_own_group() {
        let week = build_week(&[
            "UID:1\nSUMMARY:A\nDTSTART:20240102T230000Z\nDTEND:20240103T000000Z",
            "UID:2\nSUMMARY:B\nDTSTART:20240102T000000Z\nDURATION:PT0S",
            "UID:3\nSUMMARY:C\nDTSTART:20240102T220000Z\nDURATION:PT3H",
        ]);

        for row in &week.day(date(2)).unwrap().rows {
            assert!(row.overlap_group.contains(&row.event));
            assert!(row.left.is_finite() && row.width.is_finite());
        }
    }

    #[test]
    fn test_start_end_clamp() {
        let week = build_week(&["UID:1\nSUMMARY:Late\nDTSTART:20240102T230000Z\nDURATION:PT2H"]);
        let (start, end) = start_end(&week.events()[0]);

        assert_eq!(start, NaiveTime::from_hms_opt(23, 0, 0).unwrap());
        assert_eq!(end, end_of_day());
    }

    #[test]
    fn test_recurring_rows_resolved_on_every_day() {
        let week = build_week(&[
            "UID:1\nSUMMARY:Standup\nDTSTART:20240101T090000Z\nDURATION:PT30M\nRRULE:FREQ=DAILY",
            "UID:2\nSUMMARY:Sync\nDTSTART:20240103T091500Z\nDURATION:PT30M",
        ]);

        for day in week.days() {
            let standup = row_for(&week, day.date.day(), "Standup");
            if day.date == date(3) {
                assert!(approx(standup.width, 85.0));
                assert!(approx(row_for(&week, 3, "Sync").left, 50.0));
            } else {
                assert!(approx(standup.width, 100.0));
            }
        }
    }
}
