//! Terminal and JSON rendering of a laid-out week.

use owo_colors::OwoColorize;
use recall_core::{Day, Row, Week, WeekView};
use serde_json::{Value, json};

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for WeekView {
    fn render(&self) -> String {
        let week = &self.week;
        let mut lines = vec![format!(
            "📅 Week of {} ({})",
            week.first_day().format("%a %Y-%m-%d").bold(),
            week.timezone
        )];

        for day in week.days() {
            lines.push(String::new());
            lines.extend(render_day(week, day));
        }

        let all_day: Vec<&str> = week.all_day_events().map(|e| e.summary.as_str()).collect();
        if !all_day.is_empty() {
            lines.push(String::new());
            let label = format!(
                "{} all-day {} not shown: {}",
                all_day.len(),
                pluralize("event", all_day.len()),
                all_day.join(", ")
            );
            lines.push(label.dimmed().to_string());
        }

        lines.join("\n")
    }
}

fn render_day(week: &Week, day: &Day) -> Vec<String> {
    let mut lines = vec![day.date.format("%a %Y-%m-%d").to_string().bold().to_string()];

    if day.rows.is_empty() {
        lines.push(format!("   {}", "No events".dimmed()));
        return lines;
    }

    for row in &day.rows {
        lines.push(format!("   {}", render_row(week, row)));
    }

    lines
}

fn render_row(week: &Week, row: &Row) -> String {
    let time = format!("{}-{}", row.start.format("%H:%M"), row.end.format("%H:%M"));
    let summary = &week.event(row.event).summary;
    let layout = format!(
        "top {:.2} height {:.2} left {:.1}% width {:.1}%",
        row.offset, row.extent, row.left, row.width
    );

    let summary = if row.overlap_group.len() > 1 {
        summary.yellow().to_string()
    } else {
        summary.green().to_string()
    };

    format!("{} {} {}", time.cyan(), summary, layout.dimmed())
}

fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

/// JSON shape handed to presentation layers.
pub fn to_json(view: &WeekView) -> Value {
    let week = &view.week;

    let ruler: Vec<Value> = view
        .ruler
        .bars
        .iter()
        .map(|bar| {
            json!({
                "label": bar.label,
                "offset": bar.offset,
                "extent": bar.extent,
            })
        })
        .collect();

    let days: Vec<Value> = week
        .days()
        .iter()
        .map(|day| {
            let rows: Vec<Value> = day
                .rows
                .iter()
                .map(|row| {
                    let overlapping: Vec<&str> = row
                        .overlap_group
                        .iter()
                        .map(|id| week.event(*id).summary.as_str())
                        .collect();
                    json!({
                        "summary": week.event(row.event).summary,
                        "start": row.start.to_rfc3339(),
                        "end": row.end.to_rfc3339(),
                        "offset": row.offset,
                        "extent": row.extent,
                        "left": row.left,
                        "width": row.width,
                        "overlapping": overlapping,
                    })
                })
                .collect();
            json!({
                "date": day.date.to_string(),
                "rows": rows,
            })
        })
        .collect();

    json!({
        "timezone": week.timezone.to_string(),
        "ruler": {
            "height": view.ruler.height,
            "bars": ruler,
        },
        "days": days,
        "all_day": week.all_day_events().map(|e| e.summary.as_str()).collect::<Vec<_>>(),
    })
}
