use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use recall_core::FeedLoader;
use recall_core::config::RecallConfig;

use crate::render::{Render, to_json};

const URL_SCHEMES: [&str; 3] = ["http://", "https://", "webcal://"];

pub async fn run(
    config: &RecallConfig,
    source: &str,
    start: NaiveDate,
    timezone: Option<&str>,
    json: bool,
) -> Result<()> {
    let loader = FeedLoader::new(config.feed_options())?;
    tracing::debug!(source, %start, timezone = ?timezone, "Loading feed");

    let view = if is_url(source) {
        loader.load(source, start, timezone).await
    } else {
        loader.load_file(Path::new(source), start, timezone)
    }
    .with_context(|| format!("Could not lay out {}", source))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&to_json(&view))?);
    } else {
        println!("{}", view.render());
    }

    Ok(())
}

fn is_url(source: &str) -> bool {
    URL_SCHEMES.iter().any(|scheme| source.starts_with(scheme))
}
