mod commands;
mod render;

use anyhow::{Context, Result};
use chrono::{Datelike, Duration, Local, NaiveDate};
use clap::{Parser, Subcommand};
use recall_core::config::RecallConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "recall")]
#[command(about = "Lay out one week of an iCalendar feed as a week view")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lay out one week of a feed
    Week {
        /// Feed URL (http, https or webcal) or path to a local .ics file
        source: String,

        /// First day of the week (YYYY-MM-DD), defaults to this week's Monday
        #[arg(short, long)]
        start: Option<String>,

        /// IANA timezone (e.g. "Europe/Berlin"), defaults to the feed's own
        #[arg(short, long)]
        timezone: Option<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Manage the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print where the config file lives
    Path,
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = RecallConfig::load()?;

    init_logging(&config.log_level);

    match cli.command {
        Commands::Week {
            source,
            start,
            timezone,
            json,
        } => {
            let start = parse_start(start.as_deref(), Local::now().date_naive())?;
            let timezone = timezone.or_else(|| config.timezone.clone());
            commands::week::run(&config, &source, start, timezone.as_deref(), json).await
        }
        Commands::Config { action } => match action {
            ConfigAction::Path => commands::config::path(),
            ConfigAction::Init { force } => commands::config::init(force),
        },
    }
}

/// Logs go to stderr so `--json` output stays clean. RUST_LOG wins over the config.
fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Parse YYYY-MM-DD, or fall back to the Monday of `today`'s week.
fn parse_start(start: Option<&str>, today: NaiveDate) -> Result<NaiveDate> {
    match start {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("Invalid start date '{}'. Expected YYYY-MM-DD", s)),
        None => {
            let since_monday = i64::from(today.weekday().num_days_from_monday());
            Ok(today - Duration::days(since_monday))
        }
    }
}
