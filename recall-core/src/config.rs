//! Global recall configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_TIMEOUT_SECS, MAX_LINES};
use crate::error::{RecallError, RecallResult};
use crate::feed::FeedOptions;

fn default_max_lines() -> usize {
    MAX_LINES
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Configuration at ~/.config/recall/config.toml
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RecallConfig {
    /// Timezone used when none is given on the command line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,

    #[serde(default = "default_max_lines")]
    pub max_lines: usize,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for RecallConfig {
    fn default() -> Self {
        RecallConfig {
            timezone: None,
            max_lines: default_max_lines(),
            timeout_secs: default_timeout_secs(),
            log_level: default_log_level(),
        }
    }
}

impl RecallConfig {
    pub fn config_path() -> RecallResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| RecallError::Config("Could not determine config directory".into()))?
            .join("recall");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location. A missing file means defaults.
    pub fn load() -> RecallResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> RecallResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> RecallResult<Self> {
        toml::from_str(content).map_err(|e| RecallError::Config(e.to_string()))
    }

    pub fn feed_options(&self) -> FeedOptions {
        FeedOptions {
            max_lines: self.max_lines,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> RecallResult<()> {
        let contents = format!(
            "\
# recall configuration

# Timezone used when --timezone is not given (IANA name).
# Without it, the feed's X-WR-TIMEZONE is used, then UTC.
# timezone = \"Europe/Berlin\"

# Feeds with more lines than this are rejected:
# max_lines = {MAX_LINES}

# Download timeout in seconds:
# timeout_secs = {DEFAULT_TIMEOUT_SECS}

# Log level when RUST_LOG is not set:
# log_level = \"warn\"
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                RecallError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| RecallError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
