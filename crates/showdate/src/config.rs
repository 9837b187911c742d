use std::path::Path;
use std::time::Duration;

use chrono::{Datelike, Local};
use serde::Deserialize;

use crate::notifier::Subject;
use crate::parser::try_parse_date;
use crate::scraper::default_user_agent;
use crate::types::DateToken;

pub const DEFAULT_CHECK_INTERVAL_MINUTES: u64 = 30;
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to open config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{0} is required")]
    MissingField(&'static str),
}

/// The file as written by users. Every field is optional here so that a missing
/// required value is reported by name instead of as a serde error.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    discord_webhook_url: Option<String>,
    #[serde(alias = "traumpalast_url")]
    page_url: Option<String>,
    current_newest_date: Option<String>,
    check_interval_minutes: Option<i64>,
    request_timeout_seconds: Option<i64>,
    user_agent: Option<String>,
    year: Option<i32>,
    movie_title: Option<String>,
    cinema_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub page_url: String,
    pub current_newest_date: DateToken,
    pub check_interval_minutes: u64,
    pub request_timeout_seconds: u64,
    pub discord_webhook_url: Option<String>,
    pub user_agent: String,
    pub year: i32,
    pub movie_title: Option<String>,
    pub cinema_name: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn positive_or(value: Option<i64>, default: u64) -> u64 {
    value
        .and_then(|v| u64::try_from(v).ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_json::from_str(json)?;

        let page_url = non_empty(raw.page_url).ok_or(ConfigError::MissingField("page_url"))?;
        let current_newest_date = non_empty(raw.current_newest_date)
            .map(DateToken::from)
            .ok_or(ConfigError::MissingField("current_newest_date"))?;
        let year = raw.year.unwrap_or_else(|| Local::now().year());

        if let Err(e) = try_parse_date(current_newest_date.as_str(), year) {
            log::warn!("current_newest_date will compare as the earliest possible date: {e}");
        }

        Ok(Self {
            page_url,
            current_newest_date,
            check_interval_minutes: positive_or(
                raw.check_interval_minutes,
                DEFAULT_CHECK_INTERVAL_MINUTES,
            ),
            request_timeout_seconds: positive_or(
                raw.request_timeout_seconds,
                DEFAULT_REQUEST_TIMEOUT_SECONDS,
            ),
            discord_webhook_url: non_empty(raw.discord_webhook_url),
            user_agent: non_empty(raw.user_agent).unwrap_or_else(default_user_agent),
            year,
            movie_title: non_empty(raw.movie_title),
            cinema_name: non_empty(raw.cinema_name),
        })
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_minutes.saturating_mul(60))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn subject(&self) -> Subject {
        Subject {
            year: self.year,
            movie_title: self.movie_title.clone(),
            cinema_name: self.cinema_name.clone(),
        }
    }
}
