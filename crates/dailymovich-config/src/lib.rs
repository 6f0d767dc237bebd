use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File holding the system instruction sent with every completion request.
pub const SYSTEM_PROMPT_FILE: &str = "system.txt";
/// Optional schedule overrides.
pub const SCHEDULE_FILE: &str = "dailymovich.json5";

pub const ENV_DISCORD_TOKEN: &str = "DISCORD_TOKEN";
pub const ENV_REPORT_CHANNEL: &str = "REPORT_CHANNEL";
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";

/// Upper bound on the breaking-news interval (one year).
pub const MAX_BREAKING_INTERVAL_HOURS: u64 = 24 * 365;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON5 parse error: {0}")]
    Json5(#[from] json5::Error),
    #[error("environment variable {0} is not set")]
    MissingVar(&'static str),
    #[error("REPORT_CHANNEL must be a numeric channel id, got {0:?}")]
    InvalidChannelId(String),
    #[error("unknown timezone: {0}")]
    UnknownTimezone(String),
    #[error("invalid time of day {0:?}, expected HH:MM")]
    InvalidTime(String),
    #[error("breaking_interval_hours must be between 1 and 8760")]
    InvalidInterval,
}

/// Schedule settings, read from `dailymovich.json5` when present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// IANA timezone the daily times are evaluated in.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Local wall-clock times (HH:MM) of the daily bulletin.
    #[serde(default = "default_daily_times")]
    pub daily_times: Vec<String>,
    /// Hours between two breaking-news alerts.
    #[serde(default = "default_breaking_interval_hours")]
    pub breaking_interval_hours: u64,
    /// Completion model ID.
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_timezone() -> String {
    "Israel".to_string()
}

fn default_daily_times() -> Vec<String> {
    ["08:00", "15:00", "20:00", "11:00"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_breaking_interval_hours() -> u64 {
    8
}

fn default_model() -> String {
    "gpt-3.5-turbo-0125".to_string()
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            daily_times: default_daily_times(),
            breaking_interval_hours: default_breaking_interval_hours(),
            model: default_model(),
        }
    }
}

impl ScheduleConfig {
    pub fn timezone(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| ConfigError::UnknownTimezone(self.timezone.clone()))
    }

    /// Parsed daily times, sorted and deduplicated.
    pub fn daily_times(&self) -> Result<Vec<NaiveTime>, ConfigError> {
        let mut times = self
            .daily_times
            .iter()
            .map(|s| {
                NaiveTime::parse_from_str(s.trim(), "%H:%M")
                    .map_err(|_| ConfigError::InvalidTime(s.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        times.sort();
        times.dedup();
        Ok(times)
    }

    pub fn breaking_interval(&self) -> Result<Duration, ConfigError> {
        if !(1..=MAX_BREAKING_INTERVAL_HOURS).contains(&self.breaking_interval_hours) {
            return Err(ConfigError::InvalidInterval);
        }
        self.breaking_interval_hours
            .checked_mul(3600)
            .map(Duration::from_secs)
            .ok_or(ConfigError::InvalidInterval)
    }
}

/// Everything the bot needs at startup, fully validated.
#[derive(Debug, Clone)]
pub struct Settings {
    pub discord_token: String,
    pub report_channel: u64,
    pub openai_api_key: String,
    pub openai_base_url: Option<String>,
    pub system_prompt: String,
    pub model: String,
    pub timezone: Tz,
    pub daily_times: Vec<NaiveTime>,
    pub breaking_interval: Duration,
}

/// Load settings from the process environment and the current directory.
pub fn load_settings() -> Result<Settings, ConfigError> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let dir = std::env::current_dir().map_err(|source| ConfigError::Io {
        path: PathBuf::from("."),
        source,
    })?;
    load_settings_from(&dir, |key| std::env::var(key).ok())
}

/// Load settings from `dir`, looking variables up through `env`.
pub fn load_settings_from<F>(dir: &Path, env: F) -> Result<Settings, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let require = |key: &'static str| {
        env(key)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingVar(key))
    };

    let discord_token = require(ENV_DISCORD_TOKEN)?;
    let raw_channel = require(ENV_REPORT_CHANNEL)?;
    let report_channel = raw_channel
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|id| *id != 0)
        .ok_or_else(|| ConfigError::InvalidChannelId(raw_channel.clone()))?;
    let openai_api_key = require(ENV_OPENAI_API_KEY)?;
    let openai_base_url = env(ENV_OPENAI_BASE_URL).filter(|v| !v.trim().is_empty());

    let system_prompt = read_system_prompt(&dir.join(SYSTEM_PROMPT_FILE))?;
    let schedule = load_schedule_config_from(&dir.join(SCHEDULE_FILE))?;

    Ok(Settings {
        discord_token,
        report_channel,
        openai_api_key,
        openai_base_url,
        system_prompt,
        timezone: schedule.timezone()?,
        daily_times: schedule.daily_times()?,
        breaking_interval: schedule.breaking_interval()?,
        model: schedule.model,
    })
}

/// Read the system instruction verbatim.
pub fn read_system_prompt(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load schedule overrides from a specific path, falling back to defaults if not found.
pub fn load_schedule_config_from(path: &Path) -> Result<ScheduleConfig, ConfigError> {
    if !path.exists() {
        tracing::debug!("Schedule file not found at {}, using defaults", path.display());
        return Ok(ScheduleConfig::default());
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: ScheduleConfig = json5::from_str(&content)?;
    Ok(config)
}
