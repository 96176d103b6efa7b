use std::{env, path::Path, time::Duration};

use jiff::Timestamp;
use log::{info, warn};
use thiserror::Error;

use crate::db::fingrid::datasets::TimeWindow;

pub const DEFAULT_FINGRID_URL: &str = "https://data.fingrid.fi";
pub const DEFAULT_PACING_MS: u64 = 2000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_NOTES_TABLE: &str = "notes";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value {value:?} for {name}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
    #[error("start time {start} is not before end time {end}")]
    EmptyWindow { start: Timestamp, end: Timestamp },
    #[error("{present} is set but {missing} is not")]
    Incomplete {
        present: &'static str,
        missing: &'static str,
    },
}

/// Connection details for the hosted database.
#[derive(Debug, Clone, PartialEq)]
pub struct PostgrestConfig {
    pub url: String,
    pub key: String,
    pub notes_table: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub fingrid_api_key: String,
    pub fingrid_base_url: String,
    pub window: TimeWindow,
    pub pacing_delay: Duration,
    pub timeout: Duration,
    /// [None] if the database is not configured
    pub postgrest: Option<PostgrestConfig>,
}

impl Config {
    /// Load `.env/{env_name}.env` if it exists, then read the process environment.
    pub fn load(env_name: &str) -> Result<Config, ConfigError> {
        let path = format!(".env/{}.env", env_name);
        match dotenvy::from_path(Path::new(&path)) {
            Ok(_) => info!("loaded environment from {}", path),
            Err(e) => warn!("could not load {}: {}", path, e),
        }
        Config::from_lookup(|name| env::var(name).ok())
    }

    /// Build the config from a variable lookup.  Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let fingrid_api_key = get("FINGRID_API_KEY").ok_or(ConfigError::Missing("FINGRID_API_KEY"))?;
        let fingrid_base_url = get("FINGRID_BASE_URL")
            .unwrap_or_else(|| DEFAULT_FINGRID_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let default_window = TimeWindow::default();
        let window = TimeWindow {
            start: parse_var("FINGRID_START_TIME", get("FINGRID_START_TIME"))?
                .unwrap_or(default_window.start),
            end: parse_var("FINGRID_END_TIME", get("FINGRID_END_TIME"))?
                .unwrap_or(default_window.end),
        };
        if window.start >= window.end {
            return Err(ConfigError::EmptyWindow {
                start: window.start,
                end: window.end,
            });
        }

        let pacing_delay = Duration::from_millis(
            parse_var("FINGRID_PACING_MS", get("FINGRID_PACING_MS"))?.unwrap_or(DEFAULT_PACING_MS),
        );
        let timeout = Duration::from_secs(
            parse_var("HTTP_TIMEOUT_SECS", get("HTTP_TIMEOUT_SECS"))?
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        );

        let postgrest = match (get("SUPABASE_URL"), get("SUPABASE_KEY")) {
            (Some(url), Some(key)) => Some(PostgrestConfig {
                url: url.trim_end_matches('/').to_string(),
                key,
                notes_table: get("NOTES_TABLE").unwrap_or_else(|| DEFAULT_NOTES_TABLE.to_string()),
                timeout,
            }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(ConfigError::Incomplete {
                    present: "SUPABASE_URL",
                    missing: "SUPABASE_KEY",
                })
            }
            (None, Some(_)) => {
                return Err(ConfigError::Incomplete {
                    present: "SUPABASE_KEY",
                    missing: "SUPABASE_URL",
                })
            }
        };

        Ok(Config {
            fingrid_api_key,
            fingrid_base_url,
            window,
            pacing_delay,
            timeout,
            postgrest,
        })
    }
}

fn parse_var<T>(name: &'static str, value: Option<String>) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        None => Ok(None),
        Some(v) => v
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::Invalid {
                name,
                value: v.clone(),
                reason: e.to_string(),
            }),
    }
}
