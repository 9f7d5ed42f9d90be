//! Run configuration.
//!
//! Values come from three layers, highest precedence first: command line (or
//! the matching environment variable), the JSON config file, built-in
//! defaults. Everything is resolved into an immutable [`Config`] before any
//! network call is made.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use dirs::config_dir;
use serde::Deserialize;
use thiserror::Error;

use crate::ledger::LedgerPolicy;
use crate::sync::{RunContext, DEFAULT_ACTIVITY_ID, DEFAULT_WORK_HOURS};

const APP_NAME: &str = "timefill";
const CONFIG_FILE: &str = "config.json";
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("no Redmine host configured (use --host or REDMINE_HOST)")]
    MissingHost,

    #[error("no API key configured (use --apikey or REDMINE_API_KEY)")]
    MissingApiKey,

    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("invalid work hours {0}, expected a positive number")]
    InvalidHours(f64),

    #[error("config file: {0}")]
    File(String),
}

/// Contents of `config.json`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FileConfig {
    pub host: Option<String>,
    pub api_key: Option<String>,
    /// Target work hours per day.
    pub hours: Option<f64>,
    /// Redmine activity used for every created entry.
    pub activity_id: Option<u64>,
}

impl FileConfig {
    /// Load from `path`, or from the user's config directory when `None`.
    /// A missing file yields the defaults; a broken one is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match default_config_path() {
                Some(p) => p,
                None => return Ok(Self::default()),
            },
        };
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .map_err(|e| ConfigError::File(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| ConfigError::File(format!("{}: {}", path.display(), e)))
    }
}

/// Values given on the command line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub host: Option<String>,
    pub api_key: Option<String>,
    pub hours: Option<f64>,
    pub today: Option<String>,
    pub dry_run: bool,
    pub strict_ledger: bool,
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: String,
    pub api_key: String,
    pub run: RunContext,
}

impl Config {
    /// Merge the layers. `today` is used when no date override is given.
    pub fn resolve(
        overrides: Overrides,
        file: FileConfig,
        today: NaiveDate,
    ) -> Result<Self, ConfigError> {
        let host = non_empty(overrides.host)
            .or_else(|| non_empty(file.host))
            .ok_or(ConfigError::MissingHost)?;
        let api_key = non_empty(overrides.api_key)
            .or_else(|| non_empty(file.api_key))
            .ok_or(ConfigError::MissingApiKey)?;

        let target_hours = overrides.hours.or(file.hours).unwrap_or(DEFAULT_WORK_HOURS);
        if !target_hours.is_finite() || target_hours <= 0.0 {
            return Err(ConfigError::InvalidHours(target_hours));
        }

        let day = match overrides.today {
            Some(raw) => parse_day(&raw)?,
            None => today,
        };

        Ok(Self {
            host,
            api_key,
            run: RunContext {
                day,
                target_hours,
                dry_run: overrides.dry_run,
                activity_id: file.activity_id.unwrap_or(DEFAULT_ACTIVITY_ID),
                ledger_policy: if overrides.strict_ledger {
                    LedgerPolicy::Strict
                } else {
                    LedgerPolicy::FailOpen
                },
            },
        })
    }
}

pub fn parse_day(raw: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| ConfigError::InvalidDate(raw.to_string()))
}

pub fn default_config_path() -> Option<PathBuf> {
    let mut path = config_dir()?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Some(path)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 6).unwrap()
    }

    fn overrides() -> Overrides {
        Overrides {
            host: Some("pm.example.com".to_string()),
            api_key: Some("secret".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = Config::resolve(overrides(), FileConfig::default(), today()).unwrap();

        assert_eq!(config.host, "pm.example.com");
        assert_eq!(config.run.day, today());
        assert_eq!(config.run.target_hours, 8.0);
        assert_eq!(config.run.activity_id, 9);
        assert!(!config.run.dry_run);
        assert_eq!(config.run.ledger_policy, LedgerPolicy::FailOpen);
    }

    #[test]
    fn command_line_wins_over_file() {
        let file = FileConfig {
            host: Some("file.example.com".to_string()),
            api_key: Some("file-key".to_string()),
            hours: Some(6.0),
            activity_id: Some(14),
        };
        let mut cli = overrides();
        cli.hours = Some(7.5);
        cli.strict_ledger = true;

        let config = Config::resolve(cli, file, today()).unwrap();
        assert_eq!(config.host, "pm.example.com");
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.run.target_hours, 7.5);
        assert_eq!(config.run.activity_id, 14);
        assert_eq!(config.run.ledger_policy, LedgerPolicy::Strict);
    }

    #[test]
    fn file_fills_missing_credentials() {
        let file = FileConfig {
            host: Some("file.example.com".to_string()),
            api_key: Some("file-key".to_string()),
            ..Default::default()
        };
        let cli = Overrides {
            host: Some("  ".to_string()),
            ..Default::default()
        };

        let config = Config::resolve(cli, file, today()).unwrap();
        assert_eq!(config.host, "file.example.com");
        assert_eq!(config.api_key, "file-key");
    }

    #[test]
    fn missing_credentials_are_fatal() {
        let cli = Overrides {
            api_key: Some("k".to_string()),
            ..Default::default()
        };
        assert_eq!(
            Config::resolve(cli, FileConfig::default(), today()),
            Err(ConfigError::MissingHost)
        );

        let cli = Overrides {
            host: Some("h".to_string()),
            ..Default::default()
        };
        assert_eq!(
            Config::resolve(cli, FileConfig::default(), today()),
            Err(ConfigError::MissingApiKey)
        );
    }

    #[test]
    fn today_override_is_parsed() {
        let mut cli = overrides();
        cli.today = Some("2023-12-31".to_string());

        let config = Config::resolve(cli, FileConfig::default(), today()).unwrap();
        assert_eq!(config.run.day, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
    }

    #[test]
    fn malformed_today_is_rejected() {
        for raw in ["31.12.2023", "2023-13-01", "yesterday", ""] {
            let mut cli = overrides();
            cli.today = Some(raw.to_string());
            assert_eq!(
                Config::resolve(cli, FileConfig::default(), today()),
                Err(ConfigError::InvalidDate(raw.to_string()))
            );
        }
    }

    #[test]
    fn non_positive_hours_are_rejected() {
        let mut cli = overrides();
        cli.hours = Some(0.0);
        assert_eq!(
            Config::resolve(cli, FileConfig::default(), today()),
            Err(ConfigError::InvalidHours(0.0))
        );
    }

    #[test]
    fn loads_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"host": "disk.example.com", "hours": 6.5}}"#).unwrap();

        let loaded = FileConfig::load(Some(file.path())).unwrap();
        assert_eq!(loaded.host.as_deref(), Some("disk.example.com"));
        assert_eq!(loaded.hours, Some(6.5));
        assert!(loaded.api_key.is_none());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = FileConfig::load(Some(dir.path().join("absent.json").as_path())).unwrap();
        assert_eq!(loaded, FileConfig::default());
    }

    #[test]
    fn broken_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "host = nope").unwrap();

        assert!(matches!(
            FileConfig::load(Some(file.path())),
            Err(ConfigError::File(_))
        ));
    }
}
