//! Configuration loaded from environment variables
//!
//! Both binaries call `dotenv::dotenv().ok()` first, so a `.env` file in the
//! working directory is honoured. Parsing goes through a lookup function so
//! tests never touch the process environment.

use crate::aggregator_core::{DEFAULT_HIGH_MORTALITY_THRESHOLD, DEFAULT_WINDOW_CAPACITY};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?} ({reason})")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Consumer configuration
///
/// Environment variables:
/// - `LIVE_DATA_PATH` (default: data/project_live.json)
/// - `MORTALITY_DB_PATH` (default: data/mortality_analytics.sqlite)
/// - `HIGH_MORTALITY_THRESHOLD` (default: 100.0)
/// - `WINDOW_CAPACITY` (default: 20)
/// - `POLL_INTERVAL_SECS` (default: 2)
/// - `RENDER_INTERVAL_SECS` (default: 2)
/// - `FOCUS_CAUSE` (default: Heart disease)
/// - `HEADLESS` (default: false) - log snapshots instead of drawing the dashboard
#[derive(Debug, Clone, PartialEq)]
pub struct ConsumerConfig {
    pub live_data_path: PathBuf,
    pub db_path: PathBuf,
    pub threshold: f64,
    pub window_capacity: usize,
    pub poll_interval: Duration,
    pub render_interval: Duration,
    pub focus_cause: String,
    pub headless: bool,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            live_data_path: PathBuf::from("data/project_live.json"),
            db_path: PathBuf::from("data/mortality_analytics.sqlite"),
            threshold: DEFAULT_HIGH_MORTALITY_THRESHOLD,
            window_capacity: DEFAULT_WINDOW_CAPACITY,
            poll_interval: Duration::from_secs(2),
            render_interval: Duration::from_secs(2),
            focus_cause: "Heart disease".to_string(),
            headless: false,
        }
    }
}

impl ConsumerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Log filter used when `RUST_LOG` is unset. The dashboard shares the
    /// terminal with stderr, so only errors get through while it is drawn.
    pub fn default_log_filter(&self) -> &'static str {
        if self.headless {
            "info"
        } else {
            "error"
        }
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let threshold: f64 = parse_var(&lookup, "HIGH_MORTALITY_THRESHOLD", defaults.threshold)?;
        if !threshold.is_finite() {
            return Err(invalid("HIGH_MORTALITY_THRESHOLD", threshold.to_string(), "must be finite"));
        }

        let window_capacity: usize = parse_var(&lookup, "WINDOW_CAPACITY", defaults.window_capacity)?;
        if window_capacity == 0 {
            return Err(invalid("WINDOW_CAPACITY", "0".to_string(), "must be at least 1"));
        }

        Ok(Self {
            live_data_path: lookup("LIVE_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.live_data_path),
            db_path: lookup("MORTALITY_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            threshold,
            window_capacity,
            poll_interval: parse_secs(&lookup, "POLL_INTERVAL_SECS", defaults.poll_interval)?,
            render_interval: parse_secs(&lookup, "RENDER_INTERVAL_SECS", defaults.render_interval)?,
            focus_cause: lookup("FOCUS_CAUSE")
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.focus_cause),
            headless: parse_var(&lookup, "HEADLESS", defaults.headless)?,
        })
    }
}

/// Producer configuration
///
/// Environment variables:
/// - `LIVE_DATA_PATH` (default: data/project_live.json)
/// - `MORTALITY_CSV_PATH` (default: data/USRegionalMortality.csv)
/// - `PRODUCER_DB_PATH` (default: data/mortality.sqlite)
/// - `MESSAGE_INTERVAL_SECONDS` (default: 1)
#[derive(Debug, Clone, PartialEq)]
pub struct ProducerConfig {
    pub live_data_path: PathBuf,
    pub csv_path: PathBuf,
    pub db_path: PathBuf,
    pub message_interval: Duration,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            live_data_path: PathBuf::from("data/project_live.json"),
            csv_path: PathBuf::from("data/USRegionalMortality.csv"),
            db_path: PathBuf::from("data/mortality.sqlite"),
            message_interval: Duration::from_secs(1),
        }
    }
}

impl ProducerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Ok(Self {
            live_data_path: lookup("LIVE_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.live_data_path),
            csv_path: lookup("MORTALITY_CSV_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.csv_path),
            db_path: lookup("PRODUCER_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            message_interval: parse_secs(&lookup, "MESSAGE_INTERVAL_SECONDS", defaults.message_interval)?,
        })
    }
}

fn invalid(var: &'static str, value: String, reason: &'static str) -> ConfigError {
    ConfigError::InvalidValue { var, value, reason }
}

fn parse_var<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .to_lowercase()
            .parse()
            .map_err(|_| invalid(var, raw, "could not be parsed")),
    }
}

fn parse_secs<F>(lookup: &F, var: &'static str, default: Duration) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let secs: u64 = parse_var(lookup, var, default.as_secs())?;
    if secs == 0 {
        return Err(invalid(var, "0".to_string(), "must be at least 1 second"));
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_consumer_config() {
        let config = ConsumerConfig::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(config.live_data_path, PathBuf::from("data/project_live.json"));
        assert_eq!(config.db_path, PathBuf::from("data/mortality_analytics.sqlite"));
        assert_eq!(config.threshold, 100.0);
        assert_eq!(config.window_capacity, 20);
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.render_interval, Duration::from_secs(2));
        assert_eq!(config.focus_cause, "Heart disease");
        assert!(!config.headless);
        assert_eq!(config.default_log_filter(), "error");
    }

    #[test]
    fn test_headless_logs_at_info() {
        let config = ConsumerConfig::from_lookup(lookup_from(&[("HEADLESS", "true")])).unwrap();
        assert!(config.headless);
        assert_eq!(config.default_log_filter(), "info");
    }

    #[test]
    fn test_custom_consumer_config() {
        let config = ConsumerConfig::from_lookup(lookup_from(&[
            ("LIVE_DATA_PATH", "/tmp/live.json"),
            ("MORTALITY_DB_PATH", "/tmp/analytics.db"),
            ("HIGH_MORTALITY_THRESHOLD", "150.5"),
            ("WINDOW_CAPACITY", "50"),
            ("POLL_INTERVAL_SECS", "5"),
            ("FOCUS_CAUSE", "Cancer"),
            ("HEADLESS", "TRUE"),
        ]))
        .unwrap();

        assert_eq!(config.live_data_path, PathBuf::from("/tmp/live.json"));
        assert_eq!(config.db_path, PathBuf::from("/tmp/analytics.db"));
        assert_eq!(config.threshold, 150.5);
        assert_eq!(config.window_capacity, 50);
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert_eq!(config.render_interval, Duration::from_secs(2));
        assert_eq!(config.focus_cause, "Cancer");
        assert!(config.headless);
    }

    #[test]
    fn test_invalid_values_are_fatal() {
        let err = ConsumerConfig::from_lookup(lookup_from(&[("HIGH_MORTALITY_THRESHOLD", "high")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { var: "HIGH_MORTALITY_THRESHOLD", .. }));

        let err = ConsumerConfig::from_lookup(lookup_from(&[("WINDOW_CAPACITY", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { var: "WINDOW_CAPACITY", .. }));

        let err = ConsumerConfig::from_lookup(lookup_from(&[("HIGH_MORTALITY_THRESHOLD", "NaN")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { reason: "must be finite", .. }));

        let err = ProducerConfig::from_lookup(lookup_from(&[("MESSAGE_INTERVAL_SECONDS", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { var: "MESSAGE_INTERVAL_SECONDS", .. }));
    }

    #[test]
    fn test_blank_focus_cause_falls_back() {
        let config = ConsumerConfig::from_lookup(lookup_from(&[("FOCUS_CAUSE", "  ")])).unwrap();
        assert_eq!(config.focus_cause, "Heart disease");
    }

    #[test]
    fn test_producer_config() {
        let config = ProducerConfig::from_lookup(lookup_from(&[
            ("MORTALITY_CSV_PATH", "fixtures/mortality.csv"),
            ("MESSAGE_INTERVAL_SECONDS", "3"),
        ]))
        .unwrap();

        assert_eq!(config.live_data_path, PathBuf::from("data/project_live.json"));
        assert_eq!(config.csv_path, PathBuf::from("fixtures/mortality.csv"));
        assert_eq!(config.db_path, PathBuf::from("data/mortality.sqlite"));
        assert_eq!(config.message_interval, Duration::from_secs(3));
    }
}
