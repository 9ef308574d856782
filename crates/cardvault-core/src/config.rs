//! Configuration module
//!
//! Settings for the watch source, archive, index and probe, loaded from the
//! environment (and an optional `.env` file).

use std::env;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

// Common constants
const WATCH_DIR: &str = "./sd_virtual";
const BACKUP_DIR: &str = "./backup";
const DATABASE_URL: &str = "sqlite://metadata.db";
const DB_MAX_CONNECTIONS: u32 = 5;
const STABILITY_THRESHOLD_MS: u64 = 2000;
const POLL_INTERVAL_MS: u64 = 100;
const MAX_CONCURRENT_INGESTS: usize = 4;
const FFPROBE_PATH: &str = "ffprobe";
const PROBE_TIMEOUT_SECS: u64 = 60;

/// Console log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            _ => Err(anyhow::anyhow!("Invalid log format: {}", s)),
        }
    }
}

impl Display for LogFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            LogFormat::Compact => write!(f, "compact"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub watch_dir: PathBuf,
    pub backup_dir: PathBuf,
    pub database_url: String,
    pub db_max_connections: u32,
    /// File size must stay unchanged this long before it is reported ready
    pub stability_threshold_ms: u64,
    pub poll_interval_ms: u64,
    /// 0 = unbounded
    pub max_concurrent_ingests: usize,
    pub ffprobe_path: String,
    /// 0 = no cutoff
    pub probe_timeout_secs: u64,
    /// Create a missing watch root instead of failing at startup
    pub create_watch_dir: bool,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            watch_dir: PathBuf::from(WATCH_DIR),
            backup_dir: PathBuf::from(BACKUP_DIR),
            database_url: DATABASE_URL.to_string(),
            db_max_connections: DB_MAX_CONNECTIONS,
            stability_threshold_ms: STABILITY_THRESHOLD_MS,
            poll_interval_ms: POLL_INTERVAL_MS,
            max_concurrent_ingests: MAX_CONCURRENT_INGESTS,
            ffprobe_path: FFPROBE_PATH.to_string(),
            probe_timeout_secs: PROBE_TIMEOUT_SECS,
            create_watch_dir: false,
            log_format: LogFormat::Compact,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let log_format = match lookup("LOG_FORMAT") {
            Some(raw) => raw.parse()?,
            None => LogFormat::Compact,
        };

        let config = Config {
            watch_dir: lookup("WATCH_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(WATCH_DIR)),
            backup_dir: lookup("BACKUP_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(BACKUP_DIR)),
            database_url: lookup("DATABASE_URL")
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DATABASE_URL.to_string()),
            db_max_connections: lookup("DB_MAX_CONNECTIONS")
                .and_then(|s| s.parse().ok())
                .filter(|&n| n > 0)
                .unwrap_or(DB_MAX_CONNECTIONS),
            stability_threshold_ms: lookup("STABILITY_THRESHOLD_MS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(STABILITY_THRESHOLD_MS),
            poll_interval_ms: lookup("POLL_INTERVAL_MS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(POLL_INTERVAL_MS),
            max_concurrent_ingests: lookup("MAX_CONCURRENT_INGESTS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(MAX_CONCURRENT_INGESTS),
            ffprobe_path: lookup("FFPROBE_PATH").unwrap_or_else(|| FFPROBE_PATH.to_string()),
            probe_timeout_secs: lookup("PROBE_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(PROBE_TIMEOUT_SECS),
            create_watch_dir: lookup("CREATE_WATCH_DIR")
                .map(|s| s.to_lowercase())
                .and_then(|s| s.parse().ok())
                .unwrap_or(false),
            log_format,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.poll_interval_ms == 0 {
            return Err(anyhow::anyhow!("POLL_INTERVAL_MS must be greater than 0"));
        }

        if self.poll_interval_ms > self.stability_threshold_ms {
            return Err(anyhow::anyhow!(
                "POLL_INTERVAL_MS ({}) must not exceed STABILITY_THRESHOLD_MS ({})",
                self.poll_interval_ms,
                self.stability_threshold_ms
            ));
        }

        if self.ffprobe_path.trim().is_empty() {
            return Err(anyhow::anyhow!("FFPROBE_PATH must not be empty"));
        }

        Ok(())
    }

    pub fn stability_threshold(&self) -> Duration {
        Duration::from_millis(self.stability_threshold_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn probe_timeout(&self) -> Option<Duration> {
        (self.probe_timeout_secs > 0).then(|| Duration::from_secs(self.probe_timeout_secs))
    }

    pub fn max_concurrent_ingests(&self) -> Option<usize> {
        (self.max_concurrent_ingests > 0).then_some(self.max_concurrent_ingests)
    }
}
