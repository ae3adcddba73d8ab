//! Process configuration, read once from the environment at startup

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Placeholder shipped in sample `.env` files; treated the same as a missing key
pub const API_KEY_PLACEHOLDER: &str = "YOUR_API_KEY";

const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
const DEFAULT_SYMBOLS_CSV: &str = "stocks.csv";
const DEFAULT_STATIC_DIR: &str = "static";
const DEFAULT_CHART_RETAIN: usize = 20;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}' ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Immutable configuration shared by every request
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    /// `None` keeps the provider call unbounded
    pub request_timeout: Option<Duration>,
    pub bind_addr: SocketAddr,
    pub symbols_csv: PathBuf,
    pub static_dir: PathBuf,
    /// Write a uniquely named chart per request instead of overwriting one file
    pub chart_per_request: bool,
    /// How many per-request charts stay on disk before the oldest are removed
    pub chart_retain: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let request_timeout = match env_var_opt("ALPHAVANTAGE_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|e: std::num::ParseIntError| {
                    ConfigError::InvalidValue {
                        key: "ALPHAVANTAGE_TIMEOUT_SECS",
                        value: raw.clone(),
                        reason: e.to_string(),
                    }
                })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        let raw_addr = env_var_or("BIND_ADDR", DEFAULT_BIND_ADDR);
        let bind_addr = raw_addr.parse().map_err(|e: std::net::AddrParseError| {
            ConfigError::InvalidValue {
                key: "BIND_ADDR",
                value: raw_addr.clone(),
                reason: e.to_string(),
            }
        })?;

        let chart_retain = match env_var_opt("CHART_RETAIN") {
            Some(raw) => raw.parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidValue {
                    key: "CHART_RETAIN",
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?,
            None => DEFAULT_CHART_RETAIN,
        };

        Ok(Self {
            api_key: env_var_or("ALPHAVANTAGE_API_KEY", ""),
            base_url: env_var_or("ALPHAVANTAGE_BASE_URL", DEFAULT_BASE_URL),
            request_timeout,
            bind_addr,
            symbols_csv: PathBuf::from(env_var_or("SYMBOLS_CSV", DEFAULT_SYMBOLS_CSV)),
            static_dir: PathBuf::from(env_var_or("STATIC_DIR", DEFAULT_STATIC_DIR)),
            chart_per_request: env_var_bool("CHART_PER_REQUEST", false),
            chart_retain,
        })
    }

    /// False when the key is empty or still the sample placeholder
    pub fn has_api_key(&self) -> bool {
        let key = self.api_key.trim();
        !key.is_empty() && key != API_KEY_PLACEHOLDER
    }

    /// Directory chart images are written to
    pub fn chart_dir(&self) -> PathBuf {
        self.static_dir.join("images")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: None,
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            symbols_csv: PathBuf::from(DEFAULT_SYMBOLS_CSV),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            chart_per_request: false,
            chart_retain: DEFAULT_CHART_RETAIN,
        }
    }
}

fn env_var_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_var_or(key: &str, default: &str) -> String {
    env_var_opt(key).unwrap_or_else(|| default.to_string())
}

fn env_var_bool(key: &str, default: bool) -> bool {
    env_var_opt(key)
        .map(|v| v == "true" || v == "1")
        .unwrap_or(default)
}
