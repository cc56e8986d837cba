use std::env;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_MAPPINGS_URL: &str = "http://simulation:3000/api/mappings";
pub const DEFAULT_STATE_URL: &str = "http://simulation:3000/api/state";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a number, got {value:?}")]
    NotANumber { var: &'static str, value: String },

    #[error("{var} must be greater than zero")]
    Zero { var: &'static str },
}

/// Process configuration, read from the environment. Every variable is
/// optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub mappings_url: String,
    pub state_url: String,
    pub poll_interval: Duration,
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = parse_or(&lookup, "PORT", DEFAULT_PORT)?;
        if port == 0 {
            return Err(ConfigError::Zero { var: "PORT" });
        }
        let poll_interval_ms = nonzero_or(&lookup, "POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL_MS)?;
        let http_timeout_ms = nonzero_or(&lookup, "HTTP_TIMEOUT_MS", DEFAULT_HTTP_TIMEOUT_MS)?;

        Ok(Self {
            port,
            mappings_url: lookup("MAPPINGS_URL").unwrap_or_else(|| DEFAULT_MAPPINGS_URL.to_string()),
            state_url: lookup("STATE_URL").unwrap_or_else(|| DEFAULT_STATE_URL.to_string()),
            poll_interval: Duration::from_millis(poll_interval_ms),
            http_timeout: Duration::from_millis(http_timeout_ms),
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(var) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::NotANumber { var, value }),
    }
}

fn nonzero_or(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: u64,
) -> Result<u64, ConfigError> {
    match parse_or(lookup, var, default)? {
        0 => Err(ConfigError::Zero { var }),
        n => Ok(n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.mappings_url, "http://simulation:3000/api/mappings");
        assert_eq!(config.state_url, "http://simulation:3000/api/state");
        assert_eq!(config.poll_interval, Duration::from_secs(1));
        assert_eq!(config.http_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PORT", "8080"),
            ("STATE_URL", "http://localhost:4000/api/state"),
            ("POLL_INTERVAL_MS", "250"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.state_url, "http://localhost:4000/api/state");
        assert_eq!(config.poll_interval, Duration::from_millis(250));
        assert_eq!(config.mappings_url, DEFAULT_MAPPINGS_URL);
    }

    #[test]
    fn test_rejects_bad_numbers() {
        assert_eq!(
            config_from(&[("PORT", "http")]).unwrap_err(),
            ConfigError::NotANumber {
                var: "PORT",
                value: "http".to_string()
            }
        );
        assert_eq!(
            config_from(&[("POLL_INTERVAL_MS", "0")]).unwrap_err(),
            ConfigError::Zero {
                var: "POLL_INTERVAL_MS"
            }
        );
        assert!(config_from(&[("HTTP_TIMEOUT_MS", "-5")]).is_err());
        assert_eq!(
            config_from(&[("PORT", "0")]).unwrap_err(),
            ConfigError::Zero { var: "PORT" }
        );
    }
}
