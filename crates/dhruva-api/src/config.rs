//! Server configuration from environment

use crate::error::ConfigError;
use dhruva_client::EndpointConfig;
use std::str::FromStr;

pub const DEFAULT_ADDR: &str = "0.0.0.0:8787";

/// Seconds between background backend health checks
pub const DEFAULT_REFRESH_SECS: u64 = 30;

/// Location sent with grievances that do not name one
pub const DEFAULT_LOCATION: &str = "Guntur";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: String,
    pub production: bool,
    pub refresh_secs: u64,
    /// Cosmetic delays between pipeline steps
    pub pacing: bool,
    pub seed: Option<u64>,
    pub default_location: Option<String>,
    /// Keyword tables file; the embedded tables are used when unset
    pub tables_path: Option<String>,
    pub endpoints: EndpointConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let production = !cfg!(debug_assertions);
        Self {
            addr: DEFAULT_ADDR.to_string(),
            production,
            refresh_secs: DEFAULT_REFRESH_SECS,
            pacing: true,
            seed: None,
            default_location: Some(DEFAULT_LOCATION.to_string()),
            tables_path: None,
            endpoints: EndpointConfig {
                production,
                ..EndpointConfig::default()
            },
        }
    }
}

impl ServerConfig {
    /// Load config from environment variables with fallback to defaults
    ///
    /// - `DHRUVA_ADDR` - listen address
    /// - `DHRUVA_PRODUCTION` - `true` drops the localhost backend candidate
    /// - `DHRUVA_API_URL`, `DHRUVA_RAILWAY_URL`, `DHRUVA_MIRRORS` - backend candidates
    /// - `DHRUVA_REFRESH_SECS` - health check interval
    /// - `DHRUVA_PACING` - `false` disables step delays
    /// - `DHRUVA_SEED` - RNG seed for reproducible runs
    /// - `DHRUVA_LOCATION` - default location; empty disables it
    /// - `DHRUVA_TABLES` - keyword tables path
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let production = parse_var("DHRUVA_PRODUCTION")?.unwrap_or(defaults.production);
        let refresh_secs = parse_var("DHRUVA_REFRESH_SECS")?.unwrap_or(defaults.refresh_secs);
        if refresh_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "DHRUVA_REFRESH_SECS",
                value: "0".to_string(),
            });
        }

        let default_location = match std::env::var("DHRUVA_LOCATION") {
            Ok(v) if v.trim().is_empty() => None,
            Ok(v) => Some(v.trim().to_string()),
            Err(_) => defaults.default_location,
        };

        Ok(Self {
            addr: std::env::var("DHRUVA_ADDR").unwrap_or(defaults.addr),
            production,
            refresh_secs,
            pacing: parse_var("DHRUVA_PACING")?.unwrap_or(defaults.pacing),
            seed: parse_var("DHRUVA_SEED")?,
            default_location,
            tables_path: std::env::var("DHRUVA_TABLES").ok().filter(|p| !p.is_empty()),
            endpoints: EndpointConfig::from_env(production),
        })
    }
}

fn parse_var<T: FromStr>(key: &'static str) -> Result<Option<T>, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.addr, DEFAULT_ADDR);
        assert_eq!(config.refresh_secs, 30);
        assert!(config.pacing);
        assert_eq!(config.default_location.as_deref(), Some("Guntur"));
        assert_eq!(config.endpoints.production, config.production);
    }

    #[test]
    fn test_parse_var_rejects_garbage() {
        std::env::set_var("DHRUVA_TEST_SEED_GARBAGE", "not-a-number");
        let parsed: Result<Option<u64>, _> = parse_var("DHRUVA_TEST_SEED_GARBAGE");
        assert!(parsed.is_err());
        std::env::remove_var("DHRUVA_TEST_SEED_GARBAGE");

        let parsed: Option<u64> = parse_var("DHRUVA_TEST_UNSET_VAR").unwrap();
        assert!(parsed.is_none());
    }
}
