use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::store::{ApiStore, MemoryStore, Store};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_API_TIMEOUT_SECS: u64 = 10;
const DEFAULT_WEATHER_REFRESH_SECS: u64 = 300;
const DEFAULT_DISCOVERY_REFRESH_SECS: u64 = 120;

/// How often polling widgets should refetch, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollingIntervals {
    pub weather_secs: u64,
    pub discovery_secs: u64,
}

impl Default for PollingIntervals {
    fn default() -> Self {
        Self {
            weather_secs: DEFAULT_WEATHER_REFRESH_SECS,
            discovery_secs: DEFAULT_DISCOVERY_REFRESH_SECS,
        }
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Base URL of the upstream REST API. Unset means in-memory store.
    pub api_url: Option<String>,
    pub api_timeout: Duration,
    /// JSON seed for the in-memory store
    pub seed_file: Option<PathBuf>,
    pub polling: PollingIntervals,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            api_url: None,
            api_timeout: Duration::from_secs(DEFAULT_API_TIMEOUT_SECS),
            seed_file: None,
            polling: PollingIntervals::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unparseable values fall back to
    /// their defaults with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            port: parse_or("PORT", &lookup, defaults.port),
            api_url: non_empty(lookup("NEARBY_API_URL")),
            api_timeout: Duration::from_secs(parse_or(
                "NEARBY_API_TIMEOUT_SECS",
                &lookup,
                DEFAULT_API_TIMEOUT_SECS,
            )),
            seed_file: non_empty(lookup("NEARBY_SEED_FILE")).map(PathBuf::from),
            polling: PollingIntervals {
                weather_secs: parse_or("WEATHER_REFRESH_SECS", &lookup, DEFAULT_WEATHER_REFRESH_SECS),
                discovery_secs: parse_or(
                    "DISCOVERY_REFRESH_SECS",
                    &lookup,
                    DEFAULT_DISCOVERY_REFRESH_SECS,
                ),
            },
        }
    }

    /// Build the store this configuration points at
    pub async fn build_store(&self) -> Result<Store> {
        if let Some(ref url) = self.api_url {
            tracing::info!("Using upstream API at {}", url);
            let store = ApiStore::new(url, self.api_timeout).context("Failed to create API store")?;
            return Ok(Store::Api(store));
        }

        match self.seed_file {
            Some(ref path) => {
                tracing::info!("Using in-memory store seeded from {}", path.display());
                Ok(Store::Memory(MemoryStore::from_seed_file(path).await?))
            }
            None => {
                tracing::info!("Using empty in-memory store");
                Ok(Store::Memory(MemoryStore::new()))
            }
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_or<T>(key: &str, lookup: &impl Fn(&str) -> Option<String>, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    let Some(raw) = non_empty(lookup(key)) else {
        return default;
    };
    raw.parse().unwrap_or_else(|e| {
        tracing::warn!("Invalid {} value '{}': {}, using default {}", key, raw, e, default);
        default
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[]));
        assert_eq!(config.port, 3000);
        assert_eq!(config.api_url, None);
        assert_eq!(config.api_timeout, Duration::from_secs(10));
        assert_eq!(config.polling.weather_secs, 300);
        assert_eq!(config.polling.discovery_secs, 120);
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("PORT", "8080"),
            ("NEARBY_API_URL", "http://api.internal:5000"),
            ("WEATHER_REFRESH_SECS", "180"),
            ("NEARBY_SEED_FILE", "seed.json"),
        ]));
        assert_eq!(config.port, 8080);
        assert_eq!(config.api_url.as_deref(), Some("http://api.internal:5000"));
        assert_eq!(config.polling.weather_secs, 180);
        assert_eq!(config.seed_file, Some(PathBuf::from("seed.json")));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("PORT", "not-a-port"),
            ("NEARBY_API_URL", "   "),
            ("DISCOVERY_REFRESH_SECS", "-5"),
        ]));
        assert_eq!(config.port, 3000);
        assert_eq!(config.api_url, None);
        assert_eq!(config.polling.discovery_secs, 120);
    }

    #[tokio::test]
    async fn test_build_store_defaults_to_memory() {
        let store = ServerConfig::default().build_store().await.unwrap();
        assert!(matches!(store, Store::Memory(_)));
    }

    #[tokio::test]
    async fn test_build_store_missing_seed_errors() {
        let config = ServerConfig {
            seed_file: Some(PathBuf::from("/nonexistent/seed.json")),
            ..Default::default()
        };
        assert!(config.build_store().await.is_err());
    }
}
