//! Server configuration from `TRANCIT_*` environment variables.
//!
//! | variable                          | default                               |
//! |-----------------------------------|---------------------------------------|
//! | `TRANCIT_BIND`                    | `127.0.0.1:8000`                      |
//! | `TRANCIT_DATA_DIR`                | `data`                                |
//! | `TRANCIT_NOMINATIM_URL`           | `https://nominatim.openstreetmap.org` |
//! | `TRANCIT_OSRM_URL`                | `https://router.project-osrm.org`     |
//! | `TRANCIT_USER_AGENT`              | `TranCIT/0.1 (Cebu route planner)`    |
//! | `TRANCIT_HTTP_TIMEOUT_SECS`       | `10`                                  |
//! | `TRANCIT_GEOCODE_CACHE_TTL_SECS`  | `86400`                               |
//! | `TRANCIT_GEOCODE_CACHE_CAPACITY`  | `10000`                               |
//! | `TRANCIT_ROUTE_CACHE_TTL_SECS`    | `3600`                                |
//! | `TRANCIT_ROUTE_CACHE_CAPACITY`    | `2000`                                |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::CacheConfig;
use crate::geocode::NominatimConfig;
use crate::routing::OsrmConfig;

/// An environment variable had an unusable value.
#[derive(Debug, thiserror::Error)]
#[error("invalid value {value:?} for {var}: {message}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
    pub message: String,
}

/// Complete server configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind: SocketAddr,
    pub data_dir: PathBuf,
    pub nominatim: NominatimConfig,
    pub osrm: OsrmConfig,
    pub cache: CacheConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8000)),
            data_dir: PathBuf::from("data"),
            nominatim: NominatimConfig::default(),
            osrm: OsrmConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

/// Reads and parses variables through a lookup function.
struct Env<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> Env<F> {
    fn text(&self, var: &'static str) -> Result<Option<String>, ConfigError> {
        match (self.lookup)(var) {
            None => Ok(None),
            Some(value) if value.trim().is_empty() => Err(ConfigError {
                var,
                value,
                message: "must not be empty".to_string(),
            }),
            Some(value) => Ok(Some(value.trim().to_string())),
        }
    }

    fn parsed<T>(&self, var: &'static str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.text(var)?
            .map(|value| {
                value.parse().map_err(|e: T::Err| ConfigError {
                    var,
                    message: e.to_string(),
                    value,
                })
            })
            .transpose()
    }

    fn positive(&self, var: &'static str) -> Result<Option<u64>, ConfigError> {
        match self.parsed::<u64>(var)? {
            Some(0) => Err(ConfigError {
                var,
                value: "0".to_string(),
                message: "must be greater than zero".to_string(),
            }),
            other => Ok(other),
        }
    }

    fn url(&self, var: &'static str) -> Result<Option<String>, ConfigError> {
        match self.text(var)? {
            Some(value) if !(value.starts_with("http://") || value.starts_with("https://")) => {
                Err(ConfigError {
                    var,
                    value,
                    message: "must be an http(s) URL".to_string(),
                })
            }
            other => Ok(other),
        }
    }
}

impl AppConfig {
    /// Build a config from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env { lookup };
        let mut config = Self::default();

        if let Some(bind) = env.parsed("TRANCIT_BIND")? {
            config.bind = bind;
        }
        if let Some(dir) = env.text("TRANCIT_DATA_DIR")? {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(url) = env.url("TRANCIT_NOMINATIM_URL")? {
            config.nominatim = config.nominatim.with_base_url(url);
        }
        if let Some(url) = env.url("TRANCIT_OSRM_URL")? {
            config.osrm = config.osrm.with_base_url(url);
        }
        if let Some(agent) = env.text("TRANCIT_USER_AGENT")? {
            config.nominatim = config.nominatim.with_user_agent(agent.clone());
            config.osrm = config.osrm.with_user_agent(agent);
        }
        if let Some(secs) = env.positive("TRANCIT_HTTP_TIMEOUT_SECS")? {
            config.nominatim = config.nominatim.with_timeout(secs);
            config.osrm = config.osrm.with_timeout(secs);
        }
        if let Some(secs) = env.positive("TRANCIT_GEOCODE_CACHE_TTL_SECS")? {
            config.cache.geocode_ttl = Duration::from_secs(secs);
        }
        if let Some(n) = env.positive("TRANCIT_GEOCODE_CACHE_CAPACITY")? {
            config.cache.geocode_capacity = n;
        }
        if let Some(secs) = env.positive("TRANCIT_ROUTE_CACHE_TTL_SECS")? {
            config.cache.route_ttl = Duration::from_secs(secs);
        }
        if let Some(n) = env.positive("TRANCIT_ROUTE_CACHE_CAPACITY")? {
            config.cache.route_capacity = n;
        }

        Ok(config)
    }

    /// Snapshot file for user accounts.
    pub fn accounts_path(&self) -> PathBuf {
        self.data_dir.join("accounts.json")
    }

    /// Snapshot file for saved routes.
    pub fn routes_path(&self) -> PathBuf {
        self.data_dir.join("routes.json")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.bind.to_string(), "127.0.0.1:8000");
        assert_eq!(config.accounts_path(), PathBuf::from("data/accounts.json"));
        assert_eq!(config.routes_path(), PathBuf::from("data/routes.json"));
        assert_eq!(config.nominatim.base_url, "https://nominatim.openstreetmap.org");
        assert_eq!(config.osrm.base_url, "https://router.project-osrm.org");
        assert_eq!(config.cache.route_capacity, 2_000);
    }

    #[test]
    fn overrides() {
        let config = config(&[
            ("TRANCIT_BIND", "0.0.0.0:9000"),
            ("TRANCIT_DATA_DIR", "/var/lib/trancit"),
            ("TRANCIT_NOMINATIM_URL", "http://localhost:8080/"),
            ("TRANCIT_USER_AGENT", "test-agent"),
            ("TRANCIT_HTTP_TIMEOUT_SECS", "3"),
            ("TRANCIT_ROUTE_CACHE_TTL_SECS", "60"),
        ])
        .unwrap();

        assert_eq!(config.bind.port(), 9000);
        assert_eq!(
            config.routes_path(),
            PathBuf::from("/var/lib/trancit/routes.json")
        );
        assert_eq!(config.nominatim.base_url, "http://localhost:8080");
        assert_eq!(config.nominatim.user_agent, "test-agent");
        assert_eq!(config.osrm.user_agent, "test-agent");
        assert_eq!(config.osrm.timeout_secs, 3);
        assert_eq!(config.cache.route_ttl, Duration::from_secs(60));
    }

    #[test]
    fn invalid_values() {
        let err = config(&[("TRANCIT_BIND", "localhost")]).unwrap_err();
        assert_eq!(err.var, "TRANCIT_BIND");

        let err = config(&[("TRANCIT_HTTP_TIMEOUT_SECS", "0")]).unwrap_err();
        assert_eq!(err.message, "must be greater than zero");

        let err = config(&[("TRANCIT_ROUTE_CACHE_CAPACITY", "-1")]).unwrap_err();
        assert_eq!(err.var, "TRANCIT_ROUTE_CACHE_CAPACITY");

        let err = config(&[("TRANCIT_OSRM_URL", "router.example")]).unwrap_err();
        assert!(err.to_string().contains("http(s) URL"));

        assert!(config(&[("TRANCIT_DATA_DIR", "  ")]).is_err());
    }
}
