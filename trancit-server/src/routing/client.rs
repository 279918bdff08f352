//! OSRM HTTP client.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tokio::sync::Semaphore;

use crate::domain::Coordinates;

use super::error::RoutingError;
use super::types::{DrivingRoute, OsrmResponse, convert_response};

/// Default base URL for the public OSRM demo server.
const DEFAULT_BASE_URL: &str = "https://router.project-osrm.org";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 4;

/// A driving route provider.
///
/// This abstraction allows the planner to be tested with mock data.
#[async_trait]
pub trait RouteProvider: Send + Sync {
    /// Find a driving route. `Ok(None)` means the points are not connected.
    async fn driving_route(
        &self,
        from: Coordinates,
        to: Coordinates,
    ) -> Result<Option<DrivingRoute>, RoutingError>;
}

/// Configuration for the OSRM client.
#[derive(Debug, Clone)]
pub struct OsrmConfig {
    /// Base URL for the API
    pub base_url: String,
    /// Routing profile path segment
    pub profile: String,
    /// User-Agent header sent with every request
    pub user_agent: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl OsrmConfig {
    /// Create a config for the public demo server.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            profile: "driving".to_string(),
            user_agent: "TranCIT/0.1".to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 10,
        }
    }

    /// Set a custom base URL (for testing or a self-hosted instance).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the User-Agent header.
    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// OSRM routing client.
#[derive(Debug, Clone)]
pub struct OsrmClient {
    http: reqwest::Client,
    base_url: String,
    profile: String,
    semaphore: Arc<Semaphore>,
}

impl OsrmClient {
    /// Create a new OSRM client with the given configuration.
    pub fn new(config: OsrmConfig) -> Result<Self, RoutingError> {
        let mut headers = HeaderMap::new();
        let agent = HeaderValue::from_str(&config.user_agent).map_err(|_| RoutingError::Api {
            status: 0,
            message: "Invalid User-Agent format".to_string(),
        })?;
        headers.insert(USER_AGENT, agent);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
            profile: config.profile,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
        })
    }

    /// The `/route` URL for two points. OSRM takes `lon,lat` order.
    fn route_url(&self, from: Coordinates, to: Coordinates) -> String {
        format!(
            "{}/route/v1/{}/{},{};{},{}",
            self.base_url,
            self.profile,
            from.lon(),
            from.lat(),
            to.lon(),
            to.lat()
        )
    }
}

#[async_trait]
impl RouteProvider for OsrmClient {
    async fn driving_route(
        &self,
        from: Coordinates,
        to: Coordinates,
    ) -> Result<Option<DrivingRoute>, RoutingError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| RoutingError::Api {
                status: 0,
                message: "Semaphore closed".to_string(),
            })?;

        let response = self
            .http
            .get(self.route_url(from, to))
            .query(&[("overview", "full"), ("geometries", "geojson")])
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(RoutingError::RateLimited);
        }

        let body = response.text().await?;

        // OSRM reports NoRoute with a 400 status but a well-formed body.
        let parsed: Result<OsrmResponse, _> = serde_json::from_str(&body);
        match parsed {
            Ok(parsed) => convert_response(parsed),
            Err(_) if !status.is_success() => Err(RoutingError::Api {
                status: status.as_u16(),
                message: body,
            }),
            Err(e) => Err(RoutingError::Json {
                message: e.to_string(),
                body: Some(body.chars().take(500).collect()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = OsrmConfig::new();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.profile, "driving");
        assert_eq!(config.max_concurrent, DEFAULT_MAX_CONCURRENT);
    }

    #[test]
    fn route_url_uses_lon_lat_order() {
        let client = OsrmClient::new(OsrmConfig::new().with_base_url("http://osrm.local/")).unwrap();
        let from = Coordinates::new(10.3106, 123.8931).unwrap();
        let to = Coordinates::new(10.3114, 123.9181).unwrap();
        assert_eq!(
            client.route_url(from, to),
            "http://osrm.local/route/v1/driving/123.8931,10.3106;123.9181,10.3114"
        );
    }
}
