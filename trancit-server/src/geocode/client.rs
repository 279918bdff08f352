//! Nominatim HTTP client.
//!
//! Talks to any Nominatim-compatible service (the public OpenStreetMap
//! instance by default). The public instance requires an identifying
//! `User-Agent` and allows roughly one request per second, so concurrency
//! is bounded by a semaphore.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use tokio::sync::Semaphore;

use crate::domain::Coordinates;

use super::error::GeocodeError;
use super::place::{Geocoder, Place};

/// Default base URL for Nominatim.
const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Default identifying user agent.
const DEFAULT_USER_AGENT: &str = "TranCIT/0.1 (Cebu route planner)";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 2;

/// Configuration for the Nominatim client.
#[derive(Debug, Clone)]
pub struct NominatimConfig {
    /// Base URL for the API
    pub base_url: String,
    /// User-Agent header sent with every request
    pub user_agent: String,
    /// Restrict results to these ISO country codes (comma separated)
    pub country_codes: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl NominatimConfig {
    /// Create a config for the public instance, limited to the Philippines.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            country_codes: "ph".to_string(),
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

impl Default for NominatimConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// One entry of a `/search` response.
#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
}

/// A `/reverse` response. Misses come back as `{"error": "..."}`.
#[derive(Debug, Deserialize)]
struct ReverseHit {
    lat: Option<String>,
    lon: Option<String>,
    #[serde(default)]
    display_name: String,
    error: Option<String>,
}

/// Nominatim geocoding client.
#[derive(Debug, Clone)]
pub struct NominatimClient {
    http: reqwest::Client,
    base_url: String,
    country_codes: String,
    semaphore: Arc<Semaphore>,
}

impl NominatimClient {
    /// Create a new client with the given configuration.
    pub fn new(config: NominatimConfig) -> Result<Self, GeocodeError> {
        let mut headers = HeaderMap::new();
        let agent = HeaderValue::from_str(&config.user_agent).map_err(|_| GeocodeError::Api {
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
            country_codes: config.country_codes,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
        })
    }

    async fn search_places(&self, query: &str, limit: usize) -> Result<Vec<Place>, GeocodeError> {
        let url = format!("{}/search", self.base_url);
        let mut params = vec![
            ("q", query.to_string()),
            ("format", "json".to_string()),
            ("limit", limit.to_string()),
        ];
        if !self.country_codes.is_empty() {
            params.push(("countrycodes", self.country_codes.clone()));
        }

        let body = self.get_text(&url, &params).await?;
        parse_search_body(&body)
    }

    /// Issue a GET and return the body of a successful response.
    async fn get_text(&self, url: &str, query: &[(&str, String)]) -> Result<String, GeocodeError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| GeocodeError::Api {
                status: 0,
                message: "Semaphore closed".to_string(),
            })?;

        let response = self.http.get(url).query(query).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodeError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeocodeError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl Geocoder for NominatimClient {
    async fn search(&self, query: &str) -> Result<Option<Place>, GeocodeError> {
        Ok(self.search_places(query, 1).await?.into_iter().next())
    }

    async fn suggest(&self, query: &str, limit: usize) -> Result<Vec<Place>, GeocodeError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        self.search_places(query, limit).await
    }

    async fn reverse(&self, at: Coordinates) -> Result<Option<Place>, GeocodeError> {
        let url = format!("{}/reverse", self.base_url);
        let params = [
            ("lat", at.lat().to_string()),
            ("lon", at.lon().to_string()),
            ("format", "jsonv2".to_string()),
        ];

        let body = self.get_text(&url, &params).await?;
        parse_reverse_body(&body)
    }
}

fn parse_coordinates(lat: &str, lon: &str) -> Result<Coordinates, GeocodeError> {
    let lat: f64 = lat.trim().parse().map_err(|_| GeocodeError::Json {
        message: format!("invalid latitude {lat:?}"),
    })?;
    let lon: f64 = lon.trim().parse().map_err(|_| GeocodeError::Json {
        message: format!("invalid longitude {lon:?}"),
    })?;
    Coordinates::new(lat, lon).map_err(|e| GeocodeError::Json {
        message: e.to_string(),
    })
}

/// Parse a `/search` body, keeping the service's ranking.
fn parse_search_body(body: &str) -> Result<Vec<Place>, GeocodeError> {
    let hits: Vec<SearchHit> = serde_json::from_str(body).map_err(|e| GeocodeError::Json {
        message: e.to_string(),
    })?;

    hits.into_iter()
        .map(|hit| {
            Ok(Place {
                coordinates: parse_coordinates(&hit.lat, &hit.lon)?,
                display_name: hit.display_name,
            })
        })
        .collect()
}

/// Parse a `/reverse` body.
fn parse_reverse_body(body: &str) -> Result<Option<Place>, GeocodeError> {
    let hit: ReverseHit = serde_json::from_str(body).map_err(|e| GeocodeError::Json {
        message: e.to_string(),
    })?;

    if hit.error.is_some() {
        return Ok(None);
    }

    match (hit.lat, hit.lon) {
        (Some(lat), Some(lon)) => Ok(Some(Place {
            coordinates: parse_coordinates(&lat, &lon)?,
            display_name: hit.display_name,
        })),
        _ => Ok(None),
    }
}
