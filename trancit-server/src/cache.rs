//! Caching layer for geocoding and routing responses.
//!
//! Both external services are rate limited, and users tend to ask for the
//! same handful of places. Geocoder answers are cached by normalized query
//! text (plus the limit, for autocomplete candidates); routes are cached by endpoint coordinates rounded to five decimal
//! places (about a meter), which bounds cache cardinality.
//!
//! Definite answers, including "nothing found", are cached. Service errors
//! are never cached.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache as MokaCache;
use tracing::debug;

use crate::domain::Coordinates;
use crate::geocode::{GeocodeError, Geocoder, Place, normalize};
use crate::routing::{DrivingRoute, RouteProvider, RoutingError};

/// Decimal places kept when keying by coordinates.
const GRID_PLACES: i32 = 5;

/// Cache key for routes: rounded (from, to) coordinates.
type RouteKey = ((i64, i64), (i64, i64));

/// Configuration for the caches.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for geocoder answers.
    pub geocode_ttl: Duration,

    /// Maximum number of cached geocoder answers.
    pub geocode_capacity: u64,

    /// TTL for routes.
    pub route_ttl: Duration,

    /// Maximum number of cached routes.
    pub route_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            geocode_ttl: Duration::from_secs(24 * 60 * 60),
            geocode_capacity: 10_000,
            route_ttl: Duration::from_secs(60 * 60),
            route_capacity: 2_000,
        }
    }
}

/// Geocoder with caching.
///
/// Wraps any `Geocoder` and is itself a `Geocoder`.
pub struct CachedGeocoder {
    inner: Arc<dyn Geocoder>,
    searches: MokaCache<String, Option<Place>>,
    suggestions: MokaCache<(String, usize), Arc<Vec<Place>>>,
    reverses: MokaCache<(i64, i64), Option<Place>>,
}

impl CachedGeocoder {
    /// Create a new cached geocoder.
    pub fn new(inner: Arc<dyn Geocoder>, config: &CacheConfig) -> Self {
        let searches = MokaCache::builder()
            .time_to_live(config.geocode_ttl)
            .max_capacity(config.geocode_capacity)
            .build();

        let suggestions = MokaCache::builder()
            .time_to_live(config.geocode_ttl)
            .max_capacity(config.geocode_capacity)
            .build();

        let reverses = MokaCache::builder()
            .time_to_live(config.geocode_ttl)
            .max_capacity(config.geocode_capacity)
            .build();

        Self {
            inner,
            searches,
            suggestions,
            reverses,
        }
    }
}

#[async_trait]
impl Geocoder for CachedGeocoder {
    async fn search(&self, query: &str) -> Result<Option<Place>, GeocodeError> {
        let key = normalize(query);

        if let Some(cached) = self.searches.get(&key).await {
            debug!(%key, hit = cached.is_some(), "geocode cache hit");
            return Ok(cached);
        }

        let answer = self.inner.search(query).await?;
        self.searches.insert(key, answer.clone()).await;
        Ok(answer)
    }

    async fn suggest(&self, query: &str, limit: usize) -> Result<Vec<Place>, GeocodeError> {
        let key = (normalize(query), limit);

        if let Some(cached) = self.suggestions.get(&key).await {
            debug!(query = %key.0, limit, "suggestion cache hit");
            return Ok((*cached).clone());
        }

        let places = self.inner.suggest(query, limit).await?;
        self.suggestions.insert(key, Arc::new(places.clone())).await;
        Ok(places)
    }

    async fn reverse(&self, at: Coordinates) -> Result<Option<Place>, GeocodeError> {
        let key = at.grid_key(GRID_PLACES);

        if let Some(cached) = self.reverses.get(&key).await {
            return Ok(cached);
        }

        let answer = self.inner.reverse(at).await?;
        self.reverses.insert(key, answer.clone()).await;
        Ok(answer)
    }
}

/// Route provider with caching.
pub struct CachedRouteProvider {
    inner: Arc<dyn RouteProvider>,
    routes: MokaCache<RouteKey, Option<Arc<DrivingRoute>>>,
}

impl CachedRouteProvider {
    /// Create a new cached route provider.
    pub fn new(inner: Arc<dyn RouteProvider>, config: &CacheConfig) -> Self {
        let routes = MokaCache::builder()
            .time_to_live(config.route_ttl)
            .max_capacity(config.route_capacity)
            .build();

        Self { inner, routes }
    }
}

#[async_trait]
impl RouteProvider for CachedRouteProvider {
    async fn driving_route(
        &self,
        from: Coordinates,
        to: Coordinates,
    ) -> Result<Option<DrivingRoute>, RoutingError> {
        let key = (from.grid_key(GRID_PLACES), to.grid_key(GRID_PLACES));

        if let Some(cached) = self.routes.get(&key).await {
            debug!(?key, "route cache hit");
            return Ok(cached.map(|r| (*r).clone()));
        }

        let route = self.inner.driving_route(from, to).await?;
        self.routes
            .insert(key, route.clone().map(Arc::new))
            .await;
        Ok(route)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::domain::{Kilometers, Minutes};

    /// Geocoder that counts calls and fails on demand.
    #[derive(Default)]
    struct CountingGeocoder {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl Geocoder for CountingGeocoder {
        async fn search(&self, query: &str) -> Result<Option<Place>, GeocodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(GeocodeError::RateLimited);
            }
            if query.contains("nowhere") {
                return Ok(None);
            }
            Ok(Some(Place {
                coordinates: Coordinates::new(10.3, 123.9).unwrap(),
                display_name: query.to_string(),
            }))
        }

        async fn suggest(&self, query: &str, limit: usize) -> Result<Vec<Place>, GeocodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(GeocodeError::RateLimited);
            }
            Ok((0..limit)
                .map(|i| Place {
                    coordinates: Coordinates::new(10.3, 123.9).unwrap(),
                    display_name: format!("{query} {i}"),
                })
                .collect())
        }

        async fn reverse(&self, at: Coordinates) -> Result<Option<Place>, GeocodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Some(Place {
                coordinates: at,
                display_name: "somewhere".to_string(),
            }))
        }
    }

    #[derive(Default)]
    struct CountingRouter {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RouteProvider for CountingRouter {
        async fn driving_route(
            &self,
            from: Coordinates,
            to: Coordinates,
        ) -> Result<Option<DrivingRoute>, RoutingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Some(DrivingRoute {
                distance: Kilometers::from_hundredths(500),
                duration: Minutes::from_hundredths(1200),
                path: vec![from, to],
            }))
        }
    }

    #[test]
    fn default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.geocode_ttl, Duration::from_secs(86_400));
        assert_eq!(config.route_ttl, Duration::from_secs(3_600));
        assert_eq!(config.geocode_capacity, 10_000);
        assert_eq!(config.route_capacity, 2_000);
    }

    #[tokio::test]
    async fn search_is_cached_by_normalized_text() {
        let inner = Arc::new(CountingGeocoder::default());
        let cached = CachedGeocoder::new(inner.clone(), &CacheConfig::default());

        let a = cached.search("SM City  Cebu").await.unwrap();
        let b = cached.search("  sm city cebu").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn misses_are_cached() {
        let inner = Arc::new(CountingGeocoder::default());
        let cached = CachedGeocoder::new(inner.clone(), &CacheConfig::default());

        assert_eq!(cached.search("nowhere").await.unwrap(), None);
        assert_eq!(cached.search("nowhere").await.unwrap(), None);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let inner = Arc::new(CountingGeocoder {
            fail: true,
            ..Default::default()
        });
        let cached = CachedGeocoder::new(inner.clone(), &CacheConfig::default());

        assert!(cached.search("Ayala").await.is_err());
        assert!(cached.search("Ayala").await.is_err());
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn suggestions_are_cached_per_limit() {
        let inner = Arc::new(CountingGeocoder::default());
        let cached = CachedGeocoder::new(inner.clone(), &CacheConfig::default());

        let a = cached.suggest("Ayala", 5).await.unwrap();
        let b = cached.suggest(" AYALA ", 5).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 5);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);

        assert_eq!(cached.suggest("ayala", 2).await.unwrap().len(), 2);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn suggestion_errors_are_not_cached() {
        let inner = Arc::new(CountingGeocoder {
            fail: true,
            ..Default::default()
        });
        let cached = CachedGeocoder::new(inner.clone(), &CacheConfig::default());

        assert!(cached.suggest("Ayala", 5).await.is_err());
        assert!(cached.suggest("Ayala", 5).await.is_err());
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn reverse_is_cached_by_grid() {
        let inner = Arc::new(CountingGeocoder::default());
        let cached = CachedGeocoder::new(inner.clone(), &CacheConfig::default());

        let a = Coordinates::new(10.315701, 123.885401).unwrap();
        let b = Coordinates::new(10.315704, 123.885399).unwrap();
        cached.reverse(a).await.unwrap();
        cached.reverse(b).await.unwrap();
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn routes_are_cached() {
        let inner = Arc::new(CountingRouter::default());
        let cached = CachedRouteProvider::new(inner.clone(), &CacheConfig::default());

        let from = Coordinates::new(10.31, 123.89).unwrap();
        let to = Coordinates::new(10.33, 123.91).unwrap();
        let first = cached.driving_route(from, to).await.unwrap();
        let second = cached.driving_route(from, to).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);

        // Direction matters.
        cached.driving_route(to, from).await.unwrap();
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }
}
