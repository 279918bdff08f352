//! Geocoder seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::Coordinates;

use super::error::GeocodeError;

/// A geocoded location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub coordinates: Coordinates,
    pub display_name: String,
}

/// A forward and reverse geocoding service.
///
/// This abstraction allows the resolver to be tested with mock data and
/// lets the cache wrap any implementation.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Look up a free-text query. `Ok(None)` means the service found nothing.
    async fn search(&self, query: &str) -> Result<Option<Place>, GeocodeError>;

    /// Up to `limit` candidates for a partly typed query, best first.
    async fn suggest(&self, query: &str, limit: usize) -> Result<Vec<Place>, GeocodeError>;

    /// Describe the place at the given coordinates.
    async fn reverse(&self, at: Coordinates) -> Result<Option<Place>, GeocodeError>;
}
