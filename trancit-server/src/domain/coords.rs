//! Geographic coordinates.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::DomainError;

/// A WGS84 point. Latitude and longitude are finite and in range.
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinates")]
pub struct Coordinates {
    lat: f64,
    lon: f64,
}

#[derive(Deserialize)]
struct RawCoordinates {
    lat: f64,
    lon: f64,
}

impl TryFrom<RawCoordinates> for Coordinates {
    type Error = DomainError;

    fn try_from(raw: RawCoordinates) -> Result<Self, Self::Error> {
        Coordinates::new(raw.lat, raw.lon)
    }
}

impl Coordinates {
    /// Create a point, validating ranges.
    pub fn new(lat: f64, lon: f64) -> Result<Self, DomainError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(DomainError::InvalidCoordinates("latitude out of range"));
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(DomainError::InvalidCoordinates("longitude out of range"));
        }
        Ok(Self { lat, lon })
    }

    /// Parse a `"lat, lon"` pair as typed into an address box.
    ///
    /// Both parts must be decimal numbers with a decimal point, so
    /// `"12, 34"` reads as an address rather than a position. Returns `None`
    /// for anything else so callers can fall through to geocoding.
    pub fn parse_pair(s: &str) -> Option<Self> {
        let (lat, lon) = s.split_once(',')?;
        Self::new(parse_decimal(lat)?, parse_decimal(lon)?).ok()
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Coordinates scaled to integers at the given number of decimal places.
    ///
    /// Used as a hashable key where nearby points should collide.
    pub fn grid_key(&self, places: i32) -> (i64, i64) {
        let scale = 10f64.powi(places);
        (
            (self.lat * scale).round() as i64,
            (self.lon * scale).round() as i64,
        )
    }
}

/// A signed decimal such as `10.31` or `-.5`; no exponent, no bare integers.
fn parse_decimal(s: &str) -> Option<f64> {
    let s = s.trim();
    let digits = s.strip_prefix(['-', '+']).unwrap_or(s);
    let (whole, frac) = digits.split_once('.')?;
    let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
    if whole.len() + frac.len() == 0 || !all_digits(whole) || !all_digits(frac) {
        return None;
    }
    s.parse().ok()
}

impl fmt::Debug for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Coordinates({:.6}, {:.6})", self.lat, self.lon)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lat, self.lon)
    }
}
