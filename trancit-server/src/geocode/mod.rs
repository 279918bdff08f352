//! Geocoding: turning typed addresses into coordinates.
//!
//! Key characteristics:
//! - The geocoder is reached through the [`Geocoder`] trait, so the
//!   resolver, the cache, and tests can all stand in for the real service
//! - User input is resolved through a fallback chain of progressively less
//!   specific queries, ending in a fixed city-level position
//! - Coordinates typed directly (`"10.31, 123.89"`) never hit the network
//! - Autocomplete returns several ranked candidates once at least
//!   [`MIN_SUGGEST_CHARS`] characters are typed

mod client;
mod error;
mod place;
mod query;
mod resolver;

pub use client::{NominatimClient, NominatimConfig};
pub use error::GeocodeError;
pub use place::{Geocoder, Place};
pub use query::{CITY_SUFFIX, LOCALITIES, Locality, detect_locality, normalize};
pub use resolver::{
    AddressResolver, DEFAULT_SUGGESTIONS, MAX_SUGGESTIONS, MIN_SUGGEST_CHARS, Resolution,
    ResolutionSource, ResolveError,
};

#[cfg(test)]
pub(crate) use resolver::testing;
