//! Address resolution with a fallback chain.
//!
//! Free text typed by users is often too specific (house numbers, zip
//! codes) or too noisy for the geocoder. Resolution tries progressively
//! less specific queries and finally falls back to a fixed city-level
//! position when a known locality is mentioned.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::Coordinates;

use super::error::GeocodeError;
use super::place::{Geocoder, Place};
use super::query::{detect_locality, leading_segments, normalize, strip_numeric_tokens, with_city};

/// Shortest input, in characters, worth asking for autocomplete candidates.
pub const MIN_SUGGEST_CHARS: usize = 3;

/// Candidates returned when the caller doesn't ask for a number.
pub const DEFAULT_SUGGESTIONS: usize = 5;

/// Most candidates a single request may ask for.
pub const MAX_SUGGESTIONS: usize = 10;

/// Which step of the chain produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    /// The input was already a coordinate pair.
    Coordinates,
    /// Full text with the city suffix.
    FullText,
    /// Text with numeric tokens removed.
    WithoutNumbers,
    /// First two comma-separated segments.
    LeadingSegments,
    /// Fixed position of a locality named in the text.
    Locality,
}

/// A resolved address.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub input: String,
    pub place: Place,
    pub source: ResolutionSource,
}

/// Error from address resolution.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// Nothing to resolve
    #[error("address is empty")]
    Empty,

    /// Too little typed to autocomplete
    #[error("query must be at least {min} characters")]
    TooShort { min: usize },

    /// Every step ran and none produced a position
    #[error("could not find a location for {input:?}")]
    NotFound { input: String },

    /// Every geocoder attempt failed and no locality fallback applied
    #[error("geocoding service unavailable while resolving {input:?}: {source}")]
    Unavailable {
        input: String,
        #[source]
        source: GeocodeError,
    },
}

/// Build the ordered, de-duplicated geocoder queries for some input.
fn candidate_queries(text: &str) -> Vec<(ResolutionSource, String)> {
    let mut candidates = vec![(ResolutionSource::FullText, with_city(text))];

    let stripped = strip_numeric_tokens(text);
    if !stripped.is_empty() {
        candidates.push((ResolutionSource::WithoutNumbers, with_city(&stripped)));
    }

    if let Some(leading) = leading_segments(text, 2) {
        candidates.push((ResolutionSource::LeadingSegments, with_city(&leading)));
    }

    let mut seen = Vec::new();
    candidates.retain(|(_, q)| {
        let key = normalize(q);
        if seen.contains(&key) {
            false
        } else {
            seen.push(key);
            true
        }
    });
    candidates
}

/// Resolves free-text addresses to coordinates.
#[derive(Clone)]
pub struct AddressResolver {
    geocoder: Arc<dyn Geocoder>,
}

impl AddressResolver {
    /// Create a resolver over any geocoder (usually a cached one).
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self { geocoder }
    }

    /// The underlying geocoder, for reverse lookups.
    pub fn geocoder(&self) -> &Arc<dyn Geocoder> {
        &self.geocoder
    }

    /// Resolve free text to a position.
    ///
    /// Each step runs only if the previous one found nothing or failed.
    pub async fn resolve(&self, input: &str) -> Result<Resolution, ResolveError> {
        let text = input.trim();
        if text.is_empty() {
            return Err(ResolveError::Empty);
        }

        if let Some(coordinates) = Coordinates::parse_pair(text) {
            return Ok(Resolution {
                input: text.to_string(),
                place: Place {
                    coordinates,
                    display_name: coordinates.to_string(),
                },
                source: ResolutionSource::Coordinates,
            });
        }

        let mut last_error = None;
        let mut answered = false;

        for (source, query) in candidate_queries(text) {
            debug!(%query, ?source, "geocoding attempt");
            match self.geocoder.search(&query).await {
                Ok(Some(place)) => {
                    return Ok(Resolution {
                        input: text.to_string(),
                        place,
                        source,
                    });
                }
                Ok(None) => answered = true,
                Err(e) => {
                    warn!(%query, error = %e, "geocoder failed, trying next fallback");
                    last_error = Some(e);
                }
            }
        }

        if let Some(locality) = detect_locality(text)
            && let Ok(coordinates) = Coordinates::new(locality.lat, locality.lon)
        {
            debug!(input = %text, locality = locality.name, "using locality fallback");
            return Ok(Resolution {
                input: text.to_string(),
                place: Place {
                    coordinates,
                    display_name: locality.name.to_string(),
                },
                source: ResolutionSource::Locality,
            });
        }

        match last_error {
            Some(source) if !answered => Err(ResolveError::Unavailable {
                input: text.to_string(),
                source,
            }),
            _ => Err(ResolveError::NotFound {
                input: text.to_string(),
            }),
        }
    }

    /// Autocomplete candidates for partly typed text, searched within the
    /// city. `limit` is clamped to `1..=MAX_SUGGESTIONS`.
    pub async fn suggest(&self, input: &str, limit: usize) -> Result<Vec<Place>, ResolveError> {
        let text = input.trim();
        if text.chars().count() < MIN_SUGGEST_CHARS {
            return Err(ResolveError::TooShort {
                min: MIN_SUGGEST_CHARS,
            });
        }

        let limit = limit.clamp(1, MAX_SUGGESTIONS);
        self.geocoder
            .suggest(&with_city(text), limit)
            .await
            .map_err(|source| {
                warn!(input = %text, error = %source, "autocomplete failed");
                ResolveError::Unavailable {
                    input: text.to_string(),
                    source,
                }
            })
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{MockGeocoder, Scripted};
    use super::*;

    fn resolver(mock: MockGeocoder) -> (AddressResolver, Arc<MockGeocoder>) {
        let mock = Arc::new(mock);
        (AddressResolver::new(mock.clone()), mock)
    }

    #[test]
    fn candidates_in_order() {
        let queries = candidate_queries("123 Colon St, Parian, Cebu");
        assert_eq!(
            queries,
            vec![
                (
                    ResolutionSource::FullText,
                    "123 Colon St, Parian, Cebu, Cebu City, Philippines".to_string()
                ),
                (
                    ResolutionSource::WithoutNumbers,
                    "Colon St, Parian, Cebu, Cebu City, Philippines".to_string()
                ),
                (
                    ResolutionSource::LeadingSegments,
                    "123 Colon St, Parian, Cebu City, Philippines".to_string()
                ),
            ]
        );
    }

    #[test]
    fn candidates_skip_duplicates() {
        let queries = candidate_queries("Ayala Center");
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].0, ResolutionSource::FullText);
    }

    #[tokio::test]
    async fn first_hit_wins() {
        let (resolver, mock) = resolver(
            MockGeocoder::default().with(
                "Ayala Center, Cebu City, Philippines",
                Scripted::Hit(10.318, 123.905),
            ),
        );

        let r = resolver.resolve("  Ayala Center ").await.unwrap();
        assert_eq!(r.source, ResolutionSource::FullText);
        assert_eq!(r.input, "Ayala Center");
        assert_eq!(mock.calls().len(), 1);
    }

    #[tokio::test]
    async fn falls_back_to_stripped_numbers() {
        let (resolver, mock) = resolver(MockGeocoder::default().with(
            "Osmeña Blvd, Cebu City, Philippines",
            Scripted::Hit(10.30, 123.89),
        ));

        let r = resolver.resolve("123 Osmeña Blvd").await.unwrap();
        assert_eq!(r.source, ResolutionSource::WithoutNumbers);
        assert_eq!(
            mock.calls(),
            vec![
                "123 Osmeña Blvd, Cebu City, Philippines".to_string(),
                "Osmeña Blvd, Cebu City, Philippines".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn errors_move_on_to_next_step() {
        let (resolver, _) = resolver(
            MockGeocoder::default()
                .with("Colon St, Parian, Lahug, Cebu City, Philippines", Scripted::Fail)
                .with("Colon St, Parian, Cebu City, Philippines", Scripted::Hit(10.29, 123.90)),
        );

        let r = resolver.resolve("Colon St, Parian, Lahug").await.unwrap();
        assert_eq!(r.source, ResolutionSource::LeadingSegments);
    }

    #[tokio::test]
    async fn locality_fallback_when_geocoder_finds_nothing() {
        let (resolver, mock) = resolver(MockGeocoder::default());

        let r = resolver.resolve("Blk 9, Somewhere, Mandaue").await.unwrap();
        assert_eq!(r.source, ResolutionSource::Locality);
        assert_eq!(r.place.display_name, "Mandaue City");
        assert_eq!(mock.calls().len(), 3);
    }

    #[tokio::test]
    async fn coordinates_skip_geocoder() {
        let (resolver, mock) = resolver(MockGeocoder::default());

        let r = resolver.resolve("10.3157, 123.8854").await.unwrap();
        assert_eq!(r.source, ResolutionSource::Coordinates);
        assert_eq!(r.place.coordinates.lat(), 10.3157);
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn empty_input_is_rejected() {
        let (resolver, _) = resolver(MockGeocoder::default());
        assert!(matches!(resolver.resolve("   ").await, Err(ResolveError::Empty)));
    }

    #[tokio::test]
    async fn not_found_without_locality() {
        let (resolver, _) = resolver(MockGeocoder::default());
        let err = resolver.resolve("Nowhere Street").await.unwrap_err();
        assert!(matches!(err, ResolveError::NotFound { .. }));
    }

    #[tokio::test]
    async fn unavailable_when_every_attempt_errors() {
        let (resolver, _) = resolver(
            MockGeocoder::default().with("Nowhere Street, Cebu City, Philippines", Scripted::Fail),
        );
        let err = resolver.resolve("Nowhere Street").await.unwrap_err();
        assert!(matches!(err, ResolveError::Unavailable { .. }));
    }

    #[tokio::test]
    async fn locality_rescues_service_outage() {
        let (resolver, _) = resolver(
            MockGeocoder::default()
                .with("Talisay Market, Cebu City, Philippines", Scripted::Fail),
        );
        let r = resolver.resolve("Talisay Market").await.unwrap();
        assert_eq!(r.source, ResolutionSource::Locality);
        assert_eq!(r.place.display_name, "Talisay City");
    }

    #[tokio::test]
    async fn suggest_searches_within_city() {
        let (resolver, mock) = resolver(
            MockGeocoder::default()
                .with("Ayala, Cebu City, Philippines", Scripted::Hit(10.318, 123.905)),
        );

        let places = resolver.suggest(" Ayala ", DEFAULT_SUGGESTIONS).await.unwrap();
        assert_eq!(places.len(), DEFAULT_SUGGESTIONS);
        assert_eq!(mock.calls(), vec!["Ayala, Cebu City, Philippines".to_string()]);

        assert_eq!(resolver.suggest("Ayala", 50).await.unwrap().len(), MAX_SUGGESTIONS);
        assert_eq!(resolver.suggest("Ayala", 0).await.unwrap().len(), 1);
        assert!(resolver.suggest("Atlantis", 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn suggest_needs_three_characters() {
        let (resolver, mock) = resolver(MockGeocoder::default());

        for short in ["", "  ", "SM", " ñu "] {
            assert!(matches!(
                resolver.suggest(short, 5).await,
                Err(ResolveError::TooShort { min: 3 })
            ));
        }
        assert!(mock.calls().is_empty());

        // Characters, not bytes.
        assert!(resolver.suggest("ñuñ", 5).await.is_ok());
    }

    #[tokio::test]
    async fn suggest_reports_outage() {
        let (resolver, _) = resolver(
            MockGeocoder::default().with("Colon, Cebu City, Philippines", Scripted::Fail),
        );
        assert!(matches!(
            resolver.suggest("Colon", 5).await,
            Err(ResolveError::Unavailable { .. })
        ));
    }
}
