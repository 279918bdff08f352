//! Route planning: resolve, route, price.

use std::sync::Arc;

use futures::future::try_join;
use serde::Serialize;
use tracing::{info, warn};

use crate::domain::{Coordinates, JeepneyCode, Kilometers, Minutes, Money, TransportMode};
use crate::fare::{FareBreakdown, FareTable};
use crate::geocode::{AddressResolver, Place, Resolution, ResolutionSource, ResolveError};
use crate::routing::RouteProvider;

/// Which end of the trip an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Origin,
    Destination,
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Endpoint::Origin => f.write_str("origin"),
            Endpoint::Destination => f.write_str("destination"),
        }
    }
}

/// Error from route planning.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// Invalid plan request
    #[error("invalid plan request: {0}")]
    InvalidRequest(String),

    /// One of the endpoints could not be resolved
    #[error("could not resolve {endpoint}: {source}")]
    Resolve {
        endpoint: Endpoint,
        #[source]
        source: ResolveError,
    },
}

/// One end of a trip as submitted.
#[derive(Debug, Clone, Default)]
pub struct PlaceInput {
    /// Free text typed by the user.
    pub text: String,

    /// Known coordinates (e.g. from device location) that skip geocoding.
    pub coordinates: Option<Coordinates>,
}

impl PlaceInput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            coordinates: None,
        }
    }
}

/// Request for a route plan.
#[derive(Debug, Clone, Default)]
pub struct PlanRequest {
    pub origin: PlaceInput,
    pub destination: PlaceInput,
    pub mode: TransportMode,
    pub code: Option<JeepneyCode>,
    pub notes: String,
}

impl PlanRequest {
    /// Validate the request.
    pub fn validate(&self) -> Result<(), PlanError> {
        for (endpoint, input) in [
            (Endpoint::Origin, &self.origin),
            (Endpoint::Destination, &self.destination),
        ] {
            if input.text.trim().is_empty() && input.coordinates.is_none() {
                return Err(PlanError::InvalidRequest(format!("{endpoint} is required")));
            }
        }
        Ok(())
    }
}

/// A finished plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutePlan {
    pub origin: Resolution,
    pub destination: Resolution,
    pub mode: TransportMode,
    pub code: Option<JeepneyCode>,
    pub distance: Option<Kilometers>,
    pub duration: Option<Minutes>,
    pub fare: Option<Money>,
    pub fare_breakdown: Option<FareBreakdown>,
    pub path: Vec<Coordinates>,
    pub notes: String,
    /// Set when the route could not be fetched; the plan has no fare then.
    pub warning: Option<String>,
}

/// Plans routes: geocode both ends, fetch a driving route, price it.
#[derive(Clone)]
pub struct RoutePlanner {
    resolver: AddressResolver,
    router: Arc<dyn RouteProvider>,
    fares: Arc<FareTable>,
}

impl RoutePlanner {
    /// Create a new planner.
    pub fn new(resolver: AddressResolver, router: Arc<dyn RouteProvider>, fares: FareTable) -> Self {
        Self {
            resolver,
            router,
            fares: Arc::new(fares),
        }
    }

    /// The address resolver.
    pub fn resolver(&self) -> &AddressResolver {
        &self.resolver
    }

    /// The fare table.
    pub fn fares(&self) -> &FareTable {
        &self.fares
    }

    async fn resolve_endpoint(
        &self,
        endpoint: Endpoint,
        input: &PlaceInput,
    ) -> Result<Resolution, PlanError> {
        if let Some(coordinates) = input.coordinates {
            let text = input.text.trim();
            let display_name = if text.is_empty() {
                coordinates.to_string()
            } else {
                text.to_string()
            };
            return Ok(Resolution {
                input: text.to_string(),
                place: Place {
                    coordinates,
                    display_name,
                },
                source: ResolutionSource::Coordinates,
            });
        }

        self.resolver
            .resolve(&input.text)
            .await
            .map_err(|source| PlanError::Resolve { endpoint, source })
    }

    /// Plan a route.
    ///
    /// A routing failure is not an error: the plan comes back without a
    /// route, distance, or fare, and carries a warning instead.
    pub async fn plan(&self, request: PlanRequest) -> Result<RoutePlan, PlanError> {
        request.validate()?;

        let (origin, destination) = try_join(
            self.resolve_endpoint(Endpoint::Origin, &request.origin),
            self.resolve_endpoint(Endpoint::Destination, &request.destination),
        )
        .await?;

        let from = origin.place.coordinates;
        let to = destination.place.coordinates;

        let (route, warning) = match self.router.driving_route(from, to).await {
            Ok(Some(route)) => (Some(route), None),
            Ok(None) => (None, Some("no driving route between these places".to_string())),
            Err(e) => {
                warn!(error = %e, "routing service failed");
                (None, Some(format!("routing service unavailable: {e}")))
            }
        };

        let distance = route.as_ref().map(|r| r.distance);
        let duration = route.as_ref().map(|r| r.duration);
        let fare_breakdown = self.fares.breakdown(request.mode, distance, duration);

        let code = match request.mode {
            TransportMode::Jeepney => request.code,
            _ => None,
        };

        info!(
            origin = %origin.place.display_name,
            destination = %destination.place.display_name,
            mode = %request.mode,
            distance = ?distance,
            fare = ?fare_breakdown.map(|b| b.total),
            "planned route"
        );

        Ok(RoutePlan {
            origin,
            destination,
            mode: request.mode,
            code,
            distance,
            duration,
            fare: fare_breakdown.map(|b| b.total),
            fare_breakdown,
            path: route.map(|r| r.path).unwrap_or_default(),
            notes: request.notes.trim().to_string(),
            warning,
        })
    }
}

#[cfg(test)]
#[path = "plan_tests.rs"]
mod tests;
