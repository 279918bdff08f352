//! OSRM response types and conversion to domain routes.

use serde::{Deserialize, Serialize};

use crate::domain::{Coordinates, Kilometers, Minutes};

use super::error::RoutingError;

/// Top-level `/route` response.
#[derive(Debug, Deserialize)]
pub struct OsrmResponse {
    pub code: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub routes: Vec<OsrmRoute>,
}

/// One route alternative. Distance in meters, duration in seconds.
#[derive(Debug, Deserialize)]
pub struct OsrmRoute {
    pub distance: f64,
    pub duration: f64,
    pub geometry: OsrmGeometry,
}

/// GeoJSON line string, `[lon, lat]` pairs.
#[derive(Debug, Deserialize)]
pub struct OsrmGeometry {
    pub coordinates: Vec<Vec<f64>>,
}

/// A driving route between two points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrivingRoute {
    pub distance: Kilometers,
    pub duration: Minutes,
    pub path: Vec<Coordinates>,
}

/// Convert an OSRM response into the best route, if any.
///
/// `NoRoute` and an empty route list are `Ok(None)`; other non-`Ok` codes
/// are API errors.
pub fn convert_response(response: OsrmResponse) -> Result<Option<DrivingRoute>, RoutingError> {
    match response.code.as_str() {
        "Ok" => {}
        "NoRoute" | "NoSegment" => return Ok(None),
        other => {
            return Err(RoutingError::Api {
                status: 200,
                message: response
                    .message
                    .unwrap_or_else(|| other.to_string()),
            });
        }
    }

    let Some(route) = response.routes.into_iter().next() else {
        return Ok(None);
    };

    let invalid = |e: crate::domain::DomainError| RoutingError::Json {
        message: e.to_string(),
        body: None,
    };

    let distance = Kilometers::from_meters(route.distance).map_err(invalid)?;
    let duration = Minutes::from_seconds(route.duration).map_err(invalid)?;

    let path = route
        .geometry
        .coordinates
        .iter()
        .map(|pair| match pair.as_slice() {
            [lon, lat, ..] => Coordinates::new(*lat, *lon).map_err(invalid),
            _ => Err(RoutingError::Json {
                message: "geometry point needs two values".to_string(),
                body: None,
            }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(DrivingRoute {
        distance,
        duration,
        path,
    }))
}
