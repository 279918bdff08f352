//! Data transfer objects for web requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::accounts::User;
use crate::domain::{Coordinates, JeepneyCode, Kilometers, Minutes, Money, TransportMode};
use crate::fare::FareBreakdown;
use crate::geocode::Place;
use crate::planner::{PlaceInput, PlanRequest, RoutePlan};
use crate::saved::{RouteId, RouteKind, SavedRoute};

/// Error body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// `GET /api/jeepney-codes`
#[derive(Debug, Serialize)]
pub struct JeepneyCodesResponse {
    pub codes: Vec<&'static str>,
}

/// `GET /api/geocode?q=`
#[derive(Debug, Deserialize)]
pub struct GeocodeQuery {
    pub q: String,
}

/// `GET /api/geocode/suggest?q=&limit=`
#[derive(Debug, Deserialize)]
pub struct SuggestQuery {
    pub q: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SuggestResponse {
    pub places: Vec<Place>,
}

/// `GET /api/reverse?lat=&lon=`
#[derive(Debug, Deserialize)]
pub struct ReverseQuery {
    pub lat: f64,
    pub lon: f64,
}

/// `POST /api/fare`
#[derive(Debug, Deserialize)]
pub struct FareRequest {
    pub mode: TransportMode,
    pub distance: Option<Kilometers>,
    pub duration: Option<Minutes>,
}

#[derive(Debug, Serialize)]
pub struct FareResponse {
    pub mode: TransportMode,
    pub fare: Money,
    pub breakdown: FareBreakdown,
}

/// `POST /routes/plan`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PlanRouteRequest {
    pub origin: String,
    pub destination: String,
    pub origin_coordinates: Option<Coordinates>,
    pub destination_coordinates: Option<Coordinates>,
    pub mode: TransportMode,
    pub code: Option<JeepneyCode>,
    pub notes: String,
    /// Also save the plan as a favorite.
    pub save: bool,
}

impl From<PlanRouteRequest> for PlanRequest {
    fn from(req: PlanRouteRequest) -> Self {
        PlanRequest {
            origin: PlaceInput {
                text: req.origin,
                coordinates: req.origin_coordinates,
            },
            destination: PlaceInput {
                text: req.destination,
                coordinates: req.destination_coordinates,
            },
            mode: req.mode,
            code: req.code,
            notes: req.notes,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PlanRouteResponse {
    #[serde(flatten)]
    pub plan: RoutePlan,
    pub saved: Option<RouteView>,
}

/// A saved route as shown to clients.
///
/// Never includes the owner: suggestions are public, and an anonymous
/// owner is identified by their session key.
#[derive(Debug, Serialize)]
pub struct RouteView {
    pub id: RouteId,
    pub kind: RouteKind,
    pub label: String,
    pub origin: String,
    pub destination: String,
    pub origin_coordinates: Option<Coordinates>,
    pub destination_coordinates: Option<Coordinates>,
    pub mode: TransportMode,
    pub code: Option<JeepneyCode>,
    pub path: Vec<Coordinates>,
    pub distance: Option<Kilometers>,
    pub duration: Option<Minutes>,
    pub fare: Option<Money>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl From<SavedRoute> for RouteView {
    fn from(route: SavedRoute) -> Self {
        Self {
            label: route.to_string(),
            id: route.id,
            kind: route.kind,
            origin: route.origin,
            destination: route.destination,
            origin_coordinates: route.origin_coordinates,
            destination_coordinates: route.destination_coordinates,
            mode: route.mode,
            code: route.code,
            path: route.path,
            distance: route.distance,
            duration: route.duration,
            fare: route.fare,
            notes: route.notes,
            created_at: route.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RouteListResponse {
    pub routes: Vec<RouteView>,
}

impl From<Vec<SavedRoute>> for RouteListResponse {
    fn from(routes: Vec<SavedRoute>) -> Self {
        Self {
            routes: routes.into_iter().map(RouteView::from).collect(),
        }
    }
}

/// `GET /routes/suggestions?q=&code=`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SuggestionQuery {
    pub q: Option<String>,
    pub code: Option<String>,
}

/// `POST /auth/session`
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_key: String,
}

/// `POST /auth/login`
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
    /// Anonymous routes moved to the account by this login.
    pub adopted: usize,
}
