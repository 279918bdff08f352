//! HTTP route handlers.

use axum::body::Bytes;
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use serde::de::DeserializeOwned;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use super::dto::*;
use super::error::AppError;
use super::session::{Caller, bearer_token, session_key};
use super::state::AppState;
use crate::accounts::Registration;
use crate::domain::{Coordinates, JeepneyCode};
use crate::geocode::{DEFAULT_SUGGESTIONS, Geocoder};
use crate::saved::{JeepneySuggestion, NewRoute, RouteId, SuggestionFilter};

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/jeepney-codes", get(jeepney_codes))
        .route("/api/geocode", get(geocode))
        .route("/api/geocode/suggest", get(suggest_places))
        .route("/api/reverse", get(reverse_geocode))
        .route("/api/fare", post(estimate_fare))
        .route("/routes/plan", post(plan_route))
        .route("/routes/saved", post(save_favorite).get(list_favorites))
        .route("/routes/saved/:id", get(get_favorite).delete(delete_route))
        .route(
            "/routes/suggestions",
            post(suggest_route).get(search_suggestions),
        )
        .route("/routes/suggestions/:id", get(get_suggestion))
        .route("/routes/suggestions/:id/save", post(save_suggestion))
        .route("/auth/session", post(new_session))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Parse a JSON body, mapping failures to 400 with the parser's message.
fn parse_json<T: DeserializeOwned>(body: &Bytes) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|e| {
        debug!(error = %e, body = %String::from_utf8_lossy(body), "invalid JSON body");
        AppError::bad_request(format!("Invalid JSON: {e}"))
    })
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// List valid jeepney route codes.
async fn jeepney_codes() -> Json<JeepneyCodesResponse> {
    Json(JeepneyCodesResponse {
        codes: JeepneyCode::all().map(|c| c.as_str()).collect(),
    })
}

/// Resolve free text to a place.
async fn geocode(
    State(state): State<AppState>,
    query: Result<Query<GeocodeQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(query) = query?;
    let resolution = state.planner.resolver().resolve(&query.q).await?;
    Ok(Json(resolution))
}

/// Autocomplete candidates for a partly typed place.
async fn suggest_places(
    State(state): State<AppState>,
    query: Result<Query<SuggestQuery>, QueryRejection>,
) -> Result<Json<SuggestResponse>, AppError> {
    let Query(query) = query?;
    let places = state
        .planner
        .resolver()
        .suggest(&query.q, query.limit.unwrap_or(DEFAULT_SUGGESTIONS))
        .await?;
    Ok(Json(SuggestResponse { places }))
}

/// Find the address at a point.
async fn reverse_geocode(
    State(state): State<AppState>,
    query: Result<Query<ReverseQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(query) = query?;
    let at = Coordinates::new(query.lat, query.lon)
        .map_err(|e| AppError::bad_request(e.to_string()))?;

    let place = state
        .planner
        .resolver()
        .geocoder()
        .reverse(at)
        .await?
        .ok_or_else(|| AppError::NotFound {
            message: format!("no address found at {at}"),
        })?;
    Ok(Json(place))
}

/// Estimate a fare from a known distance (and duration, for taxis).
async fn estimate_fare(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<FareResponse>, AppError> {
    let req: FareRequest = parse_json(&body)?;

    let breakdown = state
        .planner
        .fares()
        .breakdown(req.mode, req.distance, req.duration)
        .ok_or_else(|| {
            if req.distance.is_none() {
                AppError::bad_request("distance is required")
            } else if req.mode.is_time_metered() && req.duration.is_none() {
                AppError::bad_request(format!("duration is required for {} fares", req.mode))
            } else {
                AppError::bad_request("distance or duration is too large")
            }
        })?;

    Ok(Json(FareResponse {
        mode: req.mode,
        fare: breakdown.total,
        breakdown,
    }))
}

/// Plan a route, optionally saving it as a favorite.
async fn plan_route(
    State(state): State<AppState>,
    caller: Caller,
    body: Bytes,
) -> Result<Json<PlanRouteResponse>, AppError> {
    let req: PlanRouteRequest = parse_json(&body)?;
    let save = req.save;
    // Check ownership before doing any external calls.
    let owner = if save { Some(caller.owner()?) } else { None };

    let plan = state.planner.plan(req.into()).await?;

    let saved = match owner {
        Some(owner) => {
            let route = state
                .routes
                .save_favorite(owner, NewRoute::from(&plan))
                .await?;
            Some(RouteView::from(route))
        }
        None => None,
    };

    Ok(Json(PlanRouteResponse { plan, saved }))
}

/// Save a favorite route.
async fn save_favorite(
    State(state): State<AppState>,
    caller: Caller,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let owner = caller.owner()?;
    let new: NewRoute = parse_json(&body)?;
    let route = state.routes.save_favorite(owner, new).await?;
    Ok((StatusCode::CREATED, Json(RouteView::from(route))))
}

/// List the caller's favorites.
async fn list_favorites(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<RouteListResponse>, AppError> {
    let owner = caller.owner()?;
    Ok(Json(state.routes.favorites(owner).await.into()))
}

/// One of the caller's favorites.
async fn get_favorite(
    State(state): State<AppState>,
    caller: Caller,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<RouteView>, AppError> {
    let owner = caller.owner()?;
    let Path(id) = id?;
    let route = state.routes.favorite(owner, RouteId(id)).await?;
    Ok(Json(RouteView::from(route)))
}

/// Delete one of the caller's routes.
async fn delete_route(
    State(state): State<AppState>,
    caller: Caller,
    id: Result<Path<u64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let owner = caller.owner()?;
    let Path(id) = id?;
    state.routes.delete(owner, RouteId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Submit a community jeepney route suggestion.
async fn suggest_route(
    State(state): State<AppState>,
    caller: Caller,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let owner = caller.owner()?;
    let suggestion: JeepneySuggestion = parse_json(&body)?;
    let route = state.routes.suggest(owner, suggestion).await?;
    Ok((StatusCode::CREATED, Json(RouteView::from(route))))
}

/// Search community suggestions.
async fn search_suggestions(
    State(state): State<AppState>,
    query: Result<Query<SuggestionQuery>, QueryRejection>,
) -> Result<Json<RouteListResponse>, AppError> {
    let Query(query) = query?;
    let code = query
        .code
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(JeepneyCode::parse)
        .transpose()
        .map_err(|e| AppError::bad_request(e.to_string()))?;

    let filter = SuggestionFilter {
        text: query.q,
        code,
    };
    Ok(Json(state.routes.search_suggestions(&filter).await.into()))
}

/// One community suggestion.
async fn get_suggestion(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<RouteView>, AppError> {
    let Path(id) = id?;
    let route = state.routes.suggestion(RouteId(id)).await?;
    Ok(Json(RouteView::from(route)))
}

/// Copy a suggestion into the caller's favorites.
async fn save_suggestion(
    State(state): State<AppState>,
    caller: Caller,
    id: Result<Path<u64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let owner = caller.owner()?;
    let Path(id) = id?;
    let route = state.routes.save_suggestion(owner, RouteId(id)).await?;
    Ok((StatusCode::CREATED, Json(RouteView::from(route))))
}

/// Start an anonymous session.
async fn new_session(State(state): State<AppState>) -> impl IntoResponse {
    let key = state.accounts.new_anonymous_session();
    (
        StatusCode::CREATED,
        Json(SessionResponse {
            session_key: key.to_string(),
        }),
    )
}

/// Create an account.
async fn register(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let form: Registration = parse_json(&body)?;
    let user = state.accounts.register(form).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Log in; adopts the anonymous session's routes if a session key is sent.
///
/// The bearer token is issued only once adoption has succeeded.
async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<LoginResponse>, AppError> {
    let req: LoginRequest = parse_json(&body)?;
    let user = state
        .accounts
        .check_credentials(&req.username, &req.password)
        .await?;

    // A bad session key shouldn't block a valid login. A failed adoption
    // does, before any token exists.
    let adopted = match session_key(&headers).ok().flatten() {
        Some(key) => state.routes.adopt(key, user.id).await.map_err(|e| {
            warn!(user = %user.id, error = %e, "login failed while adopting routes");
            e
        })?,
        None => 0,
    };

    let token = state.accounts.start_session(&user).await;

    info!(user = %user.id, adopted, "login");
    Ok(Json(LoginResponse {
        token: token.as_str().to_string(),
        user,
        adopted,
    }))
}

/// Revoke the bearer token.
async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<StatusCode, AppError> {
    let token = bearer_token(&headers)?.ok_or_else(|| AppError::unauthorized("not logged in"))?;
    state.accounts.logout(&token).await;
    Ok(StatusCode::NO_CONTENT)
}
