//! Application error type and its HTTP mapping.

use axum::Json;
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{debug, error};

use super::dto::ErrorResponse;
use crate::accounts::AccountError;
use crate::geocode::{GeocodeError, ResolveError};
use crate::planner::PlanError;
use crate::saved::StoreError;

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    Unauthorized { message: String },
    NotFound { message: String },
    Conflict { message: String },
    BadGateway { message: String },
    Internal { message: String },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        AppError::Unauthorized {
            message: message.into(),
        }
    }
}

impl From<ResolveError> for AppError {
    fn from(e: ResolveError) -> Self {
        let message = e.to_string();
        match e {
            ResolveError::Empty | ResolveError::TooShort { .. } => {
                AppError::BadRequest { message }
            }
            ResolveError::NotFound { .. } => AppError::NotFound { message },
            ResolveError::Unavailable { .. } => AppError::BadGateway { message },
        }
    }
}

impl From<PlanError> for AppError {
    fn from(e: PlanError) -> Self {
        match e {
            PlanError::InvalidRequest(message) => AppError::BadRequest { message },
            PlanError::Resolve { endpoint, source } => {
                let message = format!("could not resolve {endpoint}: {source}");
                match AppError::from(source) {
                    AppError::BadRequest { .. } => AppError::BadRequest { message },
                    AppError::NotFound { .. } => AppError::NotFound { message },
                    _ => AppError::BadGateway { message },
                }
            }
        }
    }
}

impl From<GeocodeError> for AppError {
    fn from(e: GeocodeError) -> Self {
        AppError::BadGateway {
            message: format!("geocoding service unavailable: {e}"),
        }
    }
}

impl From<AccountError> for AppError {
    fn from(e: AccountError) -> Self {
        let message = e.to_string();
        if e.is_validation() {
            AppError::BadRequest { message }
        } else if e.is_conflict() {
            AppError::Conflict { message }
        } else if matches!(e, AccountError::InvalidCredentials) {
            AppError::Unauthorized { message }
        } else {
            AppError::Internal { message }
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        let message = e.to_string();
        match e {
            StoreError::Invalid(_) => AppError::BadRequest { message },
            StoreError::NotFound(_) => AppError::NotFound { message },
            StoreError::Persist(_) => AppError::Internal { message },
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(e: QueryRejection) -> Self {
        AppError::bad_request(e.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(e: PathRejection) -> Self {
        AppError::bad_request(e.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::Unauthorized { message } => (StatusCode::UNAUTHORIZED, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Conflict { message } => (StatusCode::CONFLICT, message),
            AppError::BadGateway { message } => (StatusCode::BAD_GATEWAY, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "request failed");
        } else {
            debug!(%status, %message, "request rejected");
        }

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
