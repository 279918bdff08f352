//! Caller identification from request headers.
//!
//! `Authorization: Bearer <token>` identifies a logged-in user and wins over
//! everything else; a token the server doesn't know is rejected rather than
//! treated as anonymous. Without one, `X-Session-Key` identifies an
//! anonymous browser session.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use super::error::AppError;
use super::state::AppState;
use crate::accounts::{Owner, SessionKey, SessionToken, User};

/// Header carrying the anonymous session key.
pub const SESSION_KEY_HEADER: &str = "x-session-key";

/// Who is making the request.
#[derive(Debug, Clone)]
pub enum Caller {
    User(User),
    Anonymous(SessionKey),
    Unidentified,
}

impl Caller {
    /// The owner for saved routes, or 401 if the caller is unidentified.
    pub fn owner(&self) -> Result<Owner, AppError> {
        match self {
            Caller::User(user) => Ok(Owner::User(user.id)),
            Caller::Anonymous(key) => Ok(Owner::Anonymous(*key)),
            Caller::Unidentified => Err(AppError::unauthorized(
                "log in or start a session to keep saved routes",
            )),
        }
    }
}

/// Extract the bearer token, if an `Authorization` header is present.
pub fn bearer_token(headers: &HeaderMap) -> Result<Option<SessionToken>, AppError> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };

    let token = value
        .to_str()
        .ok()
        .and_then(|v| v.split_once(' '))
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token.trim())
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::unauthorized("malformed Authorization header"))?;

    Ok(Some(SessionToken::from_header(token)))
}

/// Extract the anonymous session key, if the header is present.
pub fn session_key(headers: &HeaderMap) -> Result<Option<SessionKey>, AppError> {
    let Some(value) = headers.get(SESSION_KEY_HEADER) else {
        return Ok(None);
    };

    value
        .to_str()
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Some)
        .ok_or_else(|| AppError::unauthorized("invalid session key"))
}

#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        if let Some(token) = bearer_token(&parts.headers)? {
            return state
                .accounts
                .authenticate(&token)
                .await
                .map(Caller::User)
                .ok_or_else(|| AppError::unauthorized("unknown or expired token"));
        }

        Ok(match session_key(&parts.headers)? {
            Some(key) => Caller::Anonymous(key),
            None => Caller::Unidentified,
        })
    }
}
