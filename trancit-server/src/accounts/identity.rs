//! Who is making a request.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Numeric user identifier, assigned sequentially on registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered user, as exposed outside the account store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Bearer token for a logged-in user.
///
/// Opaque to clients. Tokens are random and live only in memory, so a
/// server restart logs everyone out.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    pub(crate) fn generate() -> Self {
        // Two v4 UUIDs give 244 random bits.
        Self(format!(
            "{}{}",
            Uuid::new_v4().simple(),
            Uuid::new_v4().simple()
        ))
    }

    /// Wrap a token presented by a client.
    pub fn from_header(value: &str) -> Self {
        Self(value.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Key identifying an anonymous browser session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionKey(Uuid);

impl SessionKey {
    /// Create a fresh random key.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for SessionKey {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Owner of a saved route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Owner {
    User(UserId),
    Anonymous(SessionKey),
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Owner::User(id) => write!(f, "user:{id}"),
            Owner::Anonymous(key) => write!(f, "session:{key}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_key_round_trips_through_text() {
        let key = SessionKey::generate();
        let text = key.to_string();
        assert_eq!(text.len(), 32);
        assert_eq!(text.parse::<SessionKey>().unwrap(), key);
    }

    #[test]
    fn session_key_accepts_hyphenated_form() {
        let key: SessionKey = "67e55044-10b1-426f-9247-bb680e5fe0c8".parse().unwrap();
        assert_eq!(key.to_string(), "67e5504410b1426f9247bb680e5fe0c8");
    }

    #[test]
    fn session_key_rejects_garbage() {
        assert!("not-a-key".parse::<SessionKey>().is_err());
        assert!("".parse::<SessionKey>().is_err());
    }

    #[test]
    fn tokens_are_distinct() {
        let a = SessionToken::generate();
        let b = SessionToken::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 64);
    }

    #[test]
    fn owner_display() {
        assert_eq!(Owner::User(UserId(7)).to_string(), "user:7");
    }

    #[test]
    fn owner_serde_shape() {
        let json = serde_json::to_value(Owner::User(UserId(3))).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "user", "id": 3}));
        let back: Owner = serde_json::from_value(json).unwrap();
        assert_eq!(back, Owner::User(UserId(3)));
    }
}
