//! User accounts, login sessions, and anonymous sessions.
//!
//! A caller is either a registered user holding a bearer token, or an
//! anonymous browser identified by a session key. Both can own saved
//! routes; see [`Owner`].

mod error;
mod identity;
mod password;
mod store;

pub use error::AccountError;
pub use identity::{Owner, SessionKey, SessionToken, User, UserId};
pub use password::{hash_password, verify_password};
pub use store::{AccountStore, MIN_PASSWORD_LEN, Registration};
