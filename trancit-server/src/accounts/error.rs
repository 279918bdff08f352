//! Account errors.

use crate::persist::PersistError;

/// Errors from registration, login, and the account store.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// Username fails validation
    #[error("invalid username: {0}")]
    InvalidUsername(&'static str),

    /// Email fails validation
    #[error("invalid email address")]
    InvalidEmail,

    /// Password too weak
    #[error("password must be at least {min} characters")]
    WeakPassword { min: usize },

    /// Password and confirmation differ
    #[error("passwords do not match")]
    PasswordMismatch,

    /// Username already registered
    #[error("username is already taken")]
    UsernameTaken,

    /// Email already registered
    #[error("email is already registered")]
    EmailTaken,

    /// Unknown user or wrong password
    #[error("invalid username or password")]
    InvalidCredentials,

    /// Background password hashing task failed
    #[error("password hashing failed: {0}")]
    Hashing(String),

    /// Snapshot could not be written or read
    #[error(transparent)]
    Persist(#[from] PersistError),
}

impl AccountError {
    /// Whether the error is caused by the submitted data.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AccountError::InvalidUsername(_)
                | AccountError::InvalidEmail
                | AccountError::WeakPassword { .. }
                | AccountError::PasswordMismatch
        )
    }

    /// Whether the error is a uniqueness conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, AccountError::UsernameTaken | AccountError::EmailTaken)
    }
}
