//! Route store errors.

use super::model::RouteId;
use crate::persist::PersistError;

/// Errors from the saved route store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The submitted route is invalid
    #[error("invalid route: {0}")]
    Invalid(String),

    /// No such route, or not visible to the caller
    #[error("route {0} not found")]
    NotFound(RouteId),

    /// Snapshot could not be written or read
    #[error(transparent)]
    Persist(#[from] PersistError),
}
