//! Web layer for the route planner.
//!
//! JSON endpoints for geocoding, fare estimates, route plans, saved routes,
//! and accounts.

mod dto;
mod error;
mod routes;
mod session;
mod state;

pub use dto::*;
pub use error::AppError;
pub use routes::create_router;
pub use session::{Caller, SESSION_KEY_HEADER};
pub use state::AppState;
