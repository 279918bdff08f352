//! Driving routes from an OSRM-compatible routing service.
//!
//! The service is a black box: we send two points and get back a distance,
//! a duration, and a path geometry. Distances and durations are converted
//! to fixed-point kilometers and minutes at the boundary so that fare
//! arithmetic downstream is exact.

mod client;
mod error;
mod types;

pub use client::{OsrmClient, OsrmConfig, RouteProvider};
pub use error::RoutingError;
pub use types::DrivingRoute;
