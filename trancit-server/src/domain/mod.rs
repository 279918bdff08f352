//! Domain types for the route planner.
//!
//! This module contains the validated value types shared by every other
//! layer. All types enforce their invariants at construction time, so code
//! that receives these types can trust their validity.

mod coords;
mod decimal;
mod error;
mod jeepney;
mod mode;

pub use coords::Coordinates;
pub use decimal::{Kilometers, Minutes, Money};
pub use error::DomainError;
pub use jeepney::JeepneyCode;
pub use mode::TransportMode;
