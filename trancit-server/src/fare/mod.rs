//! Fare estimation.
//!
//! Fares are piecewise-linear in distance (and, for taxis, travel time).
//! Missing inputs yield a missing fare rather than an error: a route the
//! routing service could not measure simply has no estimate.

mod rules;
mod table;

pub use rules::{FareBreakdown, FareRule};
pub use table::FareTable;
