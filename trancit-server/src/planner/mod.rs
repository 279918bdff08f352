//! Route planner.
//!
//! Answers: "how far is it from here to there, and what will it cost?"
//! Both ends are geocoded concurrently, a driving route is fetched, and the
//! fare for the chosen vehicle is computed from the route's distance and
//! duration.

mod plan;

pub use plan::{Endpoint, PlaceInput, PlanError, PlanRequest, RoutePlan, RoutePlanner};
