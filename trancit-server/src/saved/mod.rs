//! Saved routes: per-owner favorites and community jeepney suggestions.

mod error;
mod model;
mod store;

pub use error::StoreError;
pub use model::{
    JeepneySuggestion, MAX_PLACE_LEN, NewRoute, RouteId, RouteKind, SavedRoute, SuggestionFilter,
};
pub use store::RouteStore;
