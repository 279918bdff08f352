//! Application state for the web layer.

use std::sync::Arc;

use crate::accounts::AccountStore;
use crate::planner::RoutePlanner;
use crate::saved::RouteStore;

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Route planner (owns the geocoder, router and fare table)
    pub planner: Arc<RoutePlanner>,

    /// Registered users and login sessions
    pub accounts: Arc<AccountStore>,

    /// Favorites and suggestions
    pub routes: Arc<RouteStore>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(planner: RoutePlanner, accounts: AccountStore, routes: RouteStore) -> Self {
        Self {
            planner: Arc::new(planner),
            accounts: Arc::new(accounts),
            routes: Arc::new(routes),
        }
    }
}
