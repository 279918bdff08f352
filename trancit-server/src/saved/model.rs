//! Saved route records.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::accounts::Owner;
use crate::domain::{Coordinates, JeepneyCode, Kilometers, Minutes, Money, TransportMode};
use crate::planner::RoutePlan;

/// Maximum length of origin/destination text.
pub const MAX_PLACE_LEN: usize = 255;

/// Identifier of a saved route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteId(pub u64);

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a route is someone's favorite or a community suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteKind {
    Favorite,
    Suggestion,
}

/// A stored route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedRoute {
    pub id: RouteId,
    pub owner: Owner,
    pub kind: RouteKind,
    pub origin: String,
    pub destination: String,
    pub origin_coordinates: Option<Coordinates>,
    pub destination_coordinates: Option<Coordinates>,
    pub mode: TransportMode,
    /// Only ever set on jeepney routes.
    pub code: Option<JeepneyCode>,
    #[serde(default)]
    pub path: Vec<Coordinates>,
    pub distance: Option<Kilometers>,
    pub duration: Option<Minutes>,
    pub fare: Option<Money>,
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl SavedRoute {
    /// Listing order: mode name alphabetically, then code, then origin.
    pub fn listing_order(&self, other: &Self) -> Ordering {
        self.mode
            .as_str()
            .cmp(other.mode.as_str())
            .then_with(|| self.code.cmp(&other.code))
            .then_with(|| self.origin.cmp(&other.origin))
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl fmt::Display for SavedRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.mode, self.code) {
            (TransportMode::Jeepney, Some(code)) => write!(
                f,
                "[{code}] {} to {} ({})",
                self.origin, self.destination, self.mode
            ),
            _ => write!(f, "{} to {} ({})", self.origin, self.destination, self.mode),
        }
    }
}

/// A route to save as a favorite.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewRoute {
    pub origin: String,
    pub destination: String,
    pub origin_coordinates: Option<Coordinates>,
    pub destination_coordinates: Option<Coordinates>,
    pub mode: TransportMode,
    pub code: Option<JeepneyCode>,
    pub path: Vec<Coordinates>,
    pub distance: Option<Kilometers>,
    pub duration: Option<Minutes>,
    pub fare: Option<Money>,
    pub notes: String,
}

impl From<&RoutePlan> for NewRoute {
    fn from(plan: &RoutePlan) -> Self {
        let text = |input: &str, display: &str| {
            if input.trim().is_empty() {
                display.to_string()
            } else {
                input.trim().to_string()
            }
        };

        Self {
            origin: text(&plan.origin.input, &plan.origin.place.display_name),
            destination: text(&plan.destination.input, &plan.destination.place.display_name),
            origin_coordinates: Some(plan.origin.place.coordinates),
            destination_coordinates: Some(plan.destination.place.coordinates),
            mode: plan.mode,
            code: plan.code,
            path: plan.path.clone(),
            distance: plan.distance,
            duration: plan.duration,
            fare: plan.fare,
            notes: plan.notes.clone(),
        }
    }
}

/// A community jeepney route suggestion.
///
/// The mode is always jeepney; the code is mandatory.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JeepneySuggestion {
    pub origin: String,
    pub destination: String,
    pub code: Option<JeepneyCode>,
    pub origin_coordinates: Option<Coordinates>,
    pub destination_coordinates: Option<Coordinates>,
    pub path: Vec<Coordinates>,
    pub distance: Option<Kilometers>,
    pub duration: Option<Minutes>,
    pub fare: Option<Money>,
    pub notes: String,
}

impl From<JeepneySuggestion> for NewRoute {
    fn from(s: JeepneySuggestion) -> Self {
        Self {
            origin: s.origin,
            destination: s.destination,
            origin_coordinates: s.origin_coordinates,
            destination_coordinates: s.destination_coordinates,
            mode: TransportMode::Jeepney,
            code: s.code,
            path: s.path,
            distance: s.distance,
            duration: s.duration,
            fare: s.fare,
            notes: s.notes,
        }
    }
}

/// Filter for searching suggestions.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SuggestionFilter {
    /// Case-insensitive substring of origin or destination.
    pub text: Option<String>,
    pub code: Option<JeepneyCode>,
}

impl SuggestionFilter {
    pub fn matches(&self, route: &SavedRoute) -> bool {
        if let Some(code) = self.code
            && route.code != Some(code)
        {
            return false;
        }

        match self.text.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(text) => {
                let needle = text.to_lowercase();
                route.origin.to_lowercase().contains(&needle)
                    || route.destination.to_lowercase().contains(&needle)
            }
        }
    }
}
