//! In-memory route store with JSON snapshot persistence.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::error::StoreError;
use super::model::{
    JeepneySuggestion, MAX_PLACE_LEN, NewRoute, RouteId, RouteKind, SavedRoute, SuggestionFilter,
};
use crate::accounts::{Owner, SessionKey, UserId};
use crate::domain::TransportMode;
use crate::persist::JsonSnapshot;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RouteData {
    next_id: u64,
    routes: Vec<SavedRoute>,
}

impl RouteData {
    fn insert(&mut self, owner: Owner, kind: RouteKind, new: NewRoute) -> SavedRoute {
        self.next_id += 1;
        let route = SavedRoute {
            id: RouteId(self.next_id),
            owner,
            kind,
            origin: new.origin.trim().to_string(),
            destination: new.destination.trim().to_string(),
            origin_coordinates: new.origin_coordinates,
            destination_coordinates: new.destination_coordinates,
            mode: new.mode,
            code: match new.mode {
                TransportMode::Jeepney => new.code,
                _ => None,
            },
            path: new.path,
            distance: new.distance,
            duration: new.duration,
            fare: new.fare,
            notes: new.notes.trim().to_string(),
            created_at: Utc::now(),
        };
        self.routes.push(route.clone());
        route
    }
}

fn validate(new: &NewRoute) -> Result<(), StoreError> {
    for (name, text) in [("origin", &new.origin), ("destination", &new.destination)] {
        let text = text.trim();
        if text.is_empty() {
            return Err(StoreError::Invalid(format!("{name} is required")));
        }
        if text.chars().count() > MAX_PLACE_LEN {
            return Err(StoreError::Invalid(format!(
                "{name} must be at most {MAX_PLACE_LEN} characters"
            )));
        }
    }
    Ok(())
}

fn sorted(mut routes: Vec<SavedRoute>) -> Vec<SavedRoute> {
    routes.sort_by(SavedRoute::listing_order);
    routes
}

/// Favorites and community suggestions.
pub struct RouteStore {
    data: RwLock<RouteData>,
    snapshot: Option<JsonSnapshot>,
}

impl RouteStore {
    /// Create an empty store that is never written to disk.
    pub fn in_memory() -> Self {
        Self {
            data: RwLock::new(RouteData::default()),
            snapshot: None,
        }
    }

    /// Open a store backed by a snapshot file, loading it if it exists.
    pub async fn open(snapshot: JsonSnapshot) -> Result<Self, StoreError> {
        let data: RouteData = snapshot.load().await?.unwrap_or_default();
        info!(
            path = %snapshot.path().display(),
            routes = data.routes.len(),
            "loaded route store"
        );
        Ok(Self {
            data: RwLock::new(data),
            snapshot: Some(snapshot),
        })
    }

    /// Apply a mutation and write the snapshot.
    ///
    /// If the snapshot cannot be written the mutation is rolled back.
    async fn mutate<R>(
        &self,
        f: impl FnOnce(&mut RouteData) -> Result<R, StoreError>,
    ) -> Result<R, StoreError> {
        let mut data = self.data.write().await;
        let backup = self.snapshot.as_ref().map(|_| data.clone());

        let result = f(&mut *data)?;

        if let (Some(snapshot), Some(backup)) = (&self.snapshot, backup)
            && let Err(e) = snapshot.save(&*data).await
        {
            *data = backup;
            return Err(e.into());
        }
        Ok(result)
    }

    /// Save a favorite route for the caller.
    pub async fn save_favorite(&self, owner: Owner, new: NewRoute) -> Result<SavedRoute, StoreError> {
        validate(&new)?;
        let route = self
            .mutate(|data| Ok(data.insert(owner, RouteKind::Favorite, new)))
            .await?;
        info!(id = %route.id, %owner, route = %route, "saved favorite");
        Ok(route)
    }

    /// Submit a community jeepney route suggestion.
    pub async fn suggest(
        &self,
        owner: Owner,
        suggestion: JeepneySuggestion,
    ) -> Result<SavedRoute, StoreError> {
        if suggestion.code.is_none() {
            return Err(StoreError::Invalid("jeepney code is required".to_string()));
        }
        let new = NewRoute::from(suggestion);
        validate(&new)?;

        let route = self
            .mutate(|data| Ok(data.insert(owner, RouteKind::Suggestion, new)))
            .await?;
        info!(id = %route.id, %owner, route = %route, "new route suggestion");
        Ok(route)
    }

    /// Copy a suggestion into the caller's favorites.
    pub async fn save_suggestion(&self, owner: Owner, id: RouteId) -> Result<SavedRoute, StoreError> {
        let route = self
            .mutate(|data| {
                let suggestion = data
                    .routes
                    .iter()
                    .find(|r| r.id == id && r.kind == RouteKind::Suggestion)
                    .ok_or(StoreError::NotFound(id))?;

                let new = NewRoute {
                    origin: suggestion.origin.clone(),
                    destination: suggestion.destination.clone(),
                    origin_coordinates: suggestion.origin_coordinates,
                    destination_coordinates: suggestion.destination_coordinates,
                    mode: suggestion.mode,
                    code: suggestion.code,
                    path: suggestion.path.clone(),
                    distance: suggestion.distance,
                    duration: suggestion.duration,
                    fare: suggestion.fare,
                    notes: suggestion.notes.clone(),
                };
                Ok(data.insert(owner, RouteKind::Favorite, new))
            })
            .await?;
        debug!(suggestion = %id, favorite = %route.id, %owner, "copied suggestion to favorites");
        Ok(route)
    }

    /// The caller's favorites, in listing order.
    pub async fn favorites(&self, owner: Owner) -> Vec<SavedRoute> {
        let data = self.data.read().await;
        sorted(
            data.routes
                .iter()
                .filter(|r| r.owner == owner && r.kind == RouteKind::Favorite)
                .cloned()
                .collect(),
        )
    }

    /// Community suggestions matching a filter, in listing order.
    pub async fn search_suggestions(&self, filter: &SuggestionFilter) -> Vec<SavedRoute> {
        let data = self.data.read().await;
        sorted(
            data.routes
                .iter()
                .filter(|r| r.kind == RouteKind::Suggestion && filter.matches(r))
                .cloned()
                .collect(),
        )
    }

    /// One of the caller's favorites.
    ///
    /// Favorites owned by someone else are reported as not found.
    pub async fn favorite(&self, owner: Owner, id: RouteId) -> Result<SavedRoute, StoreError> {
        self.find(id, |r| r.kind == RouteKind::Favorite && r.owner == owner)
            .await
    }

    /// A community suggestion; visible to everyone.
    pub async fn suggestion(&self, id: RouteId) -> Result<SavedRoute, StoreError> {
        self.find(id, |r| r.kind == RouteKind::Suggestion).await
    }

    async fn find(
        &self,
        id: RouteId,
        visible: impl Fn(&SavedRoute) -> bool,
    ) -> Result<SavedRoute, StoreError> {
        self.data
            .read()
            .await
            .routes
            .iter()
            .find(|r| r.id == id && visible(*r))
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    /// Delete one of the caller's routes.
    ///
    /// Routes owned by someone else are reported as not found.
    pub async fn delete(&self, owner: Owner, id: RouteId) -> Result<SavedRoute, StoreError> {
        let route = self
            .mutate(|data| {
                let index = data
                    .routes
                    .iter()
                    .position(|r| r.id == id && r.owner == owner)
                    .ok_or(StoreError::NotFound(id))?;
                Ok(data.routes.remove(index))
            })
            .await?;
        info!(%id, %owner, "deleted route");
        Ok(route)
    }

    /// Move everything an anonymous session owns to a user.
    ///
    /// Returns the number of routes moved.
    pub async fn adopt(&self, key: SessionKey, user: UserId) -> Result<usize, StoreError> {
        let from = Owner::Anonymous(key);
        {
            let data = self.data.read().await;
            if !data.routes.iter().any(|r| r.owner == from) {
                return Ok(0);
            }
        }

        let moved = self
            .mutate(|data| {
                let mut moved = 0;
                for route in data.routes.iter_mut().filter(|r| r.owner == from) {
                    route.owner = Owner::User(user);
                    moved += 1;
                }
                Ok(moved)
            })
            .await?;
        info!(%key, %user, moved, "adopted anonymous routes");
        Ok(moved)
    }

    /// Number of stored routes of any kind.
    pub async fn len(&self) -> usize {
        self.data.read().await.routes.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
