//! Listing screen core: loads flats, reconciles favorite flags with the API
//! and applies favorite toggles optimistically.

pub mod favorites;
pub mod reconcile;
pub mod view;

pub use favorites::FavoriteMap;
pub use reconcile::{FanOut, ReconcileReport, StalePolicy, StatusBatch, StatusMerge, StatusUpdate};
pub use view::{visible_flats, FlatCard};

use crate::api::FlatSource;
use crate::modal::ModalState;
use crate::models::{FavoriteMutation, FavoriteStatus, Flat, ListingMode};
use crate::session::Session;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Which collection to show, and for whom
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListingRoute {
    pub mode: ListingMode,
    /// User whose favorites are listed in favorites-only mode
    pub user_id: Option<String>,
}

impl ListingRoute {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn favorites_of(user_id: impl Into<String>) -> Self {
        Self {
            mode: ListingMode::FavoritesOnly,
            user_id: Some(user_id.into()),
        }
    }
}

/// Tuning for the status fan-out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenOptions {
    pub fan_out: FanOut,
    pub stale_policy: StalePolicy,
}

/// State behind one listing screen.
///
/// Every method runs on the screen's own task; status lookups and favorite
/// mutations are handed out as owned futures so they never borrow the screen.
pub struct ListingScreen<S: ?Sized> {
    source: Arc<S>,
    session: Session,
    route: ListingRoute,
    loaded_route: Option<ListingRoute>,
    flats: Vec<Flat>,
    favorites: FavoriteMap,
    loading: bool,
    generation: u64,
    reconciled_for: Option<(u64, String)>,
    options: ScreenOptions,
    modal: ModalState,
}

impl<S: FlatSource + ?Sized + 'static> ListingScreen<S> {
    pub fn new(source: Arc<S>, session: Session, route: ListingRoute) -> Self {
        Self::with_options(source, session, route, ScreenOptions::default())
    }

    pub fn with_options(
        source: Arc<S>,
        session: Session,
        route: ListingRoute,
        options: ScreenOptions,
    ) -> Self {
        Self {
            source,
            session,
            route,
            loaded_route: None,
            flats: Vec::new(),
            favorites: FavoriteMap::default(),
            loading: true,
            generation: 0,
            reconciled_for: None,
            options,
            modal: ModalState::new(),
        }
    }

    pub fn route(&self) -> &ListingRoute {
        &self.route
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn flats(&self) -> &[Flat] {
        &self.flats
    }

    pub fn favorites(&self) -> &FavoriteMap {
        &self.favorites
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Bumped by every load attempt
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn modal(&self) -> &ModalState {
        &self.modal
    }

    /// Point the screen at a different collection. Takes effect on the next
    /// `ensure_loaded`; until then the loaded collection keeps rendering under
    /// the mode it was loaded with.
    pub fn set_route(&mut self, route: ListingRoute) {
        self.route = route;
    }

    /// Replace the session identity; returns whether it changed
    pub fn set_session(&mut self, session: Session) -> bool {
        if self.session == session {
            return false;
        }
        debug!("Session changed to user {:?}", session.user_id);
        self.session = session;
        true
    }

    /// Fetch the collection for the current route, replacing whatever was
    /// loaded. On failure the collection is left empty.
    pub async fn load(&mut self) -> bool {
        let route = self.route.clone();
        self.loaded_route = Some(route.clone());
        self.loading = true;

        info!("Loading {} listing from {}", route.mode, self.source.source_name());
        let result = match route.mode {
            ListingMode::All => self.source.list_all().await,
            ListingMode::FavoritesOnly => {
                let user_id = route.user_id.as_deref().unwrap_or_default();
                if user_id.is_empty() {
                    warn!("Favorites listing requested without a user id");
                }
                self.source.list_favorites(user_id).await
            }
        };

        self.loading = false;
        self.generation += 1;
        match result {
            Ok(flats) => {
                info!("✅ Loaded {} flats", flats.len());
                self.favorites = FavoriteMap::seeded(&flats);
                self.flats = flats;
                true
            }
            Err(err) => {
                warn!("Error fetching flats data: {}", err);
                self.flats.clear();
                self.favorites = FavoriteMap::default();
                false
            }
        }
    }

    /// Load only if the route changed since the last load.
    /// Returns whether a fetch was issued.
    pub async fn ensure_loaded(&mut self) -> bool {
        if self.loaded_route.as_ref() == Some(&self.route) {
            return false;
        }
        self.load().await;
        true
    }

    /// Whether the collection or the identity changed since the last
    /// reconcile pass
    pub fn needs_reconcile(&self) -> bool {
        self.loaded_route.is_some()
            && self.reconciled_for.as_ref()
                != Some(&(self.generation, self.session.user_id.clone()))
    }

    /// Status lookups for every flat in the current collection
    pub fn status_batch(&self) -> StatusBatch<S> {
        StatusBatch::new(
            Arc::clone(&self.source),
            self.session.user_id.clone(),
            self.flats.iter().map(|flat| flat.id.clone()).collect(),
            self.generation,
            self.options.fan_out,
        )
    }

    /// Merge one lookup result. Only the update's own key is written.
    pub fn apply_status(&mut self, update: StatusUpdate) -> StatusMerge {
        if update.generation != self.generation {
            match self.options.stale_policy {
                StalePolicy::Apply => debug!(
                    "Applying stale favorite status for flat {} (generation {} < {})",
                    update.flat_id, update.generation, self.generation
                ),
                StalePolicy::Discard => {
                    debug!("Discarding stale favorite status for flat {}", update.flat_id);
                    return StatusMerge::Discarded;
                }
            }
        }

        match update.outcome {
            Ok(true) => {
                self.favorites.set(&update.flat_id, true);
                StatusMerge::Favorited
            }
            Ok(false) => StatusMerge::Unchanged,
            Err(err) => {
                warn!(
                    "Error fetching favorite status for flat {}: {}",
                    update.flat_id, err
                );
                StatusMerge::Failed
            }
        }
    }

    /// Query the favorite status of every loaded flat and merge results as
    /// they arrive
    pub async fn reconcile(&mut self) -> ReconcileReport {
        let batch = self.status_batch();
        self.reconciled_for = Some((self.generation, self.session.user_id.clone()));

        let mut report = ReconcileReport {
            queried: batch.len(),
            ..ReconcileReport::default()
        };
        let updates = batch.into_stream();
        futures::pin_mut!(updates);
        while let Some(update) = updates.next().await {
            let merge = self.apply_status(update);
            report.record(merge);
        }

        debug!(
            "Reconciled {} flats: {} favorited, {} failed",
            report.queried, report.favorited, report.failed
        );
        report
    }

    /// Load if the route changed, then reconcile if the collection or the
    /// identity changed
    pub async fn refresh(&mut self) -> Option<ReconcileReport> {
        self.ensure_loaded().await;
        if self.needs_reconcile() {
            Some(self.reconcile().await)
        } else {
            None
        }
    }

    /// Flip the local favorite flag for `flat_id` right away and return the
    /// request that tells the API. The local flag stays flipped whatever the
    /// request's outcome; the future resolves to whether the API accepted it.
    pub fn toggle_favorite(&mut self, flat_id: &str) -> impl Future<Output = bool> + Send + 'static {
        let favorited = self.favorites.flip(flat_id);
        let mutation = FavoriteMutation {
            flat: flat_id.to_string(),
            user: self.session.user_id.clone(),
            status: FavoriteStatus::from_favorited(favorited),
        };
        let source = Arc::clone(&self.source);

        async move {
            match source.set_favorite(&mutation).await {
                Ok(()) => {
                    debug!("Favorite for flat {} set to {:?}", mutation.flat, mutation.status);
                    true
                }
                Err(err) => {
                    warn!("Error adding favorite flat {}: {}", mutation.flat, err);
                    false
                }
            }
        }
    }

    /// Mode of the collection currently loaded
    pub fn loaded_mode(&self) -> ListingMode {
        self.loaded_route
            .as_ref()
            .map_or(self.route.mode, |route| route.mode)
    }

    /// Flats to render right now
    pub fn visible_flats(&self) -> Vec<&Flat> {
        visible_flats(&self.flats, &self.favorites, self.loaded_mode())
    }

    pub fn cards(&self) -> Vec<FlatCard<'_>> {
        self.visible_flats()
            .into_iter()
            .map(|flat| FlatCard::new(flat, &self.favorites, &self.session))
            .collect()
    }

    /// Open the map dialog for a loaded flat
    pub fn open_location(&mut self, flat_id: &str) -> bool {
        let Some(flat) = self.flats.iter().find(|flat| flat.id == flat_id) else {
            return false;
        };
        self.modal.open_location(flat);
        true
    }

    /// Open the contact dialog for a loaded flat the viewer does not own
    pub fn open_message(&mut self, flat_id: &str) -> bool {
        let Some(flat) = self.flats.iter().find(|flat| flat.id == flat_id) else {
            return false;
        };
        if self.session.owns(&flat.owner.id) {
            return false;
        }
        self.modal.open_message(flat, &self.session.user_id);
        true
    }

    pub fn close_modal(&mut self) {
        self.modal.close();
    }
}
