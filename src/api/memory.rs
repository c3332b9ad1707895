use crate::api::traits::FlatSource;
use crate::error::{ApiError, ApiResult};
use crate::models::{FavoriteMutation, FavoriteStatus, Flat, Owner};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info};

/// In-memory flat source.
///
/// Serves a fixed collection, keeps favorites per (flat, user) pair and can be
/// told to fail or slow down individual calls.
#[derive(Default)]
pub struct InMemoryFlatSource {
    state: Mutex<MemoryState>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

#[derive(Default)]
struct MemoryState {
    flats: Vec<Flat>,
    favorites: HashSet<(String, String)>,
    latency: Option<Duration>,
    status_latency: HashMap<String, Duration>,
    failing_listing: bool,
    failing_status: HashSet<String>,
    failing_mutations: bool,
    mutations: Vec<FavoriteMutation>,
    status_queries: usize,
}

/// Tracks concurrently running calls for `peak_in_flight`
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize, peak: &AtomicUsize) -> Self {
        let now = counter.fetch_add(1, Ordering::SeqCst) + 1;
        peak.fetch_max(now, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl InMemoryFlatSource {
    pub fn new(flats: Vec<Flat>) -> Self {
        let source = Self::default();
        source.state().flats = flats;
        source
    }

    /// Source preloaded with a handful of sample listings
    pub fn sample() -> Self {
        info!("📋 Using sample listings");
        let source = Self::new(sample_flats());
        source.state().favorites.insert(("sample-2".to_string(), "demo-user".to_string()));
        source
    }

    pub fn with_favorite(self, flat_id: &str, user_id: &str) -> Self {
        self.state()
            .favorites
            .insert((flat_id.to_string(), user_id.to_string()));
        self
    }

    /// Delay every call by `latency`
    pub fn with_latency(self, latency: Duration) -> Self {
        self.state().latency = Some(latency);
        self
    }

    /// Delay status lookups for one flat
    pub fn with_status_latency(self, flat_id: &str, latency: Duration) -> Self {
        self.state()
            .status_latency
            .insert(flat_id.to_string(), latency);
        self
    }

    pub fn failing_listing(self) -> Self {
        self.state().failing_listing = true;
        self
    }

    pub fn failing_status_for(self, flat_id: &str) -> Self {
        self.state().failing_status.insert(flat_id.to_string());
        self
    }

    pub fn failing_mutations(self) -> Self {
        self.state().failing_mutations = true;
        self
    }

    /// Replace the served collection
    pub fn set_flats(&self, flats: Vec<Flat>) {
        self.state().flats = flats;
    }

    pub fn set_failing_listing(&self, failing: bool) {
        self.state().failing_listing = failing;
    }

    pub fn is_favorite(&self, flat_id: &str, user_id: &str) -> bool {
        self.state()
            .favorites
            .contains(&(flat_id.to_string(), user_id.to_string()))
    }

    /// Mutations received so far, including rejected ones
    pub fn mutations(&self) -> Vec<FavoriteMutation> {
        self.state().mutations.clone()
    }

    pub fn status_query_count(&self) -> usize {
        self.state().status_queries
    }

    /// Highest number of calls that were running at the same time
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn delay(&self, extra: Option<Duration>) {
        let latency = self.state().latency;
        let total = latency.unwrap_or_default() + extra.unwrap_or_default();
        if !total.is_zero() {
            tokio::time::sleep(total).await;
        }
    }
}

#[async_trait]
impl FlatSource for InMemoryFlatSource {
    async fn list_all(&self) -> ApiResult<Vec<Flat>> {
        let _guard = InFlight::enter(&self.in_flight, &self.peak_in_flight);
        self.delay(None).await;

        let state = self.state();
        if state.failing_listing {
            return Err(ApiError::Unavailable("listing disabled".to_string()));
        }
        Ok(state.flats.clone())
    }

    async fn list_favorites(&self, user_id: &str) -> ApiResult<Vec<Flat>> {
        let _guard = InFlight::enter(&self.in_flight, &self.peak_in_flight);
        self.delay(None).await;

        let state = self.state();
        if state.failing_listing {
            return Err(ApiError::Unavailable("listing disabled".to_string()));
        }
        Ok(state
            .flats
            .iter()
            .filter(|flat| {
                state
                    .favorites
                    .contains(&(flat.id.clone(), user_id.to_string()))
            })
            .cloned()
            .collect())
    }

    async fn favorite_status(&self, flat_id: &str, user_id: &str) -> ApiResult<bool> {
        let _guard = InFlight::enter(&self.in_flight, &self.peak_in_flight);
        let extra = {
            let mut state = self.state();
            state.status_queries += 1;
            state.status_latency.get(flat_id).copied()
        };
        self.delay(extra).await;

        let state = self.state();
        if state.failing_status.contains(flat_id) {
            return Err(ApiError::Status(500));
        }
        Ok(state
            .favorites
            .contains(&(flat_id.to_string(), user_id.to_string())))
    }

    async fn set_favorite(&self, mutation: &FavoriteMutation) -> ApiResult<()> {
        let _guard = InFlight::enter(&self.in_flight, &self.peak_in_flight);
        self.delay(None).await;

        let mut state = self.state();
        state.mutations.push(mutation.clone());
        if state.failing_mutations {
            return Err(ApiError::Status(503));
        }

        let key = (mutation.flat.clone(), mutation.user.clone());
        match mutation.status {
            FavoriteStatus::Active => {
                state.favorites.insert(key);
            }
            FavoriteStatus::Inactive => {
                state.favorites.remove(&key);
            }
        }
        debug!("Stored favorite change for flat {}", mutation.flat);
        Ok(())
    }

    fn source_name(&self) -> &'static str {
        "In-memory"
    }
}

fn sample_flats() -> Vec<Flat> {
    let owner = |id: &str, email: &str| Owner {
        id: id.to_string(),
        email: email.to_string(),
        avatar: format!("https://i.pravatar.cc/150?u={}", id),
    };

    vec![
        Flat {
            id: "sample-1".to_string(),
            city: "Quito".to_string(),
            street_name: "Av. Amazonas".to_string(),
            street_number: "N34-12".to_string(),
            rent_price: 650.0,
            area_size: 850.0,
            year_built: Some(2012),
            has_ac: true,
            date_available: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).single(),
            latitude: Some(-0.1807),
            longitude: Some(-78.4678),
            owner: owner("owner-1", "maria@example.com"),
        },
        Flat {
            id: "sample-2".to_string(),
            city: "Guayaquil".to_string(),
            street_name: "Malecón Simón Bolívar".to_string(),
            street_number: "402".to_string(),
            rent_price: 480.0,
            area_size: 620.0,
            year_built: Some(1998),
            has_ac: false,
            date_available: Utc.with_ymd_and_hms(2024, 4, 15, 0, 0, 0).single(),
            latitude: Some(-2.1962),
            longitude: Some(-79.8862),
            owner: owner("owner-2", "jorge@example.com"),
        },
        Flat {
            id: "sample-3".to_string(),
            city: "Cuenca".to_string(),
            street_name: "Calle Larga".to_string(),
            street_number: "7-45".to_string(),
            rent_price: 390.0,
            area_size: 540.0,
            year_built: Some(1975),
            has_ac: false,
            date_available: None,
            latitude: None,
            longitude: None,
            owner: owner("demo-user", "demo@example.com"),
        },
    ]
}
