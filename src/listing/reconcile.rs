use crate::api::FlatSource;
use crate::error::ApiResult;
use futures::stream::{self, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How many status lookups may run at once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FanOut {
    /// One lookup per flat, all in flight together
    #[default]
    Unbounded,
    /// At most `n` lookups in flight
    Bounded(usize),
}

impl FanOut {
    /// `0` means unbounded
    pub fn from_limit(limit: usize) -> Self {
        if limit == 0 {
            FanOut::Unbounded
        } else {
            FanOut::Bounded(limit)
        }
    }

    fn limit(self, jobs: usize) -> usize {
        match self {
            FanOut::Unbounded => jobs.max(1),
            FanOut::Bounded(n) => n.max(1),
        }
    }
}

/// What to do with a status result launched for an older collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StalePolicy {
    /// Merge it anyway. The rendered list only shows current flats, so a
    /// stale entry is never displayed.
    #[default]
    Apply,
    /// Drop it
    Discard,
}

/// Result of one status lookup
#[derive(Debug)]
pub struct StatusUpdate {
    pub flat_id: String,
    /// Collection generation the lookup was launched for
    pub generation: u64,
    pub outcome: ApiResult<bool>,
}

/// Status lookups for one loaded collection.
///
/// Owns everything it needs, so it can be driven on another task while the
/// screen keeps handling input.
pub struct StatusBatch<S: ?Sized> {
    source: Arc<S>,
    user_id: String,
    flat_ids: Vec<String>,
    generation: u64,
    fan_out: FanOut,
}

impl<S: FlatSource + ?Sized + 'static> StatusBatch<S> {
    pub(crate) fn new(
        source: Arc<S>,
        user_id: String,
        flat_ids: Vec<String>,
        generation: u64,
        fan_out: FanOut,
    ) -> Self {
        Self {
            source,
            user_id,
            flat_ids,
            generation,
            fan_out,
        }
    }

    pub fn len(&self) -> usize {
        self.flat_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flat_ids.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Launch the lookups; updates arrive in completion order
    pub fn into_stream(self) -> impl Stream<Item = StatusUpdate> + Send + 'static {
        let Self {
            source,
            user_id,
            flat_ids,
            generation,
            fan_out,
        } = self;
        let limit = fan_out.limit(flat_ids.len());

        stream::iter(flat_ids)
            .map(move |flat_id| {
                let source = Arc::clone(&source);
                let user_id = user_id.clone();
                async move {
                    let outcome = source.favorite_status(&flat_id, &user_id).await;
                    StatusUpdate {
                        flat_id,
                        generation,
                        outcome,
                    }
                }
            })
            .buffer_unordered(limit)
    }
}

/// What merging one `StatusUpdate` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusMerge {
    /// Entry set to favorited
    Favorited,
    /// Not favorited remotely; entry left as it was
    Unchanged,
    /// Lookup failed; entry left as it was
    Failed,
    /// Stale result dropped by `StalePolicy::Discard`
    Discarded,
}

/// Tally of one reconcile pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    pub queried: usize,
    pub favorited: usize,
    pub failed: usize,
    pub discarded: usize,
}

impl ReconcileReport {
    pub fn record(&mut self, merge: StatusMerge) {
        match merge {
            StatusMerge::Favorited => self.favorited += 1,
            StatusMerge::Unchanged => {}
            StatusMerge::Failed => self.failed += 1,
            StatusMerge::Discarded => self.discarded += 1,
        }
    }
}
