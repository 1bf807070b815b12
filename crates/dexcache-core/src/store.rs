//! Shared mutable state behind the service.
//!
//! Every store sits behind its own `std::sync::Mutex`. Guards are only ever
//! held for synchronous work, never across an `.await`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::bookmarks::{Audience, BookmarkRegistry};
use crate::cache::{DetailCache, SummaryCache};
use crate::daily::DailyState;
use crate::fetch::PendingFetch;
use crate::models::TypeSummary;
use crate::persist::Snapshot;
use crate::recent::RecentSelections;

/// Lock a store, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Detail tier state. Cache and pending map share one lock so an id moves
/// from pending to cached in a single step.
#[derive(Default)]
pub(crate) struct DetailState {
    pub cache: DetailCache,
    pub pending: HashMap<u32, PendingFetch>,
    pub focused: Option<u32>,
    /// Bumped by clear-all; fetches started under an older generation discard
    /// their results.
    pub generation: u64,
}

#[derive(Default)]
pub struct Stores {
    pub(crate) summaries: Mutex<Arc<SummaryCache>>,
    pub(crate) types: Mutex<Vec<TypeSummary>>,
    pub(crate) details: Mutex<DetailState>,
    pub(crate) daily: Mutex<DailyState>,
    pub(crate) bookmarks: Mutex<BookmarkRegistry>,
    pub(crate) recent: Mutex<RecentSelections>,
}

impl Stores {
    /// Copy of the persisted subset. Pending fetches and focus are excluded.
    pub fn snapshot(&self) -> Snapshot {
        // One lock at a time.
        let summaries = lock(&self.summaries).list().to_vec();
        let types = lock(&self.types).clone();
        let details = lock(&self.details)
            .cache
            .to_sorted()
            .into_iter()
            .map(|(id, d)| (id, d.clone()))
            .collect();
        let daily = lock(&self.daily).clone();
        let bookmarks = lock(&self.bookmarks).clone();
        let recent = lock(&self.recent).clone();

        Snapshot {
            summaries,
            types,
            details,
            daily,
            kid_bookmarks: bookmarks.set(Audience::Kid).clone(),
            parent_bookmarks: bookmarks.set(Audience::Parent).clone(),
            recent,
        }
    }

    /// Replace the persisted subset with `snapshot`. In-flight fetches are
    /// left alone.
    pub fn restore(&self, snapshot: Snapshot) {
        *lock(&self.summaries) = Arc::new(SummaryCache::new(snapshot.summaries));
        *lock(&self.types) = snapshot.types;
        lock(&self.details).cache = snapshot.details.into_values().collect();
        *lock(&self.daily) = snapshot.daily;
        *lock(&self.bookmarks) =
            BookmarkRegistry::new(snapshot.kid_bookmarks, snapshot.parent_bookmarks);
        *lock(&self.recent) = snapshot.recent;
    }

    /// Return every store to its initial empty state.
    pub fn reset(&self) {
        *lock(&self.summaries) = Arc::new(SummaryCache::default());
        lock(&self.types).clear();
        {
            let mut details = lock(&self.details);
            details.cache.clear();
            details.pending.clear();
            details.focused = None;
            details.generation += 1;
        }
        *lock(&self.daily) = DailyState::default();
        *lock(&self.bookmarks) = BookmarkRegistry::default();
        lock(&self.recent).clear();
    }
}
