//! At most one in-flight detail fetch per id.
//!
//! Per id the coordinator moves `Absent -> Pending -> Cached`, or back to
//! `Absent` when the fetch fails. Callers arriving while an id is pending
//! await the same shared future, so N concurrent requests cost one fan-out
//! and all observe the same outcome.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::{debug, info, warn};

use crate::api::ApiError;
use crate::cache::SummaryCache;
use crate::models::CombinedDetail;
use crate::notify::{Notification, Notifier};
use crate::persist::{Persistence, StoreKey};
use crate::store::{lock, Stores};

use super::{DetailFetcher, PrefetchScheduler};

pub type FetchResult = Result<Arc<CombinedDetail>, ApiError>;

/// Handle on an in-flight fetch. Memory only.
pub(crate) type PendingFetch = Shared<BoxFuture<'static, FetchResult>>;

/// How often [`FetchCoordinator::wait_idle`] rechecks the in-flight count.
const IDLE_POLL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    Absent,
    Pending,
    Cached,
}

/// Clone is cheap; every clone shares the same stores.
#[derive(Clone)]
pub struct FetchCoordinator {
    inner: Arc<Inner>,
}

struct Inner {
    stores: Arc<Stores>,
    fetcher: DetailFetcher,
    persistence: Persistence,
    notifier: Arc<dyn Notifier>,
    /// Fetch tasks registered and not yet fully settled.
    in_flight: AtomicUsize,
}

/// How a lookup was satisfied.
pub(crate) enum Lookup {
    Cached(Arc<CombinedDetail>),
    Joined(PendingFetch),
    Started(PendingFetch),
}

/// Counts one fetch task from registration until it has settled, persisted
/// and scheduled its prefetches.
struct InFlight(FetchCoordinator);

impl InFlight {
    fn new(coordinator: &FetchCoordinator) -> Self {
        coordinator.inner.in_flight.fetch_add(1, Ordering::SeqCst);
        Self(coordinator.clone())
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.inner.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

impl FetchCoordinator {
    pub fn new(
        stores: Arc<Stores>,
        fetcher: DetailFetcher,
        persistence: Persistence,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                stores,
                fetcher,
                persistence,
                notifier,
                in_flight: AtomicUsize::new(0),
            }),
        }
    }

    pub fn state(&self, id: u32) -> FetchState {
        let details = lock(&self.inner.stores.details);
        if details.cache.contains(id) {
            FetchState::Cached
        } else if details.pending.contains_key(&id) {
            FetchState::Pending
        } else {
            FetchState::Absent
        }
    }

    /// Cached detail, if any. Never fetches.
    pub fn cached(&self, id: u32) -> Option<Arc<CombinedDetail>> {
        lock(&self.inner.stores.details).cache.get(id)
    }

    pub fn focused_id(&self) -> Option<u32> {
        lock(&self.inner.stores.details).focused
    }

    pub fn set_focused_id(&self, id: Option<u32>) {
        lock(&self.inner.stores.details).focused = id;
    }

    /// User-initiated fetch: focuses `id`, and reports a failure once through
    /// the notifier before returning it.
    pub async fn fetch_detail(&self, id: u32) -> FetchResult {
        self.set_focused_id(Some(id));
        let result = self.get(id).await;
        if let Err(e) = &result {
            warn!(id, error = %e, "Detail fetch failed");
            self.inner.notifier.notify(&Notification::fetch_failed(id));
        }
        result
    }

    /// Cached value, else join the pending fetch, else start one.
    pub async fn get(&self, id: u32) -> FetchResult {
        match self.lookup(id) {
            Lookup::Cached(detail) => Ok(detail),
            Lookup::Joined(pending) | Lookup::Started(pending) => pending.await,
        }
    }

    /// The cache check, pending check and registration, under one lock.
    /// A started fetch is registered before this returns.
    pub(crate) fn lookup(&self, id: u32) -> Lookup {
        // Taken before the details lock; summaries are locked on their own.
        let summaries = Arc::clone(&lock(&self.inner.stores.summaries));

        let mut details = lock(&self.inner.stores.details);
        if let Some(detail) = details.cache.get(id) {
            debug!(id, "Detail cache hit");
            return Lookup::Cached(detail);
        }
        if let Some(pending) = details.pending.get(&id) {
            debug!(id, "Joining in-flight fetch");
            return Lookup::Joined(pending.clone());
        }
        let pending = self.start_fetch(id, details.generation, summaries);
        details.pending.insert(id, pending.clone());
        Lookup::Started(pending)
    }

    /// Number of fetch tasks still running, prefetches included.
    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.load(Ordering::SeqCst)
    }

    /// Wait until every fetch task, including the prefetches they schedule,
    /// has settled. Returns `false` if `timeout` elapsed first.
    pub async fn wait_idle(&self, timeout: Duration) -> bool {
        let drained = async {
            while self.in_flight() > 0 {
                tokio::time::sleep(IDLE_POLL).await;
            }
        };
        tokio::time::timeout(timeout, drained).await.is_ok()
    }

    /// Spawn the fetch so it runs to completion even if every caller goes away.
    fn start_fetch(&self, id: u32, generation: u64, summaries: Arc<SummaryCache>) -> PendingFetch {
        let this = self.clone();
        let in_flight = InFlight::new(self);
        let handle = tokio::spawn(async move {
            let _in_flight = in_flight;
            this.run_fetch(id, generation, summaries).await
        });

        async move {
            handle
                .await
                .unwrap_or_else(|e| Err(ApiError::Cancelled(e.to_string())))
        }
        .boxed()
        .shared()
    }

    async fn run_fetch(self, id: u32, generation: u64, summaries: Arc<SummaryCache>) -> FetchResult {
        info!(id, "Fetching detail");
        let result = self
            .inner
            .fetcher
            .fetch_combined_detail(id, Some(&summaries))
            .await
            .map(Arc::new);

        // Settle in one step: drop the pending entry and, on success, cache.
        let current = {
            let mut details = lock(&self.inner.stores.details);
            let current = details.generation == generation;
            if current {
                details.pending.remove(&id);
                if let Ok(detail) = &result {
                    details.cache.insert(Arc::clone(detail));
                }
            }
            current
        };

        match &result {
            Ok(detail) if current => {
                PrefetchScheduler::new(self.clone()).prefetch(&detail.related_ids());
                self.inner.persistence.persist(&self.inner.stores, StoreKey::Details);
            }
            Ok(_) => debug!(id, "Discarding detail fetched before data was cleared"),
            Err(e) => debug!(id, error = %e, "Fetch settled with error"),
        }

        result
    }
}
