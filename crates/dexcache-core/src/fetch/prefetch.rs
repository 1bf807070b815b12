use tracing::debug;

use super::coordinator::Lookup;
use super::FetchCoordinator;

/// Best-effort background fetching of related entities.
pub struct PrefetchScheduler {
    coordinator: FetchCoordinator,
}

impl PrefetchScheduler {
    pub fn new(coordinator: FetchCoordinator) -> Self {
        Self { coordinator }
    }

    /// Start a fetch for every id that is neither cached nor pending and
    /// return how many were started. Each is registered before this returns.
    /// Failures are logged by the fetch task and otherwise dropped.
    pub fn prefetch(&self, ids: &[u32]) -> usize {
        let mut started = Vec::new();
        for &id in ids {
            if id == 0 || started.contains(&id) {
                continue;
            }
            if let Lookup::Started(_) = self.coordinator.lookup(id) {
                started.push(id);
            }
        }

        if !started.is_empty() {
            debug!(ids = ?started, "Prefetching related entities");
        }
        started.len()
    }
}
