//! Detail fetching: the three-call fan-in, per-id deduplication and
//! background prefetch of evolution relatives.

pub mod coordinator;
pub mod detail;
pub mod prefetch;

pub(crate) use coordinator::PendingFetch;
pub use coordinator::{FetchCoordinator, FetchResult, FetchState};
pub use detail::DetailFetcher;
pub use prefetch::PrefetchScheduler;
