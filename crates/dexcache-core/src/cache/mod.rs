//! In-memory caches for catalog data.
//!
//! - `SummaryCache`: the `{id, name}` list, read-only once loaded
//! - `DetailCache`: fully resolved `CombinedDetail`s keyed by id
//!
//! Both are plain data structures; locking and persistence live with their
//! owners in `store` and `persist`.

pub mod detail;
pub mod summary;

pub use detail::DetailCache;
pub use summary::SummaryCache;
