//! Core library for dexcache.
//!
//! A client-side cache over a read-only creature catalog REST API. It resolves
//! combined details (entity, species, evolution chain) with at most one
//! in-flight fetch per id, prefetches evolution relatives in the background,
//! and keeps bookmarks, a daily pick and recent selections on local storage.
//!
//! Frontends build one [`Dex`] and talk only to it.

pub mod api;
pub mod bookmarks;
pub mod cache;
pub mod config;
pub mod daily;
pub mod display;
pub mod fetch;
pub mod models;
pub mod notify;
pub mod persist;
pub mod recent;
pub mod service;
pub mod utils;

mod store;

pub use api::{ApiError, CatalogClient, HttpTransport, Transport};
pub use bookmarks::Audience;
pub use config::Config;
pub use daily::DailyState;
pub use display::DisplayRow;
pub use fetch::FetchState;
pub use models::{CombinedDetail, PokemonSummary, TypeSummary};
pub use notify::{LogNotifier, Notification, Notifier};
pub use persist::{BlobStore, FileBlobStore, MemoryBlobStore, StoreKey};
pub use recent::RecentSelection;
pub use service::Dex;
pub use store::Stores;
