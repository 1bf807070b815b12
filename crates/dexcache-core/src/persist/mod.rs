//! Durable storage for the whitelisted stores.
//!
//! Each store is written as its own blob (`summaries`, `types`, `details`,
//! `daily`, `bookmarks_kid`, `bookmarks_parent`, `recent`) wrapped in
//! `CachedData` so the time of the last write is known. In-flight fetches and
//! the focused id are never written.

pub mod blob;

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::bookmarks::{Audience, BookmarkSet};
use crate::daily::DailyState;
use crate::models::{CombinedDetail, PokemonSummary, TypeSummary};
use crate::recent::RecentSelections;
use crate::store::{lock, Stores};

pub use blob::{BlobStore, FileBlobStore, MemoryBlobStore};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.cached_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Also covers clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            format!("{}h ago", minutes / 60)
        } else {
            format!("{}d ago", minutes / 1440)
        }
    }
}

/// The persisted stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    Summaries,
    Types,
    Details,
    Daily,
    KidBookmarks,
    ParentBookmarks,
    Recent,
}

impl StoreKey {
    pub const ALL: [StoreKey; 7] = [
        StoreKey::Summaries,
        StoreKey::Types,
        StoreKey::Details,
        StoreKey::Daily,
        StoreKey::KidBookmarks,
        StoreKey::ParentBookmarks,
        StoreKey::Recent,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StoreKey::Summaries => "summaries",
            StoreKey::Types => "types",
            StoreKey::Details => "details",
            StoreKey::Daily => "daily",
            StoreKey::KidBookmarks => "bookmarks_kid",
            StoreKey::ParentBookmarks => "bookmarks_parent",
            StoreKey::Recent => "recent",
        }
    }

    pub fn for_bookmarks(audience: Audience) -> Self {
        match audience {
            Audience::Kid => StoreKey::KidBookmarks,
            Audience::Parent => StoreKey::ParentBookmarks,
        }
    }
}

/// Everything that survives a restart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub summaries: Vec<PokemonSummary>,
    pub types: Vec<TypeSummary>,
    pub details: BTreeMap<u32, CombinedDetail>,
    pub daily: DailyState,
    pub kid_bookmarks: BookmarkSet,
    pub parent_bookmarks: BookmarkSet,
    pub recent: RecentSelections,
}

/// Reads and writes snapshots through a `BlobStore`. Clone is cheap, and
/// clones share one write lock.
#[derive(Clone)]
pub struct Persistence {
    blobs: Arc<dyn BlobStore>,
    /// Held from encoding until the blob is written, so writes land in the
    /// order their snapshots were taken.
    writes: Arc<Mutex<()>>,
}

impl Persistence {
    pub fn new(blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            blobs,
            writes: Arc::new(Mutex::new(())),
        }
    }

    /// Load every stored blob. Returns `None` when nothing has been stored.
    /// A blob that fails to parse is logged and treated as absent.
    pub fn load(&self) -> Result<Option<Snapshot>> {
        let mut snapshot = Snapshot::default();
        let mut found = false;

        if let Some(v) = self.load_blob(StoreKey::Summaries)? {
            snapshot.summaries = v;
            found = true;
        }
        if let Some(v) = self.load_blob(StoreKey::Types)? {
            snapshot.types = v;
            found = true;
        }
        if let Some(v) = self.load_blob(StoreKey::Details)? {
            snapshot.details = v;
            found = true;
        }
        if let Some(v) = self.load_blob(StoreKey::Daily)? {
            snapshot.daily = v;
            found = true;
        }
        if let Some(v) = self.load_blob(StoreKey::KidBookmarks)? {
            snapshot.kid_bookmarks = v;
            found = true;
        }
        if let Some(v) = self.load_blob(StoreKey::ParentBookmarks)? {
            snapshot.parent_bookmarks = v;
            found = true;
        }
        if let Some(v) = self.load_blob(StoreKey::Recent)? {
            snapshot.recent = v;
            found = true;
        }

        Ok(found.then_some(snapshot))
    }

    fn load_blob<T: DeserializeOwned>(&self, key: StoreKey) -> Result<Option<T>> {
        let Some(contents) = self.blobs.read(key.name())? else {
            return Ok(None);
        };
        match serde_json::from_str::<CachedData<T>>(&contents) {
            Ok(cached) => Ok(Some(cached.data)),
            Err(e) => {
                warn!(store = key.name(), error = %e, "Discarding unreadable store");
                Ok(None)
            }
        }
    }

    /// Write every blob of `snapshot`.
    pub fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let _writing = lock(&self.writes);
        self.write_blob(StoreKey::Summaries, &snapshot.summaries)?;
        self.write_blob(StoreKey::Types, &snapshot.types)?;
        self.write_blob(StoreKey::Details, &snapshot.details)?;
        self.write_blob(StoreKey::Daily, &snapshot.daily)?;
        self.write_blob(StoreKey::KidBookmarks, &snapshot.kid_bookmarks)?;
        self.write_blob(StoreKey::ParentBookmarks, &snapshot.parent_bookmarks)?;
        self.write_blob(StoreKey::Recent, &snapshot.recent)?;
        Ok(())
    }

    fn write_blob<T: Serialize>(&self, key: StoreKey, data: &T) -> Result<()> {
        let contents = encode(data)?;
        self.blobs.write(key.name(), &contents)
    }

    /// Remove every blob.
    pub fn clear(&self) -> Result<()> {
        let _writing = lock(&self.writes);
        for key in StoreKey::ALL {
            self.blobs.remove(key.name())?;
        }
        Ok(())
    }

    /// Write one store's current contents. Failures are logged, not returned:
    /// the in-memory mutation that triggered the write already happened.
    pub fn persist(&self, stores: &Stores, key: StoreKey) {
        let _writing = lock(&self.writes);
        let result = encode_store(stores, key)
            .and_then(|contents| self.blobs.write(key.name(), &contents));
        match result {
            Ok(()) => debug!(store = key.name(), "Store persisted"),
            Err(e) => warn!(store = key.name(), error = %e, "Failed to persist store"),
        }
    }

    /// Human-readable age of each stored blob, `None` when absent or unreadable.
    pub fn ages(&self) -> Vec<(StoreKey, Option<String>)> {
        StoreKey::ALL
            .iter()
            .map(|&key| {
                let age = match self.blobs.read(key.name()) {
                    Ok(Some(contents)) => serde_json::from_str::<CachedData<IgnoredAny>>(&contents)
                        .map(|c| c.age_display())
                        .ok(),
                    Ok(None) => None,
                    Err(e) => {
                        debug!(store = key.name(), error = %e, "Failed to read store for age display");
                        None
                    }
                };
                (key, age)
            })
            .collect()
    }
}

fn encode<T: Serialize>(data: &T) -> Result<String> {
    serde_json::to_string(&CachedData::new(data)).context("Failed to serialize store")
}

/// Serialise a store while holding only that store's lock.
fn encode_store(stores: &Stores, key: StoreKey) -> Result<String> {
    match key {
        StoreKey::Summaries => encode(&lock(&stores.summaries).list()),
        StoreKey::Types => encode(&*lock(&stores.types)),
        StoreKey::Details => encode(&lock(&stores.details).cache.to_sorted()),
        StoreKey::Daily => encode(&*lock(&stores.daily)),
        StoreKey::KidBookmarks => encode(lock(&stores.bookmarks).set(Audience::Kid)),
        StoreKey::ParentBookmarks => encode(lock(&stores.bookmarks).set(Audience::Parent)),
        StoreKey::Recent => encode(&*lock(&stores.recent)),
    }
}
