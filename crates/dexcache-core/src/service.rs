//! The `Dex` service: the single entry point frontends talk to.
//!
//! Built once at startup, cloned freely. Construction restores whatever the
//! blob store holds, and every mutation writes the affected store back.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{info, warn};

use crate::api::{ApiError, CatalogClient, HttpTransport, Transport};
use crate::bookmarks::Audience;
use crate::cache::SummaryCache;
use crate::config::Config;
use crate::daily::{DailyRotationTracker, DailyState};
use crate::display::{display_rows, DisplayRow};
use crate::fetch::{DetailFetcher, FetchCoordinator, FetchState};
use crate::models::{CombinedDetail, PokemonSummary, TypeSummary};
use crate::notify::{LogNotifier, Notifier};
use crate::persist::{BlobStore, FileBlobStore, Persistence, StoreKey};
use crate::recent::RecentSelection;
use crate::store::{lock, Stores};
use crate::utils::{Clock, SystemClock};

#[derive(Clone)]
pub struct Dex {
    config: Arc<Config>,
    client: CatalogClient,
    stores: Arc<Stores>,
    persistence: Persistence,
    coordinator: FetchCoordinator,
    daily: DailyRotationTracker,
}

impl Dex {
    pub fn new(
        config: Config,
        transport: Arc<dyn Transport>,
        blobs: Arc<dyn BlobStore>,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let client = CatalogClient::new(transport, config.base_url.clone());
        let stores = Arc::new(Stores::default());
        let persistence = Persistence::new(blobs);

        match persistence.load() {
            Ok(Some(snapshot)) => {
                info!(
                    summaries = snapshot.summaries.len(),
                    details = snapshot.details.len(),
                    "Restored cached data"
                );
                stores.restore(snapshot);
            }
            Ok(None) => info!("No cached data, starting empty"),
            Err(e) => warn!(error = %e, "Failed to load cached data, starting empty"),
        }

        let coordinator = FetchCoordinator::new(
            Arc::clone(&stores),
            DetailFetcher::new(client.clone(), config.language.clone()),
            persistence.clone(),
            notifier,
        );
        let daily = DailyRotationTracker::new(
            Arc::clone(&stores),
            persistence.clone(),
            clock,
            config.max_pokemon_id,
        );

        Self {
            config: Arc::new(config),
            client,
            stores,
            persistence,
            coordinator,
            daily,
        }
    }

    /// Production wiring: HTTP transport, file-backed blobs, the local clock
    /// and log notifications.
    pub fn from_config(config: Config) -> Result<Self> {
        let transport = HttpTransport::new(config.request_timeout())
            .context("Failed to build HTTP client")?;
        let data_dir = config.data_dir()?;
        let blobs = FileBlobStore::new(data_dir.clone())
            .with_context(|| format!("Failed to open data directory {}", data_dir.display()))?;

        Ok(Self::new(
            config,
            Arc::new(transport),
            Arc::new(blobs),
            Arc::new(SystemClock),
            Arc::new(LogNotifier),
        ))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // ------------------------------------------------------------------
    // Details
    // ------------------------------------------------------------------

    /// User-initiated fetch of the combined detail for `id`.
    pub async fn fetch_detail(&self, id: u32) -> Result<Arc<CombinedDetail>, ApiError> {
        self.coordinator.fetch_detail(id).await
    }

    pub fn cached_detail(&self, id: u32) -> Option<Arc<CombinedDetail>> {
        self.coordinator.cached(id)
    }

    pub fn fetch_state(&self, id: u32) -> FetchState {
        self.coordinator.state(id)
    }

    pub fn set_focused_id(&self, id: Option<u32>) {
        self.coordinator.set_focused_id(id);
    }

    pub fn focused_id(&self) -> Option<u32> {
        self.coordinator.focused_id()
    }

    pub fn focused_detail(&self) -> Option<Arc<CombinedDetail>> {
        self.focused_id().and_then(|id| self.cached_detail(id))
    }

    /// Wait for background fetches, prefetches included, to settle and be
    /// persisted. Returns `false` if `timeout` elapsed first.
    pub async fn wait_for_background(&self, timeout: Duration) -> bool {
        self.coordinator.wait_idle(timeout).await
    }

    // ------------------------------------------------------------------
    // Bookmarks
    // ------------------------------------------------------------------

    /// Returns whether `id` is bookmarked afterwards.
    pub fn toggle_bookmark(&self, audience: Audience, id: u32) -> bool {
        let added = lock(&self.stores.bookmarks).toggle(audience, id);
        info!(%audience, id, added, "Bookmark toggled");
        self.persistence
            .persist(&self.stores, StoreKey::for_bookmarks(audience));
        added
    }

    pub fn is_bookmarked(&self, audience: Audience, id: u32) -> bool {
        lock(&self.stores.bookmarks).contains(audience, id)
    }

    pub fn bookmarks(&self, audience: Audience) -> Vec<u32> {
        lock(&self.stores.bookmarks).set(audience).ids().to_vec()
    }

    /// Cached details for the audience's bookmarks, in bookmark order.
    /// Bookmarks without a cached detail are skipped.
    pub fn bookmarked_details(&self, audience: Audience) -> Vec<Arc<CombinedDetail>> {
        let ids = self.bookmarks(audience);
        let details = lock(&self.stores.details);
        ids.into_iter().filter_map(|id| details.cache.get(id)).collect()
    }

    // ------------------------------------------------------------------
    // Daily pick
    // ------------------------------------------------------------------

    pub fn get_or_create_daily_pick(&self) -> u32 {
        self.daily.get_or_create_daily()
    }

    pub fn set_daily_pick(&self, id: u32) {
        self.daily.set_daily(id);
    }

    pub fn reroll_daily_pick(&self) -> u32 {
        self.daily.reroll()
    }

    pub fn reroll_count(&self) -> u32 {
        self.daily.reroll_count()
    }

    pub fn daily_state(&self) -> DailyState {
        self.daily.state()
    }

    // ------------------------------------------------------------------
    // Lists
    // ------------------------------------------------------------------

    /// The summary list, fetched once and then served from cache.
    pub async fn load_summaries(&self) -> Result<Arc<SummaryCache>, ApiError> {
        let cached = self.summaries();
        if !cached.is_empty() {
            return Ok(cached);
        }

        info!(limit = self.config.list_limit, "Fetching summary list");
        let list = self.client.fetch_pokemon_list(self.config.list_limit).await?;
        let summaries = Arc::new(SummaryCache::new(list));
        *lock(&self.stores.summaries) = Arc::clone(&summaries);
        self.persistence.persist(&self.stores, StoreKey::Summaries);
        Ok(summaries)
    }

    pub fn summaries(&self) -> Arc<SummaryCache> {
        Arc::clone(&lock(&self.stores.summaries))
    }

    /// The type list, fetched once and then served from cache.
    pub async fn load_types(&self) -> Result<Vec<TypeSummary>, ApiError> {
        let cached = self.types();
        if !cached.is_empty() {
            return Ok(cached);
        }

        info!("Fetching type list");
        let types = self.client.fetch_type_list().await?;
        *lock(&self.stores.types) = types.clone();
        self.persistence.persist(&self.stores, StoreKey::Types);
        Ok(types)
    }

    pub fn types(&self) -> Vec<TypeSummary> {
        lock(&self.stores.types).clone()
    }

    /// Members of one type, by id or name, projected into display rows.
    pub async fn fetch_by_type_display(&self, type_ref: &str) -> Result<Vec<DisplayRow>, ApiError> {
        let members = self.client.fetch_pokemon_by_type(type_ref).await?;
        let type_name = self.type_name(type_ref);
        Ok(self.display_rows(&members, Some(&type_name)))
    }

    fn type_name(&self, type_ref: &str) -> String {
        let type_ref = type_ref.trim();
        match type_ref.parse::<u32>() {
            Ok(id) => lock(&self.stores.types)
                .iter()
                .find(|t| t.id == id)
                .map(|t| t.name.clone())
                .unwrap_or_default(),
            Err(_) => type_ref.to_string(),
        }
    }

    pub fn display_rows(&self, list: &[PokemonSummary], fallback_type: Option<&str>) -> Vec<DisplayRow> {
        let details = lock(&self.stores.details);
        display_rows(list, &details.cache, fallback_type)
    }

    // ------------------------------------------------------------------
    // Recent selections
    // ------------------------------------------------------------------

    pub fn add_recent(&self, summary: &PokemonSummary) {
        lock(&self.stores.recent).add(summary, Utc::now());
        self.persistence.persist(&self.stores, StoreKey::Recent);
    }

    pub fn remove_recent(&self, id: u32) {
        lock(&self.stores.recent).remove(id);
        self.persistence.persist(&self.stores, StoreKey::Recent);
    }

    pub fn clear_recent(&self) {
        lock(&self.stores.recent).clear();
        self.persistence.persist(&self.stores, StoreKey::Recent);
    }

    pub fn recent(&self) -> Vec<RecentSelection> {
        lock(&self.stores.recent).list().to_vec()
    }

    // ------------------------------------------------------------------
    // Storage
    // ------------------------------------------------------------------

    /// Reset every in-memory store, then remove every persisted blob.
    /// Fetches still in flight finish but their results are dropped.
    pub fn clear_all_data(&self) -> Result<()> {
        info!("Clearing all data");
        self.stores.reset();
        self.persistence
            .clear()
            .context("Failed to clear persisted data")
    }

    /// Age of each persisted store, for status displays.
    pub fn store_ages(&self) -> Vec<(StoreKey, Option<String>)> {
        self.persistence.ages()
    }
}
