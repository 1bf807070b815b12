//! In-memory catalog used by tests. Counts every request per URL and can hold
//! responses back until released.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Semaphore;

use super::{ApiError, CatalogClient, Transport};

pub const BASE: &str = "https://pokeapi.test/api/v2";

#[derive(Default)]
pub struct FakeCatalog {
    routes: Mutex<HashMap<String, Result<Value, ApiError>>>,
    calls: Mutex<HashMap<String, usize>>,
    gate: Option<Semaphore>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests wait until [`FakeCatalog::release`] hands out permits.
    pub fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::default()
        }
    }

    pub fn release(&self, permits: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(permits);
        }
    }

    pub fn client(self: &Arc<Self>) -> CatalogClient {
        CatalogClient::new(Arc::clone(self) as Arc<dyn Transport>, BASE)
    }

    pub fn route(&self, url: impl Into<String>, response: Result<Value, ApiError>) {
        self.routes.lock().unwrap().insert(url.into(), response);
    }

    pub fn calls(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    pub fn pokemon_url(id: u32) -> String {
        format!("{}/pokemon/{}", BASE, id)
    }

    pub fn species_url(id: u32) -> String {
        format!("{}/pokemon-species/{}", BASE, id)
    }

    pub fn chain_url(chain_id: u32) -> String {
        format!("{}/evolution-chain/{}/", BASE, chain_id)
    }

    /// Register `/pokemon/{id}` and `/pokemon-species/{id}` pointing at `chain_id`.
    pub fn add_pokemon(&self, id: u32, name: &str, chain_id: u32) {
        self.route(
            Self::pokemon_url(id),
            Ok(json!({
                "id": id,
                "name": name,
                "height": 7,
                "weight": 69,
                "sprites": {"front_default": format!("https://img/{}.png", id), "front_shiny": null},
                "types": [{"slot": 1, "type": {"name": "grass", "url": format!("{}/type/12/", BASE)}}],
                "stats": [{"base_stat": 45, "stat": {"name": "hp", "url": ""}}],
                "abilities": [{"ability": {"name": "overgrow", "url": ""}, "is_hidden": false}]
            })),
        );
        self.route(
            Self::species_url(id),
            Ok(json!({
                "id": id,
                "name": name,
                "evolution_chain": {"url": Self::chain_url(chain_id)},
                "flavor_text_entries": [{"flavor_text": format!("{} entry.", name), "language": {"name": "en", "url": ""}}],
                "genera": [{"genus": "Seed Pokémon", "language": {"name": "en", "url": ""}}],
                "habitat": null,
                "is_legendary": false,
                "is_mythical": false
            })),
        );
    }

    pub fn add_chain(&self, chain_id: u32, chain: Value) {
        self.route(Self::chain_url(chain_id), Ok(json!({"id": chain_id, "chain": chain})));
    }

    /// A linear bulbasaur -> ivysaur -> venusaur family under chain 1.
    pub fn with_bulbasaur_family(self) -> Self {
        self.add_pokemon(1, "bulbasaur", 1);
        self.add_pokemon(2, "ivysaur", 1);
        self.add_pokemon(3, "venusaur", 1);
        self.add_chain(
            1,
            link(1, "bulbasaur", vec![link(2, "ivysaur", vec![link(3, "venusaur", vec![])])]),
        );
        self
    }
}

pub fn link(id: u32, name: &str, children: Vec<Value>) -> Value {
    json!({
        "species": {"name": name, "url": format!("{}/pokemon-species/{}/", BASE, id)},
        "evolves_to": children
    })
}

#[async_trait]
impl Transport for FakeCatalog {
    async fn get_json(&self, url: &str) -> Result<Value, ApiError> {
        *self.calls.lock().unwrap().entry(url.to_string()).or_insert(0) += 1;

        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|e| ApiError::Cancelled(e.to_string()))?
                .forget();
        } else {
            tokio::task::yield_now().await;
        }

        self.routes
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or_else(|| Err(ApiError::NotFound(url.to_string())))
    }
}
