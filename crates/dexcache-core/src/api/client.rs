//! Typed client for the read-only catalog REST API.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::models::{
    EvolutionChainResponse, NamedResourceList, PokemonResponse, PokemonSummary, SpeciesResponse,
    TypeMembersResponse, TypeSummary,
};

use super::{ApiError, Transport};

/// Default catalog base URL.
pub const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2";

/// Catalog client. Clone is cheap - the transport is shared.
#[derive(Clone)]
pub struct CatalogClient {
    transport: Arc<dyn Transport>,
    base_url: String,
}

impl CatalogClient {
    pub fn new(transport: Arc<dyn Transport>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            transport,
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let value = self.transport.get_json(url).await?;
        serde_json::from_value(value)
            .map_err(|e| ApiError::InvalidResponse(format!("{}: {}", url, e)))
    }

    /// `GET /pokemon/{id}`
    pub async fn fetch_pokemon(&self, id: u32) -> Result<PokemonResponse, ApiError> {
        self.get(&format!("{}/pokemon/{}", self.base_url, id)).await
    }

    /// `GET /pokemon-species/{id}`
    pub async fn fetch_species(&self, id: u32) -> Result<SpeciesResponse, ApiError> {
        self.get(&format!("{}/pokemon-species/{}", self.base_url, id)).await
    }

    /// Follow the evolution-chain URL referenced by a species payload.
    pub async fn fetch_evolution_chain(&self, url: &str) -> Result<EvolutionChainResponse, ApiError> {
        self.get(url).await
    }

    /// `GET /pokemon?limit=N`
    pub async fn fetch_pokemon_list(&self, limit: u32) -> Result<Vec<PokemonSummary>, ApiError> {
        let list: NamedResourceList = self
            .get(&format!("{}/pokemon?limit={}", self.base_url, limit))
            .await?;
        let summaries = list.to_pokemon_summaries();
        debug!(count = summaries.len(), "Pokemon list fetched");
        Ok(summaries)
    }

    /// `GET /type/{id-or-name}` - members of one classification.
    pub async fn fetch_pokemon_by_type(&self, type_ref: &str) -> Result<Vec<PokemonSummary>, ApiError> {
        let type_ref = type_ref.trim().to_lowercase();
        if type_ref.is_empty() {
            return Err(ApiError::MalformedReference("empty type reference".to_string()));
        }
        if !type_ref.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-') {
            return Err(ApiError::MalformedReference(format!("invalid type reference '{}'", type_ref)));
        }
        let resp: TypeMembersResponse = self
            .get(&format!("{}/type/{}", self.base_url, type_ref))
            .await?;
        Ok(resp.to_summaries())
    }

    /// `GET /type` - every classification.
    pub async fn fetch_type_list(&self) -> Result<Vec<TypeSummary>, ApiError> {
        let list: NamedResourceList = self.get(&format!("{}/type", self.base_url)).await?;
        Ok(list.to_type_summaries())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::api::fake::{FakeCatalog, BASE};

    #[tokio::test]
    async fn test_fetch_pokemon_list_extracts_ids() {
        let fake = Arc::new(FakeCatalog::new());
        fake.route(
            format!("{}/pokemon?limit=2", BASE),
            Ok(json!({"count": 2, "results": [
                {"name": "bulbasaur", "url": format!("{}/pokemon/1/", BASE)},
                {"name": "ivysaur", "url": format!("{}/pokemon/2/", BASE)}
            ]})),
        );

        let list = fake.client().fetch_pokemon_list(2).await.expect("list");
        assert_eq!(list.len(), 2);
        assert_eq!(list[1], PokemonSummary { id: 2, name: "ivysaur".to_string() });
    }

    #[tokio::test]
    async fn test_fetch_by_type_normalizes_reference() {
        let fake = Arc::new(FakeCatalog::new());
        fake.route(
            format!("{}/type/fire", BASE),
            Ok(json!({"pokemon": [{"pokemon": {"name": "charmander", "url": format!("{}/pokemon/4/", BASE)}, "slot": 1}]})),
        );

        let members = fake.client().fetch_pokemon_by_type(" Fire ").await.expect("members");
        assert_eq!(members[0].id, 4);
        assert!(matches!(
            fake.client().fetch_pokemon_by_type("  ").await,
            Err(ApiError::MalformedReference(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_by_type_rejects_path_and_query_characters() {
        let fake = Arc::new(FakeCatalog::new());
        let client = fake.client();
        for bad in ["fire?limit=1", "a/b", "fire#x", "../pokemon/1", "fire water"] {
            assert!(
                matches!(client.fetch_pokemon_by_type(bad).await, Err(ApiError::MalformedReference(_))),
                "accepted {:?}",
                bad
            );
        }
        assert_eq!(fake.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_fetch_type_list() {
        let fake = Arc::new(FakeCatalog::new());
        fake.route(
            format!("{}/type", BASE),
            Ok(json!({"results": [{"name": "normal", "url": format!("{}/type/1/", BASE)}]})),
        );
        let types = fake.client().fetch_type_list().await.expect("types");
        assert_eq!(types, vec![TypeSummary { id: 1, name: "normal".to_string() }]);
    }

    #[tokio::test]
    async fn test_shape_mismatch_is_invalid_response() {
        let fake = Arc::new(FakeCatalog::new());
        fake.route(FakeCatalog::pokemon_url(9), Ok(json!({"unexpected": true})));
        assert!(matches!(
            fake.client().fetch_pokemon(9).await,
            Err(ApiError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let fake = Arc::new(FakeCatalog::new());
        let client = CatalogClient::new(fake as Arc<dyn Transport>, "https://example.test/api/v2/");
        assert_eq!(client.base_url(), "https://example.test/api/v2");
    }
}
