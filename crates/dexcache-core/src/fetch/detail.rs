use tracing::debug;

use crate::api::{ApiError, CatalogClient};
use crate::cache::SummaryCache;
use crate::models::{build_tree, flatten, CombinedDetail, EvolutionNode};

/// Builds one `CombinedDetail` from the entity, species and evolution-chain
/// endpoints.
#[derive(Clone)]
pub struct DetailFetcher {
    client: CatalogClient,
    language: String,
}

impl DetailFetcher {
    pub fn new(client: CatalogClient, language: impl Into<String>) -> Self {
        Self {
            client,
            language: language.into(),
        }
    }

    /// Entity and species are fetched concurrently, then the chain they
    /// reference. Any failed call fails the whole detail.
    ///
    /// Chain members other than `id` get their names from `summaries` when it
    /// knows them; their details are not fetched here.
    pub async fn fetch_combined_detail(
        &self,
        id: u32,
        summaries: Option<&SummaryCache>,
    ) -> Result<CombinedDetail, ApiError> {
        if id == 0 {
            return Err(ApiError::MalformedReference("id 0 is not a catalog id".to_string()));
        }

        let (pokemon, species) =
            tokio::try_join!(self.client.fetch_pokemon(id), self.client.fetch_species(id))?;

        let evolution_tree = match species.evolution_chain_url() {
            Some(url) => {
                let chain = self.client.fetch_evolution_chain(url).await?;
                build_tree(&chain.chain)?
            }
            None => {
                debug!(id, "Species has no evolution chain");
                EvolutionNode {
                    id,
                    name: species.name.clone(),
                    children: Vec::new(),
                }
            }
        };

        let mut evolution_chain = flatten(&evolution_tree);
        if let Some(summaries) = summaries {
            for member in evolution_chain.iter_mut().filter(|m| m.id != id) {
                if let Some(name) = summaries.name_of(member.id) {
                    member.name = name.to_string();
                }
            }
        }

        Ok(CombinedDetail {
            pokemon: pokemon.to_detail(),
            species: species.to_species_info(&self.language),
            evolution_chain,
            evolution_tree,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::api::fake::{link, FakeCatalog};
    use crate::models::PokemonSummary;

    fn fetcher(fake: &Arc<FakeCatalog>) -> DetailFetcher {
        DetailFetcher::new(fake.client(), "en")
    }

    #[tokio::test]
    async fn test_fan_in_builds_combined_detail() {
        let fake = Arc::new(FakeCatalog::new().with_bulbasaur_family());

        let detail = fetcher(&fake).fetch_combined_detail(2, None).await.expect("detail");

        assert_eq!(detail.id(), 2);
        assert_eq!(detail.species.genus, "Seed Pokémon");
        assert_eq!(detail.related_ids(), vec![1, 3]);
        assert_eq!(detail.evolution_tree.children.len(), 1);
        assert_eq!(fake.calls(&FakeCatalog::pokemon_url(2)), 1);
        assert_eq!(fake.calls(&FakeCatalog::species_url(2)), 1);
        assert_eq!(fake.calls(&FakeCatalog::chain_url(1)), 1);
        // Members are not fetched inline
        assert_eq!(fake.calls(&FakeCatalog::pokemon_url(1)), 0);
    }

    #[tokio::test]
    async fn test_member_names_come_from_summaries() {
        let fake = Arc::new(FakeCatalog::new());
        fake.add_pokemon(386, "deoxys", 200);
        fake.add_pokemon(999, "other", 200);
        fake.add_chain(200, link(999, "other-species", vec![link(386, "deoxys", vec![])]));
        let summaries = SummaryCache::new(vec![PokemonSummary {
            id: 999,
            name: "other-form".to_string(),
        }]);

        let detail = fetcher(&fake)
            .fetch_combined_detail(386, Some(&summaries))
            .await
            .expect("detail");

        assert_eq!(detail.evolution_chain[0].name, "other-form");
        assert_eq!(detail.evolution_chain[1].name, "deoxys");
    }

    #[tokio::test]
    async fn test_failure_of_any_call_fails_detail() {
        let fake = Arc::new(FakeCatalog::new().with_bulbasaur_family());
        fake.route(FakeCatalog::chain_url(1), Err(ApiError::from_status(500, "boom")));

        let err = fetcher(&fake).fetch_combined_detail(1, None).await.unwrap_err();
        assert!(matches!(err, ApiError::Transport { status: 500, .. }));

        let err = fetcher(&fake).fetch_combined_detail(404, None).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_species_without_chain_is_single_node() {
        let fake = Arc::new(FakeCatalog::new());
        fake.add_pokemon(132, "ditto", 0);
        fake.route(
            FakeCatalog::species_url(132),
            Ok(json!({"id": 132, "name": "ditto", "evolution_chain": null})),
        );

        let detail = fetcher(&fake).fetch_combined_detail(132, None).await.expect("detail");
        assert_eq!(detail.evolution_chain.len(), 1);
        assert!(detail.related_ids().is_empty());
        assert_eq!(detail.species.description, crate::models::species::DESCRIPTION_PLACEHOLDER);
    }

    #[tokio::test]
    async fn test_zero_id_is_rejected_without_network() {
        let fake = Arc::new(FakeCatalog::new());
        let err = fetcher(&fake).fetch_combined_detail(0, None).await.unwrap_err();
        assert!(matches!(err, ApiError::MalformedReference(_)));
        assert_eq!(fake.total_calls(), 0);
    }
}
