//! List rows ready for rendering: summaries joined with whatever detail is
//! already cached.

use serde::{Deserialize, Serialize};

use crate::cache::DetailCache;
use crate::models::{PokemonSummary, TypeSlot};
use crate::utils::artwork_url;

/// Primary type used when nothing better is known.
pub const DEFAULT_PRIMARY_TYPE: &str = "normal";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct DisplayRow {
    pub id: u32,
    pub name: String,
    pub sprite: String,
    pub primary_type: String,
    /// Only known once the detail is cached.
    pub types: Option<Vec<TypeSlot>>,
}

/// Project `list` into rows. Never fetches.
pub fn display_rows(
    list: &[PokemonSummary],
    details: &DetailCache,
    fallback_type: Option<&str>,
) -> Vec<DisplayRow> {
    let fallback = fallback_type
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase);

    list.iter()
        .map(|summary| {
            let detail = details.get(summary.id);
            let pokemon = detail.as_ref().map(|d| &d.pokemon);

            let primary_type = pokemon
                .and_then(|p| p.primary_type())
                .map(str::to_string)
                .or_else(|| fallback.clone())
                .unwrap_or_else(|| DEFAULT_PRIMARY_TYPE.to_string());

            DisplayRow {
                id: summary.id,
                name: summary.name.clone(),
                sprite: pokemon
                    .map(|p| p.preferred_sprite())
                    .unwrap_or_else(|| artwork_url(summary.id)),
                primary_type,
                types: pokemon.map(|p| p.types.clone()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::models::{CombinedDetail, EvolutionNode, PokemonDetail, SpeciesInfo, Sprites};

    fn summary(id: u32, name: &str) -> PokemonSummary {
        PokemonSummary {
            id,
            name: name.to_string(),
        }
    }

    fn detail(id: u32, name: &str, types: &[(u8, &str)]) -> CombinedDetail {
        CombinedDetail {
            pokemon: PokemonDetail {
                id,
                name: name.to_string(),
                height: 4,
                weight: 60,
                sprites: Sprites {
                    front_default: Some(format!("https://img/{}.png", id)),
                    ..Sprites::default()
                },
                types: types
                    .iter()
                    .map(|(slot, name)| TypeSlot {
                        slot: *slot,
                        name: name.to_string(),
                    })
                    .collect(),
                stats: Vec::new(),
                abilities: Vec::new(),
            },
            species: SpeciesInfo::default(),
            evolution_chain: Vec::new(),
            evolution_tree: EvolutionNode {
                id,
                name: name.to_string(),
                children: Vec::new(),
            },
        }
    }

    #[test]
    fn test_cached_detail_wins() {
        let mut cache = DetailCache::new();
        cache.insert(Arc::new(detail(6, "charizard", &[(2, "flying"), (1, "fire")])));

        let rows = display_rows(&[summary(6, "charizard")], &cache, Some("Water"));
        assert_eq!(rows[0].primary_type, "fire");
        assert_eq!(rows[0].sprite, "https://img/6.png");
        assert_eq!(rows[0].types.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn test_fallbacks_without_detail() {
        let cache = DetailCache::new();

        let rows = display_rows(&[summary(7, "squirtle")], &cache, Some("Water"));
        assert_eq!(rows[0].primary_type, "water");
        assert_eq!(rows[0].sprite, artwork_url(7));
        assert!(rows[0].types.is_none());

        let rows = display_rows(&[summary(7, "squirtle")], &cache, None);
        assert_eq!(rows[0].primary_type, DEFAULT_PRIMARY_TYPE);

        let rows = display_rows(&[summary(7, "squirtle")], &cache, Some("  "));
        assert_eq!(rows[0].primary_type, DEFAULT_PRIMARY_TYPE);
    }

    #[test]
    fn test_rows_keep_list_order_and_names() {
        let rows = display_rows(
            &[summary(3, "venusaur"), summary(1, "bulbasaur")],
            &DetailCache::new(),
            None,
        );
        let ids: Vec<_> = rows.iter().map(|r| (r.id, r.name.as_str())).collect();
        assert_eq!(ids, vec![(3, "venusaur"), (1, "bulbasaur")]);
    }
}
