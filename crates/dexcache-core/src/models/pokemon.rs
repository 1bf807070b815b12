use serde::{Deserialize, Serialize};

use crate::utils::{artwork_url, extract_pokemon_id, extract_type_id};

use super::evolution::{EvolutionMember, EvolutionNode};
use super::species::SpeciesInfo;

// ============================================================================
// Catalog payloads
// ============================================================================

/// `{name, url}` reference used throughout the catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct NamedResource {
    pub name: String,
    pub url: String,
}

/// Paginated list response (`GET /pokemon?limit=N`, `GET /type`).
#[derive(Debug, Deserialize)]
pub struct NamedResourceList {
    #[serde(default)]
    pub results: Vec<NamedResource>,
}

impl NamedResourceList {
    /// Convert list entries into summaries, dropping entries whose URL carries no id.
    pub fn to_pokemon_summaries(&self) -> Vec<PokemonSummary> {
        self.results
            .iter()
            .filter_map(|r| PokemonSummary::from_resource(r, extract_pokemon_id))
            .collect()
    }

    pub fn to_type_summaries(&self) -> Vec<TypeSummary> {
        self.results
            .iter()
            .filter_map(|r| {
                let id = extract_type_id(&r.url);
                (id != 0).then(|| TypeSummary {
                    id,
                    name: r.name.clone(),
                })
            })
            .collect()
    }
}

/// `GET /type/{id-or-name}` response; only the member list is used.
#[derive(Debug, Deserialize)]
pub struct TypeMembersResponse {
    #[serde(default)]
    pub pokemon: Vec<TypeMember>,
}

#[derive(Debug, Deserialize)]
pub struct TypeMember {
    pub pokemon: NamedResource,
}

impl TypeMembersResponse {
    pub fn to_summaries(&self) -> Vec<PokemonSummary> {
        self.pokemon
            .iter()
            .filter_map(|m| PokemonSummary::from_resource(&m.pokemon, extract_pokemon_id))
            .collect()
    }
}

/// Raw `GET /pokemon/{id}` response.
#[derive(Debug, Deserialize)]
pub struct PokemonResponse {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub weight: u32,
    #[serde(default)]
    pub sprites: SpritesResponse,
    #[serde(default)]
    pub types: Vec<TypeSlotResponse>,
    #[serde(default)]
    pub stats: Vec<StatResponse>,
    #[serde(default)]
    pub abilities: Vec<AbilityResponse>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SpritesResponse {
    pub front_default: Option<String>,
    pub front_shiny: Option<String>,
    #[serde(default)]
    pub other: Option<OtherSprites>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OtherSprites {
    #[serde(rename = "official-artwork")]
    pub official_artwork: Option<SpriteRef>,
    pub home: Option<SpriteRef>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SpriteRef {
    pub front_default: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TypeSlotResponse {
    pub slot: u8,
    #[serde(rename = "type")]
    pub kind: NamedResource,
}

#[derive(Debug, Deserialize)]
pub struct StatResponse {
    pub base_stat: u32,
    pub stat: NamedResource,
}

#[derive(Debug, Deserialize)]
pub struct AbilityResponse {
    pub ability: NamedResource,
    #[serde(default)]
    pub is_hidden: bool,
}

impl PokemonResponse {
    pub fn to_detail(&self) -> PokemonDetail {
        let other = self.sprites.other.as_ref();
        PokemonDetail {
            id: self.id,
            name: self.name.clone(),
            height: self.height,
            weight: self.weight,
            sprites: Sprites {
                front_default: self.sprites.front_default.clone(),
                front_shiny: self.sprites.front_shiny.clone(),
                artwork: other
                    .and_then(|o| o.official_artwork.as_ref())
                    .and_then(|s| s.front_default.clone()),
                home: other
                    .and_then(|o| o.home.as_ref())
                    .and_then(|s| s.front_default.clone()),
            },
            types: self
                .types
                .iter()
                .map(|t| TypeSlot {
                    slot: t.slot,
                    name: t.kind.name.clone(),
                })
                .collect(),
            stats: self
                .stats
                .iter()
                .map(|s| StatValue {
                    name: s.stat.name.clone(),
                    base: s.base_stat,
                })
                .collect(),
            abilities: self
                .abilities
                .iter()
                .map(|a| Ability {
                    name: a.ability.name.clone(),
                    is_hidden: a.is_hidden,
                })
                .collect(),
        }
    }
}

// ============================================================================
// Domain types
// ============================================================================

/// Lightweight `{id, name}` projection used for lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct PokemonSummary {
    pub id: u32,
    pub name: String,
}

impl PokemonSummary {
    fn from_resource(resource: &NamedResource, extract: fn(&str) -> u32) -> Option<Self> {
        let id = extract(&resource.url);
        if id == 0 {
            tracing::debug!(url = %resource.url, "Skipping list entry without an id");
            return None;
        }
        Some(Self {
            id,
            name: resource.name.clone(),
        })
    }
}

/// A classification (type) as listed by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct TypeSummary {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Sprites {
    pub front_default: Option<String>,
    pub front_shiny: Option<String>,
    pub artwork: Option<String>,
    pub home: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct TypeSlot {
    pub slot: u8,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct StatValue {
    pub name: String,
    pub base: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Ability {
    pub name: String,
    pub is_hidden: bool,
}

/// Primary attributes from `/pokemon/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct PokemonDetail {
    pub id: u32,
    pub name: String,
    pub height: u32,
    pub weight: u32,
    pub sprites: Sprites,
    pub types: Vec<TypeSlot>,
    pub stats: Vec<StatValue>,
    pub abilities: Vec<Ability>,
}

impl PokemonDetail {
    /// Best available sprite: official artwork, home render, default front sprite,
    /// then the id-derived artwork URL.
    pub fn preferred_sprite(&self) -> String {
        self.sprites
            .artwork
            .clone()
            .or_else(|| self.sprites.home.clone())
            .or_else(|| self.sprites.front_default.clone())
            .unwrap_or_else(|| artwork_url(self.id))
    }

    /// Name of the lowest-slot type.
    pub fn primary_type(&self) -> Option<&str> {
        self.types
            .iter()
            .min_by_key(|t| t.slot)
            .map(|t| t.name.as_str())
    }
}

/// Fully resolved record: primary attributes, species metadata and evolution data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct CombinedDetail {
    #[serde(flatten)]
    pub pokemon: PokemonDetail,
    pub species: SpeciesInfo,
    pub evolution_chain: Vec<EvolutionMember>,
    pub evolution_tree: EvolutionNode,
}

impl CombinedDetail {
    pub fn id(&self) -> u32 {
        self.pokemon.id
    }

    pub fn name(&self) -> &str {
        &self.pokemon.name
    }

    /// Ids of every chain member except this one, in chain order.
    pub fn related_ids(&self) -> Vec<u32> {
        self.evolution_chain
            .iter()
            .map(|m| m.id)
            .filter(|&id| id != self.id())
            .collect()
    }
}
