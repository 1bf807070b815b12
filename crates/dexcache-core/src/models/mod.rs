//! Data models for catalog entities.
//!
//! This module contains the raw catalog payloads and the domain types the
//! cache stores:
//!
//! - `PokemonSummary`, `TypeSummary`: list projections
//! - `PokemonDetail`, `SpeciesInfo`: primary and species attributes
//! - `EvolutionNode`, `EvolutionMember`: evolution chains, tree and flattened
//! - `CombinedDetail`: the unit stored in the detail cache

pub mod evolution;
pub mod pokemon;
pub mod species;

pub use evolution::{
    build_tree, collect_variants, flatten, is_branching, ChainLink, EvolutionChainResponse,
    EvolutionMember, EvolutionNode,
};
pub use pokemon::{
    Ability, CombinedDetail, NamedResource, NamedResourceList, PokemonDetail, PokemonResponse,
    PokemonSummary, Sprites, StatValue, TypeMembersResponse, TypeSlot, TypeSummary,
};
pub use species::{SpeciesInfo, SpeciesResponse};
