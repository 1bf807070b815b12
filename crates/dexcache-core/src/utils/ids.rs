//! Recover numeric ids from catalog resource URLs.
//!
//! Both functions return `0` when the URL does not contain a recognised
//! resource path. `0` is never a valid catalog id.

/// Resource kinds whose URLs carry a Pokémon id.
const POKEMON_RESOURCES: [&str; 2] = ["pokemon", "pokemon-species"];

const TYPE_RESOURCES: [&str; 1] = ["type"];

/// Extract a Pokémon id from a `/pokemon/{id}` or `/pokemon-species/{id}` URL.
///
/// The id segment must be all digits: `/pokemon/25abc/` yields `0`, not `25`.
///
/// ```
/// use dexcache_core::utils::extract_pokemon_id;
/// assert_eq!(extract_pokemon_id("https://pokeapi.co/api/v2/pokemon/25/"), 25);
/// assert_eq!(extract_pokemon_id("https://pokeapi.co/api/v2/pokemon-species/133"), 133);
/// assert_eq!(extract_pokemon_id("https://pokeapi.co/api/v2/move/7/"), 0);
/// assert_eq!(extract_pokemon_id("https://pokeapi.co/api/v2/pokemon/25abc/"), 0);
/// ```
pub fn extract_pokemon_id(url: &str) -> u32 {
    extract_resource_id(url, &POKEMON_RESOURCES)
}

/// Extract a type id from a `/type/{id}` URL.
pub fn extract_type_id(url: &str) -> u32 {
    extract_resource_id(url, &TYPE_RESOURCES)
}

fn extract_resource_id(url: &str, resources: &[&str]) -> u32 {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let segments: Vec<&str> = path.split('/').collect();

    segments
        .windows(2)
        .find_map(|pair| {
            let (resource, id) = (pair[0], pair[1]);
            if resources.contains(&resource) && is_numeric(id) {
                id.parse::<u32>().ok()
            } else {
                None
            }
        })
        .unwrap_or(0)
}

fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
