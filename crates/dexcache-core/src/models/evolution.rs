//! Evolution chain trees.
//!
//! The catalog returns a chain as nested `{species, evolves_to: [...]}` links.
//! [`build_tree`] resolves every link to an [`EvolutionNode`]; the remaining
//! functions answer the questions the detail screen asks of a tree.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::api::ApiError;
use crate::utils::extract_pokemon_id;

use super::pokemon::NamedResource;

/// Deepest chain accepted. Real chains are at most three levels.
pub const MAX_CHAIN_DEPTH: usize = 16;

/// Raw `GET /evolution-chain/{id}` response.
#[derive(Debug, Clone, Deserialize)]
pub struct EvolutionChainResponse {
    pub id: u32,
    pub chain: ChainLink,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChainLink {
    pub species: NamedResource,
    #[serde(default)]
    pub evolves_to: Vec<ChainLink>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct EvolutionNode {
    pub id: u32,
    pub name: String,
    pub children: Vec<EvolutionNode>,
}

/// One chain member in pre-order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct EvolutionMember {
    pub id: u32,
    pub name: String,
}

/// Resolve a raw chain into a node tree.
///
/// Fails with `MalformedReference` when a species URL carries no id, and with
/// `InvalidResponse` when an id repeats along one root-to-leaf path or the
/// chain is deeper than [`MAX_CHAIN_DEPTH`].
pub fn build_tree(link: &ChainLink) -> Result<EvolutionNode, ApiError> {
    let mut path = HashSet::new();
    build_node(link, &mut path, 0)
}

fn build_node(
    link: &ChainLink,
    path: &mut HashSet<u32>,
    depth: usize,
) -> Result<EvolutionNode, ApiError> {
    if depth >= MAX_CHAIN_DEPTH {
        return Err(ApiError::InvalidResponse(format!(
            "evolution chain deeper than {} levels",
            MAX_CHAIN_DEPTH
        )));
    }

    let id = extract_pokemon_id(&link.species.url);
    if id == 0 {
        return Err(ApiError::MalformedReference(link.species.url.clone()));
    }
    if !path.insert(id) {
        return Err(ApiError::InvalidResponse(format!(
            "evolution chain repeats id {} on one path",
            id
        )));
    }

    let children = link
        .evolves_to
        .iter()
        .map(|child| build_node(child, path, depth + 1))
        .collect::<Result<Vec<_>, _>>();
    path.remove(&id);

    Ok(EvolutionNode {
        id,
        name: link.species.name.clone(),
        children: children?,
    })
}

/// Pre-order list of every node in the tree.
pub fn flatten(root: &EvolutionNode) -> Vec<EvolutionMember> {
    let mut members = Vec::new();
    push_preorder(root, &mut members);
    members
}

fn push_preorder(node: &EvolutionNode, out: &mut Vec<EvolutionMember>) {
    out.push(EvolutionMember {
        id: node.id,
        name: node.name.clone(),
    });
    for child in &node.children {
        push_preorder(child, out);
    }
}

/// A chain branches when its root evolves in more than one direction.
pub fn is_branching(root: &EvolutionNode) -> bool {
    root.children.len() > 1
}

/// Forms reachable from the root, for the branching layout: each direct child
/// followed by that child's own children. Nodes three or more levels below
/// the root are not included.
pub fn collect_variants(root: &EvolutionNode) -> Vec<&EvolutionNode> {
    root.children
        .iter()
        .flat_map(|child| std::iter::once(child).chain(child.children.iter()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(id: u32, name: &str, children: Vec<ChainLink>) -> ChainLink {
        ChainLink {
            species: NamedResource {
                name: name.to_string(),
                url: format!("https://pokeapi.co/api/v2/pokemon-species/{}/", id),
            },
            evolves_to: children,
        }
    }

    fn ids(nodes: &[&EvolutionNode]) -> Vec<u32> {
        nodes.iter().map(|n| n.id).collect()
    }

    #[test]
    fn test_linear_chain() {
        let raw = link(1, "bulbasaur", vec![link(2, "ivysaur", vec![link(3, "venusaur", vec![])])]);
        let root = build_tree(&raw).expect("valid chain");

        assert!(!is_branching(&root));
        let members = flatten(&root);
        assert_eq!(members.len(), 3);
        assert_eq!(members.iter().map(|m| m.id).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(members[2].name, "venusaur");
    }

    #[test]
    fn test_branching_chain() {
        let raw = link(
            133,
            "eevee",
            vec![
                link(134, "vaporeon", vec![]),
                link(135, "jolteon", vec![]),
                link(136, "flareon", vec![]),
            ],
        );
        let root = build_tree(&raw).expect("valid chain");

        assert!(is_branching(&root));
        let variants = collect_variants(&root);
        for id in [134, 135, 136] {
            assert!(ids(&variants).contains(&id));
        }
        assert!(!ids(&variants).contains(&133));
    }

    #[test]
    fn test_flatten_is_preorder() {
        let raw = link(
            1,
            "a",
            vec![link(2, "b", vec![link(4, "d", vec![])]), link(3, "c", vec![])],
        );
        let root = build_tree(&raw).expect("valid chain");
        let order: Vec<u32> = flatten(&root).iter().map(|m| m.id).collect();
        assert_eq!(order, vec![1, 2, 4, 3]);
    }

    #[test]
    fn test_collect_variants_stops_two_levels_below_root() {
        // 1 -> {2 -> 3 -> 4, 5}
        let raw = link(
            1,
            "root",
            vec![
                link(2, "child", vec![link(3, "grandchild", vec![link(4, "great", vec![])])]),
                link(5, "other", vec![]),
            ],
        );
        let root = build_tree(&raw).expect("valid chain");
        assert_eq!(ids(&collect_variants(&root)), vec![2, 3, 5]);
        assert_eq!(flatten(&root).len(), 5);
    }

    #[test]
    fn test_malformed_species_url_is_error() {
        let mut raw = link(1, "a", vec![]);
        raw.species.url = "https://pokeapi.co/api/v2/item/1/".to_string();
        assert!(matches!(build_tree(&raw), Err(ApiError::MalformedReference(_))));
    }

    #[test]
    fn test_repeated_id_on_path_is_error() {
        let raw = link(1, "a", vec![link(2, "b", vec![link(1, "a", vec![])])]);
        assert!(matches!(build_tree(&raw), Err(ApiError::InvalidResponse(_))));
    }

    #[test]
    fn test_same_id_on_sibling_paths_is_allowed() {
        let raw = link(1, "a", vec![link(2, "b", vec![link(4, "d", vec![])]), link(3, "c", vec![link(4, "d", vec![])])]);
        assert!(build_tree(&raw).is_ok());
    }

    #[test]
    fn test_depth_guard() {
        let mut raw = link(MAX_CHAIN_DEPTH as u32 + 1, "leaf", vec![]);
        for id in (1..=MAX_CHAIN_DEPTH as u32).rev() {
            raw = link(id, "n", vec![raw]);
        }
        assert!(matches!(build_tree(&raw), Err(ApiError::InvalidResponse(_))));
    }

    #[test]
    fn test_parse_chain_response() {
        let json = r#"{"id": 10, "baby_trigger_item": null, "chain": {
            "is_baby": false,
            "species": {"name": "pichu", "url": "https://pokeapi.co/api/v2/pokemon-species/172/"},
            "evolves_to": [{
                "species": {"name": "pikachu", "url": "https://pokeapi.co/api/v2/pokemon-species/25/"},
                "evolves_to": [{"species": {"name": "raichu", "url": "https://pokeapi.co/api/v2/pokemon-species/26/"}, "evolves_to": []}]
            }]
        }}"#;
        let resp: EvolutionChainResponse = serde_json::from_str(json).expect("chain JSON");
        let root = build_tree(&resp.chain).expect("valid chain");
        assert_eq!(flatten(&root).iter().map(|m| m.id).collect::<Vec<_>>(), vec![172, 25, 26]);
    }
}
