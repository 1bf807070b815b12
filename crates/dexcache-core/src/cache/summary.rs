use std::collections::HashMap;

use crate::models::PokemonSummary;

/// The lightweight `{id, name}` list, populated once from the catalog list
/// endpoint and read-only afterwards.
#[derive(Debug, Default, Clone)]
pub struct SummaryCache {
    list: Vec<PokemonSummary>,
    index: HashMap<u32, usize>,
}

impl SummaryCache {
    pub fn new(list: Vec<PokemonSummary>) -> Self {
        let index = list.iter().enumerate().map(|(i, s)| (s.id, i)).collect();
        Self { list, index }
    }

    pub fn get(&self, id: u32) -> Option<&PokemonSummary> {
        self.index.get(&id).map(|&i| &self.list[i])
    }

    pub fn name_of(&self, id: u32) -> Option<&str> {
        self.get(id).map(|s| s.name.as_str())
    }

    pub fn list(&self) -> &[PokemonSummary] {
        &self.list
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Case-insensitive substring match on names, in list order.
    pub fn search(&self, query: &str, limit: usize) -> Vec<&PokemonSummary> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.list
            .iter()
            .filter(|s| s.name.to_lowercase().contains(&needle))
            .take(limit)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(id: u32, name: &str) -> PokemonSummary {
        PokemonSummary { id, name: name.to_string() }
    }

    #[test]
    fn test_lookup_by_id() {
        let cache = SummaryCache::new(vec![summary(1, "bulbasaur"), summary(25, "pikachu")]);
        assert_eq!(cache.name_of(25), Some("pikachu"));
        assert_eq!(cache.get(2), None);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_search() {
        let cache = SummaryCache::new(vec![
            summary(25, "pikachu"),
            summary(26, "raichu"),
            summary(172, "pichu"),
        ]);
        let hits: Vec<u32> = cache.search("CHU", 2).iter().map(|s| s.id).collect();
        assert_eq!(hits, vec![25, 26]);
        assert!(cache.search("   ", 10).is_empty());
    }
}
