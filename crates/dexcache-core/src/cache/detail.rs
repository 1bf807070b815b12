use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::models::CombinedDetail;

/// Fully resolved details keyed by id. Entries are never evicted.
#[derive(Debug, Default, Clone)]
pub struct DetailCache {
    entries: HashMap<u32, Arc<CombinedDetail>>,
}

impl DetailCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: u32) -> Option<Arc<CombinedDetail>> {
        self.entries.get(&id).cloned()
    }

    pub fn contains(&self, id: u32) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn insert(&mut self, detail: Arc<CombinedDetail>) {
        self.entries.insert(detail.id(), detail);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Ordered view used when persisting.
    pub fn to_sorted(&self) -> BTreeMap<u32, &CombinedDetail> {
        self.entries.iter().map(|(id, d)| (*id, d.as_ref())).collect()
    }
}

impl FromIterator<CombinedDetail> for DetailCache {
    fn from_iter<I: IntoIterator<Item = CombinedDetail>>(iter: I) -> Self {
        let mut cache = Self::new();
        for detail in iter {
            cache.insert(Arc::new(detail));
        }
        cache
    }
}
