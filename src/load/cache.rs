use crate::table::Dataset;
use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

/// Loaded datasets keyed by source id and the tag of the load options that
/// parsed them, so loaders with different options never share an entry.
/// Nothing expires on its own; callers drop entries with `invalidate` or
/// `clear`, or bypass with `Loader::reload`.
#[derive(Debug, Default)]
pub struct DatasetCache {
    map: RwLock<HashMap<(String, String), Arc<Dataset>>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str, options_tag: &str) -> Option<Arc<Dataset>> {
        let map = self.map.read().unwrap_or_else(|e| e.into_inner());
        map.get(&(id.to_string(), options_tag.to_string())).cloned()
    }

    /// Store `dataset` under `(id, options_tag)`, replacing any earlier entry.
    pub fn insert(
        &self,
        id: impl Into<String>,
        options_tag: impl Into<String>,
        dataset: Arc<Dataset>,
    ) {
        let mut map = self.map.write().unwrap_or_else(|e| e.into_inner());
        map.insert((id.into(), options_tag.into()), dataset);
    }

    /// Drop every entry for `id`, whatever options parsed it. Returns whether
    /// any was present.
    pub fn invalidate(&self, id: &str) -> bool {
        let mut map = self.map.write().unwrap_or_else(|e| e.into_inner());
        let before = map.len();
        map.retain(|(key, _), _| key != id);
        map.len() != before
    }

    pub fn clear(&self) {
        self.map.write().unwrap_or_else(|e| e.into_inner()).clear();
    }

    pub fn len(&self) -> usize {
        self.map.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Value;

    fn ds(v: i64) -> Arc<Dataset> {
        Arc::new(Dataset::new(vec!["x".into()], vec![vec![Value::Int(v)]]))
    }

    #[test]
    fn insert_get_invalidate() {
        let cache = DatasetCache::new();
        assert!(cache.get("a", "t").is_none());

        cache.insert("a", "t", ds(1));
        cache.insert("b", "t", ds(2));
        assert_eq!(cache.len(), 2);
        assert_eq!(
            cache.get("a", "t").map(|d| d.value(0, "x").cloned()),
            Some(Some(Value::Int(1)))
        );

        assert!(cache.invalidate("a"));
        assert!(!cache.invalidate("a"));
        assert!(cache.get("a", "t").is_none());

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn insert_replaces() {
        let cache = DatasetCache::new();
        cache.insert("a", "t", ds(1));
        cache.insert("a", "t", ds(5));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("a", "t"), Some(ds(5)));
    }

    #[test]
    fn options_tag_separates_entries() {
        let cache = DatasetCache::new();
        cache.insert("a", "strict", ds(1));
        assert!(cache.get("a", "lenient").is_none());

        cache.insert("a", "lenient", ds(2));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a", "strict"), Some(ds(1)));

        // invalidation covers every options tag of the source
        assert!(cache.invalidate("a"));
        assert!(cache.is_empty());
    }
}
