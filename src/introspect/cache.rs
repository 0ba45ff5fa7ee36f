//! Owned holder of the latest completed schema snapshot.

use crate::introspect::SchemaSnapshot;
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Default)]
pub struct SchemaCache {
    current: RwLock<Arc<SchemaSnapshot>>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the last completed pass; readers keep it alive across a swap.
    pub fn load(&self) -> Arc<SchemaSnapshot> {
        self.current.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn replace(&self, snapshot: SchemaSnapshot) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::introspect::types::fixtures::shop;

    #[test]
    fn replace_swaps_whole_snapshot() {
        let cache = SchemaCache::new();
        assert!(cache.load().tables.is_empty());
        let before = cache.load();
        cache.replace(shop());
        assert!(before.tables.is_empty());
        assert_eq!(cache.load().tables.len(), 2);
    }
}
