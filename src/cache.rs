//! The fixed set of cache slots a renderer can bind.

use std::fmt;
use std::sync::Arc;
use vellum_traits::{FsCache, NoOpCacheStore};

const SLOT_COUNT: usize = 1;

/// A cache slot. The set is closed: adding a slot is a code change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheStore {
    /// Parsed font metrics, keyed by face.
    PdfFontMetrics,
}

impl CacheStore {
    pub const ALL: [CacheStore; SLOT_COUNT] = [CacheStore::PdfFontMetrics];

    fn slot(self) -> usize {
        match self {
            CacheStore::PdfFontMetrics => 0,
        }
    }
}

/// One binding per `CacheStore` slot. Every slot is always bound; unbound
/// slots hold the shared no-op cache.
#[derive(Clone)]
pub struct CacheRegistry {
    stores: [Arc<dyn FsCache>; SLOT_COUNT],
}

impl CacheRegistry {
    pub fn new() -> Self {
        Self {
            stores: std::array::from_fn(|_| NoOpCacheStore::shared()),
        }
    }

    /// Binds `cache` to `slot`, replacing the previous binding.
    pub fn replace(&mut self, slot: CacheStore, cache: Arc<dyn FsCache>) {
        log::debug!("Binding {} to cache slot {:?}", cache.name(), slot);
        self.stores[slot.slot()] = cache;
    }

    pub fn get(&self, slot: CacheStore) -> &Arc<dyn FsCache> {
        &self.stores[slot.slot()]
    }
}

impl Default for CacheRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CacheRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for slot in CacheStore::ALL {
            map.entry(&slot, &self.get(slot).name());
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_traits::InMemoryCacheStore;

    #[test]
    fn test_every_slot_starts_bound_to_no_op() {
        let registry = CacheRegistry::new();
        let shared = NoOpCacheStore::shared();
        for slot in CacheStore::ALL {
            assert!(Arc::ptr_eq(registry.get(slot), &shared));
        }
    }

    #[test]
    fn test_replace_binding() {
        let mut registry = CacheRegistry::new();
        let cache: Arc<dyn FsCache> = Arc::new(InMemoryCacheStore::new());
        registry.replace(CacheStore::PdfFontMetrics, cache.clone());
        assert!(Arc::ptr_eq(registry.get(CacheStore::PdfFontMetrics), &cache));
    }

    #[test]
    fn test_clones_do_not_see_later_replacements() {
        let mut registry = CacheRegistry::new();
        let snapshot = registry.clone();
        registry.replace(CacheStore::PdfFontMetrics, Arc::new(InMemoryCacheStore::new()));
        assert_eq!(snapshot.get(CacheStore::PdfFontMetrics).name(), "NoOpCacheStore");
        assert_eq!(registry.get(CacheStore::PdfFontMetrics).name(), "InMemoryCacheStore");
    }
}
