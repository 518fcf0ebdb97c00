//! Cache contract for data that is expensive to recompute between sessions.
//!
//! Caches are looked up by string key. A cache bound into the renderer may be
//! shared by several rendering sessions running on different threads, so every
//! implementation must be `Send + Sync` and tolerate concurrent `get`/`put`.
//!
//! # Implementations
//!
//! - `NoOpCacheStore`: stores nothing; one shared instance backs every unbound slot
//! - `InMemoryCacheStore`: an unbounded map guarded by a `RwLock`

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, RwLock};

/// Metrics of a font face, in font design units.
#[derive(Debug, Clone, PartialEq)]
pub struct FontMetrics {
    pub units_per_em: u16,
    pub ascent: i16,
    pub descent: i16,
    pub line_gap: i16,
    pub cap_height: i16,
    pub italic_angle: f32,
    /// `[x_min, y_min, x_max, y_max]`
    pub bbox: [i16; 4],
    pub underline_position: i16,
    pub underline_thickness: i16,
}

impl FontMetrics {
    fn scale(&self, value: f32, size: f32) -> f32 {
        value * size / self.units_per_em.max(1) as f32
    }

    /// Distance from the baseline to the top of the line box, in points.
    pub fn ascent_pt(&self, size: f32) -> f32 {
        self.scale(self.ascent as f32, size)
    }

    /// Distance from the baseline to the bottom of the line box, in points (positive).
    pub fn descent_pt(&self, size: f32) -> f32 {
        self.scale(-(self.descent as f32), size)
    }

    pub fn line_height(&self, size: f32) -> f32 {
        self.ascent_pt(size) + self.descent_pt(size) + self.scale(self.line_gap as f32, size)
    }
}

/// Values that can be stored in a cache slot.
#[derive(Debug, Clone)]
pub enum CacheValue {
    FontMetrics(Arc<FontMetrics>),
}

impl CacheValue {
    pub fn as_font_metrics(&self) -> Option<&Arc<FontMetrics>> {
        match self {
            CacheValue::FontMetrics(m) => Some(m),
        }
    }
}

/// A key/value cache usable across threads.
pub trait FsCache: Send + Sync + Debug {
    /// Returns the cached value for `key`, if any.
    fn get(&self, key: &str) -> Option<CacheValue>;

    /// Stores `value` under `key`, replacing any previous entry.
    fn put(&self, key: String, value: CacheValue);

    /// Returns a human-readable name for this cache (for logging/debugging).
    fn name(&self) -> &'static str;
}

static NO_OP_CACHE: Lazy<Arc<NoOpCacheStore>> = Lazy::new(|| Arc::new(NoOpCacheStore));

/// A cache that never stores anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpCacheStore;

impl NoOpCacheStore {
    /// The process-wide instance used to fill unbound cache slots.
    pub fn shared() -> Arc<dyn FsCache> {
        NO_OP_CACHE.clone()
    }
}

impl FsCache for NoOpCacheStore {
    fn get(&self, _key: &str) -> Option<CacheValue> {
        None
    }

    fn put(&self, _key: String, _value: CacheValue) {}

    fn name(&self) -> &'static str {
        "NoOpCacheStore"
    }
}

/// An unbounded in-memory cache.
#[derive(Debug, Default)]
pub struct InMemoryCacheStore {
    entries: RwLock<HashMap<String, CacheValue>>,
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of cached entries.
    ///
    /// Returns 0 if the lock is poisoned.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    /// Check if the cache is empty.
    ///
    /// Returns `true` if the lock is poisoned.
    pub fn is_empty(&self) -> bool {
        self.entries.read().map(|e| e.is_empty()).unwrap_or(true)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries
            .read()
            .map(|e| e.contains_key(key))
            .unwrap_or(false)
    }

    /// Does nothing if the lock is poisoned.
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }
}

impl FsCache for InMemoryCacheStore {
    fn get(&self, key: &str) -> Option<CacheValue> {
        self.entries.read().ok()?.get(key).cloned()
    }

    fn put(&self, key: String, value: CacheValue) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key, value);
        }
    }

    fn name(&self) -> &'static str {
        "InMemoryCacheStore"
    }
}
