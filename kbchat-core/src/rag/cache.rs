//! Embedding caches keyed by document id
//!
//! Documents are treated as immutable once embedded, so entries are never
//! invalidated on content changes. Writes are last-writer-wins.

use std::num::NonZeroUsize;

use dashmap::DashMap;
use lru::LruCache;
use parking_lot::Mutex;

/// Trait for embedding caches
pub trait EmbeddingCache: Send + Sync {
    /// Cached vector for a document id
    fn get(&self, id: &str) -> Option<Vec<f32>>;

    /// Store the vector computed for a document id
    fn put(&self, id: &str, embedding: Vec<f32>);

    /// Number of cached entries
    fn len(&self) -> usize;

    /// Whether the cache holds no entries
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry
    fn clear(&self);
}

/// Unbounded in-memory cache. Entries live for the process lifetime.
#[derive(Debug, Default)]
pub struct InMemoryEmbeddingCache {
    store: DashMap<String, Vec<f32>>,
}

impl InMemoryEmbeddingCache {
    /// Create a new in-memory cache
    pub fn new() -> Self {
        Self::default()
    }
}

impl EmbeddingCache for InMemoryEmbeddingCache {
    fn get(&self, id: &str) -> Option<Vec<f32>> {
        self.store.get(id).map(|v| v.value().clone())
    }

    fn put(&self, id: &str, embedding: Vec<f32>) {
        self.store.insert(id.to_string(), embedding);
    }

    fn len(&self) -> usize {
        self.store.len()
    }

    fn clear(&self) {
        self.store.clear();
    }
}

/// Cache capped at a fixed number of entries, evicting the least recently used
pub struct LruEmbeddingCache {
    cache: Mutex<LruCache<String, Vec<f32>>>,
}

impl LruEmbeddingCache {
    /// Create a cache holding at most `capacity` entries (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(cap)),
        }
    }

    /// Maximum number of entries
    pub fn capacity(&self) -> usize {
        self.cache.lock().cap().get()
    }
}

impl EmbeddingCache for LruEmbeddingCache {
    fn get(&self, id: &str) -> Option<Vec<f32>> {
        self.cache.lock().get(id).cloned()
    }

    fn put(&self, id: &str, embedding: Vec<f32>) {
        if let Some((evicted, _)) = self.cache.lock().push(id.to_string(), embedding) {
            if evicted != id {
                tracing::debug!(id = %evicted, "Evicted embedding from cache");
            }
        }
    }

    fn len(&self) -> usize {
        self.cache.lock().len()
    }

    fn clear(&self) {
        self.cache.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_roundtrip() {
        let cache = InMemoryEmbeddingCache::new();
        assert!(cache.get("a").is_none());

        cache.put("a", vec![1.0, 2.0]);
        assert_eq!(cache.get("a"), Some(vec![1.0, 2.0]));

        // last writer wins
        cache.put("a", vec![3.0]);
        assert_eq!(cache.get("a"), Some(vec![3.0]));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_lru_evicts_least_recently_used() {
        let cache = LruEmbeddingCache::new(2);
        cache.put("a", vec![1.0]);
        cache.put("b", vec![2.0]);

        // touch "a" so "b" becomes the eviction candidate
        assert!(cache.get("a").is_some());
        cache.put("c", vec![3.0]);

        assert_eq!(cache.len(), 2);
        assert!(cache.get("b").is_none());
        assert!(cache.get("a").is_some());
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn test_lru_zero_capacity_is_clamped() {
        let cache = LruEmbeddingCache::new(0);
        assert_eq!(cache.capacity(), 1);
    }
}
