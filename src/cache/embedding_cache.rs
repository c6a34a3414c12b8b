use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;

/// Thread-safe LRU cache for query embeddings
///
/// Search queries repeat; caching their vectors avoids redundant provider
/// calls while keeping memory bounded.
pub struct EmbeddingCache {
    cache: Mutex<LruCache<String, Vec<f32>>>,
}

impl EmbeddingCache {
    /// Create a cache holding at most `capacity` embeddings (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity.max(1)).expect("capacity is at least 1");
        Self {
            cache: Mutex::new(LruCache::new(cap)),
        }
    }

    /// Look up a cached embedding for a query
    pub fn get(&self, query: &str) -> Option<Vec<f32>> {
        self.cache.lock().unwrap().get(query).cloned()
    }

    /// Store an embedding under the query text
    pub fn put(&self, query: String, embedding: Vec<f32>) {
        self.cache.lock().unwrap().put(query, embedding);
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.cache.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.lock().unwrap().is_empty()
    }
}
