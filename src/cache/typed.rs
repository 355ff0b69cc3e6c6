//! Typed cache wrapper around Moka.

use std::hash::Hash;
use std::sync::Arc;

use moka::sync::Cache;
use tracing::trace;

use super::CacheConfig;

/// A named, typed cache.
///
/// Cloning is cheap and shares the same underlying Moka cache.
pub struct TypedCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    inner: Arc<Cache<K, V>>,
    name: Arc<str>,
}

// Manual Clone implementation that doesn't require K: Clone
impl<K, V> Clone for TypedCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            name: Arc::clone(&self.name),
        }
    }
}

impl<K, V> TypedCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Create a new typed cache with the given name and config.
    pub fn new(name: impl Into<Arc<str>>, config: CacheConfig) -> Self {
        let mut builder = Cache::builder().max_capacity(config.max_capacity);

        if let Some(ttl) = config.ttl {
            builder = builder.time_to_live(ttl);
        }

        if let Some(tti) = config.tti {
            builder = builder.time_to_idle(tti);
        }

        Self {
            inner: Arc::new(builder.build()),
            name: name.into(),
        }
    }

    pub fn insert(&self, key: K, value: V) {
        self.inner.insert(key, value);
    }

    /// Returns `Some(value)` if the key exists and hasn't expired.
    pub fn get(&self, key: &K) -> Option<V> {
        self.inner.get(key)
    }

    /// Get the value for `key`, inserting `init()` if absent.
    /// Concurrent callers for one key all see the same inserted value.
    pub fn get_or_insert_with<F>(&self, key: K, init: F) -> V
    where
        F: FnOnce() -> V,
    {
        self.inner.get_with(key, init)
    }

    pub fn invalidate(&self, key: &K) {
        self.inner.invalidate(key);
        trace!("{}: entry invalidated", self.name);
    }
}

impl<K, V> std::fmt::Debug for TypedCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedCache")
            .field("name", &self.name)
            .field("entry_count", &self.inner.entry_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_get_invalidate() {
        let cache: TypedCache<String, i64> = TypedCache::new("city_ids", CacheConfig::city_lookup());
        cache.insert("москва".to_string(), 1);
        assert_eq!(cache.get(&"москва".to_string()), Some(1));

        cache.invalidate(&"москва".to_string());
        assert_eq!(cache.get(&"москва".to_string()), None);
    }

    #[test]
    fn test_get_or_insert_with_keeps_first_value() {
        let cache: TypedCache<i64, i64> = TypedCache::new("counters", CacheConfig::sessions());
        assert_eq!(cache.get_or_insert_with(1, || 10), 10);
        assert_eq!(cache.get_or_insert_with(1, || 20), 10);
    }

    #[test]
    fn test_clones_share_storage() {
        let cache: TypedCache<i64, String> = TypedCache::new("users", CacheConfig::stored_users());
        let other = cache.clone();
        cache.insert(7, "seven".to_string());
        assert_eq!(other.get(&7).as_deref(), Some("seven"));
    }
}
