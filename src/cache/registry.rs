// Registry of tagged cache stores.
// Maps each tag to a store whose value type is fixed on first use.

use std::any::Any;
use std::sync::{Arc, LazyLock};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::{debug, info, warn};

use crate::error::{CacheError, Result};

use super::store::LocalCacheStore;

type ErasedStore = Arc<dyn Any + Send + Sync>;

static GLOBAL_REGISTRY: LazyLock<Arc<CacheRegistry>> =
    LazyLock::new(|| Arc::new(CacheRegistry::new()));

/// Tag to store mapping shared by every cached function bound to it.
#[derive(Debug, Default)]
pub struct CacheRegistry {
    stores: DashMap<String, ErasedStore>,
}

impl CacheRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    pub fn global() -> Arc<CacheRegistry> {
        Arc::clone(&GLOBAL_REGISTRY)
    }

    /// Get the store for a tag, creating it on first use.
    pub fn get_store<T>(&self, tag: &str) -> Result<Arc<LocalCacheStore<T>>>
    where
        T: Send + Sync + 'static,
    {
        let erased = self
            .stores
            .entry(tag.to_string())
            .or_insert_with(|| {
                debug!(tag, "creating cache store");
                Arc::new(LocalCacheStore::<T>::new(tag)) as ErasedStore
            })
            .value()
            .clone();

        erased.downcast::<LocalCacheStore<T>>().map_err(|_| {
            warn!(tag, "cache store requested with a different value type");
            CacheError::TypeMismatch {
                tag: tag.to_string(),
            }
        })
    }

    /// Forget the store for a tag. Unknown tags are ignored.
    pub fn purge(&self, tag: &str) {
        if self.stores.remove(tag).is_some() {
            info!(tag, "purged cache store");
        }
    }

    /// Forget every store.
    pub fn purge_all(&self) {
        let count = self.stores.len();
        self.stores.clear();
        info!(count, "purged all cache stores");
    }

    /// Write a value directly into a tag's store.
    pub fn set<T>(
        &self,
        tag: &str,
        key: impl Into<String>,
        value: T,
        expire_at: Option<DateTime<Utc>>,
    ) -> Result<()>
    where
        T: Send + Sync + 'static,
    {
        self.get_store::<T>(tag)?.set(key, value, expire_at);
        Ok(())
    }

    pub fn tags(&self) -> Vec<String> {
        self.stores.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn contains_tag(&self, tag: &str) -> bool {
        self.stores.contains_key(tag)
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}

/// Get a store from the global registry.
pub fn get_store<T>(tag: &str) -> Result<Arc<LocalCacheStore<T>>>
where
    T: Send + Sync + 'static,
{
    GLOBAL_REGISTRY.get_store(tag)
}

/// Forget a tag in the global registry.
pub fn purge(tag: &str) {
    GLOBAL_REGISTRY.purge(tag);
}

/// Forget every tag in the global registry.
pub fn purge_all() {
    GLOBAL_REGISTRY.purge_all();
}

/// Write a value into the global registry.
pub fn set<T>(
    tag: &str,
    key: impl Into<String>,
    value: T,
    expire_at: Option<DateTime<Utc>>,
) -> Result<()>
where
    T: Send + Sync + 'static,
{
    GLOBAL_REGISTRY.set(tag, key, value, expire_at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn test_get_store_is_shared() {
        let registry = CacheRegistry::new();
        let a = registry.get_store::<i32>("numbers").unwrap();
        let b = registry.get_store::<i32>("numbers").unwrap();

        a.set("one", 1, None);
        assert_eq!(b.get("one").unwrap(), 1);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_type_mismatch() {
        let registry = CacheRegistry::new();
        registry.get_store::<i32>("mixed").unwrap();

        let err = registry.get_store::<String>("mixed").unwrap_err();
        assert!(matches!(err, CacheError::TypeMismatch { ref tag } if tag == "mixed"));
    }

    #[test]
    fn test_purge_tag() {
        let registry = CacheRegistry::new();
        registry.set("a", "k", 1u8, None).unwrap();
        registry.set("b", "k", 2u8, None).unwrap();

        registry.purge("a");
        registry.purge("unknown");

        assert!(!registry.contains_tag("a"));
        assert!(registry.contains_tag("b"));
        assert!(registry.get_store::<u8>("a").unwrap().is_empty());
    }

    #[test]
    fn test_tags() {
        let registry = CacheRegistry::new();
        assert!(registry.tags().is_empty());

        registry.set("users", "k", 1u8, None).unwrap();
        registry.set("posts", "k", 2u8, None).unwrap();

        let mut tags = registry.tags();
        tags.sort();
        assert_eq!(tags, vec!["posts".to_string(), "users".to_string()]);

        registry.purge("users");
        assert_eq!(registry.tags(), vec!["posts".to_string()]);
    }

    #[test]
    fn test_purge_all() {
        let registry = CacheRegistry::new();
        registry.set("a", "k", 1u8, None).unwrap();
        registry.set("b", "k", "x".to_string(), None).unwrap();
        assert_eq!(registry.len(), 2);

        registry.purge_all();
        assert!(registry.is_empty());

        // A purged tag can be rebound to another type.
        registry.set("b", "k", 3u8, None).unwrap();
    }

    #[test]
    fn test_set_with_expiry() {
        let registry = CacheRegistry::new();
        registry
            .set("exp", "gone", 1, Some(Utc::now() - TimeDelta::seconds(1)))
            .unwrap();

        let store = registry.get_store::<i32>("exp").unwrap();
        assert!(matches!(
            store.get("gone").unwrap_err(),
            CacheError::Expired { .. }
        ));
    }

    #[test]
    fn test_global_free_functions() {
        let tag = "registry::test_global_free_functions";
        set(tag, "k", 5u32, None).unwrap();
        assert_eq!(get_store::<u32>(tag).unwrap().get("k").unwrap(), 5);
        assert!(CacheRegistry::global().contains_tag(tag));

        purge(tag);
        assert!(!CacheRegistry::global().contains_tag(tag));
    }
}
