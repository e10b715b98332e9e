// Local cache store for a single tag.
// Holds cache items in a concurrent map and drops expired items on lookup.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::debug;

use crate::error::{CacheError, Result};

use super::item::CacheItem;

/// Items cached under one tag.
#[derive(Debug)]
pub struct LocalCacheStore<T> {
    tag: String,
    items: DashMap<String, CacheItem<T>>,
}

impl<T> LocalCacheStore<T> {
    /// Create an empty store for the given tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            items: DashMap::new(),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Look up a live value.
    ///
    /// An expired item is removed and reported as [`CacheError::Expired`].
    pub fn get(&self, key: &str) -> Result<T>
    where
        T: Clone,
    {
        match self.items.get(key) {
            None => {
                return Err(CacheError::Missing {
                    tag: self.tag.clone(),
                    key: key.to_string(),
                });
            }
            Some(item) if !item.is_expired() => return Ok(item.value.clone()),
            Some(_) => {}
        }

        // Another writer may have refreshed the entry since the read above.
        self.items.remove_if(key, |_, item| item.is_expired());
        debug!(tag = %self.tag, key, "cache item expired");

        Err(CacheError::Expired {
            tag: self.tag.clone(),
            key: key.to_string(),
        })
    }

    /// Store an item under its own key, replacing any previous one.
    pub fn insert(&self, item: CacheItem<T>) {
        self.items.insert(item.key.clone(), item);
    }

    /// Store a value under a key.
    pub fn set(&self, key: impl Into<String>, value: T, expire_at: Option<DateTime<Utc>>) {
        self.insert(CacheItem::new(key, value, expire_at));
    }

    pub fn remove(&self, key: &str) -> Option<CacheItem<T>> {
        self.items.remove(key).map(|(_, item)| item)
    }

    /// Drop every item.
    pub fn purge(&self) {
        self.items.clear();
    }

    /// Drop expired items, returning how many were removed.
    pub fn prune_expired(&self) -> usize {
        let before = self.items.len();
        self.items.retain(|_, item| !item.is_expired());
        before.saturating_sub(self.items.len())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether an item exists for the key, expired or not.
    pub fn contains_key(&self, key: &str) -> bool {
        self.items.contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.items.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Copy of every item, expired ones included.
    pub fn items(&self) -> Vec<CacheItem<T>>
    where
        T: Clone,
    {
        self.items.iter().map(|entry| entry.value().clone()).collect()
    }
}
