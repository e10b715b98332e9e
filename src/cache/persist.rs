// Snapshot persistence for cache stores.
// Handles JSON serialization, expiry filtering, and atomic file writes.

use std::fs;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::info;

use crate::error::{CacheError, Result};

use super::item::CacheItem;
use super::store::LocalCacheStore;

/// On-disk form of a store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot<T> {
    /// Tag of the store the items came from.
    pub tag: String,
    /// When the snapshot was written.
    pub saved_at: DateTime<Utc>,
    /// The saved items.
    pub items: Vec<CacheItem<T>>,
}

impl<T> Snapshot<T> {
    pub fn new(tag: impl Into<String>, items: Vec<CacheItem<T>>) -> Self {
        Self {
            tag: tag.into(),
            saved_at: Utc::now(),
            items,
        }
    }

    /// Drop expired items, returning how many were removed.
    pub fn prune_expired(&mut self) -> usize {
        let before = self.items.len();
        self.items.retain(|item| !item.is_expired());
        before - self.items.len()
    }
}

/// Save the live items of a store. Returns the number of items written.
pub fn save_store<T>(store: &LocalCacheStore<T>, path: &Path) -> Result<usize>
where
    T: Serialize + Clone,
{
    let items: Vec<_> = store
        .items()
        .into_iter()
        .filter(|item| !item.is_expired())
        .collect();
    let count = items.len();

    write_snapshot(path, &Snapshot::new(store.tag(), items))?;
    info!(tag = store.tag(), count, path = %path.display(), "saved cache snapshot");

    Ok(count)
}

/// Load the live items of a snapshot into a store.
/// Returns the number of items loaded; a missing file loads nothing.
pub fn load_store<T>(store: &LocalCacheStore<T>, path: &Path) -> Result<usize>
where
    T: DeserializeOwned,
{
    let Some(snapshot) = read_snapshot::<T>(path)? else {
        return Ok(0);
    };

    if snapshot.tag != store.tag() {
        return Err(CacheError::Other(format!(
            "Snapshot at {} belongs to tag {}, not {}",
            path.display(),
            snapshot.tag,
            store.tag()
        )));
    }

    let mut count = 0;
    for item in snapshot.items.into_iter().filter(|item| !item.is_expired()) {
        store.insert(item);
        count += 1;
    }
    info!(tag = store.tag(), count, path = %path.display(), "loaded cache snapshot");

    Ok(count)
}

/// Read a snapshot file.
pub fn read_snapshot<T: DeserializeOwned>(path: &Path) -> Result<Option<Snapshot<T>>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path)?;
    let snapshot: Snapshot<T> = serde_json::from_str(&contents)?;
    Ok(Some(snapshot))
}

/// Write a snapshot file as JSON.
pub fn write_snapshot<T: Serialize>(path: &Path, snapshot: &Snapshot<T>) -> Result<()> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(snapshot)?;

    // Write atomically via temp file
    let temp_path = path.with_extension("tmp");
    let written = write_and_rename(&temp_path, path, json.as_bytes());
    if written.is_err() {
        fs::remove_file(&temp_path).ok();
    }
    written
}

fn write_and_rename(temp_path: &Path, path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = fs::File::create(temp_path)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    fs::rename(temp_path, path)?;
    Ok(())
}

/// Delete a snapshot file.
pub fn delete_snapshot(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use tempfile::TempDir;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct TestData {
        name: String,
        value: i32,
    }

    #[test]
    fn test_save_and_load_store() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("users.json");

        let store = LocalCacheStore::new("users");
        let data = TestData {
            name: "test".to_string(),
            value: 42,
        };
        store.set("42", data.clone(), None);
        store.set("old", data.clone(), Some(Utc::now() - TimeDelta::seconds(1)));

        assert_eq!(save_store(&store, &path).unwrap(), 1);
        assert!(!path.with_extension("tmp").exists());

        let restored: LocalCacheStore<TestData> = LocalCacheStore::new("users");
        assert_eq!(load_store(&restored, &path).unwrap(), 1);
        assert_eq!(restored.get("42").unwrap(), data);
        assert!(!restored.contains_key("old"));
    }

    #[test]
    fn test_load_skips_items_expired_since_save() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("s.json");

        let snapshot = Snapshot::new(
            "s",
            vec![
                CacheItem::new("a", 1, Some(Utc::now() - TimeDelta::seconds(30))),
                CacheItem::new("b", 2, None),
            ],
        );
        write_snapshot(&path, &snapshot).unwrap();

        let store: LocalCacheStore<i32> = LocalCacheStore::new("s");
        assert_eq!(load_store(&store, &path).unwrap(), 1);
        assert_eq!(store.get("b").unwrap(), 2);
    }

    #[test]
    fn test_load_rejects_other_tag() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a.json");

        let store = LocalCacheStore::new("a");
        store.set("k", 1, None);
        save_store(&store, &path).unwrap();

        let other: LocalCacheStore<i32> = LocalCacheStore::new("b");
        let err = load_store(&other, &path).unwrap_err();
        assert!(matches!(err, CacheError::Other(_)));
    }

    #[test]
    fn test_read_nonexistent() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nonexistent.json");

        let snapshot: Option<Snapshot<i32>> = read_snapshot(&path).unwrap();
        assert!(snapshot.is_none());

        let store: LocalCacheStore<i32> = LocalCacheStore::new("x");
        assert_eq!(load_store(&store, &path).unwrap(), 0);
    }

    #[test]
    fn test_delete_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("d.json");

        write_snapshot(&path, &Snapshot::<i32>::new("d", Vec::new())).unwrap();
        assert!(path.exists());

        delete_snapshot(&path).unwrap();
        assert!(!path.exists());
        delete_snapshot(&path).unwrap();
    }

    #[test]
    fn test_failed_write_removes_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        // Renaming a file over a non-empty directory fails after the temp file is written.
        let path = temp_dir.path().join("taken");
        fs::create_dir_all(path.join("child")).unwrap();

        let result = write_snapshot(&path, &Snapshot::<i32>::new("taken", Vec::new()));
        assert!(result.is_err());
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_snapshot_prune_expired() {
        let mut snapshot = Snapshot::new(
            "p",
            vec![
                CacheItem::new("a", 1, Some(Utc::now() - TimeDelta::seconds(1))),
                CacheItem::new("b", 2, Some(Utc::now() + TimeDelta::seconds(60))),
            ],
        );
        assert_eq!(snapshot.prune_expired(), 1);
        assert_eq!(snapshot.items.len(), 1);
    }
}
