// Cache module for tagged in-memory stores.
// Items, per-tag stores, the tag registry, and snapshot persistence.

pub mod item;
pub mod paths;
pub mod persist;
pub mod registry;
pub mod store;

pub use item::{CacheItem, expire_at_from};
pub use persist::{
    Snapshot, delete_snapshot, load_store, read_snapshot, save_store, write_snapshot,
};
pub use registry::{CacheRegistry, get_store, purge, purge_all, set};
pub use store::LocalCacheStore;
