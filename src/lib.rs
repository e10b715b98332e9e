// cache-utils library root.
// Tagged memoization with per-entry expiry for blocking and async functions.

pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod memo;

pub use cache::{CacheItem, CacheRegistry, LocalCacheStore};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use memo::{AsyncCachedFn, CachedFn, CachedFunction, cache, cache_async};
