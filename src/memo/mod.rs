// Memoization wrappers backed by tagged cache stores.
// Provides blocking and async cached functions sharing one interface.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::CacheRegistry;

pub mod async_fn;
pub mod sync_fn;

pub use async_fn::{AsyncCachedFn, cache_async};
pub use sync_fn::{CachedFn, cache};

/// Operations shared by every cached function.
pub trait CachedFunction {
    /// Tag of the store this function reads and writes.
    fn tag(&self) -> &str;

    /// Lifetime of entries written by this function.
    fn expire_in(&self) -> Option<Duration>;

    /// Registry the tag is resolved in.
    fn registry(&self) -> &Arc<CacheRegistry>;

    /// Drop the tag's store. Affects every function sharing the tag.
    fn purge(&self) {
        self.registry().purge(self.tag());
    }
}
