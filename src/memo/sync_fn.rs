// Blocking cached function.
// Looks up the key derived from the arguments before calling the wrapped function.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::cache::{CacheItem, CacheRegistry, expire_at_from};
use crate::error::Result;

use super::CachedFunction;

type Func<A, T> = Box<dyn Fn(A) -> T + Send + Sync>;
type KeyFunc<A> = Box<dyn Fn(&A) -> String + Send + Sync>;

/// A function whose results are cached under a tag.
pub struct CachedFn<A, T> {
    func: Func<A, T>,
    get_key: KeyFunc<A>,
    tag: String,
    expire_in: Option<Duration>,
    registry: Arc<CacheRegistry>,
}

/// Wrap `func` so results are cached in the global registry under `tag`.
///
/// `get_key` maps the arguments to the cache key. Entries expire `expire_in`
/// after being written; `None` or zero keeps them until purged.
///
/// ```
/// use cache_utils::memo::cache;
///
/// let square = cache(
///     |n: u64| n * n,
///     "doc::square",
///     |n: &u64| n.to_string(),
///     None,
/// );
/// assert_eq!(square.call(12).unwrap(), 144);
/// ```
pub fn cache<A, T, F, K>(
    func: F,
    tag: impl Into<String>,
    get_key: K,
    expire_in: Option<Duration>,
) -> CachedFn<A, T>
where
    F: Fn(A) -> T + Send + Sync + 'static,
    K: Fn(&A) -> String + Send + Sync + 'static,
{
    CachedFn {
        func: Box::new(func),
        get_key: Box::new(get_key),
        tag: tag.into(),
        expire_in,
        registry: CacheRegistry::global(),
    }
}

impl<A, T> CachedFn<A, T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Use another registry instead of the global one.
    pub fn with_registry(mut self, registry: Arc<CacheRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Return the cached value for these arguments, computing it on a miss.
    pub fn call(&self, args: A) -> Result<T> {
        let key = (self.get_key)(&args);
        let store = self.registry.get_store::<T>(&self.tag)?;

        match store.get(&key) {
            Ok(value) => {
                debug!(tag = %self.tag, key = key.as_str(), "cache hit");
                return Ok(value);
            }
            Err(err) if err.is_miss() => {}
            Err(err) => return Err(err),
        }

        debug!(tag = %self.tag, key = key.as_str(), "cache miss");
        let value = (self.func)(args);
        let expire_at = expire_at_from(self.expire_in);
        store.insert(CacheItem::new(key, value.clone(), expire_at));

        Ok(value)
    }
}

impl<A, T> CachedFunction for CachedFn<A, T> {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn expire_in(&self) -> Option<Duration> {
        self.expire_in
    }

    fn registry(&self) -> &Arc<CacheRegistry> {
        &self.registry
    }
}

impl<A, T> fmt::Debug for CachedFn<A, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedFn")
            .field("tag", &self.tag)
            .field("expire_in", &self.expire_in)
            .finish_non_exhaustive()
    }
}
