// Async cached function.
// Same lookup rules as the blocking wrapper, awaiting the wrapped future on a miss.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::cache::{CacheItem, CacheRegistry, expire_at_from};
use crate::error::Result;

use super::CachedFunction;

type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;
type AsyncFunc<A, T> = Box<dyn Fn(A) -> BoxFuture<T> + Send + Sync>;
type KeyFunc<A> = Box<dyn Fn(&A) -> String + Send + Sync>;

/// An async function whose results are cached under a tag.
///
/// No store lock is held while the wrapped future runs, so concurrent misses
/// on one key each compute and the last write wins.
pub struct AsyncCachedFn<A, T> {
    func: AsyncFunc<A, T>,
    get_key: KeyFunc<A>,
    tag: String,
    expire_in: Option<Duration>,
    registry: Arc<CacheRegistry>,
}

/// Wrap an async `func` so results are cached in the global registry under `tag`.
pub fn cache_async<A, T, F, Fut, K>(
    func: F,
    tag: impl Into<String>,
    get_key: K,
    expire_in: Option<Duration>,
) -> AsyncCachedFn<A, T>
where
    A: 'static,
    T: 'static,
    F: Fn(A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = T> + Send + 'static,
    K: Fn(&A) -> String + Send + Sync + 'static,
{
    AsyncCachedFn {
        func: Box::new(move |args: A| -> BoxFuture<T> { Box::pin(func(args)) }),
        get_key: Box::new(get_key),
        tag: tag.into(),
        expire_in,
        registry: CacheRegistry::global(),
    }
}

impl<A, T> AsyncCachedFn<A, T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Use another registry instead of the global one.
    pub fn with_registry(mut self, registry: Arc<CacheRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Return the cached value for these arguments, awaiting the function on a miss.
    pub async fn call(&self, args: A) -> Result<T> {
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
        let value = (self.func)(args).await;
        let expire_at = expire_at_from(self.expire_in);
        store.insert(CacheItem::new(key, value.clone(), expire_at));

        Ok(value)
    }
}

impl<A, T> CachedFunction for AsyncCachedFn<A, T> {
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

impl<A, T> fmt::Debug for AsyncCachedFn<A, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncCachedFn")
            .field("tag", &self.tag)
            .field("expire_in", &self.expire_in)
            .finish_non_exhaustive()
    }
}
