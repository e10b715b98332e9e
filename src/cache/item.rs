// Cache item with optional absolute expiry.
// Expiry is checked against the wall clock at lookup time.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// A cached value and the moment it stops being valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheItem<T> {
    /// Key the value is stored under.
    pub key: String,
    /// The cached value.
    pub value: T,
    /// When the value expires. `None` means never.
    pub expire_at: Option<DateTime<Utc>>,
}

impl<T> CacheItem<T> {
    pub fn new(key: impl Into<String>, value: T, expire_at: Option<DateTime<Utc>>) -> Self {
        Self {
            key: key.into(),
            value,
            expire_at,
        }
    }

    /// Check if this item has expired.
    pub fn is_expired(&self) -> bool {
        self.expire_at.is_some_and(|at| at < Utc::now())
    }

    /// Time left before expiry. Negative once expired, `None` without expiry.
    pub fn expire_in(&self) -> Option<TimeDelta> {
        self.expire_at.map(|at| at.signed_duration_since(Utc::now()))
    }
}

impl<T: fmt::Display> fmt::Display for CacheItem<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.expire_at {
            Some(at) => write!(
                f,
                "CacheItem(key={}, value={}, expire_at={})",
                self.key,
                self.value,
                at.to_rfc3339()
            ),
            None => write!(
                f,
                "CacheItem(key={}, value={}, expire_at=None)",
                self.key, self.value
            ),
        }
    }
}

/// Absolute expiry for an entry written now.
/// A zero or unrepresentable duration never expires.
pub fn expire_at_from(expire_in: Option<Duration>) -> Option<DateTime<Utc>> {
    let ttl = expire_in.filter(|d| !d.is_zero())?;
    let delta = TimeDelta::from_std(ttl).ok()?;
    Utc::now().checked_add_signed(delta)
}
