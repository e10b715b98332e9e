// Error types for cache-utils.
// Covers cache lookups, store typing, configuration and snapshot I/O.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("No item with tag: {tag}, key: {key}")]
    Missing { tag: String, key: String },

    #[error("Item with tag: {tag}, key: {key} has expired")]
    Expired { tag: String, key: String },

    #[error("Store for tag {tag} holds a different value type")]
    TypeMismatch { tag: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl CacheError {
    /// Whether this error means "not cached" (absent or expired).
    pub fn is_miss(&self) -> bool {
        matches!(self, CacheError::Missing { .. } | CacheError::Expired { .. })
    }
}

pub type Result<T> = std::result::Result<T, CacheError>;
