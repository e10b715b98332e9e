// Cache configuration.
// Loads default and per-tag expiry settings from a TOML file.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cache::paths;
use crate::error::{CacheError, Result};

/// Expiry settings for cached functions.
///
/// ```toml
/// default_expire_in_secs = 300
///
/// [tags.users]
/// expire_in_secs = 60
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Lifetime for tags without an override. Zero or absent means no expiry.
    #[serde(default)]
    pub default_expire_in_secs: Option<u64>,
    /// Per-tag overrides.
    #[serde(default)]
    pub tags: HashMap<String, TagConfig>,
}

/// Expiry override for one tag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagConfig {
    /// Lifetime for this tag. Zero means no expiry, absent falls back to the default.
    #[serde(default)]
    pub expire_in_secs: Option<u64>,
}

impl CacheConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: CacheConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        debug!(path = %path.display(), tags = config.tags.len(), "loaded cache config");
        Ok(config)
    }

    /// Load from the platform config file, falling back to defaults when absent.
    pub fn load_default() -> Result<Self> {
        match paths::config_path() {
            Some(path) => Self::load_or_default(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load from a file, falling back to defaults when it does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Lifetime of entries for a tag.
    pub fn expire_in(&self, tag: &str) -> Option<Duration> {
        self.tags
            .get(tag)
            .and_then(|t| t.expire_in_secs)
            .or(self.default_expire_in_secs)
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.tags.keys().any(|tag| tag.trim().is_empty()) {
            return Err(CacheError::Config("tag names must not be empty".to_string()));
        }
        Ok(())
    }
}
