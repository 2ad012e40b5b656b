//! # Result Cache
//!
//! In-process cache from `(item, store)` to the artifact of the last run.
//!
//! Entries expire lazily: a lookup that finds an entry older than the TTL,
//! or whose artifact has disappeared, evicts it and reports a miss. There
//! is no background sweeper.

use crate::domain::value_objects::{ItemId, Timestamp};
use crate::infrastructure::cache::artifact::{ArtifactRef, ArtifactStore, FsArtifactStore};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Default entry lifetime: 24 hours.
pub const DEFAULT_TTL_SECS: u64 = 24 * 60 * 60;

/// Cache configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Entry lifetime in seconds.
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_TTL_SECS,
        }
    }
}

impl CacheConfig {
    /// Sets the entry lifetime.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl_secs = ttl.as_secs();
        self
    }

    /// Entry lifetime.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Cache key, rendered as `<item>_<store>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Creates the key for an item in a store.
    #[must_use]
    pub fn new(item: &ItemId, store: &str) -> Self {
        Self(format!("{}_{}", item.as_str(), store))
    }

    /// The rendered key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    created_at: Timestamp,
    artifact: ArtifactRef,
}

/// Expiring map of finished runs.
#[derive(Debug, Clone)]
pub struct ResultCache {
    entries: Arc<RwLock<HashMap<CacheKey, CacheEntry>>>,
    ttl: Duration,
    store: Arc<dyn ArtifactStore>,
}

impl ResultCache {
    /// Creates a cache resolving artifacts with `store`.
    #[must_use]
    pub fn new(ttl: Duration, store: Arc<dyn ArtifactStore>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
            store,
        }
    }

    /// Creates a file-backed cache from configuration.
    #[must_use]
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.ttl(), Arc::new(FsArtifactStore))
    }

    /// Configured lifetime.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached artifact if it is fresh and still exists.
    #[must_use]
    pub fn lookup(&self, key: &CacheKey) -> Option<ArtifactRef> {
        self.lookup_at(key, Timestamp::now())
    }

    fn lookup_at(&self, key: &CacheKey, now: Timestamp) -> Option<ArtifactRef> {
        let entry = self.entries.read().get(key).cloned()?;

        let expired = now - entry.created_at >= self.ttl;
        if !expired && self.store.exists(&entry.artifact) {
            return Some(entry.artifact);
        }

        debug!(key = %key, expired, "evicting cache entry");
        let mut entries = self.entries.write();
        // only evict what we inspected; a concurrent save may have replaced it
        if entries
            .get(key)
            .is_some_and(|current| current.created_at == entry.created_at)
        {
            entries.remove(key);
        }
        None
    }

    /// Records the artifact of a completed run.
    pub fn save(&self, key: CacheKey, artifact: ArtifactRef) {
        self.save_at(key, artifact, Timestamp::now());
    }

    fn save_at(&self, key: CacheKey, artifact: ArtifactRef, created_at: Timestamp) {
        self.entries.write().insert(
            key,
            CacheEntry {
                created_at,
                artifact,
            },
        );
    }

    /// Number of stored entries, including not yet evicted stale ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}
