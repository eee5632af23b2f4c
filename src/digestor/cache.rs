//! Digest cache shared by every digest computation of a lookup context.
//!
//! One [`DigestCache`] holds two key namespaces:
//!
//! - top-level entries keyed `"<name>.<format>"` (plus any injected
//!   dependency tokens), written once per key under the stripe lock;
//! - per-node entries keyed by a node's own name, written without locking so
//!   that a dependency shared by many templates is hashed once.
//!
//! Reads never lock beyond the `DashMap` shard, which keeps the common
//! cache-hit path from serializing.
//!
//! Caches are handed out per lookup details by a [`DigestCacheRegistry`]. They
//! live until [`DigestCacheRegistry::reset`] drops them all; nothing is
//! persisted across process restarts.

use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

/// Concurrent map from cache key to digest string.
///
/// # Performance Impact
///
/// Large view trees share most of their partials (layouts, shared
/// headers). The per-node entries mean each shared partial is hashed once
/// per cache lifetime rather than once per template that renders it.
#[derive(Debug, Default)]
pub struct DigestCache {
    entries: DashMap<String, String>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl DigestCache {
    /// Create a new empty digest cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a cached digest if available
    pub fn get(&self, key: &str) -> Option<String> {
        match self.entries.get(key) {
            Some(digest) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(digest.value().clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Check for a key without touching the statistics.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Store a digest, replacing any previous value.
    pub fn insert(&self, key: impl Into<String>, digest: impl Into<String>) {
        self.entries.insert(key.into(), digest.into());
    }

    /// Number of cached entries across both namespaces.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Clear all cached digests and statistics
    pub fn clear(&self) {
        self.entries.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    /// Get cache statistics as `(hits, misses)`
    pub fn stats(&self) -> (usize, usize) {
        (self.hits.load(Ordering::Relaxed), self.misses.load(Ordering::Relaxed))
    }

    /// Calculate hit rate as a percentage
    pub fn hit_rate(&self) -> f64 {
        let (hits, misses) = self.stats();
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            (hits as f64 / total as f64) * 100.0
        }
    }
}

/// Hands out one shared [`DigestCache`] per lookup details key.
///
/// Lookup contexts created with the same details (formats, handlers) share a
/// cache, so a digest computed while serving one request is reused by the
/// next.
#[derive(Debug, Default)]
pub struct DigestCacheRegistry {
    caches: DashMap<String, Arc<DigestCache>>,
}

impl DigestCacheRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    pub fn global() -> &'static DigestCacheRegistry {
        static GLOBAL: OnceLock<DigestCacheRegistry> = OnceLock::new();
        GLOBAL.get_or_init(DigestCacheRegistry::new)
    }

    /// The cache for `details_key`, created on first use.
    pub fn cache_for(&self, details_key: &str) -> Arc<DigestCache> {
        self.caches.entry(details_key.to_string()).or_default().clone()
    }

    /// Context-reset event: clear and forget every cache.
    ///
    /// Contexts still holding a cache see it emptied; contexts created
    /// afterwards get a fresh one.
    pub fn reset(&self) {
        for cache in self.caches.iter() {
            cache.value().clear();
        }
        self.caches.clear();
        tracing::debug!("Digest caches reset");
    }

    /// Number of distinct details keys with a live cache.
    pub fn len(&self) -> usize {
        self.caches.len()
    }

    /// Whether no cache has been handed out since the last reset.
    pub fn is_empty(&self) -> bool {
        self.caches.is_empty()
    }
}
