//! Per-type cache of resolved record shapes.
//!
//! Building a [`Shape`] walks every column declaration of a type, so the
//! result is kept in a [`FieldCache`] keyed by type identity. Entries expire
//! after a period without access and the cache holds at most
//! [`CacheConfig::max_entries`] types; an evicted shape is rebuilt on the next
//! lookup.

use std::any::TypeId;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use once_cell::sync::Lazy;

use crate::field::{RecordType, Shape};

static GLOBAL: Lazy<FieldCache> = Lazy::new(FieldCache::default);

/// Retention settings for a [`FieldCache`].
///
/// ```
/// use std::time::Duration;
/// use simsql::CacheConfig;
///
/// let config = CacheConfig::default()
///     .expire_after_access(Duration::from_secs(600))
///     .max_entries(64);
/// assert_eq!(config.get_max_entries(), 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    expire_after_access: Option<Duration>,
    max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            expire_after_access: Some(Duration::from_secs(24 * 60 * 60)),
            max_entries: 1024,
        }
    }
}

impl CacheConfig {
    /// Evicts entries not accessed for `ttl`.
    pub fn expire_after_access(mut self, ttl: Duration) -> Self {
        self.expire_after_access = Some(ttl);
        self
    }

    /// Keeps entries until they are evicted for size or invalidated.
    pub fn never_expire(mut self) -> Self {
        self.expire_after_access = None;
        self
    }

    /// Maximum number of cached types; at least one is always kept.
    pub fn max_entries(mut self, n: usize) -> Self {
        self.max_entries = n.max(1);
        self
    }

    /// Returns the access expiry, if any.
    pub fn get_expire_after_access(&self) -> Option<Duration> {
        self.expire_after_access
    }

    /// Returns the entry bound.
    pub fn get_max_entries(&self) -> usize {
        self.max_entries
    }
}

/// Counters describing cache behaviour since creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups served from a live entry.
    pub hits: u64,
    /// Lookups that built a shape.
    pub misses: u64,
    /// Entries dropped for age or size.
    pub evictions: u64,
}

struct CacheEntry {
    shape: Arc<Shape>,
    last_access: AtomicU64,
}

/// Concurrent cache of record shapes.
///
/// Lookups for a missing type build the shape while holding that key's map
/// entry, so concurrent callers for the same type wait for one build instead
/// of racing.
pub struct FieldCache {
    entries: DashMap<TypeId, CacheEntry>,
    config: CacheConfig,
    epoch: Instant,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl Default for FieldCache {
    fn default() -> Self {
        FieldCache::with_config(CacheConfig::default())
    }
}

impl FieldCache {
    /// Creates a cache with default retention.
    pub fn new() -> Self {
        FieldCache::default()
    }

    /// Creates a cache with the given retention settings.
    pub fn with_config(config: CacheConfig) -> Self {
        FieldCache {
            entries: DashMap::new(),
            config,
            epoch: Instant::now(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// The process-wide cache used when a query is not given its own.
    pub fn global() -> &'static FieldCache {
        &GLOBAL
    }

    /// Returns the retention settings.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Returns the shape of `record_type`, building it on a miss.
    pub fn resolve(&self, record_type: RecordType) -> Arc<Shape> {
        let key = record_type.id();
        let now = self.now();

        if let Some(entry) = self.entries.get(&key) {
            if !self.is_expired(&entry, now) {
                entry.last_access.store(now, Ordering::Relaxed);
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Arc::clone(&entry.shape);
            }
        }

        let shape = match self.entries.entry(key) {
            Entry::Occupied(mut occupied) => {
                if self.is_expired(occupied.get(), now) {
                    self.evictions.fetch_add(1, Ordering::Relaxed);
                    let shape = self.build(record_type);
                    occupied.insert(CacheEntry {
                        shape: Arc::clone(&shape),
                        last_access: AtomicU64::new(now),
                    });
                    shape
                } else {
                    // Built by a concurrent caller while we waited.
                    let entry = occupied.get();
                    entry.last_access.store(now, Ordering::Relaxed);
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    Arc::clone(&entry.shape)
                }
            }
            Entry::Vacant(vacant) => {
                let shape = self.build(record_type);
                vacant.insert(CacheEntry {
                    shape: Arc::clone(&shape),
                    last_access: AtomicU64::new(now),
                });
                shape
            }
        };

        self.enforce_capacity(key);
        shape
    }

    /// Drops the cached shape of `record_type`, if any.
    pub fn invalidate(&self, record_type: RecordType) -> bool {
        self.entries.remove(&record_type.id()).is_some()
    }

    /// Drops every expired entry, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !self.is_expired(entry, now));
        let purged = before.saturating_sub(self.entries.len());
        self.evictions.fetch_add(purged as u64, Ordering::Relaxed);
        purged
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of cached types.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if `record_type` has a cached shape (expired or not).
    pub fn contains(&self, record_type: RecordType) -> bool {
        self.entries.contains_key(&record_type.id())
    }

    /// Returns hit, miss and eviction counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    fn build(&self, record_type: RecordType) -> Arc<Shape> {
        self.misses.fetch_add(1, Ordering::Relaxed);
        let shape = record_type.build_shape();
        tracing::debug!(
            record_type = record_type.name(),
            columns = shape.len(),
            "resolved record shape"
        );
        Arc::new(shape)
    }

    fn now(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    fn is_expired(&self, entry: &CacheEntry, now: u64) -> bool {
        match self.config.expire_after_access {
            Some(ttl) => {
                let idle = now.saturating_sub(entry.last_access.load(Ordering::Relaxed));
                u128::from(idle) >= ttl.as_millis()
            }
            None => false,
        }
    }

    /// Evicts least recently accessed entries beyond the bound, sparing `keep`.
    fn enforce_capacity(&self, keep: TypeId) {
        while self.entries.len() > self.config.max_entries {
            let oldest = self
                .entries
                .iter()
                .filter(|entry| *entry.key() != keep)
                .min_by_key(|entry| entry.value().last_access.load(Ordering::Relaxed))
                .map(|entry| *entry.key());

            match oldest {
                Some(key) => {
                    if self.entries.remove(&key).is_some() {
                        self.evictions.fetch_add(1, Ordering::Relaxed);
                        tracing::debug!(?key, "evicted record shape");
                    }
                }
                None => break,
            }
        }
    }
}

impl std::fmt::Debug for FieldCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldCache")
            .field("entries", &self.entries.len())
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish()
    }
}
