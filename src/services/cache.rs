//! Response Cache
//!
//! Memoizes generated text keyed by a fingerprint of (category, intent,
//! normalized prompt). Capacity-bounded LRU with a per-entry TTL that is
//! checked lazily on lookup.

use chrono::{DateTime, Duration, Utc};
use lru::LruCache;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::num::NonZeroUsize;
use std::sync::Arc;

use screen_insight_core::{ActivityCategory, Clock, Intent};

use super::prompt::TEMPLATE_SET_VERSION;

/// Lowercase and collapse every run of whitespace to one space.
pub fn normalize_prompt(prompt: &str) -> String {
    prompt
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Deterministic cache key for a prompt.
pub fn cache_key(category: ActivityCategory, intent: Intent, prompt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("v{}", TEMPLATE_SET_VERSION).as_bytes());
    hasher.update(b"|");
    hasher.update(category.as_str().as_bytes());
    hasher.update(b"|");
    hasher.update(intent.as_str().as_bytes());
    hasher.update(b"|");
    hasher.update(normalize_prompt(prompt).as_bytes());
    format!("{:x}", hasher.finalize())
}

/// A cached value with its lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub key: String,
    pub value: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Hit/miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub expired: u64,
    pub entries: usize,
}

struct CacheState {
    entries: LruCache<String, CacheEntry>,
    stats: CacheStats,
}

/// Thread-safe response cache. One writer at a time; readers never see a
/// partially written entry.
pub struct ResponseCache {
    state: Mutex<CacheState>,
    default_ttl: Duration,
    clock: Arc<dyn Clock>,
    enabled: bool,
}

impl ResponseCache {
    /// Create a cache holding at most `capacity` entries.
    ///
    /// A zero capacity is treated as one; use `disabled()` to turn caching off.
    pub fn new(capacity: usize, default_ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            state: Mutex::new(CacheState {
                entries: LruCache::new(capacity),
                stats: CacheStats::default(),
            }),
            default_ttl,
            clock,
            enabled: true,
        }
    }

    /// A cache that never stores anything and always misses.
    pub fn disabled(clock: Arc<dyn Clock>) -> Self {
        Self {
            enabled: false,
            ..Self::new(1, Duration::zero(), clock)
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Look up a key. Expired entries are removed and reported as misses.
    pub fn get(&self, key: &str) -> Option<String> {
        if !self.enabled {
            return None;
        }
        let now = self.clock.now();
        let mut state = self.state.lock();

        let lookup = state
            .entries
            .get(key)
            .map(|entry| (entry.is_expired(now), entry.value.clone()));

        match lookup {
            Some((false, value)) => {
                state.stats.hits += 1;
                Some(value)
            }
            Some((true, _)) => {
                state.entries.pop(key);
                state.stats.expired += 1;
                state.stats.misses += 1;
                None
            }
            None => {
                state.stats.misses += 1;
                None
            }
        }
    }

    /// Store a value with the default TTL.
    pub fn put(&self, key: impl Into<String>, value: impl Into<String>) {
        self.put_with_ttl(key, value, self.default_ttl);
    }

    /// Store a value with an explicit TTL, evicting the least recently used
    /// entry when full.
    pub fn put_with_ttl(&self, key: impl Into<String>, value: impl Into<String>, ttl: Duration) {
        if !self.enabled {
            return;
        }
        let key = key.into();
        let now = self.clock.now();
        let Some(expires_at) = now.checked_add_signed(ttl) else {
            tracing::debug!(key = %key, "cache TTL overflows, entry not stored");
            return;
        };
        let entry = CacheEntry {
            key: key.clone(),
            value: value.into(),
            created_at: now,
            expires_at,
        };

        let mut state = self.state.lock();
        if let Some((evicted, _)) = state.entries.push(key.clone(), entry) {
            if evicted != key {
                tracing::debug!(evicted = %evicted, "response cache evicted least recently used entry");
            }
        }
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        CacheStats {
            entries: state.entries.len(),
            ..state.stats
        }
    }
}
