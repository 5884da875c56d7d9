//! Message-id deduplication cache.
//!
//! Tracks recently seen message ids so server-side redelivery can be
//! spotted and logged. Redelivered frames are still dispatched: the cache
//! is diagnostic, not a suppression filter.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Default retention for a seen message id.
pub const DEFAULT_MESSAGE_TTL: Duration = Duration::from_secs(10);

struct CacheEntry {
    /// The frame's `message_timestamp`, kept for diagnostics.
    timestamp: String,
    expires_at: Instant,
}

/// A time-bounded set of recently seen message identifiers.
///
/// Entries expire a fixed TTL after insertion; lookups do not refresh
/// them. Owned exclusively by the read loop, which calls
/// [`MessageCache::evict_expired`] once per iteration so the cache stays
/// bounded without a background sweeper.
pub struct MessageCache {
    ttl: Duration,
    entries: HashMap<String, CacheEntry>,
}

impl MessageCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    /// Whether `id` was seen within the TTL.
    pub fn contains(&self, id: &str) -> bool {
        self.entries
            .get(id)
            .map_or(false, |entry| entry.expires_at > Instant::now())
    }

    /// The stored `message_timestamp` of a live entry.
    pub fn timestamp(&self, id: &str) -> Option<&str> {
        self.entries
            .get(id)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.timestamp.as_str())
    }

    pub fn insert(&mut self, id: String, timestamp: String) {
        self.entries.insert(
            id,
            CacheEntry {
                timestamp,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    pub fn evict_expired(&mut self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| entry.expires_at > now);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
