//! Bounded TTL cache from generation cache key to produced video.
//!
//! Expiry is checked lazily on read. Inserts that push the map past
//! `max_items` evict exactly one entry, the one with the oldest timestamp.
//! A single mutex covers the map so read-check-remove and insert-then-evict
//! are atomic with respect to other requests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::debug;

/// Outcome of a generation worth remembering.
///
/// Failures are never cached; a fallback that produced no real video is
/// recorded as [`VideoResult::Placeholder`] rather than an empty URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoResult {
    Ready(String),
    Placeholder,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: VideoResult,
    stored_at: Instant,
}

#[derive(Clone)]
pub struct VideoCache {
    entries: Arc<Mutex<HashMap<String, CacheEntry>>>,
    ttl: Duration,
    max_items: usize,
}

impl VideoCache {
    pub fn new(ttl: Duration, max_items: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            ttl,
            max_items,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn max_items(&self) -> usize {
        self.max_items
    }

    /// Return a fresh entry, dropping it if it has outlived the TTL.
    pub fn get(&self, key: &str) -> Option<VideoResult> {
        self.get_at(key, Instant::now())
    }

    /// Store (or overwrite) a result, then evict the oldest entry if over capacity.
    pub fn set(&self, key: impl Into<String>, value: VideoResult) {
        self.set_at(key.into(), value, Instant::now());
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get_at(&self, key: &str, now: Instant) -> Option<VideoResult> {
        let mut entries = self.lock();
        let entry = entries.get(key)?;
        if now.saturating_duration_since(entry.stored_at) > self.ttl {
            entries.remove(key);
            debug!(key, "cache entry expired");
            return None;
        }
        Some(entry.value.clone())
    }

    fn set_at(&self, key: String, value: VideoResult, now: Instant) {
        let mut entries = self.lock();
        entries.insert(
            key,
            CacheEntry {
                value,
                stored_at: now,
            },
        );

        if entries.len() > self.max_items {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.stored_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
                debug!(key = %oldest, "evicted oldest cache entry");
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        // Nothing held under the lock can be left half-written, so a poisoned map is still valid.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
