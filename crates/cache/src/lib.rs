//! Single-flight TTL cache for ranked lists
//!
//! Recommendation lists are expensive to compute (vector scans, model
//! calls), so computed lists are cached under string keys with a per-entry
//! TTL. Concurrent requests for the same missing key are collapsed into a
//! single computation: one caller becomes the leader and runs the compute
//! closure, everyone else blocks on a condvar and receives the leader's
//! cloned result. This bounds provider load to one in-flight computation
//! per key regardless of request fan-in.
//!
//! Failures are never cached: the leader's error is shared with the
//! waiters of that flight, but the next arrival starts a fresh computation.

use dashmap::DashMap;
use parking_lot::{Condvar, Mutex};
use reco_core::{RankedList, RecoError, RecoResult};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Default bound on how long a follower waits for a leader's result
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(5);

/// A cached ranked list with its expiry bookkeeping
#[derive(Debug, Clone)]
struct CacheEntry {
    list: RankedList,
    created: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        self.created.elapsed() >= self.ttl
    }
}

/// An in-flight computation shared between a leader and its followers
struct Flight {
    result: Mutex<Option<RecoResult<RankedList>>>,
    done: Condvar,
}

impl Flight {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            result: Mutex::new(None),
            done: Condvar::new(),
        })
    }

    /// Publish the result and wake all waiting followers
    fn resolve(&self, result: RecoResult<RankedList>) {
        *self.result.lock() = Some(result);
        self.done.notify_all();
    }

    /// Block until the leader resolves, up to `timeout`
    fn wait(&self, timeout: Duration) -> RecoResult<RankedList> {
        let deadline = Instant::now() + timeout;
        let mut result = self.result.lock();
        loop {
            if let Some(res) = result.as_ref() {
                return res.clone();
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(RecoError::Internal("cache wait timed out".to_string()));
            }
            self.done.wait_for(&mut result, remaining);
        }
    }
}

/// Single-flight TTL cache keyed by string
///
/// Thread-safe; cheap to share behind an `Arc`. Entries are immutable once
/// stored - readers receive clones.
pub struct RecoCache {
    entries: DashMap<String, CacheEntry>,
    flights: Mutex<HashMap<String, Arc<Flight>>>,
    wait_timeout: Duration,
}

impl Default for RecoCache {
    fn default() -> Self {
        Self::new(DEFAULT_WAIT_TIMEOUT)
    }
}

impl RecoCache {
    /// Create a cache whose followers wait at most `wait_timeout` for a
    /// leader's result
    pub fn new(wait_timeout: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            flights: Mutex::new(HashMap::new()),
            wait_timeout,
        }
    }

    /// Return the cached list for `key`, computing it on a miss.
    ///
    /// At most one `compute` runs per key at a time across all threads.
    /// Expired entries count as misses. A failed computation is returned to
    /// the leader and every follower of that flight, but nothing is cached,
    /// so the next caller retries.
    pub fn get_or_compute<F>(&self, key: &str, ttl: Duration, compute: F) -> RecoResult<RankedList>
    where
        F: FnOnce() -> RecoResult<RankedList>,
    {
        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired() {
                trace!(target: "reco::cache", key, "cache hit");
                return Ok(entry.list.clone());
            }
        }

        // Miss: join an existing flight or become the leader of a new one
        let (flight, is_leader) = {
            let mut flights = self.flights.lock();
            // Another thread may have resolved and cached while we waited
            // for the flights lock
            if let Some(entry) = self.entries.get(key) {
                if !entry.is_expired() {
                    return Ok(entry.list.clone());
                }
            }
            match flights.get(key) {
                Some(flight) => (Arc::clone(flight), false),
                None => {
                    let flight = Flight::new();
                    flights.insert(key.to_string(), Arc::clone(&flight));
                    (flight, true)
                }
            }
        };

        if !is_leader {
            trace!(target: "reco::cache", key, "joining in-flight computation");
            return flight.wait(self.wait_timeout);
        }

        debug!(target: "reco::cache", key, "cache miss, computing");
        let result = compute();

        if let Ok(list) = &result {
            self.entries.insert(
                key.to_string(),
                CacheEntry {
                    list: list.clone(),
                    created: Instant::now(),
                    ttl,
                },
            );
        }

        // Retire the flight before resolving so late arrivals either hit
        // the fresh entry or start a new computation rather than joining a
        // finished flight
        self.flights.lock().remove(key);
        flight.resolve(result.clone());

        result
    }

    /// Remove every entry whose key starts with `prefix`
    ///
    /// Best-effort: entries being computed concurrently may land after the
    /// sweep and live until their TTL.
    pub fn invalidate_prefix(&self, prefix: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.starts_with(prefix));
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            debug!(target: "reco::cache", prefix, removed, "invalidated entries");
        }
        removed
    }

    /// Drop expired entries, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired());
        before.saturating_sub(self.entries.len())
    }

    /// Number of entries, including any not yet purged expired ones
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
