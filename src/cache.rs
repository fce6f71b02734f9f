//! Result cache.
//!
//! Fingerprint-keyed, TTL-based memo of full pipeline outputs. The
//! fingerprint covers every planning input plus the calling principal, so
//! two principals never share entries. Expired entries are evicted lazily
//! at lookup time.
//!
//! A per-fingerprint flight lock gives concurrent identical requests
//! single-flight semantics: the second caller waits on the first
//! computation and then reads it from the cache instead of duplicating
//! the O(n²) analysis.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use sha2::{Digest, Sha256};

use crate::domain::{Constraints, Plan, Principal, Task, principal_key};
use crate::error::Result;

/// Deterministic cache key over tasks (in input order), constraints, and
/// the calling principal.
///
/// Per task: `(id, priority, estimated_duration, sorted dependencies)`.
/// Constraints ride along as canonical JSON. Rendered as a 16-char hex
/// prefix of the Sha256 digest.
pub fn fingerprint(
    tasks: &[Task],
    constraints: &Constraints,
    principal: Option<&Principal>,
) -> Result<String> {
    let mut canonical = String::new();
    for task in tasks {
        let mut deps = task.dependencies.clone();
        deps.sort();
        canonical.push_str(&task.id);
        canonical.push('|');
        canonical.push_str(&task.priority.to_string());
        canonical.push('|');
        canonical.push_str(&task.estimated_duration.to_string());
        canonical.push('|');
        canonical.push_str(&deps.join(","));
        canonical.push(';');
    }
    canonical.push_str(&serde_json::to_string(constraints)?);
    canonical.push('|');
    canonical.push_str(&principal_key(principal));

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    let digest = hasher.finalize();
    Ok(hex::encode(&digest[..8]))
}

/// One cached pipeline output.
#[derive(Debug, Clone)]
struct CacheEntry {
    plan: Plan,
    created_at: i64,
}

/// Shared TTL cache.
///
/// The entry map sits behind a `std::sync::Mutex`: operations are quick
/// map reads/writes and never held across an await. Flight locks are
/// `tokio::sync::Mutex` because a waiter holds one across the whole
/// in-flight computation.
#[derive(Debug)]
pub struct ResultCache {
    ttl_ms: i64,
    entries: Mutex<HashMap<String, CacheEntry>>,
    flights: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl ResultCache {
    /// Create a cache with the given entry TTL in milliseconds.
    pub fn new(ttl_ms: u64) -> Self {
        Self {
            ttl_ms: ttl_ms as i64,
            entries: Mutex::new(HashMap::new()),
            flights: Mutex::new(HashMap::new()),
        }
    }

    /// Lock handle serializing computation for one fingerprint.
    ///
    /// Callers acquire this before the cache lookup and hold it until the
    /// computed plan is stored, then `retire_flight`.
    pub fn flight(&self, fingerprint: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut flights = self.flights.lock().expect("flight map lock poisoned");
        flights
            .entry(fingerprint.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// Drop the flight entry for a completed computation. Waiters holding
    /// clones of the lock are unaffected; later callers get a fresh one
    /// and find the stored plan.
    pub fn retire_flight(&self, fingerprint: &str) {
        let mut flights = self.flights.lock().expect("flight map lock poisoned");
        flights.remove(fingerprint);
    }

    /// Plan for `fingerprint` if present and fresh. An entry at or past
    /// its TTL is evicted and reported as a miss.
    pub fn lookup(&self, fingerprint: &str, now_ms: i64) -> Option<Plan> {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        match entries.get(fingerprint) {
            Some(entry) if now_ms - entry.created_at < self.ttl_ms => Some(entry.plan.clone()),
            Some(_) => {
                tracing::debug!(fingerprint = %fingerprint, "cache entry expired");
                entries.remove(fingerprint);
                None
            }
            None => None,
        }
    }

    /// Store a computed plan under its fingerprint.
    pub fn store(&self, fingerprint: String, plan: Plan, now_ms: i64) {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        entries.insert(
            fingerprint,
            CacheEntry {
                plan,
                created_at: now_ms,
            },
        );
    }

    /// Number of retained entries (including any not yet lazily evicted).
    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache lock poisoned").len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
