//! Planner configuration
//!
//! One section per concern, all serde-defaulted so partial configs
//! deserialize cleanly.

use serde::{Deserialize, Serialize};

/// Top-level planner configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlannerConfig {
    pub scoring: ScoringConfig,
    pub conflict: ConflictConfig,
    pub cache: CacheConfig,
    pub ledger: LedgerConfig,
}

impl PlannerConfig {
    /// Create a config with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the scoring section.
    pub fn with_scoring(mut self, scoring: ScoringConfig) -> Self {
        self.scoring = scoring;
        self
    }

    /// Set the conflict-analysis section.
    pub fn with_conflict(mut self, conflict: ConflictConfig) -> Self {
        self.conflict = conflict;
        self
    }

    /// Set the cache section.
    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    /// Set the ledger section.
    pub fn with_ledger(mut self, ledger: LedgerConfig) -> Self {
        self.ledger = ledger;
        self
    }
}

/// How to treat tasks whose estimated duration exceeds the configured
/// ceiling. The policy is explicit deployment configuration; there is no
/// silent-NaN path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationPolicy {
    /// Floor the derived complexity at zero and keep the task
    Clamp,
    /// Fail the task with `InvalidTask` when duration exceeds the ceiling
    Reject,
}

/// Priority scoring configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoringConfig {
    /// Duration ceiling in minutes for the `Reject` policy
    pub duration_ceiling_minutes: f64,
    /// Over-ceiling handling policy
    pub duration_policy: DurationPolicy,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            duration_ceiling_minutes: 1440.0,
            duration_policy: DurationPolicy::Clamp,
        }
    }
}

impl ScoringConfig {
    /// Set the duration ceiling.
    pub fn with_ceiling(mut self, minutes: f64) -> Self {
        self.duration_ceiling_minutes = minutes;
        self
    }

    /// Set the over-ceiling policy.
    pub fn with_policy(mut self, policy: DurationPolicy) -> Self {
        self.duration_policy = policy;
        self
    }
}

/// Pairwise conflict-analysis configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConflictConfig {
    /// Minimum pair strength for a conflict to be recorded (0..1)
    pub threshold: f64,
}

impl Default for ConflictConfig {
    fn default() -> Self {
        Self { threshold: 0.7 }
    }
}

impl ConflictConfig {
    /// Set the recording threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }
}

/// Result cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    /// Entry time-to-live in milliseconds
    pub ttl_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_ms: 300_000 }
    }
}

impl CacheConfig {
    /// Set the entry TTL.
    pub fn with_ttl_ms(mut self, ttl_ms: u64) -> Self {
        self.ttl_ms = ttl_ms;
        self
    }
}

/// Execution ledger configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LedgerConfig {
    /// Ring buffer capacity; oldest records fall off when exceeded
    pub capacity: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self { capacity: 256 }
    }
}

impl LedgerConfig {
    /// Set the retention capacity.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }
}
