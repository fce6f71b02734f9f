//! Pairwise conflict analysis.
//!
//! Scores every unordered pair of tasks for dependency, resource, and
//! deadline interaction ("entanglement" in the inherited vocabulary) and
//! records the pairs strong enough to affect phase placement:
//!
//! - `resource_overlap = |A∩B| / max(|A∪B|, 1)` over resource tags
//! - `temporal_correlation = exp(-|deadline_a - deadline_b| / 1 day)`
//! - `dependency_strength = 1.0` iff either task depends on the other
//! - `strength` = mean of the three; recorded when above the threshold
//!
//! The pass is O(n²); the validator's batch bound keeps n small enough.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::cancel::CancelToken;
use crate::domain::Task;
use crate::error::Result;

/// Deadline proximity normalization window: one day in ms.
const TEMPORAL_WINDOW_MS: f64 = 86_400_000.0;

/// Cancellation checkpoint cadence inside the pair loop.
const CHECKPOINT_INTERVAL: usize = 256;

/// Relationship classification for a task pair, in priority order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// Direct dependency: the pair must be ordered across phases
    Sequential,
    /// Shared resource tags: the pair must not share a phase
    ResourceConflict,
    /// No dependency, disjoint resources; above the threshold purely via
    /// temporal proximity. Placement-neutral.
    Parallel,
    /// Below the recording threshold with no dependency or overlap.
    /// Recorded pairs never carry this kind: a non-dependent,
    /// non-overlapping pair above the threshold is `Parallel`.
    Independent,
}

impl ConflictKind {
    /// Whether this relationship forbids sharing a phase.
    pub fn blocks_same_phase(&self) -> bool {
        matches!(self, ConflictKind::Sequential | ConflictKind::ResourceConflict)
    }
}

/// A recorded pairwise relationship. Unordered: (a, b) and (b, a) are the
/// same record, stored once.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Conflict {
    pub task_a: String,
    pub task_b: String,
    /// Mean of the three pair components, in 0..=1
    pub strength: f64,
    pub kind: ConflictKind,
}

impl Conflict {
    /// Whether this conflict pairs `a` with `b`, in either order.
    pub fn pairs(&self, a: &str, b: &str) -> bool {
        (self.task_a == a && self.task_b == b) || (self.task_a == b && self.task_b == a)
    }

    /// Whether this conflict involves the given task.
    pub fn involves(&self, id: &str) -> bool {
        self.task_a == id || self.task_b == id
    }
}

/// Pairwise analyzer.
///
/// Stateless apart from a cumulative run counter; all pair data belongs to
/// the calling invocation. The counter exists so callers can verify that
/// cache hits perform zero re-analysis.
#[derive(Debug)]
pub struct ConflictAnalyzer {
    threshold: f64,
    analysis_runs: AtomicU64,
}

impl ConflictAnalyzer {
    /// Create an analyzer with the given recording threshold.
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            analysis_runs: AtomicU64::new(0),
        }
    }

    /// Number of full pairwise analyses performed since construction.
    pub fn analysis_runs(&self) -> u64 {
        self.analysis_runs.load(Ordering::Relaxed)
    }

    /// Analyze every unordered pair of distinct tasks, recording those
    /// above the threshold. `now_ms` anchors default-deadline resolution
    /// for the whole call.
    pub fn analyze(&self, tasks: &[Task], now_ms: i64, token: &CancelToken) -> Result<Vec<Conflict>> {
        self.analysis_runs.fetch_add(1, Ordering::Relaxed);

        let mut conflicts = Vec::new();
        let mut visited = 0usize;

        for i in 0..tasks.len() {
            for j in (i + 1)..tasks.len() {
                visited += 1;
                if visited % CHECKPOINT_INTERVAL == 0 {
                    token.checkpoint()?;
                }

                let (strength, kind) = self.classify_pair(&tasks[i], &tasks[j], now_ms);
                if strength > self.threshold {
                    conflicts.push(Conflict {
                        task_a: tasks[i].id.clone(),
                        task_b: tasks[j].id.clone(),
                        strength,
                        kind,
                    });
                }
            }
        }

        tracing::debug!(
            pairs = visited,
            recorded = conflicts.len(),
            "pairwise analysis complete"
        );
        Ok(conflicts)
    }

    /// Strength and classification for one pair.
    ///
    /// Classification follows the priority order: dependency, then shared
    /// resources, then temporal-only (`Parallel` above the threshold,
    /// `Independent` below).
    pub fn classify_pair(&self, a: &Task, b: &Task, now_ms: i64) -> (f64, ConflictKind) {
        let overlap = resource_overlap(a, b);
        let temporal = temporal_correlation(a, b, now_ms);
        let dependency = if a.depends_on(&b.id) || b.depends_on(&a.id) {
            1.0
        } else {
            0.0
        };
        let strength = (overlap + temporal + dependency) / 3.0;

        let kind = if dependency > 0.0 {
            ConflictKind::Sequential
        } else if overlap > 0.0 {
            ConflictKind::ResourceConflict
        } else if strength > self.threshold {
            ConflictKind::Parallel
        } else {
            ConflictKind::Independent
        };

        (strength, kind)
    }
}

/// Jaccard overlap of the two tasks' resource tags.
fn resource_overlap(a: &Task, b: &Task) -> f64 {
    let set_a: HashSet<&str> = a.required_resources.iter().map(String::as_str).collect();
    let set_b: HashSet<&str> = b.required_resources.iter().map(String::as_str).collect();
    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.union(&set_b).count();
    intersection as f64 / union.max(1) as f64
}

/// Deadline proximity, decaying over a one-day window.
fn temporal_correlation(a: &Task, b: &Task, now_ms: i64) -> f64 {
    let gap = (a.resolved_deadline(now_ms) - b.resolved_deadline(now_ms)).abs() as f64;
    (-gap / TEMPORAL_WINDOW_MS).exp()
}
