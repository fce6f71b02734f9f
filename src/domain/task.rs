//! Planning inputs: tasks, constraints, and the calling principal.
//!
//! Tasks and constraints are caller-owned, request-scoped values; the
//! planner never stores them beyond the call (the result cache keeps only
//! derived plans, keyed by fingerprint).

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Task priority when unspecified.
pub const DEFAULT_PRIORITY: f64 = 0.5;
/// Estimated duration in minutes when unspecified.
pub const DEFAULT_DURATION_MINUTES: f64 = 60.0;
/// Per-resource requirement weight when unspecified.
pub const DEFAULT_RESOURCE_REQUIREMENT: f64 = 1.0;
/// Deadline fallback window when a task declares none: one day in ms.
pub const DEFAULT_DEADLINE_WINDOW_MS: i64 = 86_400_000;

/// Get current time in milliseconds since epoch.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// One unit of schedulable work.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    /// Unique id within the batch
    pub id: String,

    /// Ranking weight in 0..=1
    #[serde(default = "default_priority")]
    pub priority: f64,

    /// Estimated duration in minutes, >= 0
    #[serde(default = "default_duration")]
    pub estimated_duration: f64,

    /// Ids of tasks that must complete in a strictly earlier phase.
    /// Never contains this task's own id; cycles across tasks are
    /// detected by the phase planner, not assumed absent.
    #[serde(default)]
    pub dependencies: Vec<String>,

    /// Resource tags this task holds exclusively while running
    #[serde(default)]
    pub required_resources: Vec<String>,

    /// Epoch milliseconds; `None` resolves to "now + 1 day" at planning time
    #[serde(default)]
    pub deadline: Option<i64>,

    /// Allocation weight charged against each required resource
    #[serde(default = "default_resource_requirement")]
    pub resource_requirement: f64,
}

fn default_priority() -> f64 {
    DEFAULT_PRIORITY
}

fn default_duration() -> f64 {
    DEFAULT_DURATION_MINUTES
}

fn default_resource_requirement() -> f64 {
    DEFAULT_RESOURCE_REQUIREMENT
}

impl Task {
    /// Create a task with default priority, duration, and requirement.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            priority: DEFAULT_PRIORITY,
            estimated_duration: DEFAULT_DURATION_MINUTES,
            dependencies: Vec::new(),
            required_resources: Vec::new(),
            deadline: None,
            resource_requirement: DEFAULT_RESOURCE_REQUIREMENT,
        }
    }

    /// Set the priority.
    pub fn with_priority(mut self, priority: f64) -> Self {
        self.priority = priority;
        self
    }

    /// Set the estimated duration in minutes.
    pub fn with_duration(mut self, minutes: f64) -> Self {
        self.estimated_duration = minutes;
        self
    }

    /// Add a dependency on another task id.
    pub fn with_dependency(mut self, dep: impl Into<String>) -> Self {
        self.dependencies.push(dep.into());
        self
    }

    /// Add a required resource tag.
    pub fn with_resource(mut self, tag: impl Into<String>) -> Self {
        self.required_resources.push(tag.into());
        self
    }

    /// Set the deadline in epoch milliseconds.
    pub fn with_deadline(mut self, epoch_ms: i64) -> Self {
        self.deadline = Some(epoch_ms);
        self
    }

    /// Set the per-resource allocation weight.
    pub fn with_resource_requirement(mut self, weight: f64) -> Self {
        self.resource_requirement = weight;
        self
    }

    /// Deadline resolved against a per-call `now` snapshot.
    ///
    /// One planning call resolves every default against the same snapshot,
    /// so two deadline-less tasks are exactly co-deadlined within a call.
    pub fn resolved_deadline(&self, now_ms: i64) -> i64 {
        self.deadline.unwrap_or(now_ms + DEFAULT_DEADLINE_WINDOW_MS)
    }

    /// Whether this task declares a dependency on `other`.
    pub fn depends_on(&self, other: &str) -> bool {
        self.dependencies.iter().any(|dep| dep == other)
    }

    /// Whether the two tasks declare at least one common resource tag.
    pub fn shares_resources_with(&self, other: &Task) -> bool {
        self.required_resources
            .iter()
            .any(|tag| other.required_resources.iter().any(|t| t == tag))
    }
}

/// Batch-level planning constraints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Constraints {
    /// Maximum tasks per phase, >= 1
    pub max_concurrency: usize,
    /// Global resource availability factor applied during scoring
    pub resource_availability: f64,
    /// Informational lookahead width for execution variants; not
    /// load-bearing for the final plan
    pub max_states: usize,
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            resource_availability: 1.0,
            max_states: 8,
        }
    }
}

impl Constraints {
    /// Create constraints with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-phase concurrency bound.
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    /// Set the resource availability factor.
    pub fn with_resource_availability(mut self, availability: f64) -> Self {
        self.resource_availability = availability;
        self
    }

    /// Set the variant lookahead width.
    pub fn with_max_states(mut self, max_states: usize) -> Self {
        self.max_states = max_states;
        self
    }

    /// Concurrency bound floored at 1.
    pub fn effective_concurrency(&self) -> usize {
        self.max_concurrency.max(1)
    }
}

/// The caller's identity, used for permission checks and cache keying.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Principal {
    pub user_id: String,
    pub role: String,
}

impl Principal {
    /// Create a principal.
    pub fn new(user_id: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role: role.into(),
        }
    }

    /// Cache-key form: `userId:role`.
    pub fn cache_key(&self) -> String {
        format!("{}:{}", self.user_id, self.role)
    }
}

/// Cache-key form of an optional principal; the literal `anonymous` when
/// absent.
pub fn principal_key(principal: Option<&Principal>) -> String {
    match principal {
        Some(p) => p.cache_key(),
        None => "anonymous".to_string(),
    }
}
