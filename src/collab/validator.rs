//! Input validation seam.
//!
//! The validator sanitizes a batch before the pipeline sees it. Its batch
//! bound is what keeps the O(n²) conflict pass affordable, and a
//! batch-size violation is the one failure the planner degrades on
//! (truncate + sequential plan) instead of failing.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::config::{DurationPolicy, ScoringConfig};
use crate::domain::{Constraints, Task};
use crate::error::Result;

/// Why a batch failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Priority outside 0..=1
    PriorityOutOfRange,
    /// Estimated duration below zero
    NegativeDuration,
    /// Estimated duration above the configured ceiling (Reject policy)
    DurationCeilingExceeded,
    /// A task depends on itself
    SelfDependency,
    /// A dependency references no task in the batch
    UnknownDependency,
    /// Two tasks share an id
    DuplicateId,
    /// The batch exceeds the validator's maximum size
    BatchTooLarge,
}

/// One validation finding.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category
    pub kind: ValidationErrorKind,
    /// Human-oriented description (diagnostic, not localized output)
    pub message: String,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Outcome of validating one request.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    /// Whether the batch may proceed as-is
    pub valid: bool,
    /// Findings when invalid
    pub errors: Vec<ValidationError>,
    /// Tasks after sanitization (truncated on a batch-size violation)
    pub sanitized_tasks: Vec<Task>,
    /// Constraints after sanitization (bounds floored/clamped)
    pub sanitized_constraints: Constraints,
}

impl ValidationReport {
    /// A passing report.
    pub fn pass(tasks: Vec<Task>, constraints: Constraints) -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            sanitized_tasks: tasks,
            sanitized_constraints: constraints,
        }
    }

    /// A failing report.
    pub fn fail(errors: Vec<ValidationError>, tasks: Vec<Task>, constraints: Constraints) -> Self {
        Self {
            valid: false,
            errors,
            sanitized_tasks: tasks,
            sanitized_constraints: constraints,
        }
    }

    /// True when the only failure is the batch-size bound, the one case
    /// the planner degrades gracefully on.
    pub fn batch_size_only(&self) -> bool {
        !self.valid
            && !self.errors.is_empty()
            && self
                .errors
                .iter()
                .all(|e| e.kind == ValidationErrorKind::BatchTooLarge)
    }
}

/// Trait for validators that sanitize planning requests.
#[async_trait]
pub trait Validator: Send + Sync {
    /// Validate and sanitize one batch.
    async fn validate(&self, tasks: &[Task], constraints: &Constraints) -> Result<ValidationReport>;

    /// Largest batch the pipeline may analyze.
    fn max_batch_size(&self) -> usize;
}

/// Structural checks over the raw batch.
#[derive(Debug, Clone)]
pub struct DefaultValidator {
    max_batch_size: usize,
    scoring: ScoringConfig,
}

impl DefaultValidator {
    /// Default batch bound.
    pub const DEFAULT_MAX_BATCH: usize = 100;

    /// Create a validator with the default bound and scoring policy.
    pub fn new() -> Self {
        Self {
            max_batch_size: Self::DEFAULT_MAX_BATCH,
            scoring: ScoringConfig::default(),
        }
    }

    /// Set the batch bound.
    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size.max(1);
        self
    }

    /// Align the duration checks with the planner's scoring policy.
    pub fn with_scoring(mut self, scoring: ScoringConfig) -> Self {
        self.scoring = scoring;
        self
    }

    fn sanitize_constraints(constraints: &Constraints) -> Constraints {
        Constraints {
            max_concurrency: constraints.max_concurrency.max(1),
            resource_availability: constraints.resource_availability.max(0.0),
            max_states: constraints.max_states,
        }
    }
}

impl Default for DefaultValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Validator for DefaultValidator {
    async fn validate(&self, tasks: &[Task], constraints: &Constraints) -> Result<ValidationReport> {
        let mut errors = Vec::new();

        let mut seen: HashSet<&str> = HashSet::new();
        for task in tasks {
            if !seen.insert(task.id.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::DuplicateId,
                    format!("duplicate task id: {}", task.id),
                ));
            }
            if !(0.0..=1.0).contains(&task.priority) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::PriorityOutOfRange,
                    format!("task '{}' priority {} outside 0..=1", task.id, task.priority),
                ));
            }
            if task.estimated_duration < 0.0 {
                errors.push(ValidationError::new(
                    ValidationErrorKind::NegativeDuration,
                    format!("task '{}' duration {} is negative", task.id, task.estimated_duration),
                ));
            }
            if self.scoring.duration_policy == DurationPolicy::Reject
                && task.estimated_duration > self.scoring.duration_ceiling_minutes
            {
                errors.push(ValidationError::new(
                    ValidationErrorKind::DurationCeilingExceeded,
                    format!(
                        "task '{}' duration {} exceeds ceiling {}",
                        task.id, task.estimated_duration, self.scoring.duration_ceiling_minutes
                    ),
                ));
            }
            if task.dependencies.iter().any(|dep| dep == &task.id) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::SelfDependency,
                    format!("task '{}' depends on itself", task.id),
                ));
            }
        }

        let ids: HashSet<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        for task in tasks {
            for dep in &task.dependencies {
                if dep != &task.id && !ids.contains(dep.as_str()) {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::UnknownDependency,
                        format!("task '{}' depends on unknown task '{}'", task.id, dep),
                    ));
                }
            }
        }

        if tasks.len() > self.max_batch_size {
            errors.push(ValidationError::new(
                ValidationErrorKind::BatchTooLarge,
                format!("batch of {} exceeds limit {}", tasks.len(), self.max_batch_size),
            ));
        }

        let sanitized_constraints = Self::sanitize_constraints(constraints);
        if errors.is_empty() {
            return Ok(ValidationReport::pass(tasks.to_vec(), sanitized_constraints));
        }

        // On a pure batch-size violation the sanitized set is the truncated
        // prefix; other failures keep the batch for diagnostics only.
        let sanitized_tasks = if errors.iter().all(|e| e.kind == ValidationErrorKind::BatchTooLarge) {
            tasks[..self.max_batch_size].to_vec()
        } else {
            tasks.to_vec()
        };
        Ok(ValidationReport::fail(errors, sanitized_tasks, sanitized_constraints))
    }

    fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }
}
