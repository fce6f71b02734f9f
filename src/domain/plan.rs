//! Planning outputs: phases, the plan, and the response envelope.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::task::Task;

/// A group of tasks scheduled to run concurrently.
///
/// Phases execute sequentially; tasks within a phase execute in parallel,
/// bounded by the slowest member.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Phase {
    /// Admitted tasks, in admission order
    pub tasks: Vec<Task>,
    /// Wall duration in minutes: the slowest member
    pub duration: f64,
    /// Cumulative allocation per resource tag across members
    pub resources: HashMap<String, f64>,
}

impl Phase {
    /// Create an empty phase.
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit a task, updating the phase duration and resource allocations.
    pub fn admit(&mut self, task: Task) {
        if task.estimated_duration > self.duration {
            self.duration = task.estimated_duration;
        }
        for tag in &task.required_resources {
            *self.resources.entry(tag.clone()).or_insert(0.0) += task.resource_requirement;
        }
        self.tasks.push(task);
    }

    /// Number of admitted tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether no task has been admitted.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Whether a task with `id` is in this phase.
    pub fn contains(&self, id: &str) -> bool {
        self.tasks.iter().any(|t| t.id == id)
    }

    /// Whether any admitted task shares a resource tag with `task`.
    pub fn shares_resources_with(&self, task: &Task) -> bool {
        self.tasks.iter().any(|member| member.shares_resources_with(task))
    }
}

/// The full phased execution plan with derived quality metrics.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Plan {
    /// Ordered phases; earlier phases complete before later ones start
    pub phases: Vec<Phase>,
    /// Sum of phase durations in minutes
    pub total_duration: f64,
    /// Peak concurrent allocation per resource across phases (not a sum)
    pub resource_utilization: HashMap<String, f64>,
    /// `min(task_count / phase_count, 1.0)`, a saturating index in 0..=1,
    /// regardless of how many tasks actually run concurrently
    pub parallelism: f64,
    /// `min(total task work / total_duration, 1.0)`, 0 for an empty plan
    pub efficiency: f64,
}

impl Plan {
    /// Create a plan with no phases.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of phases.
    pub fn phase_count(&self) -> usize {
        self.phases.len()
    }

    /// Total tasks across phases.
    pub fn task_count(&self) -> usize {
        self.phases.iter().map(Phase::len).sum()
    }

    /// Index of the phase containing `task_id`.
    pub fn phase_of(&self, task_id: &str) -> Option<usize> {
        self.phases.iter().position(|phase| phase.contains(task_id))
    }
}

/// How the planner fulfilled the request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlanAction {
    /// The full batch was planned
    Planned,
    /// The batch exceeded the validator limit and was truncated to a
    /// degraded sequential plan
    Sanitized,
}

/// Response envelope for one planning call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanResponse {
    /// The produced plan
    pub plan: Plan,
    /// How the request was fulfilled
    pub action: PlanAction,
    /// Whether the plan came from the result cache
    pub cached: bool,
    /// Submitted task count before any sanitization
    pub original_task_count: usize,
    /// Tasks retained on the sanitized path; `None` when fully planned
    pub sanitized_tasks: Option<Vec<Task>>,
    /// Region selected by the router, when routing ran
    pub region: Option<String>,
}

impl PlanResponse {
    /// Envelope for a fully planned batch.
    pub fn planned(plan: Plan, original_task_count: usize) -> Self {
        Self {
            plan,
            action: PlanAction::Planned,
            cached: false,
            original_task_count,
            sanitized_tasks: None,
            region: None,
        }
    }

    /// Envelope for the degraded batch-size path.
    pub fn sanitized(plan: Plan, sanitized_tasks: Vec<Task>, original_task_count: usize) -> Self {
        Self {
            plan,
            action: PlanAction::Sanitized,
            cached: false,
            original_task_count,
            sanitized_tasks: Some(sanitized_tasks),
            region: None,
        }
    }

    /// Mark the plan as served from cache.
    pub fn from_cache(mut self) -> Self {
        self.cached = true;
        self
    }

    /// Attach the routing decision's region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Stable identifier for the presentation layer (see `collab::localize`).
    pub fn message_id(&self) -> &'static str {
        match self.action {
            PlanAction::Planned => "planr.plan.created",
            PlanAction::Sanitized => "planr.plan.sanitized",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_task(id: &str, minutes: f64) -> Task {
        Task::new(id).with_duration(minutes)
    }

    #[test]
    fn test_phase_admit_tracks_duration() {
        let mut phase = Phase::new();
        phase.admit(make_task("a", 30.0));
        assert_eq!(phase.duration, 30.0);
        phase.admit(make_task("b", 90.0));
        assert_eq!(phase.duration, 90.0);
        phase.admit(make_task("c", 10.0));
        // Slowest member wins
        assert_eq!(phase.duration, 90.0);
        assert_eq!(phase.len(), 3);
    }

    #[test]
    fn test_phase_admit_accumulates_resources() {
        let mut phase = Phase::new();
        phase.admit(make_task("a", 10.0).with_resource("gpu").with_resource_requirement(0.5));
        phase.admit(make_task("b", 10.0).with_resource("gpu").with_resource_requirement(0.25));
        phase.admit(make_task("c", 10.0).with_resource("db"));
        assert_eq!(phase.resources["gpu"], 0.75);
        assert_eq!(phase.resources["db"], 1.0);
    }

    #[test]
    fn test_phase_contains() {
        let mut phase = Phase::new();
        phase.admit(make_task("a", 10.0));
        assert!(phase.contains("a"));
        assert!(!phase.contains("b"));
    }

    #[test]
    fn test_phase_shares_resources_with() {
        let mut phase = Phase::new();
        phase.admit(make_task("a", 10.0).with_resource("db"));
        assert!(phase.shares_resources_with(&make_task("x", 5.0).with_resource("db")));
        assert!(!phase.shares_resources_with(&make_task("y", 5.0).with_resource("gpu")));
    }

    #[test]
    fn test_plan_counts_and_lookup() {
        let mut first = Phase::new();
        first.admit(make_task("a", 10.0));
        first.admit(make_task("b", 10.0));
        let mut second = Phase::new();
        second.admit(make_task("c", 10.0));

        let plan = Plan {
            phases: vec![first, second],
            ..Plan::empty()
        };
        assert_eq!(plan.phase_count(), 2);
        assert_eq!(plan.task_count(), 3);
        assert_eq!(plan.phase_of("a"), Some(0));
        assert_eq!(plan.phase_of("c"), Some(1));
        assert_eq!(plan.phase_of("missing"), None);
    }

    #[test]
    fn test_response_planned() {
        let response = PlanResponse::planned(Plan::empty(), 3);
        assert_eq!(response.action, PlanAction::Planned);
        assert!(!response.cached);
        assert_eq!(response.original_task_count, 3);
        assert!(response.sanitized_tasks.is_none());
        assert_eq!(response.message_id(), "planr.plan.created");
    }

    #[test]
    fn test_response_sanitized() {
        let tasks = vec![make_task("a", 10.0)];
        let response = PlanResponse::sanitized(Plan::empty(), tasks.clone(), 150);
        assert_eq!(response.action, PlanAction::Sanitized);
        assert_eq!(response.original_task_count, 150);
        assert_eq!(response.sanitized_tasks, Some(tasks));
        assert_eq!(response.message_id(), "planr.plan.sanitized");
    }

    #[test]
    fn test_response_from_cache_and_region() {
        let response = PlanResponse::planned(Plan::empty(), 1)
            .from_cache()
            .with_region("local");
        assert!(response.cached);
        assert_eq!(response.region.as_deref(), Some("local"));
    }

    #[test]
    fn test_plan_serialization_roundtrip() {
        let mut phase = Phase::new();
        phase.admit(make_task("a", 30.0).with_resource("db"));
        let plan = Plan {
            phases: vec![phase],
            total_duration: 30.0,
            resource_utilization: HashMap::from([("db".to_string(), 1.0)]),
            parallelism: 1.0,
            efficiency: 1.0,
        };
        let json = serde_json::to_string(&plan).unwrap();
        let restored: Plan = serde_json::from_str(&json).unwrap();
        assert_eq!(plan, restored);
    }
}
