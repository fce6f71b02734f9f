//! End-to-end planning integration tests
//!
//! Exercises the full pipeline through the public `Planner` surface:
//! scoring, conflict analysis, phase construction, metrics, the result
//! cache, the ledger, and the collaborator seams.

use std::sync::Arc;

use planr::Planner;
use planr::cancel::CancelToken;
use planr::collab::DefaultValidator;
use planr::config::{CacheConfig, ConflictConfig, LedgerConfig, PlannerConfig};
use planr::domain::{Constraints, PlanAction, Principal, Task};
use planr::error::PlanrError;

fn pipeline_batch() -> Vec<Task> {
    vec![
        Task::new("fetch").with_priority(0.9).with_duration(10.0),
        Task::new("parse").with_priority(0.8).with_duration(20.0).with_dependency("fetch"),
        Task::new("index").with_priority(0.6).with_duration(40.0).with_dependency("parse").with_resource("disk"),
        Task::new("report").with_priority(0.4).with_duration(15.0).with_dependency("parse"),
        Task::new("archive").with_priority(0.3).with_duration(25.0).with_resource("disk"),
    ]
}

/// Integration test: dependency ordering holds across the whole batch
#[tokio::test]
async fn test_dependencies_run_in_earlier_phases() {
    let planner = Planner::new();
    let response = planner
        .plan(pipeline_batch(), Constraints::default(), None)
        .await
        .unwrap();
    let plan = &response.plan;

    for task in pipeline_batch() {
        let phase = plan.phase_of(&task.id).expect("every task is phased");
        for dep in &task.dependencies {
            let dep_phase = plan.phase_of(dep).expect("dependency is phased");
            assert!(
                dep_phase < phase,
                "{dep} (phase {dep_phase}) must precede {} (phase {phase})",
                task.id
            );
        }
    }
}

/// Integration test: no phase exceeds the concurrency bound, and
/// resource-sharing tasks without a dependency never share a phase
#[tokio::test]
async fn test_concurrency_and_resource_exclusivity() {
    let planner = Planner::new();
    let constraints = Constraints::new().with_max_concurrency(2);
    let response = planner.plan(pipeline_batch(), constraints, None).await.unwrap();
    let plan = &response.plan;

    assert!(plan.phases.iter().all(|p| p.len() <= 2));

    // index and archive both hold "disk" with no dependency between them
    assert_ne!(plan.phase_of("index"), plan.phase_of("archive"));
    assert_eq!(plan.task_count(), 5);
}

/// Integration test: a high-priority task with a dependent follower
#[tokio::test]
async fn test_two_task_scenario_shape() {
    let planner = Planner::new();
    let tasks = vec![
        Task::new("A").with_priority(0.9).with_duration(30.0),
        Task::new("B").with_priority(0.5).with_duration(60.0).with_dependency("A"),
    ];
    let response = planner
        .plan(tasks, Constraints::new().with_max_concurrency(2), None)
        .await
        .unwrap();

    let plan = &response.plan;
    assert_eq!(plan.phase_count(), 2);
    assert_eq!(plan.phases[0].tasks.len(), 1);
    assert_eq!(plan.phases[0].tasks[0].id, "A");
    assert_eq!(plan.phases[1].tasks[0].id, "B");
    assert!((plan.total_duration - 90.0).abs() < 1e-9);
}

/// Integration test: repeated identical calls hit the cache with
/// identical plan content and zero re-analysis
#[tokio::test]
async fn test_cache_round_trip() {
    let planner = Planner::new();
    let principal = Principal::new("ops", "admin");

    let first = planner
        .plan(pipeline_batch(), Constraints::default(), Some(principal.clone()))
        .await
        .unwrap();
    let second = planner
        .plan(pipeline_batch(), Constraints::default(), Some(principal))
        .await
        .unwrap();

    assert!(!first.cached);
    assert!(second.cached);
    assert_eq!(first.plan, second.plan);
    assert_eq!(planner.analysis_runs(), 1);

    // Both calls hit the ledger, the second flagged cached
    let recent = planner.ledger().recent(2);
    assert_eq!(recent.len(), 2);
    assert!(!recent[0].cached);
    assert!(recent[1].cached);
}

/// Integration test: 150 tasks against a 100-task validator limit takes
/// the sanitized path
#[tokio::test]
async fn test_batch_limit_sanitized_path() {
    let planner = Planner::new().with_validator(Arc::new(DefaultValidator::new().with_max_batch_size(100)));
    let tasks: Vec<Task> = (0..150).map(|i| Task::new(format!("t{i:03}"))).collect();
    let response = planner.plan(tasks, Constraints::default(), None).await.unwrap();

    assert_eq!(response.action, PlanAction::Sanitized);
    assert_eq!(response.original_task_count, 150);
    assert_eq!(response.sanitized_tasks.as_ref().unwrap().len(), 100);
    assert_eq!(response.plan.phase_count(), 100);
    assert!((response.plan.efficiency - 0.7).abs() < 1e-9);
    assert_eq!(response.message_id(), "planr.plan.sanitized");
}

/// Integration test: a dependency cycle fails with UnsatisfiablePlan and
/// drops nothing silently
#[tokio::test]
async fn test_cycle_fails_explicitly() {
    let planner = Planner::new();
    let tasks = vec![
        Task::new("A").with_dependency("B"),
        Task::new("B").with_dependency("A"),
        Task::new("C"),
    ];
    let err = planner.plan(tasks, Constraints::default(), None).await.unwrap_err();

    match err {
        PlanrError::UnsatisfiablePlan { unassigned } => {
            assert!(unassigned.contains(&"A".to_string()));
            assert!(unassigned.contains(&"B".to_string()));
            assert!(!unassigned.contains(&"C".to_string()));
        }
        other => panic!("expected UnsatisfiablePlan, got {other:?}"),
    }
}

/// Integration test: metric indices stay in range over varied batches
#[tokio::test]
async fn test_metric_ranges() {
    let planner = Planner::new();
    for concurrency in [1, 2, 4, 8] {
        let constraints = Constraints::new().with_max_concurrency(concurrency);
        let response = planner.plan(pipeline_batch(), constraints, None).await.unwrap();
        let plan = &response.plan;
        assert!((0.0..=1.0).contains(&plan.parallelism), "parallelism at {concurrency}");
        assert!((0.0..=1.0).contains(&plan.efficiency), "efficiency at {concurrency}");
        assert!(plan.total_duration.is_finite());
        assert!(plan.resource_utilization.values().all(|v| v.is_finite()));
    }
}

/// Integration test: a cancelled call fails cleanly with no ledger entry
#[tokio::test]
async fn test_cancellation_is_clean() {
    let planner = Planner::new();
    let token = CancelToken::new();
    token.cancel();

    let err = planner
        .plan_with_token(pipeline_batch(), Constraints::default(), None, token)
        .await
        .unwrap_err();
    assert!(matches!(err, PlanrError::Cancelled(_)));
    assert!(planner.ledger().is_empty());
}

/// Integration test: custom configuration threads through the pipeline
#[tokio::test]
async fn test_custom_config() {
    let config = PlannerConfig::new()
        .with_conflict(ConflictConfig::default().with_threshold(0.3))
        .with_cache(CacheConfig::default().with_ttl_ms(0))
        .with_ledger(LedgerConfig::default().with_capacity(2));
    let planner = Planner::with_config(config);

    // TTL 0: every call recomputes
    planner.plan(pipeline_batch(), Constraints::default(), None).await.unwrap();
    planner.plan(pipeline_batch(), Constraints::default(), None).await.unwrap();
    assert_eq!(planner.analysis_runs(), 2);

    // Ledger capacity 2 retains only the last two of three calls
    planner.plan(pipeline_batch(), Constraints::default(), None).await.unwrap();
    assert_eq!(planner.ledger().len(), 2);
}

/// Integration test: response envelope serializes for transport
#[tokio::test]
async fn test_response_serialization_roundtrip() {
    let planner = Planner::new();
    let response = planner
        .plan(pipeline_batch(), Constraints::default(), None)
        .await
        .unwrap();

    let json = serde_json::to_string(&response).unwrap();
    let restored: planr::domain::PlanResponse = serde_json::from_str(&json).unwrap();
    assert_eq!(response, restored);
    assert_eq!(restored.message_id(), "planr.plan.created");
}
