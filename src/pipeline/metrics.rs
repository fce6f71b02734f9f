//! Plan quality metrics.
//!
//! Derives the plan-level indicators from constructed phases:
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Total duration | Sum of phase durations (phases run sequentially) |
//! | Resource utilization | Peak per-resource allocation across phases |
//! | Parallelism | `min(task_count / phase_count, 1.0)`, saturating |
//! | Efficiency | `min(total task work / total_duration, 1.0)` |
//!
//! Every derivation is guarded: no division by zero, no NaN or infinity
//! ever reaches a `Plan`.

use std::collections::HashMap;

use crate::domain::{Phase, Plan, Task};

/// Efficiency pinned on the degraded batch-size path.
pub const DEGRADED_EFFICIENCY: f64 = 0.7;

/// Assemble a `Plan` from constructed phases, deriving all metrics.
pub fn finalize(phases: Vec<Phase>) -> Plan {
    let total_duration: f64 = phases.iter().map(|p| p.duration).sum();

    let mut resource_utilization: HashMap<String, f64> = HashMap::new();
    for phase in &phases {
        for (tag, allocation) in &phase.resources {
            let peak = resource_utilization.entry(tag.clone()).or_insert(0.0);
            if *allocation > *peak {
                *peak = *allocation;
            }
        }
    }

    let task_count: usize = phases.iter().map(Phase::len).sum();
    let parallelism = if phases.is_empty() {
        0.0
    } else {
        (task_count as f64 / phases.len() as f64).min(1.0)
    };

    let total_work: f64 = phases
        .iter()
        .flat_map(|p| p.tasks.iter())
        .map(|t| t.estimated_duration)
        .sum();
    let efficiency = if total_duration > 0.0 {
        (total_work / total_duration).min(1.0)
    } else {
        0.0
    };

    Plan {
        phases,
        total_duration,
        resource_utilization,
        parallelism: sanitize_index(parallelism),
        efficiency: sanitize_index(efficiency),
    }
}

/// Degraded one-task-per-phase plan for the sanitized batch-size path.
/// Efficiency is pinned to the degraded-path constant.
pub fn sequential(tasks: &[Task]) -> Plan {
    let phases = tasks
        .iter()
        .map(|task| {
            let mut phase = Phase::new();
            phase.admit(task.clone());
            phase
        })
        .collect();
    let mut plan = finalize(phases);
    plan.efficiency = DEGRADED_EFFICIENCY;
    plan
}

/// Clamp a derived index into 0..=1, mapping non-finite values to 0.
fn sanitize_index(value: f64) -> f64 {
    if value.is_finite() { value.clamp(0.0, 1.0) } else { 0.0 }
}
