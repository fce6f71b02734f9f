//! Greedy phase construction.
//!
//! Partitions the ranked task list into ordered phases. Each pass admits
//! unassigned tasks in rank order until the concurrency bound fills, then
//! the next pass opens a new phase. Admission requires dependency
//! completion in a strictly earlier phase, no blocking conflict with the
//! phase, and no direct resource overlap (the overlap check is an
//! independent safety net: conflict recording is threshold-gated and can
//! miss a real but sub-threshold overlap).
//!
//! A pass that admits nothing while tasks remain is an unsatisfiable plan
//! (dependency cycle or equivalent) and is reported, never truncated.

use std::collections::HashMap;

use crate::cancel::CancelToken;
use crate::domain::{Phase, Task};
use crate::error::{PlanrError, Result};
use crate::pipeline::conflict::Conflict;
use crate::pipeline::scoring::TaskState;

/// Order states by probability descending, breaking ties by task id so
/// equal-probability batches plan identically across calls.
pub fn rank(states: &mut [TaskState]) {
    states.sort_by(|a, b| {
        b.probability
            .partial_cmp(&a.probability)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.task.id.cmp(&b.task.id))
    });
}

/// Build phases from ranked states.
///
/// Terminates in at most `states.len()` passes: every kept pass admits at
/// least one task, and a pass that admits none either finishes the batch
/// or fails with `UnsatisfiablePlan` naming the stuck tasks.
pub fn build(
    states: &[TaskState],
    conflicts: &[Conflict],
    max_concurrency: usize,
    token: &CancelToken,
) -> Result<Vec<Phase>> {
    let max_concurrency = max_concurrency.max(1);
    let mut assigned: HashMap<&str, usize> = HashMap::new();
    let mut phases: Vec<Phase> = Vec::new();

    while assigned.len() < states.len() {
        token.checkpoint()?;
        let phase_index = phases.len();
        let mut phase = Phase::new();

        for state in states {
            if phase.len() >= max_concurrency {
                break;
            }
            if assigned.contains_key(state.task.id.as_str()) {
                continue;
            }
            if !deps_satisfied(&state.task, &assigned, phase_index) {
                continue;
            }
            if conflicts_with_phase(&state.task, &phase, conflicts) {
                continue;
            }
            if phase.shares_resources_with(&state.task) {
                continue;
            }
            assigned.insert(state.task.id.as_str(), phase_index);
            phase.admit(state.task.clone());
        }

        if phase.is_empty() {
            let unassigned: Vec<String> = states
                .iter()
                .filter(|s| !assigned.contains_key(s.task.id.as_str()))
                .map(|s| s.task.id.clone())
                .collect();
            tracing::warn!(stuck = unassigned.len(), "phase construction stalled");
            return Err(PlanrError::UnsatisfiablePlan { unassigned });
        }

        tracing::debug!(phase = phase_index, admitted = phase.len(), "phase constructed");
        phases.push(phase);
    }

    Ok(phases)
}

/// Every declared dependency assigned to a strictly earlier phase.
/// Dependencies admitted to the phase under construction do not count.
fn deps_satisfied(task: &Task, assigned: &HashMap<&str, usize>, current_phase: usize) -> bool {
    task.dependencies
        .iter()
        .all(|dep| assigned.get(dep.as_str()).is_some_and(|&p| p < current_phase))
}

/// A recorded Sequential or ResourceConflict against any admitted task.
fn conflicts_with_phase(task: &Task, phase: &Phase, conflicts: &[Conflict]) -> bool {
    phase.tasks.iter().any(|member| {
        conflicts
            .iter()
            .any(|c| c.kind.blocks_same_phase() && c.pairs(&task.id, &member.id))
    })
}
