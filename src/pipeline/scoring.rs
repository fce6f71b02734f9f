//! Priority scoring.
//!
//! Converts each task into a scalar ranking weight and a diagnostic angle.
//! The vocabulary ("amplitude", "phase", "probability") is inherited from
//! the upstream system; the math is plain floating point:
//!
//! - `complexity = 1 - duration / 1440`, floored at 0
//! - `amplitude = sqrt(priority * complexity * resource_availability)`
//! - `probability = amplitude²` is the ranking key
//! - `phase = (index * π / total + priority * π) mod 2π`, diagnostic only

use std::f64::consts::PI;

use crate::config::{DurationPolicy, ScoringConfig};
use crate::domain::{Constraints, Task};
use crate::error::{PlanrError, Result};

/// Complexity normalization window: one day of minutes.
pub const COMPLEXITY_WINDOW_MINUTES: f64 = 1440.0;

/// Variant execution time decays by `exp(-0.1 * i)`, floored at half base.
const VARIANT_TIME_DECAY: f64 = 0.1;
/// Variant selection probability decays by `exp(-0.5 * i)`.
const VARIANT_PROBABILITY_DECAY: f64 = 0.5;
/// Variant resource allocation grows 20% per step.
const VARIANT_ALLOCATION_STEP: f64 = 0.2;
/// Variant resource allocation cap.
const VARIANT_ALLOCATION_CAP: f64 = 2.0;

/// Per-task scoring record, produced fresh for each planning call and
/// never shared across calls.
#[derive(Debug, Clone)]
pub struct TaskState {
    /// The scored task
    pub task: Task,
    /// Ranking weight, sqrt of the clamped priority product
    pub amplitude: f64,
    /// Diagnostic angle in radians; not consumed downstream
    pub phase: f64,
    /// `amplitude²`, the ranking key
    pub probability: f64,
    /// Reserved alternative-execution candidates, width = `max_states`
    pub variants: Vec<ExecutionVariant>,
}

/// A candidate execution profile for one task.
///
/// Reserved extension point for alternative-execution selection; the base
/// plan does not consume these.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionVariant {
    /// Projected duration in minutes
    pub execution_time: f64,
    /// Projected allocation weight
    pub resource_allocation: f64,
    /// Selection weight for this variant
    pub probability: f64,
}

/// Score one task. `index` and `total_tasks` position the diagnostic angle.
pub fn score(
    task: &Task,
    constraints: &Constraints,
    config: &ScoringConfig,
    index: usize,
    total_tasks: usize,
) -> Result<TaskState> {
    if config.duration_policy == DurationPolicy::Reject
        && task.estimated_duration > config.duration_ceiling_minutes
    {
        return Err(PlanrError::InvalidTask {
            id: task.id.clone(),
            reason: format!(
                "estimated duration {} exceeds ceiling {}",
                task.estimated_duration, config.duration_ceiling_minutes
            ),
        });
    }

    // Floor at zero so over-long durations clamp instead of driving the
    // product negative (and the sqrt to NaN).
    let complexity = (1.0 - task.estimated_duration / COMPLEXITY_WINDOW_MINUTES).max(0.0);
    let product = (task.priority * complexity * constraints.resource_availability).max(0.0);
    let amplitude = product.sqrt();
    let probability = amplitude * amplitude;

    let total = total_tasks.max(1) as f64;
    let phase = (index as f64 * PI / total + task.priority * PI) % (2.0 * PI);

    Ok(TaskState {
        task: task.clone(),
        amplitude,
        phase,
        probability,
        variants: execution_variants(task, constraints.max_states),
    })
}

/// Score a whole batch in input order.
pub fn score_all(tasks: &[Task], constraints: &Constraints, config: &ScoringConfig) -> Result<Vec<TaskState>> {
    let total = tasks.len();
    tasks
        .iter()
        .enumerate()
        .map(|(index, task)| score(task, constraints, config, index, total))
        .collect()
}

fn execution_variants(task: &Task, max_states: usize) -> Vec<ExecutionVariant> {
    let base = task.estimated_duration;
    (0..max_states)
        .map(|i| {
            let step = i as f64;
            ExecutionVariant {
                execution_time: (base * (-VARIANT_TIME_DECAY * step).exp()).max(0.5 * base),
                resource_allocation: (task.resource_requirement * (1.0 + VARIANT_ALLOCATION_STEP * step))
                    .min(VARIANT_ALLOCATION_CAP),
                probability: (-VARIANT_PROBABILITY_DECAY * step).exp(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn default_scoring() -> ScoringConfig {
        ScoringConfig::default()
    }

    #[test]
    fn test_score_default_task() {
        let task = Task::new("a");
        let state = score(&task, &Constraints::default(), &default_scoring(), 0, 1).unwrap();

        // complexity = 1 - 60/1440 = 0.958333..., product = 0.5 * complexity
        let expected_probability = 0.5 * (1.0 - 60.0 / 1440.0);
        assert!((state.probability - expected_probability).abs() < EPSILON);
        assert!((state.amplitude - expected_probability.sqrt()).abs() < EPSILON);
        assert!((state.amplitude * state.amplitude - state.probability).abs() < EPSILON);
    }

    #[test]
    fn test_score_overlong_duration_clamps_to_zero() {
        let task = Task::new("huge").with_duration(2000.0);
        let state = score(&task, &Constraints::default(), &default_scoring(), 0, 1).unwrap();
        assert_eq!(state.amplitude, 0.0);
        assert_eq!(state.probability, 0.0);
        assert!(state.amplitude.is_finite());
    }

    #[test]
    fn test_score_reject_policy() {
        let config = ScoringConfig::default().with_policy(DurationPolicy::Reject);
        let task = Task::new("huge").with_duration(2000.0);
        let err = score(&task, &Constraints::default(), &config, 0, 1).unwrap_err();
        assert!(matches!(err, PlanrError::InvalidTask { .. }));
        assert!(err.to_string().contains("huge"));
    }

    #[test]
    fn test_score_reject_policy_accepts_under_ceiling() {
        let config = ScoringConfig::default().with_policy(DurationPolicy::Reject);
        let task = Task::new("ok").with_duration(1440.0);
        assert!(score(&task, &Constraints::default(), &config, 0, 1).is_ok());
    }

    #[test]
    fn test_score_availability_scales_probability() {
        let task = Task::new("a").with_priority(1.0).with_duration(0.0);
        let half = Constraints::default().with_resource_availability(0.5);
        let state = score(&task, &half, &default_scoring(), 0, 1).unwrap();
        assert!((state.probability - 0.5).abs() < EPSILON);
    }

    #[test]
    fn test_score_negative_availability_clamps() {
        let task = Task::new("a");
        let constraints = Constraints::default().with_resource_availability(-1.0);
        let state = score(&task, &constraints, &default_scoring(), 0, 1).unwrap();
        assert_eq!(state.amplitude, 0.0);
        assert!(state.probability.is_finite());
    }

    #[test]
    fn test_phase_angle_positions() {
        let task = Task::new("a").with_priority(0.5);
        let state = score(&task, &Constraints::default(), &default_scoring(), 2, 8).unwrap();
        let expected = (2.0 * PI / 8.0 + 0.5 * PI) % (2.0 * PI);
        assert!((state.phase - expected).abs() < EPSILON);
        assert!(state.phase >= 0.0);
        assert!(state.phase < 2.0 * PI);
    }

    #[test]
    fn test_phase_angle_zero_total_does_not_divide_by_zero() {
        let task = Task::new("a");
        let state = score(&task, &Constraints::default(), &default_scoring(), 0, 0).unwrap();
        assert!(state.phase.is_finite());
    }

    #[test]
    fn test_execution_variants_width() {
        let task = Task::new("a");
        let constraints = Constraints::default().with_max_states(5);
        let state = score(&task, &constraints, &default_scoring(), 0, 1).unwrap();
        assert_eq!(state.variants.len(), 5);
    }

    #[test]
    fn test_execution_variant_time_floor() {
        let task = Task::new("a").with_duration(100.0);
        let constraints = Constraints::default().with_max_states(12);
        let state = score(&task, &constraints, &default_scoring(), 0, 1).unwrap();

        // exp(-0.1 * i) dips below 0.5 at i >= 7; the floor holds there
        assert!((state.variants[7].execution_time - 50.0).abs() < EPSILON);
        assert!((state.variants[11].execution_time - 50.0).abs() < EPSILON);
        // Early variants decay freely
        assert!((state.variants[1].execution_time - 100.0 * (-0.1f64).exp()).abs() < EPSILON);
    }

    #[test]
    fn test_execution_variant_allocation_cap() {
        let task = Task::new("a").with_resource_requirement(1.0);
        let constraints = Constraints::default().with_max_states(8);
        let state = score(&task, &constraints, &default_scoring(), 0, 1).unwrap();

        // 1.0 * (1 + 0.2 * i) crosses 2.0 at i >= 5
        assert!((state.variants[5].resource_allocation - 2.0).abs() < EPSILON);
        assert!((state.variants[7].resource_allocation - 2.0).abs() < EPSILON);
        assert!((state.variants[2].resource_allocation - 1.4).abs() < EPSILON);
    }

    #[test]
    fn test_execution_variant_probability_decay() {
        let task = Task::new("a");
        let state = score(&task, &Constraints::default(), &default_scoring(), 0, 1).unwrap();
        assert!((state.variants[0].probability - 1.0).abs() < EPSILON);
        assert!((state.variants[2].probability - (-1.0f64).exp()).abs() < EPSILON);
        assert!(state.variants[0].probability > state.variants[1].probability);
    }

    #[test]
    fn test_score_all_preserves_input_order() {
        let tasks = vec![Task::new("c"), Task::new("a"), Task::new("b")];
        let states = score_all(&tasks, &Constraints::default(), &default_scoring()).unwrap();
        let ids: Vec<&str> = states.iter().map(|s| s.task.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_score_all_propagates_rejection() {
        let config = ScoringConfig::default().with_policy(DurationPolicy::Reject);
        let tasks = vec![Task::new("ok"), Task::new("huge").with_duration(9999.0)];
        assert!(score_all(&tasks, &Constraints::default(), &config).is_err());
    }
}
