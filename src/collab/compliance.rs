//! Compliance audit seam.
//!
//! Fire-and-forget: the planner records one activity per call when a
//! principal is present, logs failures, and never lets them affect the
//! planning outcome.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Audit description of one planning call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcessingActivity {
    /// Cache-key form of the principal
    pub principal: String,
    /// Gated action, e.g. `plan.create`
    pub action: String,
    /// Submitted task count
    pub task_count: usize,
    /// Epoch ms at submission
    pub timestamp: i64,
}

/// Trait for audit-trail recorders.
#[async_trait]
pub trait ComplianceManager: Send + Sync {
    /// Record an activity, returning its record id.
    async fn record_activity(&self, activity: ProcessingActivity) -> Result<String>;
}

/// Discards activities; the standalone default.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCompliance;

#[async_trait]
impl ComplianceManager for NoopCompliance {
    async fn record_activity(&self, _activity: ProcessingActivity) -> Result<String> {
        Ok("noop".to_string())
    }
}
