//! Error recovery seam.
//!
//! Invoked exactly once when the pipeline or any collaborator fails. A
//! handler may produce a fallback response; if it fails too, the planner
//! propagates the ORIGINAL error unchanged, preserving its identity for
//! the caller.

use async_trait::async_trait;

use crate::domain::PlanResponse;
use crate::error::{PlanrError, Result};

/// What the handler knows about the failed call.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorContext {
    /// Cache-key form of the principal
    pub principal: String,
    /// Submitted task count
    pub task_count: usize,
}

/// Trait for failure recovery.
#[async_trait]
pub trait ErrorHandler: Send + Sync {
    /// Attempt to produce a fallback response for a failed call.
    /// `Err` means no recovery; the original error then propagates.
    async fn handle(&self, error: &PlanrError, context: &ErrorContext) -> Result<PlanResponse>;
}

/// Never recovers; the standalone default.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRecovery;

#[async_trait]
impl ErrorHandler for NoRecovery {
    async fn handle(&self, _error: &PlanrError, _context: &ErrorContext) -> Result<PlanResponse> {
        Err(PlanrError::Collaborator {
            collaborator: "error_handler".to_string(),
            message: "no recovery configured".to_string(),
        })
    }
}
