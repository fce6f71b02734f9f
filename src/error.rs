//! Error types for planr
//!
//! Centralized error handling using thiserror. Every variant carries a
//! stable message identifier so the presentation layer can localize
//! without the core ever hardcoding display text.

use thiserror::Error;

/// All error types that can occur while planning
#[derive(Debug, Error)]
pub enum PlanrError {
    /// A task is outside the accepted input range (duration, priority)
    #[error("Invalid task '{id}': {reason}")]
    InvalidTask {
        /// Offending task id
        id: String,
        /// What was out of range
        reason: String,
    },

    /// Input validation failed with no graceful degradation available
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// The principal is not allowed to request planning
    #[error("Permission denied for '{principal}' on '{action}'")]
    PermissionDenied {
        /// Cache-key form of the principal (`userId:role` or `anonymous`)
        principal: String,
        /// Action that was gated
        action: String,
    },

    /// Phase construction stalled with tasks still unassigned
    /// (typically a dependency cycle)
    #[error("Unsatisfiable plan: tasks {unassigned:?} could not be phased")]
    UnsatisfiablePlan {
        /// Ids of the tasks no pass could admit
        unassigned: Vec<String>,
    },

    /// An external collaborator call failed
    #[error("Collaborator '{collaborator}' failed: {message}")]
    Collaborator {
        /// Which seam failed (validator, security, router, ...)
        collaborator: String,
        /// Collaborator-reported detail
        message: String,
    },

    /// The call was cancelled or its deadline elapsed; no partial plan exists
    #[error("Planning cancelled: {0}")]
    Cancelled(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PlanrError {
    /// Stable identifier for the presentation layer.
    ///
    /// Localization happens outside the core (see `collab::localize`); the
    /// identifiers here are the contract.
    pub fn message_id(&self) -> &'static str {
        match self {
            PlanrError::InvalidTask { .. } => "planr.error.invalid_task",
            PlanrError::ValidationFailed(_) => "planr.error.validation_failed",
            PlanrError::PermissionDenied { .. } => "planr.error.permission_denied",
            PlanrError::UnsatisfiablePlan { .. } => "planr.error.unsatisfiable_plan",
            PlanrError::Collaborator { .. } => "planr.error.collaborator_failure",
            PlanrError::Cancelled(_) => "planr.error.cancelled",
            PlanrError::Json(_) => "planr.error.json",
        }
    }
}

/// Result type alias for planr operations
pub type Result<T> = std::result::Result<T, PlanrError>;
