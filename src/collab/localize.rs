//! Localization seam.
//!
//! The core never hardcodes human-readable output: responses and errors
//! expose stable message identifiers (`PlanResponse::message_id`,
//! `PlanrError::message_id`) and the presentation layer renders them.
//! Identifier catalog:
//!
//! - `planr.plan.created`, `planr.plan.sanitized`
//! - `planr.error.invalid_task`, `planr.error.validation_failed`,
//!   `planr.error.permission_denied`, `planr.error.unsatisfiable_plan`,
//!   `planr.error.collaborator_failure`, `planr.error.cancelled`,
//!   `planr.error.json`

use std::collections::HashMap;

/// Trait for rendering message identifiers into display text.
pub trait Localizer: Send + Sync {
    /// Render a message identifier for the presentation locale.
    fn localize(&self, message_id: &str) -> String;
}

/// Identity rendering: the identifier is the message. The standalone
/// default, and the right choice for machine consumers.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityLocalizer;

impl Localizer for IdentityLocalizer {
    fn localize(&self, message_id: &str) -> String {
        message_id.to_string()
    }
}

/// Table-backed localizer for embedding a fixed catalog. Unknown
/// identifiers fall back to identity.
#[derive(Debug, Clone, Default)]
pub struct TableLocalizer {
    messages: HashMap<String, String>,
}

impl TableLocalizer {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rendering for one identifier.
    pub fn with_message(mut self, message_id: impl Into<String>, text: impl Into<String>) -> Self {
        self.messages.insert(message_id.into(), text.into());
        self
    }
}

impl Localizer for TableLocalizer {
    fn localize(&self, message_id: &str) -> String {
        self.messages
            .get(message_id)
            .cloned()
            .unwrap_or_else(|| message_id.to_string())
    }
}
