//! Collaborator seams consumed by the planner.
//!
//! Each seam is a trait owned by an out-of-scope subsystem, with a
//! standalone default so the planner works with no wiring:
//!
//! - `Validator` / `DefaultValidator`: input sanitization and the batch bound
//! - `SecurityManager` / `AllowAllSecurity`: pre-computation permission gate
//! - `ComplianceManager` / `NoopCompliance`: fire-and-forget audit hook
//! - `RegionRouter` / `LocalRouter`: execution-context selection
//! - `ErrorHandler` / `NoRecovery`: one-shot failure recovery
//! - `Localizer` / `IdentityLocalizer`: message-id rendering

pub mod compliance;
pub mod localize;
pub mod recovery;
pub mod routing;
pub mod security;
pub mod validator;

pub use compliance::{ComplianceManager, NoopCompliance, ProcessingActivity};
pub use localize::{IdentityLocalizer, Localizer, TableLocalizer};
pub use recovery::{ErrorContext, ErrorHandler, NoRecovery};
pub use routing::{LocalRouter, RegionRouter, RouteDecision, RouteRequest};
pub use security::{ACTION_PLAN, AllowAllSecurity, RoleAllowlistSecurity, SecurityManager};
pub use validator::{
    DefaultValidator, ValidationError, ValidationErrorKind, ValidationReport, Validator,
};
