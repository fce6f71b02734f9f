//! Permission gate seam.
//!
//! Checked before any computation; a denied principal never reaches the
//! validator, the cache, or the pipeline.

use async_trait::async_trait;

use crate::domain::Principal;
use crate::error::Result;

/// The action gated on every planning call.
pub const ACTION_PLAN: &str = "plan.create";

/// Trait for permission checks on planning actions.
#[async_trait]
pub trait SecurityManager: Send + Sync {
    /// Whether `principal` may perform `action`. `false` aborts the call
    /// with `PermissionDenied` before any computation.
    async fn check_permission(&self, principal: Option<&Principal>, action: &str) -> Result<bool>;
}

/// Permits everything; the standalone default.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAllSecurity;

#[async_trait]
impl SecurityManager for AllowAllSecurity {
    async fn check_permission(&self, _principal: Option<&Principal>, _action: &str) -> Result<bool> {
        Ok(true)
    }
}

/// Role-allowlist security for callers that want a real gate without a
/// full policy engine. Anonymous calls are denied.
#[derive(Debug, Clone, Default)]
pub struct RoleAllowlistSecurity {
    allowed_roles: Vec<String>,
}

impl RoleAllowlistSecurity {
    /// Create an empty allowlist (denies everyone).
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow a role.
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.allowed_roles.push(role.into());
        self
    }
}

#[async_trait]
impl SecurityManager for RoleAllowlistSecurity {
    async fn check_permission(&self, principal: Option<&Principal>, _action: &str) -> Result<bool> {
        Ok(principal.is_some_and(|p| self.allowed_roles.iter().any(|r| r == &p.role)))
    }
}
