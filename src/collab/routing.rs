//! Regional routing seam.
//!
//! The router picks an execution context before the pipeline runs; the
//! pipeline then executes locally inside that decision. The selected
//! region rides on the response envelope so callers can see where their
//! plan was produced.

use async_trait::async_trait;

use crate::error::Result;

/// What the router sees about a request before the pipeline runs.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    /// Cache-key form of the principal
    pub principal: String,
    /// Submitted task count
    pub task_count: usize,
}

/// The router's selected execution context.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteDecision {
    /// Region identifier
    pub region: String,
    /// Routing overhead in ms, as measured by the router
    pub latency_ms: u64,
}

/// Trait for pre-pipeline request routing.
#[async_trait]
pub trait RegionRouter: Send + Sync {
    /// Select an execution context for the request.
    async fn route(&self, request: &RouteRequest) -> Result<RouteDecision>;
}

/// Single-region default: everything runs where it was called.
#[derive(Debug, Clone, Default)]
pub struct LocalRouter {
    region: Option<String>,
}

impl LocalRouter {
    /// Create a router reporting the `local` region.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the reported region name.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }
}

#[async_trait]
impl RegionRouter for LocalRouter {
    async fn route(&self, _request: &RouteRequest) -> Result<RouteDecision> {
        Ok(RouteDecision {
            region: self.region.clone().unwrap_or_else(|| "local".to_string()),
            latency_ms: 0,
        })
    }
}
