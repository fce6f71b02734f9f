//! Per-call cancellation
//!
//! The pairwise analysis and phase construction stages are pure CPU work
//! with no await points, so cancellation is cooperative: a shared flag plus
//! an optional deadline, checked at loop checkpoints. On cancellation the
//! call fails cleanly and no partial plan escapes.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::error::{PlanrError, Result};

/// Cooperative cancellation handle for one planning call.
///
/// Clones share the flag: cancelling any clone cancels the call.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    /// Create a token that never fires unless cancelled explicitly.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a token that fires once `timeout` has elapsed.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            deadline: Some(Instant::now() + timeout),
        }
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether the flag is set or the deadline has elapsed.
    pub fn is_cancelled(&self) -> bool {
        if self.flag.load(Ordering::Relaxed) {
            return true;
        }
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Fail with `Cancelled` when the call should stop.
    ///
    /// Pipeline loops call this periodically; the planner calls it between
    /// stages.
    pub fn checkpoint(&self) -> Result<()> {
        if self.flag.load(Ordering::Relaxed) {
            return Err(PlanrError::Cancelled("cancelled by caller".to_string()));
        }
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Err(PlanrError::Cancelled("deadline elapsed".to_string()));
        }
        Ok(())
    }
}
