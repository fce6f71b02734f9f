//! The planning pipeline.
//!
//! Stages run in order, all on per-call state:
//! 1. **scoring**: amplitude/probability ranking weights per task
//! 2. **conflict**: O(n²) pairwise relationship analysis
//! 3. **phases**: greedy concurrency-bounded phase construction
//! 4. **metrics**: derived plan-quality indicators

pub mod conflict;
pub mod metrics;
pub mod phases;
pub mod scoring;

pub use conflict::{Conflict, ConflictAnalyzer, ConflictKind};
pub use scoring::{ExecutionVariant, TaskState};
