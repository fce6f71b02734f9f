//! planr - phased execution planning for task orchestration
//!
//! Turns a batch of prioritized, dependent, resource-tagged tasks into an
//! ordered sequence of concurrency-bounded phases with derived duration,
//! utilization, and efficiency metrics. Produces a plan; never executes
//! one. The single entry point is [`Planner::plan`].
//!
//! ```no_run
//! use planr::domain::{Constraints, Task};
//! use planr::Planner;
//!
//! # async fn example() -> planr::Result<()> {
//! let planner = Planner::new();
//! let tasks = vec![
//!     Task::new("build").with_priority(0.9).with_duration(30.0),
//!     Task::new("deploy").with_dependency("build").with_resource("cluster"),
//! ];
//! let response = planner.plan(tasks, Constraints::default(), None).await?;
//! println!("{} phases", response.plan.phase_count());
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod cancel;
pub mod collab;
pub mod config;
pub mod domain;
pub mod error;
pub mod ledger;
pub mod pipeline;
pub mod planner;

pub use error::{PlanrError, Result};
pub use planner::Planner;
