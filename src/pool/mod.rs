//! Fixed-size worker pool with an optional shared best-score register.
//!
//! This module runs one task on each of N worker threads and collects the
//! results, with optional score sharing between workers.
//!
//! # Architecture
//!
//! The pool consists of:
//! - A **coordinator** that spawns workers and aggregates their reports
//! - Multiple **workers** that each run the task exactly once
//! - A **channel system** for terminal reports and the start gate
//! - A **shared register** holding the best score when the run is entangled
//!
//! # Example
//!
//! ```ignore
//! use entangled_pool::TaskError;
//! use entangled_pool::pool::{PoolConfig, WorkerContext, run_with_config};
//!
//! let config = PoolConfig::default()
//!     .with_workers(8)
//!     .with_entangled(true);
//!
//! let result = run_with_config(
//!     |ctx: &WorkerContext| -> Result<f64, TaskError> {
//!         let score = evaluate(ctx.seed());
//!         ctx.maybe_update_shared(score);
//!         Ok(score)
//!     },
//!     &config,
//! )?;
//! ```

pub mod channel;
pub mod config;
pub mod coordinator;
pub mod register;
pub mod result;
pub mod worker;

pub use config::{DEFAULT_WORKERS, PoolConfig, is_entangled, set_entangled};
pub use coordinator::{PoolCoordinator, run, run_with_config};
pub use register::{DEFAULT_SCALE, ScaledScore, SharedScoreRegister};
pub use result::{RunResult, RunStatistics, WorkerOutput};
pub use worker::{PoolTask, Publisher, WorkerContext};
