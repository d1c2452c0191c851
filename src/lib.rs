//! Run a scoring task concurrently on a fixed number of worker threads.
//!
//! In entangled mode all workers of a run share one lock-free register
//! holding the lowest score published so far; otherwise every worker runs in
//! isolation. See [`pool`] for the moving parts and [`tasks`] for the
//! built-in tasks used by the command-line tool.

pub mod error;
pub mod pool;
pub mod tasks;

pub use error::{PoolError, TaskError};
pub use pool::{
    PoolConfig, PoolCoordinator, PoolTask, RunResult, WorkerContext, is_entangled, run,
    run_with_config, set_entangled,
};
pub use tasks::BuiltinTask;
