//! Error types for pool runs.

use thiserror::Error;

/// Error type returned by a task.
///
/// Task closures may return any error that converts into this box.
pub type TaskError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that fail a whole pool run.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum PoolError {
    /// A run was requested with zero workers.
    #[error("worker count must be at least 1")]
    InvalidWorkerCount,

    /// The score scale factor is not a finite positive number.
    #[error("invalid score scale {0}: must be finite and positive")]
    InvalidScale(f64),

    /// Worker thread names cannot contain NUL bytes.
    #[error("invalid thread name prefix {0:?}")]
    InvalidThreadName(String),

    /// The OS refused to create a worker thread.
    #[error("failed to spawn worker {worker_id}: {source}")]
    SpawnFailed {
        /// Worker whose thread could not be created.
        worker_id: usize,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// A task returned an error.
    #[error("worker {worker_id} failed: {source}")]
    TaskFailed {
        /// Worker that ran the failing task.
        worker_id: usize,
        /// The error exactly as the task returned it.
        #[source]
        source: TaskError,
    },

    /// A task panicked.
    #[error("worker {worker_id} panicked: {message}")]
    TaskPanicked {
        /// Worker that ran the panicking task.
        worker_id: usize,
        /// Panic payload rendered as text.
        message: String,
    },

    /// Every worker hung up before all of them reported.
    #[error("workers disconnected after {received} of {expected} reports")]
    WorkerLost {
        /// Reports received before the channel closed.
        received: usize,
        /// Reports the run was waiting for.
        expected: usize,
    },
}

impl PoolError {
    /// The worker this error originated from, if any.
    pub fn worker_id(&self) -> Option<usize> {
        match self {
            PoolError::SpawnFailed { worker_id, .. }
            | PoolError::TaskFailed { worker_id, .. }
            | PoolError::TaskPanicked { worker_id, .. } => Some(*worker_id),
            _ => None,
        }
    }

    /// Whether the run failed because a task errored or panicked.
    pub fn is_task_failure(&self) -> bool {
        matches!(
            self,
            PoolError::TaskFailed { .. } | PoolError::TaskPanicked { .. }
        )
    }
}
