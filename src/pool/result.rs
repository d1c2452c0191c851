//! Run result types and statistics

use std::time::Duration;

/// Value reported by one worker.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerOutput<T> {
    /// Worker that produced the value (spawn index).
    pub worker_id: usize,
    /// Whatever the task returned.
    pub value: T,
    /// Time spent inside the task.
    pub elapsed: Duration,
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct RunResult<T> {
    /// One entry per worker, in the order completions were observed.
    pub outputs: Vec<WorkerOutput<T>>,
    /// Whether this run shared a register.
    pub entangled: bool,
    /// Register value after the run, if entangled and anything was published.
    pub final_best: Option<f64>,
    /// Statistics for the run
    pub statistics: RunStatistics,
}

impl<T> RunResult<T> {
    /// Number of worker outputs.
    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    /// Values in completion order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.outputs.iter().map(|o| &o.value)
    }

    /// Consume the result, keeping only the values in completion order.
    pub fn into_values(self) -> Vec<T> {
        self.outputs.into_iter().map(|o| o.value).collect()
    }

    /// Worker ids in the order they completed.
    pub fn completion_order(&self) -> Vec<usize> {
        self.outputs.iter().map(|o| o.worker_id).collect()
    }
}

/// Statistics from a run
#[derive(Debug, Clone, Default)]
pub struct RunStatistics {
    /// Wall time from launch until the last worker reported
    pub elapsed_time: Duration,
    /// Number of workers spawned
    pub num_workers: usize,
}

impl RunStatistics {
    /// Sum of time spent inside tasks across all workers.
    pub fn total_task_time<T>(outputs: &[WorkerOutput<T>]) -> Duration {
        outputs.iter().map(|o| o.elapsed).sum()
    }
}
