//! Pool coordinator that spawns workers and aggregates their reports.

use crate::error::PoolError;
use crate::pool::channel::{CoordinatorChannels, WorkerMessage, create_channels};
use crate::pool::config::PoolConfig;
use crate::pool::register::SharedScoreRegister;
use crate::pool::result::{RunResult, RunStatistics, WorkerOutput};
use crate::pool::worker::{PoolTask, Publisher, WorkerUnit};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

/// Runs tasks with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct PoolCoordinator {
    config: PoolConfig,
}

impl PoolCoordinator {
    pub fn new(config: PoolConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Run `task` once on every worker. See [`run_with_config`].
    pub fn run<T>(&self, task: T) -> Result<RunResult<T::Output>, PoolError>
    where
        T: PoolTask + 'static,
        T::Output: 'static,
    {
        run_with_config(task, &self.config)
    }
}

/// Run `task` on `count` workers using the process-wide entangled setting.
///
/// The setting is read once here; toggling it later does not affect this run.
pub fn run<T>(task: T, count: usize) -> Result<RunResult<T::Output>, PoolError>
where
    T: PoolTask + 'static,
    T::Output: 'static,
{
    let mut config = PoolConfig::current();
    config.num_workers = count;
    run_with_config(task, &config)
}

/// Run `task` once on each of `config.num_workers` threads.
///
/// Returns every worker's value in completion order, or the first failure
/// observed. On failure the remaining workers are told to stop and left
/// to finish on their own; their results are discarded.
pub fn run_with_config<T>(task: T, config: &PoolConfig) -> Result<RunResult<T::Output>, PoolError>
where
    T: PoolTask + 'static,
    T::Output: 'static,
{
    config.validate()?;

    let start_time = Instant::now();
    let num_workers = config.num_workers;
    let entangled = config.entangled;

    tracing::info!(
        workers = num_workers,
        entangled,
        scale = config.scale,
        "launching pool run"
    );

    let register = entangled.then(|| Arc::new(SharedScoreRegister::new(config.scale)));
    let (coordinator_channels, worker_channels) = create_channels(num_workers);
    let task = Arc::new(task);

    // Spawn every worker before any of them starts its task
    let mut worker_handles = Vec::with_capacity(num_workers);
    for (worker_id, channels) in worker_channels.into_iter().enumerate() {
        let unit = WorkerUnit {
            worker_id,
            seed: config.worker_seed(worker_id),
            publisher: match &register {
                Some(register) => Publisher::Entangled(Arc::clone(register)),
                None => Publisher::Detached,
            },
            channels,
        };
        let task = Arc::clone(&task);

        let spawned = thread::Builder::new()
            .name(format!("{}-{}", config.thread_name_prefix, worker_id))
            .spawn(move || unit.run(&*task));

        match spawned {
            Ok(handle) => worker_handles.push(handle),
            Err(source) => {
                tracing::warn!(worker_id, error = %source, "failed to spawn worker");
                // Closing the gate sends the spawned workers home without running the task
                drop(coordinator_channels);
                for handle in worker_handles {
                    let _ = handle.join();
                }
                return Err(PoolError::SpawnFailed { worker_id, source });
            }
        }
    }

    coordinator_channels.release(num_workers);

    let outputs = match run_coordinator(&coordinator_channels, num_workers) {
        Ok(outputs) => outputs,
        Err(err) => {
            coordinator_channels.stop.signal_stop();
            tracing::warn!(error = %err, "pool run failed, abandoning remaining workers");
            // Handles are dropped, which detaches the outstanding threads
            return Err(err);
        }
    };

    // Every worker has reported, so these joins do not wait on task code
    for handle in worker_handles {
        if handle.join().is_err() {
            tracing::warn!("worker thread panicked after reporting");
        }
    }

    let final_best = register
        .as_ref()
        .map(|register| register.best())
        .filter(|best| *best != f64::INFINITY);

    let statistics = RunStatistics {
        elapsed_time: start_time.elapsed(),
        num_workers,
    };

    tracing::info!(
        workers = num_workers,
        elapsed_ms = statistics.elapsed_time.as_millis() as u64,
        final_best,
        "pool run completed"
    );

    Ok(RunResult {
        outputs,
        entangled,
        final_best,
        statistics,
    })
}

/// Coordinator loop that waits for one report per worker.
///
/// Stops at the first failure.
fn run_coordinator<T>(
    channels: &CoordinatorChannels<T>,
    expected: usize,
) -> Result<Vec<WorkerOutput<T>>, PoolError> {
    let mut outputs = Vec::with_capacity(expected);

    while outputs.len() < expected {
        let message = channels
            .from_workers
            .recv()
            .map_err(|_| PoolError::WorkerLost {
                received: outputs.len(),
                expected,
            })?;

        match message {
            WorkerMessage::Completed {
                worker_id,
                value,
                elapsed,
            } => {
                tracing::debug!(worker_id, elapsed_us = elapsed.as_micros() as u64, "worker finished");
                outputs.push(WorkerOutput {
                    worker_id,
                    value,
                    elapsed,
                });
            }
            WorkerMessage::Failed { worker_id, error } => {
                return Err(PoolError::TaskFailed {
                    worker_id,
                    source: error,
                });
            }
            WorkerMessage::Panicked { worker_id, message } => {
                return Err(PoolError::TaskPanicked { worker_id, message });
            }
        }
    }

    Ok(outputs)
}
