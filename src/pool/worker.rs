//! Worker units and the task protocol they run.
//!
//! A task is invoked exactly once per worker with a [`WorkerContext`] that
//! carries the score observed at start and a publish hook into the run's
//! shared register. When the run is not entangled the hook is a no-op and the
//! starting score is `+inf`.

use crate::error::TaskError;
use crate::pool::channel::{StopSignal, WorkerChannels, WorkerMessage};
use crate::pool::register::SharedScoreRegister;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

/// A task the pool can run on each worker.
///
/// Implemented for any `Fn(&WorkerContext) -> Result<T, E>` closure, so most
/// callers never implement it by hand.
pub trait PoolTask: Send + Sync {
    /// Value a worker reports on success. The pool does not interpret it.
    type Output: Send;

    /// Run once on a worker.
    fn run(&self, ctx: &WorkerContext) -> Result<Self::Output, TaskError>;
}

impl<F, T, E> PoolTask for F
where
    F: Fn(&WorkerContext) -> Result<T, E> + Send + Sync,
    T: Send,
    E: Into<TaskError>,
{
    type Output = T;

    fn run(&self, ctx: &WorkerContext) -> Result<T, TaskError> {
        self(ctx).map_err(Into::into)
    }
}

/// Where a worker's publications go.
#[derive(Debug, Clone)]
pub enum Publisher {
    /// Bound to the run's shared register.
    Entangled(Arc<SharedScoreRegister>),
    /// Not entangled; publications are dropped.
    Detached,
}

impl Publisher {
    /// Offer a score to the register. Returns true if it became the new best.
    pub fn publish(&self, score: f64) -> bool {
        match self {
            Publisher::Entangled(register) => register.maybe_publish(score),
            Publisher::Detached => false,
        }
    }

    /// Best score published so far, `+inf` when detached or empty.
    pub fn current_best(&self) -> f64 {
        match self {
            Publisher::Entangled(register) => register.best(),
            Publisher::Detached => f64::INFINITY,
        }
    }
}

/// Everything a task can see while it runs.
#[derive(Debug)]
pub struct WorkerContext {
    worker_id: usize,
    starting_best: f64,
    seed: Option<u64>,
    publisher: Publisher,
    stop: StopSignal,
}

impl WorkerContext {
    pub(crate) fn new(
        worker_id: usize,
        seed: Option<u64>,
        publisher: Publisher,
        stop: StopSignal,
    ) -> Self {
        // Read once, at task start
        let starting_best = publisher.current_best();
        Self {
            worker_id,
            starting_best,
            seed,
            publisher,
            stop,
        }
    }

    /// Index of this worker within its run, in spawn order.
    pub fn worker_id(&self) -> usize {
        self.worker_id
    }

    /// Shared best observed when the task started (`+inf` if none).
    pub fn starting_best(&self) -> f64 {
        self.starting_best
    }

    /// Offer a score to the shared register. No-op unless entangled.
    pub fn maybe_update_shared(&self, score: f64) -> bool {
        self.publisher.publish(score)
    }

    /// Fresh read of the shared best (`+inf` if none or not entangled).
    pub fn current_best(&self) -> f64 {
        self.publisher.current_best()
    }

    /// Whether this worker shares a register with the rest of the run.
    pub fn is_entangled(&self) -> bool {
        matches!(self.publisher, Publisher::Entangled(_))
    }

    /// Per-worker seed derived from the run's base seed.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// True once the coordinator has given up on the run.
    pub fn should_stop(&self) -> bool {
        self.stop.should_stop()
    }
}

/// One worker of a run, before it is moved onto its thread.
pub(crate) struct WorkerUnit<T> {
    pub worker_id: usize,
    pub seed: Option<u64>,
    pub publisher: Publisher,
    pub channels: WorkerChannels<T>,
}

impl<O: Send> WorkerUnit<O> {
    /// Wait for the start gate, run the task once and report the outcome.
    pub fn run<T>(self, task: &T)
    where
        T: PoolTask<Output = O> + ?Sized,
    {
        let WorkerUnit {
            worker_id,
            seed,
            publisher,
            channels,
        } = self;

        if channels.start.recv().is_err() {
            tracing::trace!(worker_id, "run aborted before start");
            return;
        }

        let ctx = WorkerContext::new(worker_id, seed, publisher, channels.stop);
        tracing::debug!(
            worker_id,
            starting_best = ctx.starting_best(),
            "worker started"
        );

        let start_time = Instant::now();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| task.run(&ctx)));
        let message = match outcome {
            Ok(Ok(value)) => WorkerMessage::Completed {
                worker_id,
                value,
                elapsed: start_time.elapsed(),
            },
            Ok(Err(error)) => WorkerMessage::Failed { worker_id, error },
            Err(payload) => WorkerMessage::Panicked {
                worker_id,
                message: panic_message(payload.as_ref()),
            },
        };

        // The coordinator may have stopped listening after another failure
        let _ = channels.to_coordinator.send(message);
    }
}

/// Render a panic payload as text.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
