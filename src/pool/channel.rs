//! Channels between the coordinator and its workers.

use crate::error::TaskError;
use crossbeam_channel::{Receiver, Sender, unbounded};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Terminal report sent from a worker to the coordinator.
#[derive(Debug)]
pub enum WorkerMessage<T> {
    /// Task returned a value.
    Completed {
        worker_id: usize,
        value: T,
        elapsed: Duration,
    },
    /// Task returned an error.
    Failed { worker_id: usize, error: TaskError },
    /// Task panicked.
    Panicked { worker_id: usize, message: String },
}

/// Cooperative stop flag raised by the coordinator when it abandons a run.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    /// Signal all workers to stop.
    pub fn signal_stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Check if we should stop.
    pub fn should_stop(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Channel endpoints for a worker.
pub struct WorkerChannels<T> {
    /// Send the terminal report to the coordinator.
    pub to_coordinator: Sender<WorkerMessage<T>>,
    /// Released once per worker when every spawn succeeded; disconnected on abort.
    pub start: Receiver<()>,
    /// Stop flag shared with the coordinator.
    pub stop: StopSignal,
}

/// Channel endpoints for the coordinator.
pub struct CoordinatorChannels<T> {
    /// Receive reports from workers.
    pub from_workers: Receiver<WorkerMessage<T>>,
    /// Start gate; dropping it without sending aborts waiting workers.
    pub start: Sender<()>,
    /// Stop flag shared with every worker.
    pub stop: StopSignal,
}

impl<T> CoordinatorChannels<T> {
    /// Let `num_workers` workers through the start gate.
    pub fn release(&self, num_workers: usize) {
        for _ in 0..num_workers {
            // Receivers are alive until their worker passes the gate
            let _ = self.start.send(());
        }
    }
}

/// Create channels for a run with the given number of workers.
pub fn create_channels<T>(num_workers: usize) -> (CoordinatorChannels<T>, Vec<WorkerChannels<T>>) {
    let stop = StopSignal::default();

    // Unbounded so that reporting never blocks a worker
    let (worker_tx, coordinator_rx) = unbounded();
    let (start_tx, start_rx) = unbounded();

    let worker_channels = (0..num_workers)
        .map(|_| WorkerChannels {
            to_coordinator: worker_tx.clone(),
            start: start_rx.clone(),
            stop: stop.clone(),
        })
        .collect();

    // worker_tx is dropped here so the coordinator sees a disconnect once
    // every worker has hung up
    let coordinator = CoordinatorChannels {
        from_workers: coordinator_rx,
        start: start_tx,
        stop,
    };

    (coordinator, worker_channels)
}
