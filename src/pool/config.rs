//! Configuration for pool runs.

use crate::error::PoolError;
use crate::pool::register::DEFAULT_SCALE;
use std::sync::atomic::{AtomicBool, Ordering};

/// Worker count used when none is given.
pub const DEFAULT_WORKERS: usize = 4;

/// Process-wide entangled toggle. Runs copy it into their config at launch.
static ENTANGLED: AtomicBool = AtomicBool::new(false);

/// Enable or disable entangled mode for runs launched after this call.
///
/// Runs already in flight keep the value they captured at launch.
pub fn set_entangled(enabled: bool) {
    ENTANGLED.store(enabled, Ordering::SeqCst);
}

/// Current value of the process-wide entangled toggle.
pub fn is_entangled() -> bool {
    ENTANGLED.load(Ordering::SeqCst)
}

/// Configuration for a single pool run.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Number of worker threads to spawn.
    pub num_workers: usize,
    /// Whether workers share one best-score register.
    pub entangled: bool,
    /// Multiplier applied to scores before they are stored in the register.
    pub scale: f64,
    /// Base random seed (workers get seed + worker_id).
    pub base_seed: Option<u64>,
    /// Worker threads are named `{prefix}-{worker_id}`.
    pub thread_name_prefix: String,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            num_workers: DEFAULT_WORKERS,
            entangled: false,
            scale: DEFAULT_SCALE,
            base_seed: None,
            thread_name_prefix: "pool-worker".to_string(),
        }
    }
}

impl PoolConfig {
    /// Default config with `entangled` taken from the process-wide toggle.
    pub fn current() -> Self {
        Self::default().with_entangled(is_entangled())
    }

    /// Set the number of workers (at least 1).
    pub fn with_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = num_workers.max(1);
        self
    }

    /// Use one worker per logical CPU.
    pub fn with_all_cores(self) -> Self {
        self.with_workers(num_cpus::get())
    }

    /// Enable or disable the shared best-score register.
    pub fn with_entangled(mut self, entangled: bool) -> Self {
        self.entangled = entangled;
        self
    }

    /// Set the score scale factor.
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Set the base random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.base_seed = Some(seed);
        self
    }

    /// Set the base random seed from an Option.
    pub fn with_seed_option(mut self, seed: Option<u64>) -> Self {
        self.base_seed = seed;
        self
    }

    /// Set the prefix used for worker thread names.
    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Seed handed to the given worker, if a base seed is set.
    pub fn worker_seed(&self, worker_id: usize) -> Option<u64> {
        self.base_seed.map(|s| s.wrapping_add(worker_id as u64))
    }

    /// Check the config before a run is launched.
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.num_workers == 0 {
            return Err(PoolError::InvalidWorkerCount);
        }
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(PoolError::InvalidScale(self.scale));
        }
        if self.thread_name_prefix.contains('\0') {
            return Err(PoolError::InvalidThreadName(self.thread_name_prefix.clone()));
        }
        Ok(())
    }
}
