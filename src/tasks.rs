//! Built-in tasks that can be selected by name.
//!
//! Closures cannot be named on a command line, so the binary picks one of
//! these instead. Each variant scores lower-is-better and reports its best
//! score as an `f64`.

use crate::error::TaskError;
use crate::pool::{PoolTask, WorkerContext};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Search box for random search, per coordinate
const SEARCH_BOUND: f64 = 5.12;

/// Largest coordinate step of a local move
const LOCAL_STEP: f64 = 0.25;

/// How often random search polls the stop signal
const STOP_CHECK_INTERVAL: u64 = 64;

/// A task selectable by name.
#[derive(Debug, Clone, PartialEq)]
pub enum BuiltinTask {
    /// Publish and return a fixed score.
    Constant(f64),
    /// Minimize the sphere function by random restarts and local moves.
    RandomSearch { iterations: u64, dimensions: usize },
    /// Fail immediately with the given message.
    Fail(String),
}

impl std::fmt::Display for BuiltinTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuiltinTask::Constant(value) => write!(f, "constant({})", value),
            BuiltinTask::RandomSearch {
                iterations,
                dimensions,
            } => write!(f, "random-search({} iterations, {}d)", iterations, dimensions),
            BuiltinTask::Fail(message) => write!(f, "fail({})", message),
        }
    }
}

impl PoolTask for BuiltinTask {
    type Output = f64;

    fn run(&self, ctx: &WorkerContext) -> Result<f64, TaskError> {
        match self {
            BuiltinTask::Constant(value) => {
                ctx.maybe_update_shared(*value);
                Ok(*value)
            }
            BuiltinTask::RandomSearch {
                iterations,
                dimensions,
            } => random_search(ctx, *iterations, *dimensions),
            BuiltinTask::Fail(message) => Err(message.clone().into()),
        }
    }
}

/// Sum of squares; minimum 0 at the origin.
pub fn sphere(point: &[f64]) -> f64 {
    point.iter().map(|x| x * x).sum()
}

fn random_search(ctx: &WorkerContext, iterations: u64, dimensions: usize) -> Result<f64, TaskError> {
    if dimensions == 0 {
        return Err("random search needs at least one dimension".into());
    }

    let mut rng: ChaCha8Rng = match ctx.seed() {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_os_rng(),
    };

    // Incumbent: the shared best as this worker last saw it. Local
    // improvements are only published when they beat it.
    let mut shared_best = ctx.starting_best();
    let mut best_point: Vec<f64> = (0..dimensions)
        .map(|_| rng.random_range(-SEARCH_BOUND..SEARCH_BOUND))
        .collect();
    let mut best_score = sphere(&best_point);
    let mut published = 0u64;

    if best_score < shared_best {
        published += u64::from(ctx.maybe_update_shared(best_score));
        shared_best = best_score;
    }

    for iteration in 0..iterations {
        if iteration % STOP_CHECK_INTERVAL == 0 {
            if ctx.should_stop() {
                tracing::debug!(worker_id = ctx.worker_id(), iteration, "random search stopped early");
                break;
            }
            shared_best = shared_best.min(ctx.current_best());
        }

        let candidate: Vec<f64> = if rng.random_bool(0.5) {
            best_point
                .iter()
                .map(|x| {
                    (x + rng.random_range(-LOCAL_STEP..LOCAL_STEP))
                        .clamp(-SEARCH_BOUND, SEARCH_BOUND)
                })
                .collect()
        } else {
            (0..dimensions)
                .map(|_| rng.random_range(-SEARCH_BOUND..SEARCH_BOUND))
                .collect()
        };

        let score = sphere(&candidate);
        if score < best_score {
            best_score = score;
            best_point = candidate;
            if score < shared_best {
                published += u64::from(ctx.maybe_update_shared(score));
                shared_best = score;
            }
        }
    }

    tracing::debug!(
        worker_id = ctx.worker_id(),
        best_score,
        shared_best = ctx.current_best(),
        published,
        "random search finished"
    );

    Ok(best_score)
}
