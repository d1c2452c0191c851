use entangled_pool::pool::{PoolConfig, WorkerContext, run, run_with_config};
use entangled_pool::{PoolError, TaskError, is_entangled, set_entangled};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::sync::atomic::{AtomicUsize, Ordering};

fn config(workers: usize, entangled: bool) -> PoolConfig {
    PoolConfig::default()
        .with_workers(workers)
        .with_entangled(entangled)
}

#[test]
fn test_entangled_scenario_32_workers() {
    let result = run_with_config(
        |ctx: &WorkerContext| -> Result<i32, TaskError> {
            ctx.maybe_update_shared(21.0);
            Ok(21)
        },
        &config(32, true),
    )
    .expect("run should succeed");

    assert_eq!(result.len(), 32);
    assert!(result.values().all(|v| *v == 21));
    assert_eq!(result.final_best, Some(21.0));
}

#[test]
fn test_detached_scenario_distinct_values() {
    let result = run_with_config(
        |ctx: &WorkerContext| -> Result<(usize, f64), TaskError> {
            Ok((ctx.worker_id() + 1, ctx.starting_best()))
        },
        &config(4, false),
    )
    .expect("run should succeed");

    assert_eq!(result.len(), 4);
    let values: HashSet<usize> = result.values().map(|(v, _)| *v).collect();
    assert_eq!(values, HashSet::from([1, 2, 3, 4]));
    assert!(result.values().all(|(_, best)| *best == f64::INFINITY));
}

#[test]
fn test_randomized_stress_final_minimum_never_missed() {
    for round in 0..10u64 {
        let result = run_with_config(
            move |ctx: &WorkerContext| -> Result<f64, TaskError> {
                let mut rng = ChaCha8Rng::seed_from_u64(round * 1000 + ctx.worker_id() as u64);
                let mut local_min = f64::INFINITY;
                for _ in 0..200 {
                    let score: f64 = rng.random_range(0.0..10_000.0);
                    local_min = local_min.min(score);
                    ctx.maybe_update_shared(score);
                }
                Ok(local_min)
            },
            &config(16, true),
        )
        .expect("run should succeed");

        let minimum = result.values().copied().fold(f64::INFINITY, f64::min);
        let shared = result.final_best.expect("scores were published");
        assert!(
            (minimum - shared).abs() < 2e-6,
            "round {}: shared {} vs minimum {}",
            round,
            shared,
            minimum
        );
    }
}

#[test]
fn test_failure_never_returns_partial_results() {
    let completed = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&completed);

    let outcome = run_with_config(
        move |ctx: &WorkerContext| -> Result<usize, TaskError> {
            if ctx.worker_id() == 5 {
                return Err(std::io::Error::other("disk unavailable").into());
            }
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(ctx.worker_id())
        },
        &config(8, true),
    );

    match outcome {
        Err(PoolError::TaskFailed { worker_id, source }) => {
            assert_eq!(worker_id, 5);
            assert_eq!(source.to_string(), "disk unavailable");
        }
        other => panic!("expected task failure, got {:?}", other.map(|r| r.len())),
    }
}

#[test]
fn test_process_wide_toggle_is_snapshotted() {
    // The only test in this binary that touches the process-wide toggle
    set_entangled(true);
    assert!(is_entangled());
    let snapshot = PoolConfig::current();
    set_entangled(false);
    assert!(snapshot.entangled);
    assert!(!PoolConfig::current().entangled);

    set_entangled(true);
    let result = run(
        |ctx: &WorkerContext| -> Result<bool, TaskError> {
            ctx.maybe_update_shared(3.5);
            Ok(ctx.is_entangled())
        },
        4,
    )
    .expect("run should succeed");
    set_entangled(false);

    assert!(result.entangled);
    assert_eq!(result.len(), 4);
    assert!(result.values().all(|v| *v));
    assert_eq!(result.final_best, Some(3.5));

    // Clearing the toggle while a run is in flight leaves that run entangled
    set_entangled(true);
    let barrier = Arc::new(Barrier::new(4));
    let result = run(
        move |ctx: &WorkerContext| -> Result<(bool, bool), TaskError> {
            if ctx.worker_id() == 0 {
                set_entangled(false);
            }
            barrier.wait();
            ctx.maybe_update_shared(1.25 + ctx.worker_id() as f64);
            Ok((ctx.is_entangled(), is_entangled()))
        },
        4,
    )
    .expect("run should succeed");

    assert!(!is_entangled());
    assert!(result.entangled);
    assert_eq!(result.len(), 4);
    assert!(result.values().all(|(worker, toggle)| *worker && !*toggle));
    assert_eq!(result.final_best, Some(1.25));

    let result = run(
        |ctx: &WorkerContext| -> Result<bool, TaskError> { Ok(ctx.is_entangled()) },
        2,
    )
    .expect("run should succeed");
    assert!(!result.entangled);
    assert!(result.values().all(|v| !*v));

    let err = run(
        |_: &WorkerContext| -> Result<(), TaskError> { Ok(()) },
        0,
    )
    .unwrap_err();
    assert!(matches!(err, PoolError::InvalidWorkerCount));
}

#[test]
fn test_concurrent_runs_do_not_share_registers() {
    let handles: Vec<_> = (0..4)
        .map(|run_id| {
            std::thread::spawn(move || {
                let score = 10.0 * (run_id + 1) as f64;
                run_with_config(
                    move |ctx: &WorkerContext| -> Result<f64, TaskError> {
                        ctx.maybe_update_shared(score);
                        Ok(score)
                    },
                    &config(4, true),
                )
                .map(|result| (score, result.final_best))
            })
        })
        .collect();

    for handle in handles {
        let (score, final_best) = handle.join().unwrap().expect("run should succeed");
        assert_eq!(final_best, Some(score));
    }
}
