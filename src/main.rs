use clap::{Parser, Subcommand, ValueEnum};
use entangled_pool::pool::{PoolConfig, RunResult, RunStatistics, set_entangled};
use entangled_pool::{BuiltinTask, PoolCoordinator};
use tracing_subscriber::EnvFilter;

// --- Command Line Arguments ---

#[derive(Parser)]
#[command(name = "entangled-pool")]
#[command(about = "entangled-pool - run a scoring task on a fixed pool of workers")]
#[command(version)]
#[command(subcommand_required = true)]
#[command(arg_required_else_help = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// CLI task selection
#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliTask {
    /// Publish and return a fixed score
    Constant,
    /// Random search on the sphere function
    RandomSearch,
    /// Fail immediately (for exercising error handling)
    Fail,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a built-in task once on every worker
    Run {
        /// Task to run on each worker
        #[arg(long, value_enum, default_value = "constant")]
        task: CliTask,

        // --- Pool options ---
        /// Number of worker threads
        #[arg(long, short = 'j', default_value = "4")]
        workers: usize,
        /// Use one worker per logical CPU (overrides --workers)
        #[arg(long)]
        all_cores: bool,
        /// Share one best-score register between workers
        #[arg(long)]
        entangled: bool,
        /// Score scale factor for the shared register
        #[arg(long, default_value = "1000000")]
        scale: f64,
        /// Base random seed (worker i gets seed + i)
        #[arg(long)]
        seed: Option<u64>,

        // --- Task options ---
        /// Score returned by the constant task
        #[arg(long, default_value = "21")]
        value: f64,
        /// Iterations per worker for random search
        #[arg(long, default_value = "100000")]
        iterations: u64,
        /// Dimensions of the random search space
        #[arg(long, default_value = "4")]
        dimensions: usize,
        /// Failure message for the fail task
        #[arg(long, default_value = "task failed on purpose")]
        message: String,

        /// Enable verbose output
        #[arg(long, short)]
        verbose: bool,
    },
}

/// Options for a pool run
struct RunOptions {
    task: BuiltinTask,
    workers: usize,
    all_cores: bool,
    entangled: bool,
    scale: f64,
    seed: Option<u64>,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_pool(options: &RunOptions) -> Result<(), Box<dyn std::error::Error>> {
    set_entangled(options.entangled);

    let mut config = PoolConfig::current()
        .with_workers(options.workers)
        .with_scale(options.scale)
        .with_seed_option(options.seed);
    if options.all_cores {
        config = config.with_all_cores();
    }

    let coordinator = PoolCoordinator::new(config);
    let config = coordinator.config();
    println!("Task: {}", options.task);
    println!(
        "Workers: {} (entangled: {}, scale: {})",
        config.num_workers, config.entangled, config.scale
    );

    let result = coordinator.run(options.task.clone())?;
    print_result(&result);

    Ok(())
}

fn print_result(result: &RunResult<f64>) {
    println!("\nResults (completion order):");
    for output in &result.outputs {
        println!(
            "  worker {:>3} -> {} ({:.3?})",
            output.worker_id, output.value, output.elapsed
        );
    }

    if result.entangled {
        match result.final_best {
            Some(best) => println!("Shared best: {}", best),
            None => println!("Shared best: none published"),
        }
    }

    let best = result.values().copied().fold(f64::INFINITY, f64::min);
    println!("Best result: {}", best);
    println!("Elapsed: {:.3?}", result.statistics.elapsed_time);
    println!(
        "Total task time: {:.3?}",
        RunStatistics::total_task_time(&result.outputs)
    );
}

// --- Main Function ---
fn main() {
    let args = Args::parse();

    match args.command {
        Commands::Run {
            task,
            workers,
            all_cores,
            entangled,
            scale,
            seed,
            value,
            iterations,
            dimensions,
            message,
            verbose,
        } => {
            init_logging(verbose);

            let task = match task {
                CliTask::Constant => BuiltinTask::Constant(value),
                CliTask::RandomSearch => BuiltinTask::RandomSearch {
                    iterations,
                    dimensions,
                },
                CliTask::Fail => BuiltinTask::Fail(message),
            };

            let options = RunOptions {
                task,
                workers,
                all_cores,
                entangled,
                scale,
                seed,
            };

            match run_pool(&options) {
                Ok(()) => println!("\nRun completed successfully."),
                Err(e) => {
                    eprintln!("Error during run: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }
}
