use std::process::exit;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use log::{error, info};

use taskpool::{Result, ThreadPool};

const DEFAULT_THREADS: usize = 8;
const DEFAULT_TASKS: usize = 50_000;

#[derive(Parser)]
#[command(
    name = "taskpool-smoke",
    version,
    about = "Runs a batch of counter increments through the thread pool"
)]
struct Cli {
    /// Number of worker threads
    #[arg(long, default_value_t = DEFAULT_THREADS, value_name = "N")]
    threads: usize,

    /// Number of increment tasks to submit
    #[arg(long, default_value_t = DEFAULT_TASKS, value_name = "N")]
    tasks: usize,
}

fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(count) if count == cli.tasks => {}
        Ok(count) => {
            error!("Expected {} completed tasks, counted {}", cli.tasks, count);
            exit(1);
        }
        Err(e) => {
            error!("{}", e);
            exit(1);
        }
    }
}

fn run(cli: &Cli) -> Result<usize> {
    info!("taskpool-smoke {}", env!("CARGO_PKG_VERSION"));
    info!("Submitting {} tasks to {} workers", cli.tasks, cli.threads);

    let start = Instant::now();
    let pool = ThreadPool::new(cli.threads)?;
    let counter = Arc::new(AtomicUsize::new(0));

    for _ in 0..cli.tasks {
        let counter = Arc::clone(&counter);
        pool.submit(move || {
            counter.fetch_add(1, Ordering::Relaxed);
        })?;
    }
    pool.shutdown();

    let count = counter.load(Ordering::Relaxed);
    info!("Finished in {:?}", start.elapsed());
    println!(
        "completed {}/{} tasks on {} threads",
        count, cli.tasks, cli.threads
    );
    Ok(count)
}
