mod demos;

use crate::demos::{
    run_demo, BinarySemaphoreLocks, CountingSemaphoreLocks, DemoSettings, LockingMode,
};
use backtrace::Backtrace;
use config::{
    PrintCounterType, CONSOLE_HOLD_TIME_MS, CONSOLE_SEMAPHORE_ID, DEFAULT_CONSOLE_HOLD_TIME_MS,
    DEFAULT_PRINT_INTERVAL_MS, DEFAULT_THREADS_COUNT, SHARED_MEMORY_SEMAPHORE_ID,
};
use primitives::{BinarySemaphoreTable, CountingSemaphore, StaticCountingSemaphore};
use semsync_logging::{info, warn, UnrecoverableErrorLogging};
use std::io::Write;
use std::panic;
use std::process::exit;
use std::sync::atomic::Ordering;
use std::time::Duration;
use structopt::StructOpt;

#[derive(StructOpt, Debug)]
#[structopt(name = "semsync", about = "Worker threads sharing a counter and the console")]
enum CliArgs {
    /// A single binary semaphore guards both the prints counter and the console
    Mutex(DemoArgs),
    /// Two binary semaphores from the process-wide table, one per shared resource
    Binary(DemoArgs),
    /// Two counting semaphores of capacity 1 created at runtime
    Counting(DemoArgs),
    /// Two counting semaphores of capacity 1 fixed at compile time
    CountingStatic(DemoArgs),
}

#[derive(StructOpt, Debug)]
struct DemoArgs {
    /// Number of worker threads, numbered from 1
    #[structopt(short = "j", long = "threads")]
    pub threads_count: Option<u16>,

    /// Time between two prints of the same thread, in milliseconds
    #[structopt(short = "i", long = "interval-ms")]
    pub interval_ms: Option<u64>,

    /// Number of prints performed by each thread. Runs until interrupted if omitted
    #[structopt(short = "n", long)]
    pub iterations: Option<u64>,

    /// Time the console stays reserved after each print, in milliseconds
    #[structopt(long = "hold-ms")]
    pub hold_ms: Option<u64>,
}

static STATIC_SHARED_MEMORY_SEMAPHORE: StaticCountingSemaphore<1> = StaticCountingSemaphore::new();
static STATIC_CONSOLE_SEMAPHORE: StaticCountingSemaphore<1> = StaticCountingSemaphore::new();

fn initialize(args: &DemoArgs, mode: LockingMode) -> anyhow::Result<DemoSettings> {
    let threads_count = args.threads_count.unwrap_or(DEFAULT_THREADS_COUNT);
    let interval_ms = args.interval_ms.unwrap_or(DEFAULT_PRINT_INTERVAL_MS);
    anyhow::ensure!(threads_count > 0, "At least one thread is required");

    CONSOLE_HOLD_TIME_MS.store(
        args.hold_ms.unwrap_or(DEFAULT_CONSOLE_HOLD_TIME_MS),
        Ordering::Relaxed,
    );

    info!(
        "Starting {} threads with a print interval of {} ms",
        threads_count, interval_ms
    );
    if args.iterations.is_none() {
        warn!("No iterations limit specified, running until interrupted");
    }

    Ok(DemoSettings {
        threads_count,
        print_interval: Duration::from_millis(interval_ms),
        console_hold_time: config::get_console_hold_time(),
        iterations: args.iterations,
        mode,
    })
}

fn main() -> anyhow::Result<()> {
    let args: CliArgs = CliArgs::from_args();

    panic::set_hook(Box::new(move |info| {
        let stdout = std::io::stdout();
        let _lock = stdout.lock();

        let stderr = std::io::stderr();
        let mut err_lock = stderr.lock();

        if let Some(location) = info.location() {
            let _ = writeln!(err_lock, "Thread panicked at location: {}", location);
        }
        if let Some(s) = info.payload().downcast_ref::<&str>() {
            let _ = writeln!(err_lock, "Panic payload: {:?}", s);
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            let _ = writeln!(err_lock, "Panic payload: {:?}", s);
        }

        let _ = writeln!(err_lock, "Backtrace: {:?}", Backtrace::new());

        exit(1);
    }));

    let performed: Vec<Vec<PrintCounterType>> = match args {
        CliArgs::Mutex(args) => {
            let settings = initialize(&args, LockingMode::SingleLock)?;
            let locks = BinarySemaphoreLocks::new(
                BinarySemaphoreTable::global(),
                CONSOLE_SEMAPHORE_ID,
                CONSOLE_SEMAPHORE_ID,
            );
            run_demo(&locks, &settings)?
        }
        CliArgs::Binary(args) => {
            let settings = initialize(&args, LockingMode::SplitLocks)?;
            let locks = BinarySemaphoreLocks::new(
                BinarySemaphoreTable::global(),
                SHARED_MEMORY_SEMAPHORE_ID,
                CONSOLE_SEMAPHORE_ID,
            );
            run_demo(&locks, &settings)?
        }
        CliArgs::Counting(args) => {
            let settings = initialize(&args, LockingMode::SplitLocks)?;
            let shared_memory = CountingSemaphore::new(1)
                .log_unrecoverable_error("Cannot create the shared memory semaphore")?;
            let console = CountingSemaphore::new(1)
                .log_unrecoverable_error("Cannot create the console semaphore")?;

            let performed = run_demo(
                &CountingSemaphoreLocks::new(&shared_memory, &console),
                &settings,
            )?;

            shared_memory.destroy();
            console.destroy();
            performed
        }
        CliArgs::CountingStatic(args) => {
            let settings = initialize(&args, LockingMode::SplitLocks)?;
            let locks = CountingSemaphoreLocks::new(
                &STATIC_SHARED_MEMORY_SEMAPHORE,
                &STATIC_CONSOLE_SEMAPHORE,
            );
            run_demo(&locks, &settings)?
        }
    };

    info!(
        "Performed {} prints",
        performed.iter().map(|p| p.len()).sum::<usize>()
    );

    Ok(())
}
