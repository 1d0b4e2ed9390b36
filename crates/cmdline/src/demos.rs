use anyhow::anyhow;
use config::{BinarySemaphoreIdType, PrintCounterType};
use primitives::{BinarySemaphoreTable, ResourceSemaphore, SemaphoreError};
use semsync_logging::error;
use std::io::Write;
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::Duration;
use utils::Utils;

/// Exclusive access to the two resources shared by the workers: the prints counter and
/// the console
pub trait SharedResourcesLocks: Sync {
    fn with_shared_memory<R>(&self, f: impl FnOnce() -> R) -> Result<R, SemaphoreError>;
    fn with_console<R>(&self, f: impl FnOnce() -> R) -> Result<R, SemaphoreError>;
}

pub struct BinarySemaphoreLocks<'a> {
    table: &'a BinarySemaphoreTable,
    shared_memory_id: BinarySemaphoreIdType,
    console_id: BinarySemaphoreIdType,
}

impl<'a> BinarySemaphoreLocks<'a> {
    pub fn new(
        table: &'a BinarySemaphoreTable,
        shared_memory_id: BinarySemaphoreIdType,
        console_id: BinarySemaphoreIdType,
    ) -> Self {
        Self {
            table,
            shared_memory_id,
            console_id,
        }
    }
}

impl SharedResourcesLocks for BinarySemaphoreLocks<'_> {
    fn with_shared_memory<R>(&self, f: impl FnOnce() -> R) -> Result<R, SemaphoreError> {
        let _guard = self.table.lock(self.shared_memory_id)?;
        Ok(f())
    }

    fn with_console<R>(&self, f: impl FnOnce() -> R) -> Result<R, SemaphoreError> {
        let _guard = self.table.lock(self.console_id)?;
        Ok(f())
    }
}

pub struct CountingSemaphoreLocks<'a, S: ResourceSemaphore> {
    shared_memory: &'a S,
    console: &'a S,
}

impl<'a, S: ResourceSemaphore> CountingSemaphoreLocks<'a, S> {
    pub fn new(shared_memory: &'a S, console: &'a S) -> Self {
        Self {
            shared_memory,
            console,
        }
    }
}

impl<S: ResourceSemaphore> SharedResourcesLocks for CountingSemaphoreLocks<'_, S> {
    fn with_shared_memory<R>(&self, f: impl FnOnce() -> R) -> Result<R, SemaphoreError> {
        let _guard = self.shared_memory.lock();
        Ok(f())
    }

    fn with_console<R>(&self, f: impl FnOnce() -> R) -> Result<R, SemaphoreError> {
        let _guard = self.console.lock();
        Ok(f())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LockingMode {
    /// The counter update and the print happen under the console lock only
    SingleLock,
    /// The counter and the console are locked separately
    SplitLocks,
}

#[derive(Clone, Debug)]
pub struct DemoSettings {
    pub threads_count: u16,
    pub print_interval: Duration,
    pub console_hold_time: Duration,
    /// Prints performed by each thread, `None` runs forever
    pub iterations: Option<u64>,
    pub mode: LockingMode,
}

/// Shared prints counter. The increment is a plain load and store, callers must hold
/// the shared memory lock.
struct PrintCounter(AtomicU16);

impl PrintCounter {
    fn increment(&self) -> PrintCounterType {
        let value = self.0.load(Ordering::Relaxed).wrapping_add(1);
        self.0.store(value, Ordering::Relaxed);
        value
    }
}

fn print_report(thread_id: u16, num_prints: PrintCounterType, hold_time: Duration) {
    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    let _ = lock.write_all(Utils::format_print_report(thread_id, num_prints).as_bytes());
    let _ = lock.flush();
    drop(lock);
    Utils::delay(hold_time);
}

fn run_worker<L: SharedResourcesLocks>(
    locks: &L,
    counter: &PrintCounter,
    thread_id: u16,
    settings: &DemoSettings,
) -> Result<Vec<PrintCounterType>, SemaphoreError> {
    let sleep_time = match settings.mode {
        LockingMode::SingleLock => settings.print_interval,
        LockingMode::SplitLocks => Utils::adjusted_print_interval(settings.print_interval),
    };

    let mut performed = Vec::new();
    let mut iteration = 0;

    while settings.iterations.map_or(true, |max| iteration < max) {
        let num_prints = match settings.mode {
            LockingMode::SingleLock => locks.with_console(|| {
                let num_prints = counter.increment();
                print_report(thread_id, num_prints, settings.console_hold_time);
                num_prints
            })?,
            LockingMode::SplitLocks => {
                let num_prints = locks.with_shared_memory(|| counter.increment())?;
                locks.with_console(|| {
                    print_report(thread_id, num_prints, settings.console_hold_time)
                })?;
                num_prints
            }
        };

        performed.push(num_prints);
        iteration += 1;
        Utils::delay(sleep_time);
    }

    Ok(performed)
}

/// Runs the worker threads until each one has performed its prints, returning the
/// counter values seen by every thread in order of thread id
pub fn run_demo<L: SharedResourcesLocks>(
    locks: &L,
    settings: &DemoSettings,
) -> anyhow::Result<Vec<Vec<PrintCounterType>>> {
    let counter = PrintCounter(AtomicU16::new(0));
    let counter = &counter;

    crossbeam::thread::scope(|s| -> anyhow::Result<Vec<Vec<PrintCounterType>>> {
        let mut handles = Vec::with_capacity(settings.threads_count as usize);

        for thread_id in 1..=settings.threads_count {
            let handle = s
                .builder()
                .name(format!("worker-{}", thread_id))
                .spawn(move |_| run_worker(locks, counter, thread_id, settings))?;
            handles.push((thread_id, handle));
        }

        let mut performed = Vec::with_capacity(handles.len());
        for (thread_id, handle) in handles {
            match handle
                .join()
                .map_err(|_| anyhow!("A worker thread panicked"))?
            {
                Ok(thread_prints) => performed.push(thread_prints),
                Err(err) => {
                    error!("Worker thread {} stopped: {}", thread_id, err);
                    return Err(err.into());
                }
            }
        }
        Ok(performed)
    })
    .map_err(|_| anyhow!("A worker thread panicked"))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use primitives::{CountingSemaphore, StaticCountingSemaphore};

    fn settings(mode: LockingMode) -> DemoSettings {
        DemoSettings {
            threads_count: 3,
            print_interval: Duration::from_millis(1),
            console_hold_time: Duration::from_millis(1),
            iterations: Some(4),
            mode,
        }
    }

    fn assert_every_print_counted(performed: Vec<Vec<PrintCounterType>>) {
        assert_eq!(performed.len(), 3);
        for thread_prints in &performed {
            assert_eq!(thread_prints.len(), 4);
            assert!(thread_prints.windows(2).all(|w| w[0] < w[1]));
        }

        let mut all: Vec<_> = performed.into_iter().flatten().collect();
        all.sort_unstable();
        assert_eq!(all, (1..=12).collect::<Vec<_>>());
    }

    #[test]
    fn binary_split_locks() {
        let table = BinarySemaphoreTable::new();
        let locks = BinarySemaphoreLocks::new(&table, 1, 0);

        assert_every_print_counted(run_demo(&locks, &settings(LockingMode::SplitLocks)).unwrap());
        assert_eq!(table.reserved_mask(), 0);
    }

    #[test]
    fn binary_single_lock() {
        let table = BinarySemaphoreTable::new();
        let locks = BinarySemaphoreLocks::new(&table, 0, 0);

        assert_every_print_counted(run_demo(&locks, &settings(LockingMode::SingleLock)).unwrap());
    }

    #[test]
    fn counting_semaphores() {
        let shared_memory = CountingSemaphore::new(1).unwrap();
        let console = CountingSemaphore::new(1).unwrap();
        let locks = CountingSemaphoreLocks::new(&shared_memory, &console);

        assert_every_print_counted(run_demo(&locks, &settings(LockingMode::SplitLocks)).unwrap());
        assert_eq!(console.num_available(), 1);
    }

    #[test]
    fn static_counting_semaphores() {
        static SHARED_MEMORY: StaticCountingSemaphore<1> = StaticCountingSemaphore::new();
        static CONSOLE: StaticCountingSemaphore<1> = StaticCountingSemaphore::new();
        let locks = CountingSemaphoreLocks::new(&SHARED_MEMORY, &CONSOLE);

        assert_every_print_counted(run_demo(&locks, &settings(LockingMode::SplitLocks)).unwrap());
    }

    #[test]
    fn invalid_semaphore_id_fails_the_demo() {
        let table = BinarySemaphoreTable::new();
        let locks = BinarySemaphoreLocks::new(&table, 40, 0);

        let err = run_demo(&locks, &settings(LockingMode::SplitLocks)).unwrap_err();
        assert_eq!(
            err.downcast_ref::<SemaphoreError>(),
            Some(&SemaphoreError::InvalidId(40))
        );
    }
}
