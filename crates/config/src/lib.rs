use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

pub type BinarySemaphoreIdType = u8;
pub type ResourceCountType = u16;
pub type PrintCounterType = u16;

/// The number of binary semaphores in the process-wide table, one per bit of a u32
pub const BINARY_SEMAPHORES_COUNT: usize = 32;
pub const BINARY_SEMAPHORE_ID_MIN: BinarySemaphoreIdType = 0;
pub const BINARY_SEMAPHORE_ID_MAX: BinarySemaphoreIdType = (BINARY_SEMAPHORES_COUNT - 1) as u8;

// Binary semaphore ids reserved by the demos
pub const CONSOLE_SEMAPHORE_ID: BinarySemaphoreIdType = 0;
pub const SHARED_MEMORY_SEMAPHORE_ID: BinarySemaphoreIdType = 1;

pub const DEFAULT_THREADS_COUNT: u16 = 2;
pub const DEFAULT_PRINT_INTERVAL_MS: u64 = 1000;

/// Time a worker keeps the console reserved after printing, so the output is flushed
/// before another thread can write
pub const DEFAULT_CONSOLE_HOLD_TIME_MS: u64 = 10;

/// Lower bound for the sleep between two prints of the same worker
pub const MIN_PRINT_INTERVAL_MS: u64 = 10;

pub const BANNER_WIDTH: usize = 80;

// Functions depending on global config parameters set at runtime
pub static CONSOLE_HOLD_TIME_MS: AtomicU64 = AtomicU64::new(DEFAULT_CONSOLE_HOLD_TIME_MS);

pub fn get_console_hold_time() -> Duration {
    Duration::from_millis(CONSOLE_HOLD_TIME_MS.load(Ordering::Relaxed))
}
