//! Binary and counting semaphores for coordinating OS threads.
//!
//! [`BinarySemaphoreTable`] holds 32 independent binary semaphores addressed by id, with
//! a process-wide instance available through [`BinarySemaphoreTable::global`].
//! [`CountingSemaphore`] and [`StaticCountingSemaphore`] admit up to a fixed number of
//! concurrent holders. Blocked callers sleep on a condition variable, waking order among
//! contending threads is unspecified.
//!
//! The free functions at the crate root are the flat, C-like surface of the two
//! primitives: invalid binary ids are reported as `false`, and counting semaphores are
//! plain owned values.

pub mod binary;
pub mod counting;
pub mod errors;

pub use binary::{BinarySemaphoreGuard, BinarySemaphoreTable};
pub use config::{
    BinarySemaphoreIdType, ResourceCountType, BINARY_SEMAPHORES_COUNT, BINARY_SEMAPHORE_ID_MAX,
    BINARY_SEMAPHORE_ID_MIN,
};
pub use counting::{
    CountingSemaphore, CountingSemaphoreGuard, ResourceSemaphore, StaticCountingSemaphore,
};
pub use errors::SemaphoreError;

/// Reserves binary semaphore `id` of the process-wide table, blocking until it is free.
/// Returns false for ids outside `[0, 31]`.
pub fn binary_semaphore_take(id: BinarySemaphoreIdType) -> bool {
    BinarySemaphoreTable::global().take(id).is_ok()
}

/// Frees binary semaphore `id` of the process-wide table.
/// Returns false for ids outside `[0, 31]`.
pub fn binary_semaphore_release(id: BinarySemaphoreIdType) -> bool {
    BinarySemaphoreTable::global().release(id).is_ok()
}

pub fn counting_semaphore_create(
    capacity: ResourceCountType,
) -> Result<CountingSemaphore, SemaphoreError> {
    CountingSemaphore::new(capacity)
}

pub fn counting_semaphore_destroy(semaphore: CountingSemaphore) {
    semaphore.destroy()
}

pub fn counting_semaphore_num_reserved(semaphore: &CountingSemaphore) -> ResourceCountType {
    semaphore.num_reserved()
}

pub fn counting_semaphore_num_available(semaphore: &CountingSemaphore) -> ResourceCountType {
    semaphore.num_available()
}

pub fn counting_semaphore_take(semaphore: &CountingSemaphore) {
    semaphore.take()
}

pub fn counting_semaphore_release(semaphore: &CountingSemaphore) {
    semaphore.release()
}
