use crate::errors::SemaphoreError;
use config::{BinarySemaphoreIdType, BINARY_SEMAPHORE_ID_MAX};
use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};

static GLOBAL_TABLE: BinarySemaphoreTable = BinarySemaphoreTable::new();

/// A bank of 32 independent binary semaphores, stored as the bits of a single word.
///
/// A set bit means that the semaphore with the same index is reserved. There is no
/// ownership tracking: any thread may release a semaphore, even one it never took.
#[derive(Debug, Default)]
pub struct BinarySemaphoreTable {
    reserved_bits: Mutex<u32>,
    release_condvar: Condvar,
}

impl BinarySemaphoreTable {
    /// Creates a table with every semaphore free
    pub const fn new() -> Self {
        Self {
            reserved_bits: Mutex::new(0),
            release_condvar: Condvar::new(),
        }
    }

    /// The process-wide table, all free at startup and never destroyed
    pub fn global() -> &'static Self {
        &GLOBAL_TABLE
    }

    #[inline(always)]
    fn id_mask(id: BinarySemaphoreIdType) -> Result<u32, SemaphoreError> {
        if id > BINARY_SEMAPHORE_ID_MAX {
            Err(SemaphoreError::InvalidId(id))
        } else {
            Ok(1u32 << id)
        }
    }

    /// Reserves the semaphore `id`, blocking until it is free.
    /// Invalid ids fail immediately without touching the table.
    pub fn take(&self, id: BinarySemaphoreIdType) -> Result<(), SemaphoreError> {
        let mask = Self::id_mask(id)?;
        let mut bits = self.reserved_bits.lock();
        while *bits & mask != 0 {
            self.release_condvar.wait(&mut bits);
        }
        *bits |= mask;
        Ok(())
    }

    /// Reserves the semaphore `id` only if it is currently free
    pub fn try_take(&self, id: BinarySemaphoreIdType) -> Result<bool, SemaphoreError> {
        let mask = Self::id_mask(id)?;
        let mut bits = self.reserved_bits.lock();
        if *bits & mask != 0 {
            return Ok(false);
        }
        *bits |= mask;
        Ok(true)
    }

    /// Like [`take`](Self::take), but gives up after `timeout`.
    /// Returns whether the semaphore was reserved.
    pub fn take_timeout(
        &self,
        id: BinarySemaphoreIdType,
        timeout: Duration,
    ) -> Result<bool, SemaphoreError> {
        let mask = Self::id_mask(id)?;

        let Some(deadline) = Instant::now().checked_add(timeout) else {
            self.take(id)?;
            return Ok(true);
        };

        let mut bits = self.reserved_bits.lock();
        while *bits & mask != 0 {
            if self
                .release_condvar
                .wait_until(&mut bits, deadline)
                .timed_out()
                && *bits & mask != 0
            {
                return Ok(false);
            }
        }
        *bits |= mask;
        Ok(true)
    }

    /// Frees the semaphore `id`. Releasing a free semaphore is allowed and has no effect.
    pub fn release(&self, id: BinarySemaphoreIdType) -> Result<(), SemaphoreError> {
        let mask = Self::id_mask(id)?;
        *self.reserved_bits.lock() &= !mask;
        // Waiters for different ids share the condvar, wake all of them to recheck their bit
        self.release_condvar.notify_all();
        Ok(())
    }

    /// Takes the semaphore `id` and releases it when the returned guard is dropped
    pub fn lock(
        &self,
        id: BinarySemaphoreIdType,
    ) -> Result<BinarySemaphoreGuard<'_>, SemaphoreError> {
        self.take(id)?;
        Ok(BinarySemaphoreGuard { table: self, id })
    }

    pub fn is_reserved(&self, id: BinarySemaphoreIdType) -> Result<bool, SemaphoreError> {
        let mask = Self::id_mask(id)?;
        Ok(*self.reserved_bits.lock() & mask != 0)
    }

    pub fn reserved_mask(&self) -> u32 {
        *self.reserved_bits.lock()
    }
}

#[must_use = "the semaphore is released as soon as the guard is dropped"]
pub struct BinarySemaphoreGuard<'a> {
    table: &'a BinarySemaphoreTable,
    id: BinarySemaphoreIdType,
}

impl BinarySemaphoreGuard<'_> {
    pub fn id(&self) -> BinarySemaphoreIdType {
        self.id
    }
}

impl Drop for BinarySemaphoreGuard<'_> {
    fn drop(&mut self) {
        // The id was validated when the guard was created
        let _ = self.table.release(self.id);
    }
}
