use crate::errors::SemaphoreError;
use config::ResourceCountType;
use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// Common interface of the counting semaphores, whether the capacity is chosen at runtime
/// or at compile time
pub trait ResourceSemaphore: Send + Sync {
    fn capacity(&self) -> ResourceCountType;
    fn num_reserved(&self) -> ResourceCountType;

    fn num_available(&self) -> ResourceCountType {
        self.capacity() - self.num_reserved()
    }

    /// Reserves one resource, blocking while all of them are reserved
    fn take(&self);
    fn try_take(&self) -> bool;
    /// Like [`take`](Self::take), but gives up after `timeout`
    fn take_timeout(&self, timeout: Duration) -> bool;

    /// Frees one resource, does nothing if no resource is reserved
    fn release(&self);

    fn lock(&self) -> CountingSemaphoreGuard<'_, Self>
    where
        Self: Sized,
    {
        self.take();
        CountingSemaphoreGuard { semaphore: self }
    }
}

#[derive(Debug)]
struct ReservedCounter {
    reserved: Mutex<ResourceCountType>,
    condvar: Condvar,
}

impl ReservedCounter {
    const fn new() -> Self {
        Self {
            reserved: Mutex::new(0),
            condvar: Condvar::new(),
        }
    }

    fn reserved(&self) -> ResourceCountType {
        *self.reserved.lock()
    }

    fn take(&self, capacity: ResourceCountType) {
        let mut reserved = self.reserved.lock();
        while *reserved >= capacity {
            self.condvar.wait(&mut reserved);
        }
        *reserved += 1;
    }

    fn try_take(&self, capacity: ResourceCountType) -> bool {
        let mut reserved = self.reserved.lock();
        if *reserved >= capacity {
            return false;
        }
        *reserved += 1;
        true
    }

    fn take_timeout(&self, capacity: ResourceCountType, timeout: Duration) -> bool {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            self.take(capacity);
            return true;
        };

        let mut reserved = self.reserved.lock();
        while *reserved >= capacity {
            if self.condvar.wait_until(&mut reserved, deadline).timed_out() && *reserved >= capacity
            {
                return false;
            }
        }
        *reserved += 1;
        true
    }

    fn release(&self) {
        let mut reserved = self.reserved.lock();
        if *reserved > 0 {
            *reserved -= 1;
            drop(reserved);
            self.condvar.notify_one();
        }
    }
}

/// Counting semaphore with a capacity chosen at creation time
#[derive(Debug)]
pub struct CountingSemaphore {
    capacity: ResourceCountType,
    counter: ReservedCounter,
}

impl CountingSemaphore {
    pub fn new(capacity: ResourceCountType) -> Result<Self, SemaphoreError> {
        if capacity == 0 {
            return Err(SemaphoreError::InvalidCapacity);
        }
        Ok(Self {
            capacity,
            counter: ReservedCounter::new(),
        })
    }

    /// Consumes the semaphore. Outstanding guards keep it borrowed, so this cannot
    /// happen while a resource is held through [`lock`](ResourceSemaphore::lock).
    pub fn destroy(self) {}
}

impl ResourceSemaphore for CountingSemaphore {
    #[inline(always)]
    fn capacity(&self) -> ResourceCountType {
        self.capacity
    }

    fn num_reserved(&self) -> ResourceCountType {
        self.counter.reserved()
    }

    fn take(&self) {
        self.counter.take(self.capacity)
    }

    fn try_take(&self) -> bool {
        self.counter.try_take(self.capacity)
    }

    fn take_timeout(&self, timeout: Duration) -> bool {
        self.counter.take_timeout(self.capacity, timeout)
    }

    fn release(&self) {
        self.counter.release()
    }
}

/// Counting semaphore with a compile-time capacity, usable as a `static`.
///
/// A zero capacity is rejected when the semaphore is constructed.
///
/// ```
/// use semsync_primitives::{ResourceSemaphore, StaticCountingSemaphore};
///
/// static WORKERS: StaticCountingSemaphore<4> = StaticCountingSemaphore::new();
///
/// let _guard = WORKERS.lock();
/// assert_eq!(WORKERS.num_available(), 3);
/// ```
///
/// ```compile_fail
/// use semsync_primitives::StaticCountingSemaphore;
///
/// static EMPTY: StaticCountingSemaphore<0> = StaticCountingSemaphore::new();
/// ```
#[derive(Debug)]
pub struct StaticCountingSemaphore<const CAPACITY: ResourceCountType> {
    counter: ReservedCounter,
}

impl<const CAPACITY: ResourceCountType> StaticCountingSemaphore<CAPACITY> {
    const NON_ZERO_CAPACITY: () = assert!(
        CAPACITY > 0,
        "The number of resources for a counting semaphore cannot be 0!"
    );

    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::NON_ZERO_CAPACITY;
        Self {
            counter: ReservedCounter::new(),
        }
    }
}

impl<const CAPACITY: ResourceCountType> Default for StaticCountingSemaphore<CAPACITY> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const CAPACITY: ResourceCountType> ResourceSemaphore for StaticCountingSemaphore<CAPACITY> {
    #[inline(always)]
    fn capacity(&self) -> ResourceCountType {
        CAPACITY
    }

    fn num_reserved(&self) -> ResourceCountType {
        self.counter.reserved()
    }

    fn take(&self) {
        self.counter.take(CAPACITY)
    }

    fn try_take(&self) -> bool {
        self.counter.try_take(CAPACITY)
    }

    fn take_timeout(&self, timeout: Duration) -> bool {
        self.counter.take_timeout(CAPACITY, timeout)
    }

    fn release(&self) {
        self.counter.release()
    }
}

#[must_use = "the resource is released as soon as the guard is dropped"]
pub struct CountingSemaphoreGuard<'a, S: ResourceSemaphore> {
    semaphore: &'a S,
}

impl<S: ResourceSemaphore> Drop for CountingSemaphoreGuard<'_, S> {
    fn drop(&mut self) {
        self.semaphore.release();
    }
}
