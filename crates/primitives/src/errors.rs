use config::{BinarySemaphoreIdType, BINARY_SEMAPHORE_ID_MAX};
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SemaphoreError {
    #[error("invalid binary semaphore id {0} (expected <= {max})", max = BINARY_SEMAPHORE_ID_MAX)]
    InvalidId(BinarySemaphoreIdType),
    #[error("a counting semaphore needs at least one resource")]
    InvalidCapacity,
}
