//! Batch admission control
//!
//! Bounds how many conversion batches run at once. Requests beyond the limit are turned away
//! immediately instead of queueing behind converters that may take minutes.

use std::sync::Arc;

use docbatch_core::{AppError, Config};
use tokio::sync::{OwnedSemaphorePermit, Semaphore, TryAcquireError};

#[derive(Clone, Debug)]
pub struct BatchAdmission {
    semaphore: Arc<Semaphore>,
    limit: usize,
}

/// Held for the lifetime of one admitted batch; dropping it frees the slot.
#[derive(Debug)]
pub struct BatchPermit {
    _permit: OwnedSemaphorePermit,
}

impl BatchAdmission {
    pub fn new(limit: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(limit)),
            limit,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.max_concurrent_batches())
    }

    /// Take a slot without waiting, or fail with [`AppError::Overloaded`].
    pub fn try_admit(&self) -> Result<BatchPermit, AppError> {
        match self.semaphore.clone().try_acquire_owned() {
            Ok(permit) => Ok(BatchPermit { _permit: permit }),
            Err(TryAcquireError::NoPermits) => {
                tracing::warn!(limit = self.limit, "Batch rejected, all slots busy");
                Err(AppError::Overloaded(format!(
                    "{} conversion batches already in progress, retry shortly",
                    self.limit
                )))
            }
            Err(TryAcquireError::Closed) => {
                Err(AppError::Internal("batch admission closed".to_string()))
            }
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn in_flight(&self) -> usize {
        self.limit
            .saturating_sub(self.semaphore.available_permits())
    }
}
