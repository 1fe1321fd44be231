//! Cooperative cancellation token.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::errors::{PagResult, SearchError};

/// Checked by long-running stages (skeleton depths, orientation passes,
/// latent seeds, bootstrap runs) between units of work.
pub trait Cancellable {
    /// Check if cancellation has been requested.
    fn is_cancelled(&self) -> bool;

    /// Request cancellation.
    fn cancel(&self);

    /// `Err(Cancelled)` naming `stage` if cancellation was requested.
    fn check(&self, stage: &str) -> PagResult<()> {
        if self.is_cancelled() {
            Err(SearchError::Cancelled {
                stage: stage.to_string(),
            }
            .into())
        } else {
            Ok(())
        }
    }
}

/// Shared flag; clones observe the same cancellation.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new cancellation token (not cancelled).
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl Cancellable for CancellationToken {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}
