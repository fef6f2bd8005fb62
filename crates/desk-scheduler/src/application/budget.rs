//! Per-item wall-clock budget
//!
//! Each item runs as its own task. When the budget elapses the task is
//! aborted and the epoch advances, so a result that still completes after
//! expiry is dropped instead of being attributed to the next item.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::error::SchedulerError;

pub struct ItemBudget {
    limit: Duration,
    epoch: Arc<AtomicU64>,
}

impl ItemBudget {
    pub fn new(limit: Duration) -> Self {
        Self { limit, epoch: Arc::new(AtomicU64::new(0)) }
    }

    /// Run `work` for at most the budget
    pub async fn run<F, T>(&self, work: F) -> Result<T, SchedulerError>
    where
        F: Future<Output = Result<T, SchedulerError>> + Send + 'static,
        T: Send + 'static,
    {
        let generation = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        let epoch = Arc::clone(&self.epoch);

        let mut handle = tokio::spawn(async move {
            let outcome = work.await;
            if epoch.load(Ordering::SeqCst) != generation {
                tracing::debug!(generation, "discarding result that arrived after its budget");
                return None;
            }
            Some(outcome)
        });

        match tokio::time::timeout(self.limit, &mut handle).await {
            Ok(Ok(Some(outcome))) => outcome,
            Ok(Ok(None)) => Err(SchedulerError::BudgetExceeded(self.limit)),
            Ok(Err(e)) => Err(SchedulerError::TaskAborted(e.to_string())),
            Err(_) => {
                self.epoch.fetch_add(1, Ordering::SeqCst);
                handle.abort();
                tracing::warn!(budget = ?self.limit, "item budget exceeded, abandoning work");
                Err(SchedulerError::BudgetExceeded(self.limit))
            }
        }
    }
}
