//! Queue Drainer
//!
//! Matches a batch strictly in order, one request at a time, and stops at the
//! first request that cannot be matched within its budget.

use std::sync::Arc;
use std::time::Duration;

use crate::application::budget::ItemBudget;
use crate::application::matcher::MatchEngine;
use crate::domain::{Assignment, SupportRequest};
use crate::error::SchedulerError;

/// Partial failure: everything before `failed_req_id` was matched
#[derive(Debug, Clone, thiserror::Error)]
#[error("drain stopped at request {failed_req_id} after {count} matches: {source}", count = .matched.len())]
pub struct DrainError {
    pub matched: Vec<Assignment>,
    pub failed_req_id: String,
    pub source: SchedulerError,
}

pub struct QueueDrainer {
    engine: Arc<MatchEngine>,
    item_budget: Duration,
}

impl QueueDrainer {
    pub fn new(engine: Arc<MatchEngine>, item_budget: Duration) -> Self {
        Self { engine, item_budget }
    }

    pub async fn drain(
        &self,
        requests: Vec<SupportRequest>,
    ) -> Result<Vec<Assignment>, DrainError> {
        let budget = ItemBudget::new(self.item_budget);
        let mut matched = Vec::with_capacity(requests.len());

        for request in requests {
            let engine = Arc::clone(&self.engine);
            let item = request.clone();
            match budget.run(async move { engine.match_one(&item).await }).await {
                Ok(assignment) => matched.push(assignment),
                Err(source) => {
                    tracing::debug!(
                        req_id = %request.req_id,
                        matched = matched.len(),
                        error = %source,
                        "drain stopped"
                    );
                    return Err(DrainError { matched, failed_req_id: request.req_id, source });
                }
            }
        }

        Ok(matched)
    }
}
