//! Match Engine
//!
//! Binds one pending request to the first free agent of its category.
//!
//! Step order is select → store move → directory tag. A store failure
//! therefore never leaves an agent tagged busy; a tag failure after the move
//! leaves the request `scheduled` while the directory still shows the agent
//! free. That window is not compensated here; cleanup reconciles it.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{Assignment, SupportRequest, Table};
use crate::error::SchedulerError;
use crate::ports::outbound::{AgentDirectory, RequestStore};

pub struct MatchEngine {
    directory: Arc<dyn AgentDirectory>,
    store: Arc<dyn RequestStore>,
    /// Serializes matches so two requests never pick from the same snapshot
    gate: Mutex<()>,
}

impl MatchEngine {
    pub fn new(directory: Arc<dyn AgentDirectory>, store: Arc<dyn RequestStore>) -> Self {
        Self { directory, store, gate: Mutex::new(()) }
    }

    pub async fn match_one(&self, request: &SupportRequest) -> Result<Assignment, SchedulerError> {
        let _gate = self.gate.lock().await;

        let candidates = self
            .directory
            .find_agents(Some(&request.category))
            .await
            .map_err(SchedulerError::DirectoryQueryFailed)?;

        let agent = candidates
            .into_iter()
            .find(|a| !a.is_busy())
            .ok_or_else(|| SchedulerError::NoAvailableAgent(request.category.clone()))?;

        let bound = request.bound_to(&agent.id, &agent.display_name);
        self.store
            .move_request(&bound, Table::New, Table::Scheduled)
            .await
            .map_err(SchedulerError::StoreTransitionFailed)?;

        if let Err(e) = self.directory.update_tags(&agent.id, &agent.tags_with_busy()).await {
            tracing::warn!(
                req_id = %request.req_id,
                agent_id = %agent.id,
                error = %e,
                "request scheduled but agent could not be tagged busy"
            );
            return Err(SchedulerError::DirectoryUpdateFailed(e));
        }

        tracing::info!(
            req_id = %request.req_id,
            agent_id = %agent.id,
            agent_name = %agent.display_name,
            "agent assigned"
        );

        Ok(Assignment {
            req_id: request.req_id.clone(),
            agent_id: agent.id,
            agent_name: agent.display_name,
            guest_id: request.guest_id.clone(),
        })
    }
}
