//! Cleanup Coordinator
//!
//! Administrative reset: empties backlog tables and releases every busy
//! agent. Best-effort; one stuck agent never blocks the others.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::application::budget::ItemBudget;
use crate::error::SchedulerError;
use crate::ports::outbound::{AgentDirectory, RequestStore};

/// Outcome of one cleanup run, for logging and tests
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupReport {
    pub released: Vec<String>,
    pub failed: Vec<String>,
    /// The store delete failed and nothing else was attempted
    pub aborted: bool,
}

pub struct CleanupCoordinator {
    directory: Arc<dyn AgentDirectory>,
    store: Arc<dyn RequestStore>,
    item_budget: Duration,
}

impl CleanupCoordinator {
    pub fn new(
        directory: Arc<dyn AgentDirectory>,
        store: Arc<dyn RequestStore>,
        item_budget: Duration,
    ) -> Self {
        Self { directory, store, item_budget }
    }

    pub async fn clear(&self, clear_new: bool, clear_scheduled: bool) -> CleanupReport {
        let mut report = CleanupReport::default();

        if let Err(e) = self.store.delete_all(clear_new, clear_scheduled).await {
            if e.is_benign_delete() {
                tracing::debug!(clear_new, clear_scheduled, "no rows to delete");
            } else {
                tracing::error!(error = %e, "cleanup aborted: backlog delete failed");
                report.aborted = true;
                return report;
            }
        }

        let agents = match self.directory.find_agents(None).await {
            Ok(agents) => agents,
            Err(e) => {
                tracing::error!(error = %e, "cleanup could not list agents");
                return report;
            }
        };

        let budget = ItemBudget::new(self.item_budget);
        for agent in agents.into_iter().filter(|a| a.is_busy()) {
            let directory = Arc::clone(&self.directory);
            let agent_id = agent.id.clone();
            let tags = agent.tags_without_busy();

            let outcome = budget
                .run(async move {
                    directory
                        .update_tags(&agent_id, &tags)
                        .await
                        .map_err(SchedulerError::DirectoryUpdateFailed)
                })
                .await;

            match outcome {
                Ok(()) => report.released.push(agent.id),
                Err(e) => {
                    tracing::warn!(
                        agent_id = %agent.id,
                        error = %e,
                        "could not release agent, continuing"
                    );
                    report.failed.push(agent.id);
                }
            }
        }

        tracing::info!(
            released = report.released.len(),
            failed = report.failed.len(),
            "cleanup finished"
        );
        report
    }

    /// Remove the busy tag from one agent; a no-op when it is not busy
    pub async fn release_agent(&self, agent_id: &str) -> Result<(), SchedulerError> {
        let agent = self
            .directory
            .get_agent(agent_id)
            .await
            .map_err(SchedulerError::DirectoryQueryFailed)?;

        if !agent.is_busy() {
            return Ok(());
        }

        self.directory
            .update_tags(&agent.id, &agent.tags_without_busy())
            .await
            .map_err(SchedulerError::DirectoryUpdateFailed)?;

        tracing::info!(agent_id = %agent.id, "agent released");
        Ok(())
    }
}
