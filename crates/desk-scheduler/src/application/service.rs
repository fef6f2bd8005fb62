//! Desk service: the inbound port implementation

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::application::cleanup::CleanupCoordinator;
use crate::application::matcher::MatchEngine;
use crate::application::scheduler::{SchedulerController, SchedulerSnapshot};
use crate::config::SchedulerConfig;
use crate::domain::{RequestLookup, SupportRequest};
use crate::error::SchedulerError;
use crate::ports::inbound::SchedulingUseCases;
use crate::ports::outbound::{AgentDirectory, RequestStore, StoreError};

pub struct DeskService {
    directory: Arc<dyn AgentDirectory>,
    store: Arc<dyn RequestStore>,
    scheduler: Arc<SchedulerController>,
    cleanup: Arc<CleanupCoordinator>,
}

impl DeskService {
    pub fn new(
        directory: Arc<dyn AgentDirectory>,
        store: Arc<dyn RequestStore>,
        config: SchedulerConfig,
    ) -> Self {
        let engine = Arc::new(MatchEngine::new(Arc::clone(&directory), Arc::clone(&store)));
        let scheduler = Arc::new(SchedulerController::new(
            engine,
            Arc::clone(&store),
            config.schedule_delay(),
            config.item_budget(),
        ));
        let cleanup = Arc::new(CleanupCoordinator::new(
            Arc::clone(&directory),
            Arc::clone(&store),
            config.item_budget(),
        ));

        Self { directory, store, scheduler, cleanup }
    }
}

#[async_trait]
impl SchedulingUseCases for DeskService {
    async fn submit(&self, mut request: SupportRequest) -> Result<SupportRequest, SchedulerError> {
        request.validate()?;
        request.req_id = Uuid::new_v4().to_string();
        request.req_time = Utc::now();
        request.agent_id = None;
        request.agent_name = None;

        let guest_id = self
            .directory
            .create_guest(&request)
            .await
            .map_err(SchedulerError::GuestProvisioningFailed)?;
        request.guest_id = Some(guest_id);

        self.store
            .add_new(&request)
            .await
            .map_err(SchedulerError::StoreTransitionFailed)?;
        tracing::info!(
            req_id = %request.req_id,
            category = %request.category,
            guest_id = ?request.guest_id,
            "support request received"
        );

        self.request_agent(request).await
    }

    async fn request_agent(
        &self,
        request: SupportRequest,
    ) -> Result<SupportRequest, SchedulerError> {
        let assignment = self.scheduler.request_agent(&request).await?;
        Ok(request.bound_to(&assignment.agent_id, &assignment.agent_name))
    }

    fn clear_requests(&self, clear_new: bool, clear_scheduled: bool) {
        let cleanup = Arc::clone(&self.cleanup);
        tokio::spawn(async move {
            cleanup.clear(clear_new, clear_scheduled).await;
        });
    }

    async fn untag_agent(&self, agent_id: &str) -> Result<(), SchedulerError> {
        self.cleanup.release_agent(agent_id).await
    }

    async fn close_request(&self, req_id: &str, agent_id: &str) -> Result<(), SchedulerError> {
        self.store.close_request(req_id).await.map_err(|e| match e {
            StoreError::NotFound(_) => SchedulerError::RequestNotFound(req_id.to_string()),
            other => SchedulerError::StoreTransitionFailed(other),
        })?;
        tracing::info!(req_id, agent_id, "support request closed");

        self.cleanup.release_agent(agent_id).await
    }

    async fn request_status(
        &self,
        lookup: &RequestLookup,
    ) -> Result<Option<SupportRequest>, SchedulerError> {
        self.store.find(lookup).await.map_err(SchedulerError::BacklogUnavailable)
    }

    async fn bound_request(
        &self,
        agent_id: &str,
    ) -> Result<Option<SupportRequest>, SchedulerError> {
        self.store.find_bound(agent_id).await.map_err(SchedulerError::BacklogUnavailable)
    }

    fn scheduler_status(&self) -> SchedulerSnapshot {
        self.scheduler.snapshot()
    }
}
