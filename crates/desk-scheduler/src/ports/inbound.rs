//! Inbound ports
//!
//! Use cases the HTTP surface drives.

use async_trait::async_trait;

use crate::application::SchedulerSnapshot;
use crate::domain::{RequestLookup, SupportRequest};
use crate::error::SchedulerError;

#[async_trait]
pub trait SchedulingUseCases: Send + Sync {
    /// Validate, provision a guest, persist into `new`, then try to bind an agent immediately
    async fn submit(&self, request: SupportRequest) -> Result<SupportRequest, SchedulerError>;

    /// Bind an agent to a request already in `new`
    async fn request_agent(&self, request: SupportRequest)
        -> Result<SupportRequest, SchedulerError>;

    /// Start a cleanup in the background and return immediately
    fn clear_requests(&self, clear_new: bool, clear_scheduled: bool);

    /// Remove the busy tag from one agent
    async fn untag_agent(&self, agent_id: &str) -> Result<(), SchedulerError>;

    /// Complete a scheduled request and release its agent
    async fn close_request(&self, req_id: &str, agent_id: &str) -> Result<(), SchedulerError>;

    async fn request_status(
        &self,
        lookup: &RequestLookup,
    ) -> Result<Option<SupportRequest>, SchedulerError>;

    /// Request an agent is currently serving, if any
    async fn bound_request(&self, agent_id: &str)
        -> Result<Option<SupportRequest>, SchedulerError>;

    fn scheduler_status(&self) -> SchedulerSnapshot;
}
