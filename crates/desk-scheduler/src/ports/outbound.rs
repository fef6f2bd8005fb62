//! Outbound ports
//!
//! The agent directory and the request store are remote services owned by
//! other teams. Infrastructure adapters implement these traits.

use async_trait::async_trait;

use crate::domain::{Agent, RequestLookup, SupportRequest, Table};

/// Agent directory port
#[async_trait]
pub trait AgentDirectory: Send + Sync {
    /// Agents tagged with `category`, or every agent when `None`.
    ///
    /// The result is a point-in-time snapshot; order is the directory's order.
    async fn find_agents(&self, category: Option<&str>) -> Result<Vec<Agent>, DirectoryError>;

    /// Single agent by id
    async fn get_agent(&self, agent_id: &str) -> Result<Agent, DirectoryError>;

    /// Replace an agent's tag set
    async fn update_tags(&self, agent_id: &str, tags: &[String]) -> Result<(), DirectoryError>;

    /// Provision a guest account for the requester, returning its id
    async fn create_guest(&self, request: &SupportRequest) -> Result<String, DirectoryError>;
}

/// Request store port
#[async_trait]
pub trait RequestStore: Send + Sync {
    /// Insert into the `new` table
    async fn add_new(&self, request: &SupportRequest) -> Result<(), StoreError>;

    /// Entire `new` backlog, oldest first
    async fn fetch_new(&self) -> Result<Vec<SupportRequest>, StoreError>;

    /// Delete from `from` and insert `request` into `to`. Not atomic.
    async fn move_request(
        &self,
        request: &SupportRequest,
        from: Table,
        to: Table,
    ) -> Result<(), StoreError>;

    /// Delete every row of the selected backlog tables
    async fn delete_all(&self, clear_new: bool, clear_scheduled: bool) -> Result<(), StoreError>;

    /// Find a single request, `None` when nothing matches
    async fn find(&self, lookup: &RequestLookup) -> Result<Option<SupportRequest>, StoreError>;

    /// The `scheduled` request currently bound to `agent_id`
    async fn find_bound(&self, agent_id: &str) -> Result<Option<SupportRequest>, StoreError>;

    /// Move a scheduled request to `completed`
    async fn close_request(&self, req_id: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum DirectoryError {
    #[error("agent not found: {0}")]
    AgentNotFound(String),

    #[error("directory rejected request: {0}")]
    Rejected(String),

    #[error("directory unreachable: {0}")]
    Unreachable(String),

    #[error("invalid directory response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for DirectoryError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::InvalidResponse(e.to_string())
        } else {
            Self::Unreachable(e.to_string())
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// The operation had no rows to act on
    #[error("nothing to delete")]
    NothingToDelete,

    #[error("request not found: {0}")]
    NotFound(String),

    #[error("store rejected request: {0}")]
    Rejected(String),

    #[error("store unreachable: {0}")]
    Unreachable(String),

    #[error("invalid store response: {0}")]
    InvalidResponse(String),
}

impl StoreError {
    /// Errors that mean there was simply nothing to act on
    pub fn is_benign_delete(&self) -> bool {
        matches!(self, Self::NothingToDelete)
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::InvalidResponse(e.to_string())
        } else {
            Self::Unreachable(e.to_string())
        }
    }
}
