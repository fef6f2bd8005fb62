//! Error types for the scheduler

use std::time::Duration;
use thiserror::Error;

use crate::domain::ValidationError;
use crate::ports::{DirectoryError, StoreError};

/// Scheduling failure taxonomy
#[derive(Error, Debug, Clone)]
pub enum SchedulerError {
    /// No candidate for the category is free of the busy tag
    #[error("no available agent for category '{0}'")]
    NoAvailableAgent(String),

    /// The store refused to move the request between tables
    #[error("store transition failed: {0}")]
    StoreTransitionFailed(StoreError),

    /// The directory refused the busy tag write
    #[error("directory update failed: {0}")]
    DirectoryUpdateFailed(DirectoryError),

    /// The directory could not create a guest account for the requester
    #[error("guest provisioning failed: {0}")]
    GuestProvisioningFailed(DirectoryError),

    /// Candidate agents could not be fetched
    #[error("directory query failed: {0}")]
    DirectoryQueryFailed(DirectoryError),

    /// A drain cycle is active; retry later
    #[error("scheduler busy")]
    SchedulerBusy,

    /// Per-item budget elapsed before the match settled
    #[error("budget of {0:?} exceeded")]
    BudgetExceeded(Duration),

    /// The backlog or a single record could not be read from the store
    #[error("request store unavailable: {0}")]
    BacklogUnavailable(StoreError),

    #[error("request not found: {0}")]
    RequestNotFound(String),

    #[error("invalid request: {0}")]
    InvalidRequest(#[from] ValidationError),

    /// Spawned work panicked or was cancelled for a reason other than the budget
    #[error("task aborted: {0}")]
    TaskAborted(String),
}

impl SchedulerError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoAvailableAgent(_) => "NO_AVAILABLE_AGENT",
            Self::StoreTransitionFailed(_) => "STORE_TRANSITION_FAILED",
            Self::DirectoryUpdateFailed(_) => "DIRECTORY_UPDATE_FAILED",
            Self::DirectoryQueryFailed(_) => "DIRECTORY_QUERY_FAILED",
            Self::GuestProvisioningFailed(_) => "GUEST_PROVISIONING_FAILED",
            Self::SchedulerBusy => "SCHEDULER_BUSY",
            Self::BudgetExceeded(_) => "BUDGET_EXCEEDED",
            Self::BacklogUnavailable(_) => "STORE_UNAVAILABLE",
            Self::RequestNotFound(_) => "REQUEST_NOT_FOUND",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::TaskAborted(_) => "TASK_ABORTED",
        }
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
