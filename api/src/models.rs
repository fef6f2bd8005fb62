//! API Models

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use desk_scheduler::{SchedulerError, SchedulerSnapshot, SupportRequest};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Acknowledgement / error envelope
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorResponse>,
}

impl ApiResponse {
    pub fn success() -> Self {
        Self { success: true, error: None }
    }

    pub fn error(code: &str, message: &str) -> Self {
        Self {
            success: false,
            error: Some(ErrorResponse {
                code: code.to_string(),
                message: message.to_string(),
            }),
        }
    }
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

// ============ Support requests ============

/// `{support_req: ...}` body used by intake and scheduling
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SupportReqEnvelope {
    #[schema(value_type = Object)]
    pub support_req: SupportRequest,
}

/// Request status lookup result
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RequestStatus {
    #[schema(value_type = Option<Object>)]
    pub support_req: Option<SupportRequest>,
    pub active: bool,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CloseParams {
    pub req_id: String,
    pub agent_id: String,
}

/// Lookup keys; the first present of agentId, reqId, email wins
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct StatusParams {
    pub req_id: Option<String>,
    pub agent_id: Option<String>,
    pub email: Option<String>,
}

/// Tables selected for a cleanup; both default to true
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ClearParams {
    #[serde(default = "default_true")]
    pub neww: bool,
    #[serde(default = "default_true")]
    pub scheduled: bool,
}

fn default_true() -> bool {
    true
}

// ============ Scheduler ============

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerStatus {
    pub scheduling: bool,
    pub pending_more: bool,
    pub cycles_run: u64,
}

impl From<SchedulerSnapshot> for SchedulerStatus {
    fn from(s: SchedulerSnapshot) -> Self {
        Self {
            scheduling: s.scheduling,
            pending_more: s.pending_more,
            cycles_run: s.cycles_run,
        }
    }
}

// ============ Errors ============

/// Scheduler failure rendered as a non-2xx response
#[derive(Debug)]
pub struct ApiError(pub SchedulerError);

impl From<SchedulerError> for ApiError {
    fn from(e: SchedulerError) -> Self {
        Self(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            SchedulerError::SchedulerBusy => StatusCode::SERVICE_UNAVAILABLE,
            SchedulerError::NoAvailableAgent(_) => StatusCode::CONFLICT,
            SchedulerError::BudgetExceeded(_) => StatusCode::GATEWAY_TIMEOUT,
            SchedulerError::StoreTransitionFailed(_)
            | SchedulerError::DirectoryUpdateFailed(_)
            | SchedulerError::DirectoryQueryFailed(_)
            | SchedulerError::GuestProvisioningFailed(_)
            | SchedulerError::BacklogUnavailable(_) => StatusCode::BAD_GATEWAY,
            SchedulerError::RequestNotFound(_) => StatusCode::NOT_FOUND,
            SchedulerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            SchedulerError::TaskAborted(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(error = %self.0, %status, "request failed");
        }
        let body = ApiResponse::error(self.0.code(), &self.0.to_string());
        (status, Json(body)).into_response()
    }
}
