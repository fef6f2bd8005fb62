//! Endpoints shared by customers and agents

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use desk_scheduler::domain::ValidationError;
use desk_scheduler::{RequestLookup, SchedulerError};

use crate::models::*;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/closereq", get(close_request))
        .route("/reqstatus", get(request_status))
}

/// Complete a scheduled request and release its agent
#[utoipa::path(
    get,
    path = "/common/closereq",
    params(CloseParams),
    responses(
        (status = 200, description = "Request completed", body = ApiResponse),
        (status = 404, description = "No scheduled request with that id", body = ApiResponse)
    ),
    tag = "common"
)]
pub async fn close_request(
    State(desk): State<AppState>,
    Query(params): Query<CloseParams>,
) -> Result<Json<ApiResponse>, ApiError> {
    desk.close_request(&params.req_id, &params.agent_id).await?;
    Ok(Json(ApiResponse::success()))
}

/// Look a request up by agent id, request id or email
#[utoipa::path(
    get,
    path = "/common/reqstatus",
    params(StatusParams),
    responses(
        (status = 200, description = "Lookup result", body = RequestStatus),
        (status = 400, description = "No lookup key given", body = ApiResponse)
    ),
    tag = "common"
)]
pub async fn request_status(
    State(desk): State<AppState>,
    Query(params): Query<StatusParams>,
) -> Result<Json<RequestStatus>, ApiError> {
    let lookup = RequestLookup::first_of(params.agent_id, params.req_id, params.email).ok_or(
        SchedulerError::InvalidRequest(ValidationError::MissingField("agentId, reqId or email")),
    )?;

    let support_req = desk.request_status(&lookup).await?;
    Ok(Json(RequestStatus { active: support_req.is_some(), support_req }))
}
