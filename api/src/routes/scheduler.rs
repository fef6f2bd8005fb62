//! Scheduler endpoints
//!
//! Used by intake and by the close-request flow.

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::models::*;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/reqagent", post(request_agent))
        .route("/clearreqs", get(clear_requests))
        .route("/untagagent/:agent_id", get(untag_agent))
        .route("/status", get(status))
}

/// Bind an agent to a request already in the `new` table
#[utoipa::path(
    post,
    path = "/scheduler/reqagent",
    request_body = SupportReqEnvelope,
    responses(
        (status = 200, description = "Agent bound", body = SupportReqEnvelope),
        (status = 409, description = "No free agent for the category", body = ApiResponse),
        (status = 502, description = "Store or directory failure", body = ApiResponse),
        (status = 503, description = "Drain in progress, retry later", body = ApiResponse)
    ),
    tag = "scheduler"
)]
pub async fn request_agent(
    State(desk): State<AppState>,
    Json(body): Json<SupportReqEnvelope>,
) -> Result<Json<SupportReqEnvelope>, ApiError> {
    let support_req = desk.request_agent(body.support_req).await?;
    Ok(Json(SupportReqEnvelope { support_req }))
}

/// Empty backlog tables and release every busy agent
///
/// Returns immediately; the cleanup runs in the background.
#[utoipa::path(
    get,
    path = "/scheduler/clearreqs",
    params(ClearParams),
    responses((status = 200, description = "Cleanup started")),
    tag = "scheduler"
)]
pub async fn clear_requests(
    State(desk): State<AppState>,
    Query(params): Query<ClearParams>,
) -> Json<Value> {
    desk.clear_requests(params.neww, params.scheduled);
    Json(json!({}))
}

#[utoipa::path(
    get,
    path = "/scheduler/untagagent/{agent_id}",
    params(("agent_id" = String, Path, description = "Directory agent id")),
    responses(
        (status = 200, description = "Agent released", body = ApiResponse),
        (status = 502, description = "Directory failure", body = ApiResponse)
    ),
    tag = "scheduler"
)]
pub async fn untag_agent(
    State(desk): State<AppState>,
    Path(agent_id): Path<String>,
) -> Result<Json<ApiResponse>, ApiError> {
    desk.untag_agent(&agent_id).await?;
    Ok(Json(ApiResponse::success()))
}

#[utoipa::path(
    get,
    path = "/scheduler/status",
    responses((status = 200, description = "Scheduler state", body = SchedulerStatus)),
    tag = "scheduler"
)]
pub async fn status(State(desk): State<AppState>) -> Json<SchedulerStatus> {
    Json(desk.scheduler_status().into())
}
