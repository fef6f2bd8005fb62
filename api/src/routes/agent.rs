//! Agent console endpoints

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use desk_scheduler::SchedulerError;
use serde_json::{json, Value};

use crate::models::*;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/checkforrequest/:agent_id", get(check_for_request))
}

/// Scheduled request currently bound to an agent
#[utoipa::path(
    get,
    path = "/agent/checkforrequest/{agent_id}",
    params(("agent_id" = String, Path, description = "Directory agent id")),
    responses(
        (status = 200, description = "Bound request as `{suppReq}`"),
        (status = 404, description = "Nothing bound to this agent", body = ApiResponse)
    ),
    tag = "agent"
)]
pub async fn check_for_request(
    State(desk): State<AppState>,
    Path(agent_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let supp_req = desk
        .bound_request(&agent_id)
        .await?
        .ok_or(SchedulerError::RequestNotFound(format!("no request for agent {}", agent_id)))?;
    Ok(Json(json!({ "suppReq": supp_req })))
}
