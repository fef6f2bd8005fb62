//! Customer-facing intake

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};

use crate::models::*;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/newsupportreq", post(new_support_request))
}

/// Submit a support request
///
/// A guest account is provisioned for the requester, then the request is
/// stored in `new` and matched right away when an agent is
/// free. Otherwise it stays queued for the background drain and the error is
/// returned.
#[utoipa::path(
    post,
    path = "/user/newsupportreq",
    request_body = SupportReqEnvelope,
    responses(
        (status = 200, description = "Request stored and bound to an agent", body = SupportReqEnvelope),
        (status = 400, description = "Missing or malformed fields", body = ApiResponse),
        (status = 409, description = "Queued; no free agent yet", body = ApiResponse),
        (status = 502, description = "Guest provisioning or store failure", body = ApiResponse),
        (status = 503, description = "Queued; drain in progress", body = ApiResponse)
    ),
    tag = "user"
)]
pub async fn new_support_request(
    State(desk): State<AppState>,
    Json(body): Json<SupportReqEnvelope>,
) -> Result<Json<SupportReqEnvelope>, ApiError> {
    let support_req = desk.submit(body.support_req).await?;
    Ok(Json(SupportReqEnvelope { support_req }))
}
