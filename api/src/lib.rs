//! OpenDesk HTTP API
//!
//! Thin axum surface over the scheduling use cases.
//!
//! ```text
//! /user/newsupportreq        intake: store + immediate match
//! /scheduler/reqagent        match a stored request
//! /scheduler/clearreqs       background cleanup
//! /scheduler/untagagent/:id  release one agent
//! /scheduler/status          drain loop state
//! /common/closereq           complete + release
//! /common/reqstatus          lookup by agentId | reqId | email
//! /agent/checkforrequest/:id request bound to an agent
//! /health
//! ```

pub mod models;
pub mod routes;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use desk_scheduler::SchedulingUseCases;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use models::*;

/// Shared handler state
pub type AppState = Arc<dyn SchedulingUseCases>;

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "OpenDesk API",
        version = "1.0.0",
        description = "Support request intake and agent scheduling",
        license(name = "Apache-2.0")
    ),
    paths(
        routes::health::health,
        routes::user::new_support_request,
        routes::scheduler::request_agent,
        routes::scheduler::clear_requests,
        routes::scheduler::untag_agent,
        routes::scheduler::status,
        routes::common::close_request,
        routes::common::request_status,
        routes::agent::check_for_request,
    ),
    components(
        schemas(
            ApiResponse, ErrorResponse,
            SupportReqEnvelope, RequestStatus, SchedulerStatus,
            routes::health::HealthResponse
        )
    ),
    tags(
        (name = "health", description = "Liveness"),
        (name = "user", description = "Customer intake"),
        (name = "scheduler", description = "Agent matching and release"),
        (name = "common", description = "Request lifecycle"),
        (name = "agent", description = "Agent console")
    )
)]
pub struct ApiDoc;

/// Build the API router
pub fn build_router(desk: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(routes::health::health))
        .nest("/user", routes::user::router())
        .nest("/scheduler", routes::scheduler::router())
        .nest("/common", routes::common::router())
        .nest("/agent", routes::agent::router())
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(desk)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use desk_scheduler::{
        Agent, DeskService, InMemoryAgentDirectory, InMemoryRequestStore, SchedulerConfig,
        SupportRequest, Table,
    };
    use serde_json::{json, Value};
    use std::time::Duration;

    struct Harness {
        server: TestServer,
        directory: Arc<InMemoryAgentDirectory>,
        store: Arc<InMemoryRequestStore>,
    }

    fn harness(agents: Vec<Agent>) -> Harness {
        let directory = Arc::new(InMemoryAgentDirectory::with_agents(agents));
        let store = Arc::new(InMemoryRequestStore::new());
        let desk = DeskService::new(directory.clone(), store.clone(), SchedulerConfig::default());
        let server = TestServer::new(build_router(Arc::new(desk))).unwrap();
        Harness { server, directory, store }
    }

    fn intake_body(category: &str) -> Value {
        json!({
            "support_req": {
                "name": "Alice",
                "email": "alice@example.com",
                "category": category,
                "browserId": "chrome-1"
            }
        })
    }

    #[tokio::test]
    async fn test_health() {
        let h = harness(vec![]);
        let response = h.server.get("/health").await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["draining"], false);
    }

    #[tokio::test]
    async fn test_reqagent_binds_free_agent() {
        let h = harness(vec![Agent::new("a1", "Ann").with_tags(["support"])]);
        let stored =
            SupportRequest::new("Alice", "alice@example.com", "support", "chrome").with_id("r1");
        h.store.seed(Table::New, [stored.clone()]);

        let response = h
            .server
            .post("/scheduler/reqagent")
            .json(&json!({ "support_req": stored }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["support_req"]["reqId"], "r1");
        assert_eq!(body["support_req"]["agentId"], "a1");
        assert_eq!(body["support_req"]["agentName"], "Ann");
        assert!(h.directory.agent("a1").unwrap().is_busy());
    }

    #[tokio::test]
    async fn test_reqagent_without_agent_is_conflict() {
        let h = harness(vec![]);
        let stored =
            SupportRequest::new("Alice", "alice@example.com", "support", "chrome").with_id("r1");
        h.store.seed(Table::New, [stored.clone()]);

        let response = h
            .server
            .post("/scheduler/reqagent")
            .json(&json!({ "support_req": stored }))
            .await;

        response.assert_status(StatusCode::CONFLICT);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "NO_AVAILABLE_AGENT");

        // the drain is now active, so the next caller is told to retry
        let retry = h
            .server
            .post("/scheduler/reqagent")
            .json(&json!({ "support_req": stored }))
            .await;
        retry.assert_status(StatusCode::SERVICE_UNAVAILABLE);

        let status: Value = h.server.get("/scheduler/status").await.json();
        assert_eq!(status["scheduling"], true);
    }

    #[tokio::test]
    async fn test_intake_and_close_flow() {
        let h = harness(vec![Agent::new("a1", "Ann").with_tags(["support"])]);

        let response = h.server.post("/user/newsupportreq").json(&intake_body("support")).await;
        response.assert_status_ok();
        let body: Value = response.json();
        let req_id = body["support_req"]["reqId"].as_str().unwrap().to_string();
        assert_eq!(body["support_req"]["agentId"], "a1");
        assert_eq!(body["support_req"]["guestId"], "guest-1");

        let status: Value = h
            .server
            .get("/common/reqstatus")
            .add_query_param("agentId", "a1")
            .await
            .json();
        assert_eq!(status["active"], true);
        assert_eq!(status["support_req"]["reqId"], req_id.as_str());

        let bound: Value = h.server.get("/agent/checkforrequest/a1").await.json();
        assert_eq!(bound["suppReq"]["reqId"], req_id.as_str());

        h.server
            .get("/common/closereq")
            .add_query_param("reqId", &req_id)
            .add_query_param("agentId", "a1")
            .await
            .assert_json(&json!({ "success": true }));

        assert_eq!(h.store.location(&req_id), Some(Table::Completed));
        assert!(h.directory.busy_agents().is_empty());
    }

    #[tokio::test]
    async fn test_checkforrequest_clears_after_close() {
        let h = harness(vec![Agent::new("a1", "Ann").with_tags(["support"])]);
        let body: Value = h
            .server
            .post("/user/newsupportreq")
            .json(&intake_body("support"))
            .await
            .json();
        let req_id = body["support_req"]["reqId"].as_str().unwrap().to_string();

        h.server.get("/agent/checkforrequest/a1").await.assert_status_ok();

        h.server
            .get("/common/closereq")
            .add_query_param("reqId", &req_id)
            .add_query_param("agentId", "a1")
            .await
            .assert_status_ok();

        let response = h.server.get("/agent/checkforrequest/a1").await;
        response.assert_status(StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert_eq!(body["error"]["code"], "REQUEST_NOT_FOUND");

        // completed requests are still visible through reqstatus
        let status: Value = h
            .server
            .get("/common/reqstatus")
            .add_query_param("agentId", "a1")
            .await
            .json();
        assert_eq!(status["support_req"]["reqId"], req_id.as_str());
    }

    #[tokio::test]
    async fn test_intake_guest_refused_is_bad_gateway() {
        let h = harness(vec![Agent::new("a1", "Ann").with_tags(["support"])]);
        h.directory.set_fail_guests(true);

        let response = h.server.post("/user/newsupportreq").json(&intake_body("support")).await;

        response.assert_status(StatusCode::BAD_GATEWAY);
        let body: Value = response.json();
        assert_eq!(body["error"]["code"], "GUEST_PROVISIONING_FAILED");
        assert!(h.store.table(Table::New).is_empty());
    }

    #[tokio::test]
    async fn test_intake_rejects_bad_email() {
        let h = harness(vec![]);
        let mut body = intake_body("support");
        body["support_req"]["email"] = json!("nobody");

        let response = h.server.post("/user/newsupportreq").json(&body).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(h.store.table(Table::New).is_empty());
    }

    #[tokio::test]
    async fn test_reqstatus_unknown_and_missing_key() {
        let h = harness(vec![]);

        h.server
            .get("/common/reqstatus")
            .add_query_param("email", "ghost@example.com")
            .await
            .assert_json(&json!({ "support_req": null, "active": false }));

        h.server.get("/common/reqstatus").await.assert_status(StatusCode::BAD_REQUEST);
        h.server.get("/agent/checkforrequest/a9").await.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_closereq_unknown_request() {
        let h = harness(vec![]);
        h.server
            .get("/common/closereq")
            .add_query_param("reqId", "missing")
            .add_query_param("agentId", "a1")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_untagagent_and_clearreqs() {
        let h = harness(vec![
            Agent::new("a1", "Ann").with_tags(["support", "busy"]),
            Agent::new("a2", "Ben").with_tags(["billing", "busy"]),
        ]);
        h.store.seed(
            Table::New,
            [SupportRequest::new("Alice", "alice@example.com", "support", "chrome").with_id("r1")],
        );

        h.server
            .get("/scheduler/untagagent/a1")
            .await
            .assert_json(&json!({ "success": true }));
        assert_eq!(h.directory.busy_agents(), vec!["a2"]);

        h.server
            .get("/scheduler/clearreqs")
            .add_query_param("scheduled", "false")
            .await
            .assert_json(&json!({}));
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(h.store.table(Table::New).is_empty());
        assert!(h.directory.busy_agents().is_empty());
    }

    #[tokio::test]
    async fn test_untagagent_unknown_agent() {
        let h = harness(vec![]);
        let response = h.server.get("/scheduler/untagagent/ghost").await;
        response.assert_status(StatusCode::BAD_GATEWAY);
        let body: Value = response.json();
        assert_eq!(body["error"]["code"], "DIRECTORY_QUERY_FAILED");
    }

    #[tokio::test]
    async fn test_openapi_document_served() {
        let h = harness(vec![]);
        let doc: Value = h.server.get("/api-docs/openapi.json").await.json();
        assert!(doc["paths"]["/scheduler/reqagent"].is_object());
        assert!(doc["paths"]["/user/newsupportreq"].is_object());
    }
}
