//! Request Store API Client
//!
//! HTTP client for the support-request store service. Table layout and SQL
//! live behind that service.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::config::StoreConfig;
use crate::domain::{RequestLookup, SupportRequest, Table};
use crate::ports::outbound::{RequestStore, StoreError};

/// Store API client
pub struct HttpRequestStore {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
struct AddNewBody<'a> {
    support_req: &'a SupportRequest,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SwapTableBody<'a> {
    supp_req: &'a SupportRequest,
    from: Table,
    to: Table,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckResponse {
    supp_req: Option<SupportRequest>,
}

impl HttpRequestStore {
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/supportreq/{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, StoreError> {
        let response = self.client.get(url).query(query).send().await?;
        let response = Self::check(response).await?;
        response.json().await.map_err(|e| StoreError::InvalidResponse(e.to_string()))
    }

    async fn get_ack(&self, url: &str, query: &[(&str, &str)]) -> Result<(), StoreError> {
        let response = self.client.get(url).query(query).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn post_ack<T: Serialize>(&self, url: &str, body: &T) -> Result<(), StoreError> {
        let response = self.client.post(url).json(body).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let path = response.url().path().to_string();
        let text = response.text().await.unwrap_or_default();
        if text.to_lowercase().contains("nothing to delete") {
            return Err(StoreError::NothingToDelete);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(path));
        }
        Err(StoreError::Rejected(format!("{}: {}", status, text)))
    }
}

#[async_trait]
impl RequestStore for HttpRequestStore {
    async fn add_new(&self, request: &SupportRequest) -> Result<(), StoreError> {
        self.post_ack(&self.url("addnew"), &AddNewBody { support_req: request }).await
    }

    async fn fetch_new(&self) -> Result<Vec<SupportRequest>, StoreError> {
        self.get_json(&self.url("getnew"), &[]).await
    }

    async fn move_request(
        &self,
        request: &SupportRequest,
        from: Table,
        to: Table,
    ) -> Result<(), StoreError> {
        let body = SwapTableBody { supp_req: request, from, to };
        self.post_ack(&self.url("swaptable"), &body).await
    }

    async fn delete_all(&self, clear_new: bool, clear_scheduled: bool) -> Result<(), StoreError> {
        let neww = clear_new.to_string();
        let scheduled = clear_scheduled.to_string();
        self.get_ack(
            &self.url("deleteallreqs"),
            &[("neww", neww.as_str()), ("scheduled", scheduled.as_str())],
        )
        .await
    }

    async fn find(&self, lookup: &RequestLookup) -> Result<Option<SupportRequest>, StoreError> {
        let (key, value) = lookup.as_query();
        match self.get_json::<CheckResponse>(&self.url("check"), &[(key, value)]).await {
            Ok(body) => Ok(body.supp_req),
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn find_bound(&self, agent_id: &str) -> Result<Option<SupportRequest>, StoreError> {
        let url = self.url(&format!("checkforreq/{}", agent_id));
        match self.get_json::<CheckResponse>(&url, &[]).await {
            Ok(body) => Ok(body.supp_req),
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn close_request(&self, req_id: &str) -> Result<(), StoreError> {
        self.get_ack(&self.url(&format!("closereq/{}", req_id)), &[])
            .await
            .map_err(|e| match e {
                StoreError::NotFound(_) => StoreError::NotFound(req_id.to_string()),
                other => other,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store(server: &MockServer) -> HttpRequestStore {
        HttpRequestStore::new(&StoreConfig { base_url: server.uri(), timeout_ms: 2_000 }).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_new_backlog() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/supportreq/getnew"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"reqId": "r1", "name": "Alice", "email": "alice@example.com",
                 "category": "it", "browserId": "chrome", "reqTime": "2024-05-01T10:00:00Z"},
                {"reqId": "r2", "name": "Bob", "email": "bob@example.com",
                 "category": "billing", "browserId": "firefox", "reqTime": "2024-05-01T10:01:00Z"}
            ])))
            .mount(&server)
            .await;

        let backlog = store(&server).fetch_new().await.unwrap();
        assert_eq!(backlog.iter().map(|r| r.req_id.as_str()).collect::<Vec<_>>(), vec!["r1", "r2"]);
    }

    #[tokio::test]
    async fn test_swap_table_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/supportreq/swaptable"))
            .and(body_partial_json(json!({
                "suppReq": {"reqId": "r1", "agentId": "a1", "agentName": "Ann"},
                "from": "new",
                "to": "scheduled"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;

        let request = SupportRequest::new("Alice", "alice@example.com", "it", "chrome")
            .with_id("r1")
            .bound_to("a1", "Ann");
        store(&server).move_request(&request, Table::New, Table::Scheduled).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_all_nothing_to_delete_is_classified() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/supportreq/deleteallreqs"))
            .and(query_param("neww", "true"))
            .and(query_param("scheduled", "false"))
            .respond_with(ResponseTemplate::new(400).set_body_string("Nothing to delete"))
            .mount(&server)
            .await;

        let err = store(&server).delete_all(true, false).await.unwrap_err();
        assert!(err.is_benign_delete());
    }

    #[tokio::test]
    async fn test_find_missing_request_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/supportreq/check"))
            .and(query_param("email", "ghost@example.com"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/supportreq/check"))
            .and(query_param("reqId", "r1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "suppReq": {"reqId": "r1", "name": "Alice", "email": "alice@example.com",
                            "category": "it", "browserId": "chrome"}
            })))
            .mount(&server)
            .await;

        let store = store(&server);
        let missing = store.find(&RequestLookup::Email("ghost@example.com".into())).await.unwrap();
        assert!(missing.is_none());

        let found = store.find(&RequestLookup::ReqId("r1".into())).await.unwrap();
        assert_eq!(found.unwrap().name, "Alice");
    }

    #[tokio::test]
    async fn test_find_bound_uses_agent_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/supportreq/checkforreq/a1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "suppReq": {"reqId": "r1", "name": "Alice", "email": "alice@example.com",
                            "category": "it", "browserId": "chrome",
                            "agentId": "a1", "agentName": "Ann"}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/supportreq/checkforreq/a2"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let store = store(&server);
        let bound = store.find_bound("a1").await.unwrap().unwrap();
        assert_eq!(bound.agent_id.as_deref(), Some("a1"));
        assert!(store.find_bound("a2").await.unwrap().is_none());
    }
}
