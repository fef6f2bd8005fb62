//! Agent Directory API Client
//!
//! HTTP client for the external agent directory. The bearer credential is
//! obtained and refreshed elsewhere; this client only presents it.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::config::DirectoryConfig;
use crate::domain::{Agent, SupportRequest};
use crate::ports::outbound::{AgentDirectory, DirectoryError};

/// Directory API client
pub struct HttpAgentDirectory {
    client: reqwest::Client,
    base_url: String,
    company_id: String,
}

#[derive(Serialize)]
struct TagsBody<'a> {
    tags: &'a [String],
}

/// Guest account for the customer behind a request
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GuestBody<'a> {
    first_name: &'a str,
    login_email: &'a str,
    roles: [&'static str; 1],
    /// Request id
    user_info1: &'a str,
    /// Browser id
    user_info2: &'a str,
}

#[derive(Deserialize)]
struct GuestCreated {
    data: GuestData,
}

#[derive(Deserialize)]
struct GuestData {
    id: String,
}

impl HttpAgentDirectory {
    /// Create new directory client
    pub fn new(config: &DirectoryConfig) -> Result<Self, DirectoryError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(ref token) = config.bearer_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| DirectoryError::Rejected(format!("invalid bearer token: {}", e)))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            company_id: config.company_id.clone(),
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, DirectoryError> {
        let response = self.client.get(url).query(query).send().await?;
        let response = Self::check(response).await?;
        response.json().await.map_err(|e| DirectoryError::InvalidResponse(e.to_string()))
    }

    async fn put<T: Serialize>(&self, url: &str, body: &T) -> Result<(), DirectoryError> {
        let response = self.client.put(url).json(body).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T, DirectoryError> {
        let response = self.client.post(url).json(body).send().await?;
        let response = Self::check(response).await?;
        response.json().await.map_err(|e| DirectoryError::InvalidResponse(e.to_string()))
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, DirectoryError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().path().to_string();
        let text = response.text().await.unwrap_or_default();
        if status == StatusCode::NOT_FOUND {
            return Err(DirectoryError::AgentNotFound(url));
        }
        Err(DirectoryError::Rejected(format!("{}: {}", status, text)))
    }
}

#[async_trait]
impl AgentDirectory for HttpAgentDirectory {
    async fn find_agents(&self, category: Option<&str>) -> Result<Vec<Agent>, DirectoryError> {
        let url = format!("{}/agents", self.base_url);
        let mut query = vec![
            ("companyId", self.company_id.as_str()),
            ("roles", "user"),
            ("format", "full"),
        ];
        if let Some(category) = category {
            query.push(("tags", category));
        }
        self.get(&url, &query).await
    }

    async fn get_agent(&self, agent_id: &str) -> Result<Agent, DirectoryError> {
        let url = format!("{}/agents/{}", self.base_url, agent_id);
        self.get(&url, &[("format", "full")]).await.map_err(|e| match e {
            DirectoryError::AgentNotFound(_) => DirectoryError::AgentNotFound(agent_id.to_string()),
            other => other,
        })
    }

    async fn update_tags(&self, agent_id: &str, tags: &[String]) -> Result<(), DirectoryError> {
        let url = format!("{}/agents/{}", self.base_url, agent_id);
        self.put(&url, &TagsBody { tags }).await.map_err(|e| match e {
            DirectoryError::AgentNotFound(_) => DirectoryError::AgentNotFound(agent_id.to_string()),
            other => other,
        })
    }

    async fn create_guest(&self, request: &SupportRequest) -> Result<String, DirectoryError> {
        let url = format!("{}/users", self.base_url);
        let body = GuestBody {
            first_name: &request.name,
            login_email: &request.email,
            roles: ["guest"],
            user_info1: &request.req_id,
            user_info2: &request.browser_id,
        };
        let created: GuestCreated = self.post(&url, &body).await?;
        Ok(created.data.id)
    }
}
