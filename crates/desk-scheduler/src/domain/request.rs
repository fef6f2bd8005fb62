//! Support request entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One customer's help request.
///
/// Exactly one lifecycle table holds a given `req_id` at a time. Once a request
/// leaves `new` it carries the bound agent's id and name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportRequest {
    #[serde(default)]
    pub req_id: String,
    pub name: String,
    pub email: String,
    /// Skill tag matched against agent tags
    pub category: String,
    pub browser_id: String,
    #[serde(default = "Utc::now")]
    pub req_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_id: Option<String>,
}

impl SupportRequest {
    /// Create an unassigned request with a fresh id and timestamp
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        category: impl Into<String>,
        browser_id: impl Into<String>,
    ) -> Self {
        Self {
            req_id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            email: email.into(),
            category: category.into(),
            browser_id: browser_id.into(),
            req_time: Utc::now(),
            agent_id: None,
            agent_name: None,
            guest_id: None,
        }
    }

    pub fn with_id(mut self, req_id: impl Into<String>) -> Self {
        self.req_id = req_id.into();
        self
    }

    /// Copy of this request bound to an agent
    pub fn bound_to(&self, agent_id: &str, agent_name: &str) -> Self {
        Self {
            agent_id: Some(agent_id.to_string()),
            agent_name: Some(agent_name.to_string()),
            ..self.clone()
        }
    }

    /// True when both agent fields are present and non-empty
    pub fn is_bound(&self) -> bool {
        matches!(
            (&self.agent_id, &self.agent_name),
            (Some(id), Some(name)) if !id.is_empty() && !name.is_empty()
        )
    }

    /// Check the fields intake requires before a request enters `new`
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            ("name", &self.name),
            ("email", &self.email),
            ("category", &self.category),
            ("browserId", &self.browser_id),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::MissingField(field));
            }
        }

        if !is_valid_email(&self.email) {
            return Err(ValidationError::InvalidEmail(self.email.clone()));
        }

        Ok(())
    }
}

fn is_valid_email(email: &str) -> bool {
    let mut parts = email.trim().split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };

    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    MissingField(&'static str),
    InvalidEmail(String),
}

impl std::error::Error for ValidationError {}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "missing field: {}", field),
            Self::InvalidEmail(email) => write!(f, "invalid email: {}", email),
        }
    }
}

/// Lifecycle tables of the request store
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Table {
    New,
    Scheduled,
    Completed,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Scheduled => "scheduled",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key used to look up a single request across tables
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RequestLookup {
    AgentId(String),
    ReqId(String),
    Email(String),
}

impl RequestLookup {
    /// Pick the first present key, agent id taking precedence over request id and email
    pub fn first_of(
        agent_id: Option<String>,
        req_id: Option<String>,
        email: Option<String>,
    ) -> Option<Self> {
        agent_id
            .map(Self::AgentId)
            .or_else(|| req_id.map(Self::ReqId))
            .or_else(|| email.map(Self::Email))
    }

    /// Query parameter name and value understood by the store service
    pub fn as_query(&self) -> (&'static str, &str) {
        match self {
            Self::AgentId(v) => ("agentId", v),
            Self::ReqId(v) => ("reqId", v),
            Self::Email(v) => ("email", v),
        }
    }

    pub fn matches(&self, request: &SupportRequest) -> bool {
        match self {
            Self::AgentId(v) => request.agent_id.as_deref() == Some(v.as_str()),
            Self::ReqId(v) => &request.req_id == v,
            Self::Email(v) => &request.email == v,
        }
    }
}
