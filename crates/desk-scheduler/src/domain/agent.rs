//! Directory agent
use serde::{Deserialize, Serialize};

/// Tag marking an agent as not eligible for new assignments
pub const BUSY_TAG: &str = "busy";

/// Agent record as held by the external directory
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Agent {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self { id: id.into(), display_name: display_name.into(), tags: vec![] }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_busy(&self) -> bool {
        self.tags.iter().any(|t| t == BUSY_TAG)
    }

    pub fn has_skill(&self, category: &str) -> bool {
        self.tags.iter().any(|t| t == category)
    }

    /// Tag set with `busy` added, order preserved
    pub fn tags_with_busy(&self) -> Vec<String> {
        let mut tags = self.tags.clone();
        if !self.is_busy() {
            tags.push(BUSY_TAG.to_string());
        }
        tags
    }

    /// Tag set with every `busy` removed
    pub fn tags_without_busy(&self) -> Vec<String> {
        self.tags.iter().filter(|t| *t != BUSY_TAG).cloned().collect()
    }
}

/// Agent identity bound to a request by a successful match
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub req_id: String,
    pub agent_id: String,
    pub agent_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_id: Option<String>,
}
