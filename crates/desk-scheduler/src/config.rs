//! Service Configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ConfigError;

/// Top-level service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeskConfig {
    /// Address the HTTP API binds to
    pub listen_addr: String,
    /// Agent directory service
    pub directory: DirectoryConfig,
    /// Request store service
    pub store: StoreConfig,
    /// Scheduler timings
    pub scheduler: SchedulerConfig,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:3030".into(),
            directory: DirectoryConfig::default(),
            store: StoreConfig::default(),
            scheduler: SchedulerConfig::default(),
        }
    }
}

impl DeskConfig {
    /// Load from file
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save to file
    pub fn save(&self, path: &str) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply `DESK_*` environment overrides
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = var("DESK_LISTEN_ADDR") {
            self.listen_addr = v;
        }
        if let Some(v) = var("DESK_DIRECTORY_URL") {
            self.directory.base_url = v;
        }
        if let Some(v) = var("DESK_DIRECTORY_TOKEN") {
            self.directory.bearer_token = Some(v);
        }
        if let Some(v) = var("DESK_COMPANY_ID") {
            self.directory.company_id = v;
        }
        if let Some(v) = var("DESK_STORE_URL") {
            self.store.base_url = v;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.directory.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("directory.base_url is empty".into()));
        }
        if self.store.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("store.base_url is empty".into()));
        }
        if self.scheduler.schedule_delay_ms == 0 {
            return Err(ConfigError::Invalid("scheduler.schedule_delay_ms must be > 0".into()));
        }
        if self.scheduler.item_budget_ms == 0 {
            return Err(ConfigError::Invalid("scheduler.item_budget_ms must be > 0".into()));
        }
        Ok(())
    }
}

/// Agent directory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    pub base_url: String,
    pub company_id: String,
    /// Bearer credential, refreshed outside this service
    pub bearer_token: Option<String>,
    pub timeout_ms: u64,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api/directory".into(),
            company_id: String::new(),
            bearer_token: None,
            timeout_ms: 10_000,
        }
    }
}

impl DirectoryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Request store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub base_url: String,
    pub timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3002".into(),
            timeout_ms: 10_000,
        }
    }
}

impl StoreConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Scheduler timings
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Fixed backoff between drain cycles
    pub schedule_delay_ms: u64,
    /// Wall-clock budget for one match inside a drain or cleanup
    pub item_budget_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            schedule_delay_ms: 5_000,
            item_budget_ms: 30_000,
        }
    }
}

impl SchedulerConfig {
    pub fn schedule_delay(&self) -> Duration {
        Duration::from_millis(self.schedule_delay_ms)
    }

    pub fn item_budget(&self) -> Duration {
        Duration::from_millis(self.item_budget_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: DeskConfig =
            serde_json::from_str(r#"{"scheduler": {"schedule_delay_ms": 250}}"#).unwrap();

        assert_eq!(config.scheduler.schedule_delay(), Duration::from_millis(250));
        assert_eq!(config.scheduler.item_budget(), Duration::from_secs(30));
        assert_eq!(config.listen_addr, "0.0.0.0:3030");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("DESK_DIRECTORY_URL", "https://directory.example.com/api"),
            ("DESK_DIRECTORY_TOKEN", "secret"),
            ("DESK_COMPANY_ID", "acme"),
        ]
        .into_iter()
        .collect();

        let config = DeskConfig::default().with_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.directory.base_url, "https://directory.example.com/api");
        assert_eq!(config.directory.bearer_token.as_deref(), Some("secret"));
        assert_eq!(config.directory.company_id, "acme");
        assert_eq!(config.store.base_url, StoreConfig::default().base_url);
    }

    #[test]
    fn test_validate_rejects_zero_budget() {
        let mut config = DeskConfig::default();
        config.scheduler.item_budget_ms = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!("desk-config-{}.json", std::process::id()));
        let path = path.to_string_lossy().to_string();

        let mut config = DeskConfig::default();
        config.directory.company_id = "acme".into();
        tokio_test::assert_ok!(config.save(&path));

        let loaded = tokio_test::assert_ok!(DeskConfig::load(&path));
        assert_eq!(loaded.directory.company_id, "acme");
        let _ = std::fs::remove_file(&path);

        tokio_test::assert_err!(DeskConfig::load("/nonexistent/desk.json"));
    }
}
