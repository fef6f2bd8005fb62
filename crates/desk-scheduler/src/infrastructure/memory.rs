//! In-memory adapters for testing and local runs
//!
//! Both adapters count calls and can be told to fail or stall, so scheduler
//! behaviour under partial outages can be exercised without a network.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::domain::{Agent, RequestLookup, SupportRequest, Table};
use crate::ports::outbound::{AgentDirectory, DirectoryError, RequestStore, StoreError};

/// In-memory agent directory
#[derive(Default)]
pub struct InMemoryAgentDirectory {
    agents: RwLock<Vec<Agent>>,
    failing_updates: RwLock<HashSet<String>>,
    query_latency: RwLock<Option<Duration>>,
    update_latency: RwLock<Option<Duration>>,
    fail_queries: AtomicBool,
    fail_guests: AtomicBool,
    queries: AtomicUsize,
    updates: AtomicUsize,
    guests: RwLock<Vec<(String, String)>>,
}

impl InMemoryAgentDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_agents(agents: impl IntoIterator<Item = Agent>) -> Self {
        let directory = Self::new();
        for agent in agents {
            directory.insert(agent);
        }
        directory
    }

    /// Insert or replace an agent, keeping its position if it already exists
    pub fn insert(&self, agent: Agent) {
        let mut agents = self.agents.write();
        match agents.iter_mut().find(|a| a.id == agent.id) {
            Some(existing) => *existing = agent,
            None => agents.push(agent),
        }
    }

    pub fn agent(&self, agent_id: &str) -> Option<Agent> {
        self.agents.read().iter().find(|a| a.id == agent_id).cloned()
    }

    pub fn busy_agents(&self) -> Vec<String> {
        self.agents.read().iter().filter(|a| a.is_busy()).map(|a| a.id.clone()).collect()
    }

    /// Make tag writes for `agent_id` fail
    pub fn fail_updates_for(&self, agent_id: &str) {
        self.failing_updates.write().insert(agent_id.to_string());
    }

    pub fn set_fail_queries(&self, fail: bool) {
        self.fail_queries.store(fail, Ordering::SeqCst);
    }

    /// Delay every `find_agents` call
    pub fn set_query_latency(&self, latency: Option<Duration>) {
        *self.query_latency.write() = latency;
    }

    /// Delay every `update_tags` call
    pub fn set_update_latency(&self, latency: Option<Duration>) {
        *self.update_latency.write() = latency;
    }

    pub fn set_fail_guests(&self, fail: bool) {
        self.fail_guests.store(fail, Ordering::SeqCst);
    }

    /// `(guest_id, req_id)` pairs provisioned so far
    pub fn guests(&self) -> Vec<(String, String)> {
        self.guests.read().clone()
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AgentDirectory for InMemoryAgentDirectory {
    async fn find_agents(&self, category: Option<&str>) -> Result<Vec<Agent>, DirectoryError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        let latency = *self.query_latency.read();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(DirectoryError::Unreachable("directory offline".into()));
        }

        let agents = self.agents.read();
        Ok(agents
            .iter()
            .filter(|a| category.map_or(true, |c| a.has_skill(c)))
            .cloned()
            .collect())
    }

    async fn get_agent(&self, agent_id: &str) -> Result<Agent, DirectoryError> {
        self.agent(agent_id)
            .ok_or_else(|| DirectoryError::AgentNotFound(agent_id.to_string()))
    }

    async fn update_tags(&self, agent_id: &str, tags: &[String]) -> Result<(), DirectoryError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        let latency = *self.update_latency.read();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if self.failing_updates.read().contains(agent_id) {
            return Err(DirectoryError::Rejected(format!("tag write refused for {}", agent_id)));
        }

        let mut agents = self.agents.write();
        let agent = agents
            .iter_mut()
            .find(|a| a.id == agent_id)
            .ok_or_else(|| DirectoryError::AgentNotFound(agent_id.to_string()))?;
        agent.tags = tags.to_vec();
        Ok(())
    }

    async fn create_guest(&self, request: &SupportRequest) -> Result<String, DirectoryError> {
        if self.fail_guests.load(Ordering::SeqCst) {
            return Err(DirectoryError::Rejected(format!("guest refused for {}", request.email)));
        }

        let mut guests = self.guests.write();
        let guest_id = format!("guest-{}", guests.len() + 1);
        guests.push((guest_id.clone(), request.req_id.clone()));
        Ok(guest_id)
    }
}

/// In-memory request store with the three lifecycle tables
#[derive(Default)]
pub struct InMemoryRequestStore {
    tables: RwLock<HashMap<Table, Vec<SupportRequest>>>,
    fail_moves: AtomicBool,
    fail_deletes: AtomicBool,
    fail_fetches: AtomicBool,
    fetches: AtomicUsize,
}

impl InMemoryRequestStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a table directly, bypassing intake
    pub fn seed(&self, table: Table, requests: impl IntoIterator<Item = SupportRequest>) {
        self.tables.write().entry(table).or_default().extend(requests);
    }

    pub fn table(&self, table: Table) -> Vec<SupportRequest> {
        self.tables.read().get(&table).cloned().unwrap_or_default()
    }

    /// Table currently holding `req_id`
    pub fn location(&self, req_id: &str) -> Option<Table> {
        let tables = self.tables.read();
        [Table::New, Table::Scheduled, Table::Completed]
            .into_iter()
            .find(|t| tables.get(t).map_or(false, |rows| rows.iter().any(|r| r.req_id == req_id)))
    }

    pub fn set_fail_moves(&self, fail: bool) {
        self.fail_moves.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_fetches(&self, fail: bool) {
        self.fail_fetches.store(fail, Ordering::SeqCst);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RequestStore for InMemoryRequestStore {
    async fn add_new(&self, request: &SupportRequest) -> Result<(), StoreError> {
        if self.location(&request.req_id).is_some() {
            return Err(StoreError::Rejected(format!("duplicate reqId {}", request.req_id)));
        }
        self.tables.write().entry(Table::New).or_default().push(request.clone());
        Ok(())
    }

    async fn fetch_new(&self) -> Result<Vec<SupportRequest>, StoreError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetches.load(Ordering::SeqCst) {
            return Err(StoreError::Unreachable("store offline".into()));
        }
        Ok(self.table(Table::New))
    }

    async fn move_request(
        &self,
        request: &SupportRequest,
        from: Table,
        to: Table,
    ) -> Result<(), StoreError> {
        if self.fail_moves.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected("swap refused".into()));
        }

        let mut tables = self.tables.write();
        let source = tables.entry(from).or_default();
        let index = source
            .iter()
            .position(|r| r.req_id == request.req_id)
            .ok_or_else(|| StoreError::NotFound(format!("{} in {}", request.req_id, from)))?;
        source.remove(index);
        tables.entry(to).or_default().push(request.clone());
        Ok(())
    }

    async fn delete_all(&self, clear_new: bool, clear_scheduled: bool) -> Result<(), StoreError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StoreError::Unreachable("store offline".into()));
        }

        let mut tables = self.tables.write();
        let mut deleted = 0;
        for (table, selected) in [(Table::New, clear_new), (Table::Scheduled, clear_scheduled)] {
            if selected {
                if let Some(rows) = tables.get_mut(&table) {
                    deleted += rows.len();
                    rows.clear();
                }
            }
        }

        if deleted == 0 {
            return Err(StoreError::NothingToDelete);
        }
        Ok(())
    }

    async fn find(&self, lookup: &RequestLookup) -> Result<Option<SupportRequest>, StoreError> {
        let tables = self.tables.read();
        Ok([Table::New, Table::Scheduled, Table::Completed]
            .iter()
            .filter_map(|t| tables.get(t))
            .flatten()
            .find(|r| lookup.matches(r))
            .cloned())
    }

    async fn find_bound(&self, agent_id: &str) -> Result<Option<SupportRequest>, StoreError> {
        let tables = self.tables.read();
        Ok(tables
            .get(&Table::Scheduled)
            .and_then(|rows| rows.iter().find(|r| r.agent_id.as_deref() == Some(agent_id)))
            .cloned())
    }

    async fn close_request(&self, req_id: &str) -> Result<(), StoreError> {
        let mut tables = self.tables.write();
        let scheduled = tables.entry(Table::Scheduled).or_default();
        let index = scheduled
            .iter()
            .position(|r| r.req_id == req_id)
            .ok_or_else(|| StoreError::NotFound(req_id.to_string()))?;
        let request = scheduled.remove(index);
        tables.entry(Table::Completed).or_default().push(request);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(id: &str) -> SupportRequest {
        SupportRequest::new("Alice", "alice@example.com", "it", "chrome").with_id(id)
    }

    #[tokio::test]
    async fn test_store_move_and_close() {
        let store = InMemoryRequestStore::new();
        store.add_new(&request("r1")).await.unwrap();
        assert_eq!(store.location("r1"), Some(Table::New));

        let bound = request("r1").bound_to("a1", "Ann");
        store.move_request(&bound, Table::New, Table::Scheduled).await.unwrap();
        assert_eq!(store.location("r1"), Some(Table::Scheduled));
        assert_eq!(store.table(Table::Scheduled)[0].agent_id.as_deref(), Some("a1"));

        store.close_request("r1").await.unwrap();
        assert_eq!(store.location("r1"), Some(Table::Completed));

        let found = store.find(&RequestLookup::AgentId("a1".into())).await.unwrap();
        assert_eq!(found.map(|r| r.req_id), Some("r1".to_string()));
        // completed rows are history, not a live binding
        assert!(store.find_bound("a1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_bound_only_sees_scheduled() {
        let store = InMemoryRequestStore::new();
        store.seed(Table::New, [request("r0")]);
        store.seed(Table::Scheduled, [request("r1").bound_to("a1", "Ann")]);
        store.seed(Table::Completed, [request("r2").bound_to("a2", "Ben")]);

        let bound = store.find_bound("a1").await.unwrap();
        assert_eq!(bound.map(|r| r.req_id), Some("r1".to_string()));
        assert!(store.find_bound("a2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_store_rejects_duplicates_and_missing_rows() {
        let store = InMemoryRequestStore::new();
        store.add_new(&request("r1")).await.unwrap();
        assert!(matches!(store.add_new(&request("r1")).await, Err(StoreError::Rejected(_))));

        let missing = store.move_request(&request("r2"), Table::New, Table::Scheduled).await;
        assert!(matches!(missing, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_all_reports_nothing_to_delete() {
        let store = InMemoryRequestStore::new();
        store.seed(Table::Scheduled, [request("r1")]);

        let err = store.delete_all(true, false).await.unwrap_err();
        assert!(err.is_benign_delete());

        store.delete_all(false, true).await.unwrap();
        assert!(store.table(Table::Scheduled).is_empty());
    }

    #[tokio::test]
    async fn test_directory_filters_by_category() {
        let directory = InMemoryAgentDirectory::with_agents([
            Agent::new("a1", "Ann").with_tags(["billing"]),
            Agent::new("a2", "Ben").with_tags(["it", "busy"]),
            Agent::new("a3", "Cat").with_tags(["it"]),
        ]);

        let it: Vec<_> = directory.find_agents(Some("it")).await.unwrap();
        assert_eq!(it.iter().map(|a| a.id.as_str()).collect::<Vec<_>>(), vec!["a2", "a3"]);
        assert_eq!(directory.find_agents(None).await.unwrap().len(), 3);

        directory.update_tags("a3", &["it".into(), "busy".into()]).await.unwrap();
        assert_eq!(directory.busy_agents(), vec!["a2", "a3"]);
        assert_eq!(directory.query_count(), 2);
    }
}
