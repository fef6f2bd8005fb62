//! OpenDesk Agent Scheduler
//!
//! Routes incoming support requests to available human agents and keeps the
//! request lifecycle (`new` → `scheduled` → `completed`) in the request store.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          SCHEDULER CONTROLLER                           │
//! │   single-flight guard | sync fast path | backlog drain with backoff     │
//! └───────────────┬─────────────────────────────────────┬───────────────────┘
//!                 │                                     │
//! ┌───────────────▼──────────────┐      ┌───────────────▼──────────────────┐
//! │        QUEUE DRAINER         │      │       CLEANUP COORDINATOR        │
//! │  strict order | fail fast    │      │  clear tables | release agents   │
//! └───────────────┬──────────────┘      └───────┬──────────────────┬───────┘
//!                 │                             │                  │
//! ┌───────────────▼──────────────┐              │                  │
//! │         MATCH ENGINE         │              │                  │
//! │ select → store move → tag    │              │                  │
//! └───────┬──────────────┬───────┘              │                  │
//!         │              │                      │                  │
//! ┌───────▼──────┐ ┌─────▼──────────────────────▼───┐ ┌────────────▼─────┐
//! │   Agent      │ │          Request Store          │ │  Agent Directory │
//! │  Directory   │ │     new | scheduled | completed │ │   (untag busy)   │
//! └──────────────┘ └─────────────────────────────────┘ └──────────────────┘
//! ```
//!
//! ## Layers
//!
//! - **Domain**: support requests, agents, lifecycle tables
//! - **Ports**: directory/store traits (outbound), scheduling use cases (inbound)
//! - **Application**: match engine, drainer, scheduler, cleanup
//! - **Infrastructure**: HTTP and in-memory adapters

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod ports;

pub use application::{
    CleanupCoordinator, DeskService, DrainError, MatchEngine, QueueDrainer, SchedulerController,
    SchedulerSnapshot,
};
pub use config::{DeskConfig, DirectoryConfig, SchedulerConfig, StoreConfig};
pub use domain::{Agent, Assignment, RequestLookup, SupportRequest, Table, BUSY_TAG};
pub use error::{ConfigError, SchedulerError};
pub use infrastructure::http::{HttpAgentDirectory, HttpRequestStore};
pub use infrastructure::memory::{InMemoryAgentDirectory, InMemoryRequestStore};
pub use ports::inbound::SchedulingUseCases;
pub use ports::outbound::{AgentDirectory, DirectoryError, RequestStore, StoreError};
