//! Application layer
//!
//! Orchestrates matching, draining, cleanup and the use cases built on them.

pub mod budget;
pub mod cleanup;
pub mod drainer;
pub mod matcher;
pub mod scheduler;
pub mod service;

pub use budget::ItemBudget;
pub use cleanup::{CleanupCoordinator, CleanupReport};
pub use drainer::{DrainError, QueueDrainer};
pub use matcher::MatchEngine;
pub use scheduler::{SchedulerController, SchedulerSnapshot};
pub use service::DeskService;
