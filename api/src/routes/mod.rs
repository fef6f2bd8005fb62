//! API Routes

pub mod agent;
pub mod common;
pub mod health;
pub mod scheduler;
pub mod user;
