//! Domain module
//!
//! Support requests, directory agents and the lifecycle tables they move through.

pub mod agent;
pub mod request;

pub use agent::{Agent, Assignment, BUSY_TAG};
pub use request::{RequestLookup, SupportRequest, Table, ValidationError};
