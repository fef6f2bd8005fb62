//! Infrastructure layer
//!
//! Concrete adapters for the outbound ports.

pub mod http;
pub mod memory;
