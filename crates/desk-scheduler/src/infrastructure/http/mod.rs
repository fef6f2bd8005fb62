//! HTTP adapters for the remote directory and store services

pub mod directory;
pub mod store;

pub use directory::HttpAgentDirectory;
pub use store::HttpRequestStore;
