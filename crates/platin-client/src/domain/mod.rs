//! Domain types for the client: connection settings and the error model.

pub mod config;
pub mod error;

pub use config::HubConfig;
pub use error::HubError;
