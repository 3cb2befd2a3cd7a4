//! Storage infrastructure: the optional configuration file.
//!
//! The client never writes this file.  It is read once at start-up and
//! turned into a [`crate::domain::HubConfig`] plus CLI display settings.

pub mod config;
