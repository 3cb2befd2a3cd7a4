//! Infrastructure layer for the client.
//!
//! **Dependency rule**: this layer may depend on `application`, `domain`, and
//! `platin_core`, but MUST NOT be imported by the `application` or domain
//! layers.
//!
//! # Sub-modules
//!
//! - **`network`** – [`network::TcpTransport`], the TCP implementation of
//!   `HubTransport`: timed connects, one connection per operation, and the
//!   media-service register handshake.
//!
//! - **`storage`** – the optional TOML configuration file.

pub mod network;
pub mod storage;
