//! Application layer: the hub operations.
//!
//! - **`hub`** – [`hub::Hub`] exposes power, source, and volume operations on
//!   top of the [`hub::HubTransport`] trait.  The TCP implementation of that
//!   trait lives in the infrastructure layer and is injected at construction
//!   time, so this layer never touches a socket.

pub mod hub;
