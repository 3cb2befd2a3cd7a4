//! # platin-core
//!
//! Shared library for the Platin hub remote control containing the binary
//! frame codec for both hub services and the source list parser.
//!
//! It has no dependencies on sockets or async runtimes; the `platin-client`
//! crate supplies the transport.
//!
//! # Architecture overview
//!
//! The hub is an audio device reachable over two TCP services:
//!
//! - **`protocol`** – How bytes travel over the wire.  Control requests are a
//!   length-prefixed frame with a `03 02` marker; media requests use a fixed
//!   10-byte header and an ASCII payload.  Responses for both services are
//!   decoded through the [`ResponseFrame`] trait, which lets a stream reader
//!   pull exactly one frame without knowing which service it came from.
//!
//! - **`domain`** – The [`Source`] type and the parser for the JSON source
//!   list carried inside a control response.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `platin_core::ControlCommand` instead of `platin_core::protocol::messages::ControlCommand`.
pub use domain::source::{find_active, find_by_name, parse_source_list, Source};
pub use protocol::codec::{ControlResponse, MediaResponse, ProtocolError, ResponseFrame};
pub use protocol::messages::{ControlCommand, MediaCommand, RequestFrame};
