//! Errors returned by hub operations.

use std::time::Duration;

use platin_core::ProtocolError;
use thiserror::Error;

/// Everything that can make a hub operation fail.
///
/// Failures are never retried or masked; the variant tells the caller which
/// stage broke.
#[derive(Debug, Error)]
pub enum HubError {
    /// The TCP connection could not be established.
    #[error("failed to connect to hub at {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The TCP connection was not established within the connect timeout.
    #[error("timed out connecting to hub at {addr} after {timeout:?}")]
    ConnectTimeout { addr: String, timeout: Duration },

    /// A read or write failed mid-exchange, including a connection that closed
    /// before a whole frame arrived.
    #[error("connection I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The hub did not send the expected bytes within the read deadline.
    #[error("timed out after {0:?} waiting for hub response")]
    ReadTimeout(Duration),

    /// A frame could not be encoded, or a response could not be decoded.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The requested or active source is not in the hub's current list.
    #[error("source not found")]
    SourceNotFound,
}

impl HubError {
    /// Returns true for the named source lookup failure.
    pub fn is_source_not_found(&self) -> bool {
        matches!(self, HubError::SourceNotFound)
    }
}
