//! Hub connection settings.
//!
//! [`HubConfig`] is passed explicitly to every [`crate::Hub`]; nothing in the
//! client reads process-wide state.  The infrastructure layer fills it from
//! CLI arguments or the TOML file.

use std::time::Duration;

use platin_core::protocol::messages::{DEFAULT_CONTROL_PORT, DEFAULT_MEDIA_PORT};

/// Default bound on establishing a TCP connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default bound on each individual read from the hub.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Everything needed to reach one hub.
///
/// # Example
///
/// ```rust
/// use platin_client::domain::HubConfig;
///
/// let cfg = HubConfig::new("192.168.1.50");
/// assert_eq!(cfg.control_port, 50006);
/// assert_eq!(cfg.media_port, 7777);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubConfig {
    /// Hostname or IP address of the hub.
    pub host: String,
    /// TCP port of the control service (power, sources).
    pub control_port: u16,
    /// TCP port of the media service (volume).
    pub media_port: u16,
    /// Upper bound on a TCP connect.
    pub connect_timeout: Duration,
    /// Upper bound on each read; restarted before every read.
    pub read_timeout: Duration,
}

impl HubConfig {
    /// Creates a config for `host` with the default ports and timeouts.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            control_port: DEFAULT_CONTROL_PORT,
            media_port: DEFAULT_MEDIA_PORT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    /// Formats `host:port` for log and error messages.
    ///
    /// IPv6 literals are bracketed.
    pub fn display_addr(&self, port: u16) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{port}", self.host)
        } else {
            format!("{}:{port}", self.host)
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
