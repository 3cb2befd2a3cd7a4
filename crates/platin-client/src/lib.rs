//! platin-client library entry point.
//!
//! Remote control for a Platin audio hub.  The hub runs two TCP services:
//! a control service (power and input source) and a media service (volume).
//! Every [`Hub`] operation opens its own connection, performs one short
//! exchange, and closes it again; nothing is cached between calls.
//!
//! ```no_run
//! use platin_client::{Hub, HubConfig};
//!
//! # async fn demo() -> Result<(), platin_client::HubError> {
//! let hub = Hub::new(HubConfig::new("192.168.1.50"));
//! if !hub.power().await? {
//!     hub.set_power(true).await?;
//! }
//! hub.set_source("Optical").await?;
//! hub.set_volume(30).await?;
//! # Ok(())
//! # }
//! ```
//!
//! Layers:
//!
//! - `domain` – connection settings and the error type.
//! - `application` – the hub operations, written against a transport trait.
//! - `infrastructure` – TCP transport and the config file.
//! - `presentation` – text output for the `platin` binary.

/// Domain layer: settings and errors.
pub mod domain;

/// Application layer: hub operations.
pub mod application;

/// Infrastructure layer: TCP transport and config file.
pub mod infrastructure;

/// Presentation layer: CLI output formatting.
pub mod presentation;

pub use application::hub::{Hub, HubTransport};
pub use domain::{HubConfig, HubError};
pub use infrastructure::network::TcpTransport;
pub use platin_core::Source;
