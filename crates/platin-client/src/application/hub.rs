//! Hub: the public remote-control operations.
//!
//! Each operation is one linear sequence (connect, optional register, send,
//! optional receive, close) carried out by a [`HubTransport`].  The hub itself
//! holds no state between calls: power, volume, and sources are always read
//! fresh.
//!
//! The only shortcut is [`Hub::set_power`], which skips the write when the hub
//! already reports the requested state.

use async_trait::async_trait;
use platin_core::domain::source::{find_active, find_by_name};
use platin_core::protocol::messages::POWER_ON;
use platin_core::{
    parse_source_list, ControlCommand, ControlResponse, MediaCommand, MediaResponse,
    ProtocolError, Source,
};
use tracing::{debug, info};

use crate::domain::HubError;

/// Frame exchanges the hub operations are built from.
///
/// Every call opens its own connection and closes it before returning.  The
/// TCP implementation lives in [`crate::infrastructure::network`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HubTransport: Send + Sync {
    /// Sends a control command without waiting for a reply.
    async fn send_control(&self, command: ControlCommand) -> Result<(), HubError>;

    /// Sends a control command and decodes the reply.
    async fn query_control(&self, command: ControlCommand) -> Result<ControlResponse, HubError>;

    /// Registers on a fresh media connection, then sends `command` and decodes
    /// its reply.
    async fn media_exchange(&self, command: MediaCommand) -> Result<MediaResponse, HubError>;
}

/// Remote control for one hub.
pub struct Hub<T> {
    transport: T,
}

impl<T: HubTransport> Hub<T> {
    /// Creates a hub client over an explicit transport.
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    /// Returns whether the speakers are powered on.
    ///
    /// # Errors
    ///
    /// Returns [`HubError`] if the control service cannot be reached or the
    /// reply carries no payload byte.
    pub async fn power(&self) -> Result<bool, HubError> {
        let resp = self.transport.query_control(ControlCommand::QueryPower).await?;
        let state = resp
            .payload
            .first()
            .copied()
            .ok_or(ProtocolError::InsufficientData {
                needed: 1,
                available: 0,
            })?;
        Ok(state == POWER_ON)
    }

    /// Switches the speakers on or off.
    ///
    /// Reads the current state first and sends nothing if it already matches.
    ///
    /// # Errors
    ///
    /// Returns [`HubError`] if either the query or the write fails.
    pub async fn set_power(&self, on: bool) -> Result<(), HubError> {
        if self.power().await? == on {
            debug!("power already {}; nothing to send", if on { "on" } else { "off" });
            return Ok(());
        }
        self.transport
            .send_control(ControlCommand::SetPower { on })
            .await?;
        info!("power set {}", if on { "on" } else { "off" });
        Ok(())
    }

    /// Sends the toggle command.
    ///
    /// The command goes out as-is without reading the current state; its
    /// effect depends on hub firmware.
    ///
    /// # Errors
    ///
    /// Returns [`HubError`] if the write fails.
    pub async fn toggle_power(&self) -> Result<(), HubError> {
        self.transport
            .send_control(ControlCommand::TogglePower)
            .await
    }

    /// Lists the hub's sources in the order the hub reports them.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Protocol`] if the source list cannot be parsed.
    pub async fn sources(&self) -> Result<Vec<Source>, HubError> {
        let resp = self.transport.query_control(ControlCommand::ListSources).await?;
        Ok(parse_source_list(&resp.payload)?)
    }

    /// Returns the source flagged active.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::SourceNotFound`] if no source is active.
    pub async fn active_source(&self) -> Result<Source, HubError> {
        let sources = self.sources().await?;
        find_active(&sources).cloned().ok_or(HubError::SourceNotFound)
    }

    /// Makes the source named exactly `name` active.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::SourceNotFound`] without sending anything if no
    /// source has that name, or [`ProtocolError::FieldOutOfRange`] if its index
    /// does not fit the one-byte argument.
    pub async fn set_source(&self, name: &str) -> Result<(), HubError> {
        let sources = self.sources().await?;
        let source = find_by_name(&sources, name).ok_or(HubError::SourceNotFound)?;
        let index = u8::try_from(source.index).map_err(|_| ProtocolError::FieldOutOfRange {
            field: "source index",
            value: source.index,
        })?;

        self.transport
            .send_control(ControlCommand::SelectSource { index })
            .await?;
        info!("selected source {name:?} (index {index})");
        Ok(())
    }

    /// Returns the current volume level.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidVolume`] (wrapped) if the reply is not
    /// a decimal integer.
    pub async fn volume(&self) -> Result<u8, HubError> {
        let resp = self.transport.media_exchange(MediaCommand::GetVolume).await?;
        Ok(resp.volume()?)
    }

    /// Sets the volume level.
    ///
    /// The caller is responsible for keeping `level` within 0–100.
    ///
    /// # Errors
    ///
    /// Returns [`HubError`] if the exchange fails.
    pub async fn set_volume(&self, level: u8) -> Result<(), HubError> {
        let resp = self
            .transport
            .media_exchange(MediaCommand::SetVolume { level })
            .await?;
        debug!("set volume reply: {resp}");
        info!("volume set to {level}");
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
