//! Request commands and wire constants for both hub services.
//!
//! The hub exposes two unrelated TCP services:
//!
//! - the **control service** (power and source selection), which speaks a
//!   length-prefixed frame with a fixed `03 02` marker, and
//! - the **media service** (volume), which speaks a fixed 10-byte header
//!   followed by an ASCII payload.
//!
//! Every request the client can send is one variant of [`ControlCommand`] or
//! [`MediaCommand`]; [`RequestFrame`] joins the two so callers that do not care
//! which service a frame targets can still encode it.

use std::net::IpAddr;

use crate::protocol::codec::{encode_control_request, encode_media_request, ProtocolError};

// ── Service ports ─────────────────────────────────────────────────────────────

/// Default TCP port of the control service.
pub const DEFAULT_CONTROL_PORT: u16 = 50006;

/// Default TCP port of the media service.
pub const DEFAULT_MEDIA_PORT: u16 = 7777;

// ── Frame geometry ────────────────────────────────────────────────────────────

/// Bytes preceding the command in a control request: `00 len 03 02`.
pub const CONTROL_REQUEST_HEADER_SIZE: usize = 4;

/// Fixed marker following the length byte of every control request.
pub const CONTROL_MARKER: [u8; 2] = [0x03, 0x02];

/// Bytes in a control response header: `length:u16_be` + `type:3`.
pub const CONTROL_RESPONSE_HEADER_SIZE: usize = 5;

/// The three type bytes are counted by the control response length field.
pub const CONTROL_TYPE_SIZE: usize = 3;

/// Size of the media request and media response headers.
pub const MEDIA_HEADER_SIZE: usize = 10;

/// The media request stores its payload length in a single byte.
pub const MAX_MEDIA_PAYLOAD: usize = u8::MAX as usize;

// ── Opcodes ───────────────────────────────────────────────────────────────────

/// Command opcodes understood by the hub.
pub mod opcodes {
    /// Control: list the selectable sources (JSON reply).
    pub const LIST_SOURCES: u8 = 0x01;
    /// Control: select a source; followed by one index byte.
    pub const SELECT_SOURCE: u8 = 0x03;
    /// Control: query the power state; reply payload byte 0 is `0x01` when on.
    pub const QUERY_POWER: u8 = 0x0D;
    /// Control: set the power state; followed by one argument byte.
    pub const SET_POWER: u8 = 0x0F;

    /// Media: register this connection; payload is the caller's IP as text.
    pub const REGISTER: [u8; 2] = [0x02, 0x03];
    /// Media: read the volume; reply payload is a decimal string.
    pub const GET_VOLUME: [u8; 2] = [0x01, 0x40];
    /// Media: set the volume; payload is a decimal string.
    pub const SET_VOLUME: [u8; 2] = [0x02, 0x40];
}

/// `SET_POWER` argument that turns the speakers off.
pub const POWER_OFF: u8 = 0x00;

/// `SET_POWER` argument that turns the speakers on.
pub const POWER_ON: u8 = 0x01;

/// Argument sent by the toggle command.
///
/// This is the same byte as [`POWER_OFF`]. The hub receives it unchanged and
/// whether it toggles or switches off depends on hub firmware.
pub const TOGGLE_POWER_ARG: u8 = 0x00;

// ── Control service commands ──────────────────────────────────────────────────

/// Every command the client sends to the control service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    /// `01`: list sources.
    ListSources,
    /// `03 <index>`: make the source with hub index `index` active.
    SelectSource { index: u8 },
    /// `0d`: query the power state.
    QueryPower,
    /// `0f <00|01>`: switch the power off or on.
    SetPower { on: bool },
    /// `0f 00`: the toggle command, sent without reading the current state.
    TogglePower,
}

impl ControlCommand {
    /// Returns the command bytes that follow the control request header.
    pub fn command_bytes(&self) -> Vec<u8> {
        match *self {
            ControlCommand::ListSources => vec![opcodes::LIST_SOURCES],
            ControlCommand::SelectSource { index } => vec![opcodes::SELECT_SOURCE, index],
            ControlCommand::QueryPower => vec![opcodes::QUERY_POWER],
            ControlCommand::SetPower { on } => {
                vec![opcodes::SET_POWER, if on { POWER_ON } else { POWER_OFF }]
            }
            ControlCommand::TogglePower => vec![opcodes::SET_POWER, TOGGLE_POWER_ARG],
        }
    }

    /// Encodes this command as a complete control request frame.
    ///
    /// # Errors
    ///
    /// Never fails for the commands defined here; the `Result` mirrors
    /// [`encode_control_request`].
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        encode_control_request(&self.command_bytes())
    }
}

// ── Media service commands ────────────────────────────────────────────────────

/// Every command the client sends to the media service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaCommand {
    /// Mandatory first command on each media connection.
    Register { local_ip: IpAddr },
    /// Read the current volume.
    GetVolume,
    /// Set the volume. Range checking belongs to the caller.
    SetVolume { level: u8 },
}

impl MediaCommand {
    /// Returns the two opcode bytes placed at offset 2 of the header.
    pub fn opcode(&self) -> [u8; 2] {
        match self {
            MediaCommand::Register { .. } => opcodes::REGISTER,
            MediaCommand::GetVolume => opcodes::GET_VOLUME,
            MediaCommand::SetVolume { .. } => opcodes::SET_VOLUME,
        }
    }

    /// Returns the ASCII payload carried after the header.
    pub fn payload(&self) -> String {
        match self {
            MediaCommand::Register { local_ip } => local_ip.to_string(),
            MediaCommand::GetVolume => String::new(),
            MediaCommand::SetVolume { level } => level.to_string(),
        }
    }

    /// Encodes this command as a complete media request frame.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::PayloadTooLong`] if the payload exceeds
    /// [`MAX_MEDIA_PAYLOAD`] bytes.
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        encode_media_request(self.opcode(), &self.payload())
    }
}

// ── Request frames ────────────────────────────────────────────────────────────

/// A request for either service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestFrame {
    Control(ControlCommand),
    Media(MediaCommand),
}

impl RequestFrame {
    /// Encodes the request into the bytes written to the socket.
    ///
    /// # Errors
    ///
    /// Propagates the encoding error of the underlying command.
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        match self {
            RequestFrame::Control(cmd) => cmd.encode(),
            RequestFrame::Media(cmd) => cmd.encode(),
        }
    }
}

impl From<ControlCommand> for RequestFrame {
    fn from(cmd: ControlCommand) -> Self {
        RequestFrame::Control(cmd)
    }
}

impl From<MediaCommand> for RequestFrame {
    fn from(cmd: MediaCommand) -> Self {
        RequestFrame::Media(cmd)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_power_command_bytes_is_single_opcode() {
        assert_eq!(ControlCommand::QueryPower.command_bytes(), vec![0x0D]);
    }

    #[test]
    fn test_set_power_on_appends_power_on_argument() {
        assert_eq!(
            ControlCommand::SetPower { on: true }.command_bytes(),
            vec![0x0F, 0x01]
        );
        assert_eq!(
            ControlCommand::SetPower { on: false }.command_bytes(),
            vec![0x0F, 0x00]
        );
    }

    #[test]
    fn test_toggle_power_always_sends_zero_argument() {
        assert_eq!(ControlCommand::TogglePower.command_bytes(), vec![0x0F, 0x00]);
    }

    #[test]
    fn test_select_source_appends_index_byte() {
        assert_eq!(
            ControlCommand::SelectSource { index: 7 }.command_bytes(),
            vec![0x03, 0x07]
        );
    }

    #[test]
    fn test_register_payload_is_textual_ip() {
        let cmd = MediaCommand::Register {
            local_ip: "192.168.1.20".parse().unwrap(),
        };
        assert_eq!(cmd.opcode(), [0x02, 0x03]);
        assert_eq!(cmd.payload(), "192.168.1.20");
    }

    #[test]
    fn test_set_volume_payload_is_decimal() {
        let cmd = MediaCommand::SetVolume { level: 42 };
        assert_eq!(cmd.opcode(), [0x02, 0x40]);
        assert_eq!(cmd.payload(), "42");
    }

    #[test]
    fn test_get_volume_has_empty_payload() {
        assert!(MediaCommand::GetVolume.payload().is_empty());
    }

    #[test]
    fn test_request_frame_dispatches_to_service_encoder() {
        let control = RequestFrame::from(ControlCommand::ListSources).encode().unwrap();
        let media = RequestFrame::from(MediaCommand::GetVolume).encode().unwrap();

        assert_eq!(control, vec![0x00, 0x03, 0x03, 0x02, 0x01]);
        assert_eq!(media.len(), MEDIA_HEADER_SIZE);
        assert_eq!(&media[2..4], &[0x01, 0x40]);
    }
}
