//! Binary codec for the hub's request and response frames.
//!
//! Wire formats (all multi-byte integers big-endian):
//! ```text
//! control request : [00][len:1][03][02][cmd:N]            len = N + 2
//! control response: [length:2][type:3][payload:length-3]
//! media request   : [00][00][cmd:2][00 00 00 00][len:1][00][payload:len]
//! media response  : [00][00][type:3][unknown:3][length:2][payload:length]
//! ```
//!
//! Nothing in this module performs I/O. Responses are decoded in two steps so
//! that a stream reader can pull exactly the right number of bytes: read
//! [`ResponseFrame::HEADER_SIZE`] bytes, ask [`ResponseFrame::payload_len`] how
//! many more to read, then assemble with [`ResponseFrame::from_parts`].

use std::fmt;

use thiserror::Error;

use crate::protocol::messages::{
    CONTROL_MARKER, CONTROL_REQUEST_HEADER_SIZE, CONTROL_RESPONSE_HEADER_SIZE, CONTROL_TYPE_SIZE,
    MAX_MEDIA_PAYLOAD, MEDIA_HEADER_SIZE,
};

/// Errors that can occur while encoding a request or decoding a response.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The byte slice is shorter than the minimum required length.
    #[error("insufficient data: need at least {needed} bytes, got {available}")]
    InsufficientData { needed: usize, available: usize },

    /// A control response declared a length smaller than its own type field.
    #[error("control response length {0} is smaller than the 3-byte type field")]
    LengthUnderflow(u16),

    /// The header's length field does not match the payload supplied.
    #[error("payload length mismatch: header says {declared}, available is {available}")]
    PayloadLengthMismatch { declared: usize, available: usize },

    /// A request payload does not fit the single-byte length field.
    #[error("payload too long: {len} bytes (max: {max})")]
    PayloadTooLong { len: usize, max: usize },

    /// A value does not fit the wire field it must be written to.
    #[error("{field} out of range: {value}")]
    FieldOutOfRange { field: &'static str, value: i64 },

    /// The payload could not be parsed (bad JSON, non-ASCII text, etc.).
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// A source record carried an active flag other than `0` or `1`.
    #[error("invalid active flag {value} for source {name:?}")]
    InvalidActiveFlag { name: String, value: String },

    /// The volume payload is not a decimal integer in byte range.
    #[error("invalid volume payload: {0:?}")]
    InvalidVolume(String),
}

// ── Request encoding ──────────────────────────────────────────────────────────

/// Wraps `command` in a control request frame.
///
/// The second byte counts the command bytes plus the two marker bytes.
///
/// # Errors
///
/// Returns [`ProtocolError::PayloadTooLong`] if that count does not fit a byte.
///
/// # Examples
///
/// ```rust
/// use platin_core::protocol::codec::encode_control_request;
///
/// let bytes = encode_control_request(&[0x0d]).unwrap();
/// assert_eq!(bytes, vec![0x00, 0x03, 0x03, 0x02, 0x0d]);
/// ```
pub fn encode_control_request(command: &[u8]) -> Result<Vec<u8>, ProtocolError> {
    let max = u8::MAX as usize - CONTROL_MARKER.len();
    let len = u8::try_from(command.len() + CONTROL_MARKER.len()).map_err(|_| {
        ProtocolError::PayloadTooLong {
            len: command.len(),
            max,
        }
    })?;

    let mut buf = Vec::with_capacity(CONTROL_REQUEST_HEADER_SIZE + command.len());
    buf.push(0x00);
    buf.push(len);
    buf.extend_from_slice(&CONTROL_MARKER);
    buf.extend_from_slice(command);
    Ok(buf)
}

/// Builds a media request frame from a two-byte command and an ASCII payload.
///
/// # Errors
///
/// Returns [`ProtocolError::PayloadTooLong`] if `payload` is longer than
/// [`MAX_MEDIA_PAYLOAD`] bytes.
///
/// # Examples
///
/// ```rust
/// use platin_core::protocol::codec::encode_media_request;
///
/// let bytes = encode_media_request([0x02, 0x40], "42").unwrap();
/// assert_eq!(&bytes[..10], &[0x00, 0x00, 0x02, 0x40, 0x00, 0x00, 0x00, 0x00, 0x02, 0x00]);
/// assert_eq!(&bytes[10..], b"42");
/// ```
pub fn encode_media_request(command: [u8; 2], payload: &str) -> Result<Vec<u8>, ProtocolError> {
    let payload = payload.as_bytes();
    if payload.len() > MAX_MEDIA_PAYLOAD {
        return Err(ProtocolError::PayloadTooLong {
            len: payload.len(),
            max: MAX_MEDIA_PAYLOAD,
        });
    }

    let mut buf = Vec::with_capacity(MEDIA_HEADER_SIZE + payload.len());
    buf.extend_from_slice(&[0x00, 0x00]);
    buf.extend_from_slice(&command);
    buf.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
    buf.push(payload.len() as u8);
    buf.push(0x00);
    buf.extend_from_slice(payload);
    Ok(buf)
}

// ── Response decoding ─────────────────────────────────────────────────────────

mod private {
    pub trait Sealed {}
    impl Sealed for super::ControlResponse {}
    impl Sealed for super::MediaResponse {}
}

/// A response frame that can be read off a byte stream.
///
/// Implemented only by [`ControlResponse`] and [`MediaResponse`].
pub trait ResponseFrame: private::Sealed + Sized {
    /// Number of header bytes to read before the payload length is known.
    const HEADER_SIZE: usize;

    /// Returns how many payload bytes follow `header`.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError`] if `header` is short or its length field is
    /// inconsistent.
    fn payload_len(header: &[u8]) -> Result<usize, ProtocolError>;

    /// Builds the response from a complete header and exactly the payload
    /// announced by [`ResponseFrame::payload_len`].
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::PayloadLengthMismatch`] if the payload size
    /// differs from the header's declaration.
    fn from_parts(header: &[u8], payload: Vec<u8>) -> Result<Self, ProtocolError>;

    /// Decodes one response from the beginning of `bytes`.
    ///
    /// Returns the response and the number of bytes consumed.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError`] if `bytes` holds less than one complete frame.
    fn decode(bytes: &[u8]) -> Result<(Self, usize), ProtocolError> {
        require_len(bytes, Self::HEADER_SIZE)?;
        let header = &bytes[..Self::HEADER_SIZE];
        let payload_len = Self::payload_len(header)?;

        let total = Self::HEADER_SIZE + payload_len;
        if bytes.len() < total {
            return Err(ProtocolError::PayloadLengthMismatch {
                declared: payload_len,
                available: bytes.len() - Self::HEADER_SIZE,
            });
        }

        let frame = Self::from_parts(header, bytes[Self::HEADER_SIZE..total].to_vec())?;
        Ok((frame, total))
    }
}

/// Response from the control service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlResponse {
    /// Byte count of `response_type` plus `payload`.
    pub length: u16,
    /// Response type, `00 02 <opcode>` in practice.
    pub response_type: [u8; 3],
    /// Body; `length - 3` bytes.
    pub payload: Vec<u8>,
}

impl ResponseFrame for ControlResponse {
    const HEADER_SIZE: usize = CONTROL_RESPONSE_HEADER_SIZE;

    fn payload_len(header: &[u8]) -> Result<usize, ProtocolError> {
        require_len(header, Self::HEADER_SIZE)?;
        let length = u16::from_be_bytes([header[0], header[1]]);
        (length as usize)
            .checked_sub(CONTROL_TYPE_SIZE)
            .ok_or(ProtocolError::LengthUnderflow(length))
    }

    fn from_parts(header: &[u8], payload: Vec<u8>) -> Result<Self, ProtocolError> {
        let declared = Self::payload_len(header)?;
        if payload.len() != declared {
            return Err(ProtocolError::PayloadLengthMismatch {
                declared,
                available: payload.len(),
            });
        }
        Ok(Self {
            length: u16::from_be_bytes([header[0], header[1]]),
            response_type: [header[2], header[3], header[4]],
            payload,
        })
    }
}

impl fmt::Display for ControlResponse {
    /// `[00 04] [00 02 0d] [01]`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] [{}] [{}]",
            hex(&self.length.to_be_bytes()),
            hex(&self.response_type),
            hex(&self.payload)
        )
    }
}

/// Response from the media service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaResponse {
    /// Response type bytes (header offset 2..5).
    pub response_type: [u8; 3],
    /// Reserved bytes (header offset 5..8). Never interpreted; kept for
    /// diagnostics.
    pub unknown: [u8; 3],
    /// Payload byte count.
    pub length: u16,
    /// ASCII body.
    pub payload: Vec<u8>,
}

impl MediaResponse {
    /// Returns the payload as text.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::MalformedPayload`] if the payload is not ASCII.
    pub fn payload_text(&self) -> Result<&str, ProtocolError> {
        if !self.payload.is_ascii() {
            return Err(ProtocolError::MalformedPayload(format!(
                "media payload is not ASCII: {}",
                hex(&self.payload)
            )));
        }
        // ASCII is always valid UTF-8.
        std::str::from_utf8(&self.payload)
            .map_err(|e| ProtocolError::MalformedPayload(e.to_string()))
    }

    /// Interprets the payload as a decimal volume level.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::MalformedPayload`] if the payload is not ASCII,
    /// or [`ProtocolError::InvalidVolume`] unless it is a decimal integer
    /// between 0 and 255.
    pub fn volume(&self) -> Result<u8, ProtocolError> {
        let text = self.payload_text()?;
        text.parse::<u8>()
            .map_err(|_| ProtocolError::InvalidVolume(text.to_string()))
    }
}

impl ResponseFrame for MediaResponse {
    const HEADER_SIZE: usize = MEDIA_HEADER_SIZE;

    fn payload_len(header: &[u8]) -> Result<usize, ProtocolError> {
        require_len(header, Self::HEADER_SIZE)?;
        Ok(u16::from_be_bytes([header[8], header[9]]) as usize)
    }

    fn from_parts(header: &[u8], payload: Vec<u8>) -> Result<Self, ProtocolError> {
        let declared = Self::payload_len(header)?;
        if payload.len() != declared {
            return Err(ProtocolError::PayloadLengthMismatch {
                declared,
                available: payload.len(),
            });
        }
        // bytes[0..2] are not interpreted
        Ok(Self {
            response_type: [header[2], header[3], header[4]],
            unknown: [header[5], header[6], header[7]],
            length: u16::from_be_bytes([header[8], header[9]]),
            payload,
        })
    }
}

impl fmt::Display for MediaResponse {
    /// `00 00 [01 40 00] [00 00 00] [00 02] "42"`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "00 00 [{}] [{}] [{}]",
            hex(&self.response_type),
            hex(&self.unknown),
            hex(&self.length.to_be_bytes())
        )?;
        if !self.payload.is_empty() {
            write!(f, " {:?}", String::from_utf8_lossy(&self.payload))?;
        }
        Ok(())
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Formats bytes as space-separated lowercase hex pairs.
pub fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn require_len(bytes: &[u8], needed: usize) -> Result<(), ProtocolError> {
    if bytes.len() < needed {
        return Err(ProtocolError::InsufficientData {
            needed,
            available: bytes.len(),
        });
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
