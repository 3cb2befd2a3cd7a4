//! Protocol module containing request commands and the binary codec.

pub mod codec;
pub mod messages;

pub use codec::{
    encode_control_request, encode_media_request, ControlResponse, MediaResponse, ProtocolError,
    ResponseFrame,
};
pub use messages::*;
