//! Wire protocol for Ghost.
//!
//! This crate defines the "language" that clients and the server speak
//! over a raw TCP stream:
//!
//! - **Framing** ([`encode_frame`], [`decode_header`], [`decode_body`]):
//!   every message is `BE-u32 length || opcode || payload`, where the
//!   length counts the opcode byte plus the payload.
//! - **Messages** ([`ClientMessage`], [`ServerMessage`]): the typed
//!   per-opcode payloads, one enum per direction.
//! - **Application data** ([`DataMessage`]): the JSON bodies carried by
//!   `DATA` frames (letters, chat, game state, broadcasts).
//! - **Errors** ([`ProtocolError`]): structural failures only. The codec
//!   never judges field semantics (pseudo charset, room existence...).
//!
//! # Architecture
//!
//! ```text
//! Transport (bytes) → Protocol (Frame → ClientMessage) → Session / Room
//! ```

mod codec;
mod data;
mod error;
mod frame;
mod message;
mod payload;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use data::DataMessage;
pub use error::ProtocolError;
pub use frame::{
    decode_body, decode_header, encode_frame, Frame, HEADER_LEN,
};
pub use message::{ClientMessage, ServerMessage};
pub use payload::{PayloadReader, PayloadWriter};
pub use types::{
    ErrorCode, LoginStatus, NotifyKind, OpCode, RoomId, RoomSummary,
    MAX_LISTED_ROOMS,
};
