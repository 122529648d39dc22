//! Error types for the protocol layer.
//!
//! Each crate in Ghost defines its own error enum. When you see a
//! `ProtocolError`, the problem is in the bytes themselves, not in
//! networking or game rules.

use crate::OpCode;

/// Errors that can occur while encoding or decoding wire messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The byte stream is structurally broken: a short header, an empty
    /// body, an unknown opcode, a truncated field, invalid UTF-8 or
    /// trailing garbage after a fixed-shape payload.
    ///
    /// A framing error is fatal to the connection: once framing is lost
    /// the stream can no longer be trusted.
    #[error("framing error: {0}")]
    Framing(String),

    /// A well-formed message whose opcode is only valid in the other
    /// direction (e.g. a client sending `RESP_LOGIN`).
    #[error("opcode {0} is not valid in this direction")]
    UnexpectedOpcode(OpCode),

    /// A length-prefixed string does not fit its single-byte prefix.
    #[error("field too long: {0} bytes (max 255)")]
    FieldTooLong(usize),

    /// JSON serialization of a `DATA` body failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// A `DATA` body is not a valid JSON application message.
    ///
    /// Common causes: malformed JSON, an unknown `type` tag, or missing
    /// fields.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),
}

impl ProtocolError {
    /// Shorthand for building a [`ProtocolError::Framing`].
    pub(crate) fn framing(reason: impl Into<String>) -> Self {
        Self::Framing(reason.into())
    }

    /// Returns `true` if this error means the stream is unusable.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Framing(_))
    }
}
