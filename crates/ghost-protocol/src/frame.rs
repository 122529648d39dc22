//! Length-prefixed framing.
//!
//! Every message on the wire has the same envelope:
//!
//! ```text
//! ┌──────────────────────┬──────────┬──────────────────────┐
//! │ length: u32 (BE)     │ opcode   │ payload              │
//! │ = 1 + payload.len()  │ u8       │ length - 1 bytes     │
//! └──────────────────────┴──────────┴──────────────────────┘
//! ```
//!
//! The reader first pulls the 4-byte header, then waits until all
//! `length` body bytes have arrived before interpreting anything.

use crate::ProtocolError;

/// Size of the length prefix in bytes.
pub const HEADER_LEN: usize = 4;

/// A decoded frame: the raw opcode byte and its payload.
///
/// The opcode stays a plain `u8` here. Turning it into an [`OpCode`]
/// (and rejecting unknown values) is the job of the message layer.
///
/// [`OpCode`]: crate::OpCode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// The opcode byte.
    pub opcode: u8,
    /// Everything after the opcode.
    pub payload: Vec<u8>,
}

impl Frame {
    /// Creates a frame from an opcode byte and payload.
    pub fn new(opcode: u8, payload: Vec<u8>) -> Self {
        Self { opcode, payload }
    }

    /// Decodes a frame body (opcode + payload, no length prefix).
    pub fn from_body(body: &[u8]) -> Result<Self, ProtocolError> {
        let (opcode, payload) = decode_body(body)?;
        Ok(Self::new(opcode, payload.to_vec()))
    }

    /// Encodes this frame, length prefix included.
    pub fn to_bytes(&self) -> Vec<u8> {
        encode_frame(self.opcode, &self.payload)
    }
}

/// Encodes `BE-u32(1 + len(payload)) || opcode || payload`.
pub fn encode_frame(opcode: u8, payload: &[u8]) -> Vec<u8> {
    let body_len = (1 + payload.len()) as u32;
    let mut out = Vec::with_capacity(HEADER_LEN + 1 + payload.len());
    out.extend_from_slice(&body_len.to_be_bytes());
    out.push(opcode);
    out.extend_from_slice(payload);
    out
}

/// Decodes the 4-byte length prefix.
///
/// Only the first [`HEADER_LEN`] bytes are read.
///
/// # Errors
/// Returns [`ProtocolError::Framing`] if fewer than 4 bytes are supplied.
pub fn decode_header(bytes: &[u8]) -> Result<u32, ProtocolError> {
    let header: [u8; HEADER_LEN] = bytes
        .get(..HEADER_LEN)
        .and_then(|h| h.try_into().ok())
        .ok_or_else(|| {
            ProtocolError::framing(format!(
                "header needs {HEADER_LEN} bytes, got {}",
                bytes.len()
            ))
        })?;
    Ok(u32::from_be_bytes(header))
}

/// Splits a frame body into its opcode and payload.
///
/// # Errors
/// Returns [`ProtocolError::Framing`] if the body is empty (no opcode).
pub fn decode_body(body: &[u8]) -> Result<(u8, &[u8]), ProtocolError> {
    match body.split_first() {
        Some((opcode, payload)) => Ok((*opcode, payload)),
        None => Err(ProtocolError::framing("empty body (no opcode byte)")),
    }
}
