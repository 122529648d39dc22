//! Serialization of `DATA` bodies.
//!
//! Frames carry `DATA` bodies as opaque bytes. What goes inside is decided
//! here: clients and server agree on JSON, through [`JsonCodec`].

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// Turns application messages into `DATA` bodies and back.
///
/// Implementations are stateless, so one value can be shared by every
/// connection task.
pub trait Codec: Send + Sync + 'static {
    /// # Errors
    /// [`ProtocolError::Encode`] when `value` can't be represented.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// # Errors
    /// [`ProtocolError::Decode`] when `body` isn't a valid `T`. This is
    /// never fatal: the frame around it was well-formed.
    fn decode<T: DeserializeOwned>(&self, body: &[u8]) -> Result<T, ProtocolError>;
}

/// JSON bodies, the format clients send. Requires the `json` feature.
///
/// ```rust
/// use ghost_protocol::{Codec, DataMessage, JsonCodec};
///
/// let body = JsonCodec
///     .encode(&DataMessage::PlayLetter { letter: "q".into() })
///     .unwrap();
/// assert_eq!(body, br#"{"type":"PLAY_LETTER","letter":"q"}"#);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, body: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(body).map_err(ProtocolError::Decode)
    }
}
