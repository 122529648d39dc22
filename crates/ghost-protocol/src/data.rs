//! Application messages carried inside `DATA` frames.
//!
//! The frame layer treats `DATA` payloads as opaque bytes. Inside, they
//! are JSON objects with a `type` discriminator:
//!
//! ```text
//! {"type": "PLAY_LETTER", "letter": "a"}
//! {"type": "CHAT", "sender": "ann", "message": "hi"}
//! {"type": "GAME_STATE", "frag": "CA", "active_player": "bob",
//!  "event": "ann played A", "scores": {"ann": "", "bob": "G"}}
//! {"type": "BROADCAST", "message": "server restarting"}
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[cfg(feature = "json")]
use crate::{Codec, JsonCodec, ProtocolError};

/// A game or chat message exchanged through `DATA` frames.
///
/// `#[serde(tag = "type")]` produces internally tagged JSON, and
/// `SCREAMING_SNAKE_CASE` turns `PlayLetter` into `"PLAY_LETTER"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataMessage {
    /// Client → Server: play one letter on your turn.
    PlayLetter { letter: String },

    /// Either direction: a chat line for the room.
    Chat { sender: String, message: String },

    /// Server → Client: the room's game after a move or roster change.
    GameState {
        frag: String,
        /// `None` when the room is empty.
        active_player: Option<String>,
        event: String,
        /// Pseudo → penalty string (a prefix of "GHOST").
        scores: BTreeMap<String, String>,
    },

    /// Server → Client: an administrator announcement.
    Broadcast { message: String },
}

impl DataMessage {
    /// Returns `true` for the variants clients are allowed to send.
    pub fn is_client_message(&self) -> bool {
        matches!(self, Self::PlayLetter { .. } | Self::Chat { .. })
    }

    /// Serializes to the JSON body of a `DATA` frame.
    #[cfg(feature = "json")]
    pub fn to_bytes(&self) -> Result<Vec<u8>, ProtocolError> {
        JsonCodec.encode(self)
    }

    /// Parses the JSON body of a `DATA` frame.
    #[cfg(feature = "json")]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProtocolError> {
        JsonCodec.decode(bytes)
    }
}
