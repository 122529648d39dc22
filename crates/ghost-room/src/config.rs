//! Room configuration.

use serde::{Deserialize, Serialize};

use crate::RoomError;

/// Room names travel in `ROOM_LIST` behind a one-byte length.
pub const MAX_ROOM_NAME_LEN: usize = u8::MAX as usize;

/// Settings for one room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Display name shown in room listings.
    pub name: String,

    /// Seats in the room. A join beyond this is refused.
    pub max_players: u8,
}

impl RoomConfig {
    pub fn new(name: impl Into<String>, max_players: u8) -> Self {
        Self {
            name: name.into(),
            max_players,
        }
    }

    /// Checks the name is non-blank and fits the wire (at most
    /// [`MAX_ROOM_NAME_LEN`] bytes), and that the room has a seat.
    ///
    /// # Errors
    /// [`RoomError::InvalidConfig`] naming the first broken rule.
    pub fn validate(&self) -> Result<(), RoomError> {
        if self.name.trim().is_empty() {
            return Err(RoomError::InvalidConfig("room name is blank".into()));
        }
        if self.name.len() > MAX_ROOM_NAME_LEN {
            return Err(RoomError::InvalidConfig(format!(
                "room name is {} bytes, at most {MAX_ROOM_NAME_LEN} allowed",
                self.name.len()
            )));
        }
        if self.max_players == 0 {
            return Err(RoomError::InvalidConfig(format!("room {:?} has no seats", self.name)));
        }
        Ok(())
    }
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self::new("Lobby", 4)
    }
}
