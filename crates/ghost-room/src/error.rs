//! Error types for the room layer.

use ghost_game::GameError;
use ghost_protocol::RoomId;

/// Errors that can occur during room operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist.
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// Every seat is taken.
    #[error("room {0} is full")]
    RoomFull(RoomId),

    /// The player already sits in a room (this one or another).
    #[error("{0} is already in room {1}")]
    AlreadyInRoom(String, RoomId),

    /// The player isn't in any room.
    #[error("{0} is not in a room")]
    NotInRoom(String),

    /// The game refused the move.
    #[error(transparent)]
    Game(#[from] GameError),

    /// A room can't be created with these settings.
    #[error("invalid room config: {0}")]
    InvalidConfig(String),

    /// The room's command channel is full or closed.
    #[error("room {0} is unavailable")]
    Unavailable(RoomId),
}
