//! Unified error type for the Ghost server.

use ghost_game::GameError;
use ghost_protocol::ProtocolError;
use ghost_room::RoomError;
use ghost_session::SessionError;
use ghost_transport::TransportError;

use crate::RendezvousError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum GhostError {
    /// A transport-level error (bind, accept, read, write).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (framing, encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (login refused, slow consumer).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A room-level error (full, not found, not seated).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// The game refused a move.
    #[error(transparent)]
    Game(#[from] GameError),

    /// A peer-to-peer rendezvous could not proceed.
    #[error(transparent)]
    Rendezvous(#[from] RendezvousError),

    /// Bad configuration (environment variable, room list).
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A plain I/O failure (reading the dictionary file, for example).
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
