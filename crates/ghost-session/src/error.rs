//! Error types for the session layer.

use ghost_transport::ConnectionId;

/// Errors that can occur during session management.
///
/// Login failures (`InvalidPseudo`, `PseudoTaken`, `AlreadyLoggedIn`) are
/// all reported to the client as a refused login. `SlowConsumer` and
/// `Closed` come from an [`Outbox`](crate::Outbox) and mean the
/// connection is going away.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The pseudo is empty or longer than the configured maximum.
    #[error("invalid pseudo {0:?}")]
    InvalidPseudo(String),

    /// Another live session already holds this pseudo.
    #[error("pseudo {0} is already taken")]
    PseudoTaken(String),

    /// This session already logged in. A session keeps one pseudo for
    /// its whole life.
    #[error("{0} is already logged in")]
    AlreadyLoggedIn(String),

    /// No session exists for this connection.
    #[error("session not found for {0}")]
    NotFound(ConnectionId),

    /// The outbound queue was full. The connection has been told to close.
    #[error("outbound queue full for {0}")]
    SlowConsumer(ConnectionId),

    /// The connection's writer is gone.
    #[error("connection {0} is closed")]
    Closed(ConnectionId),
}
