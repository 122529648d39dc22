//! Session types: the server's record of one connection.

use std::net::SocketAddr;
use std::time::SystemTime;

use ghost_protocol::RoomId;
use ghost_transport::ConnectionId;

use crate::Outbox;

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Limits applied to every session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Longest accepted pseudo, in characters.
    ///
    /// Default: 20.
    pub max_pseudo_len: usize,

    /// How many messages may wait in a connection's outbound queue
    /// before the connection is treated as a slow consumer and closed.
    ///
    /// Default: 64.
    pub outbound_queue: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_pseudo_len: 20,
            outbound_queue: 64,
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A single connection's session.
///
/// Created as soon as the socket is accepted, with no pseudo. A successful
/// login names it; it is destroyed when the connection goes away.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: ConnectionId,

    /// Remote address of the TCP connection. The rendezvous uses its IP
    /// to tell a requester where to dial.
    pub addr: SocketAddr,

    /// `None` until login succeeds.
    pub pseudo: Option<String>,

    /// The room this session sits in, if any.
    pub current_room: Option<RoomId>,

    /// When the last inbound frame arrived.
    pub last_activity: SystemTime,

    /// Where to push messages for this connection.
    pub outbox: Outbox,
}

impl Session {
    pub(crate) fn new(id: ConnectionId, addr: SocketAddr, outbox: Outbox) -> Self {
        Self {
            id,
            addr,
            pseudo: None,
            current_room: None,
            last_activity: SystemTime::now(),
            outbox,
        }
    }

    /// Returns `true` once the session has a pseudo.
    pub fn is_logged_in(&self) -> bool {
        self.pseudo.is_some()
    }

    /// The fields an operator dashboard displays.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            conn_id: self.id,
            addr: self.addr,
            pseudo: self.pseudo.clone(),
            current_room: self.current_room,
            last_activity: self.last_activity,
        }
    }
}

/// A point-in-time copy of a session, safe to hand out to admin tooling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub conn_id: ConnectionId,
    pub addr: SocketAddr,
    /// `None` for a guest that hasn't logged in.
    pub pseudo: Option<String>,
    pub current_room: Option<RoomId>,
    pub last_activity: SystemTime,
}
