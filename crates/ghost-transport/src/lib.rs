//! Transport layer for Ghost.
//!
//! Ghost speaks its binary protocol over plain TCP. This crate owns the
//! sockets:
//!
//! - [`TcpTransport`] accepts connections and tags each with a
//!   [`ConnectionId`] and its peer address.
//! - [`FrameReader`] / [`FrameWriter`] turn any async byte stream into a
//!   stream of [`Frame`](ghost_protocol::Frame)s.
//! - [`PeerListener`] / [`dial_peer`] are the client-side half of a
//!   rendezvous: a single-use listening socket and the matching dial.

#![allow(async_fn_in_trait)]

mod error;
mod frame_io;
mod peer;
mod tcp;

pub use error::TransportError;
pub use frame_io::{FrameReader, FrameWriter, DEFAULT_MAX_FRAME_LEN};
pub use peer::{dial_peer, PeerListener};
pub use tcp::{TcpConnection, TcpTransport};

use std::fmt;
use std::net::SocketAddr;

/// Process-unique tag for an accepted connection, handed out in accept
/// order starting at 1. Sessions, outboxes and log lines key on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// A listening socket that yields connections.
///
/// [`TcpTransport`] is the only implementation the server uses.
pub trait Transport: Send + Sync + 'static {
    type Connection;
    type Error: std::error::Error + Send + Sync;

    /// Waits for the next peer.
    async fn accept(&mut self) -> Result<Self::Connection, Self::Error>;

    fn local_addr(&self) -> std::io::Result<SocketAddr>;
}
