//! Direct peer-to-peer sockets, the client half of a rendezvous.
//!
//! The side that accepts a rendezvous binds a [`PeerListener`] on an
//! ephemeral port, reports the port to the server, and waits for exactly
//! one inbound connection. The requesting side gets `ip:port` back from
//! the server and calls [`dial_peer`]. The server never sees the direct
//! link.

use std::net::{IpAddr, SocketAddr};

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::TransportError;

type AcceptResult = Result<Option<(TcpStream, SocketAddr)>, TransportError>;

/// A single-use listening socket.
///
/// The listener lives on its own short-lived task and is closed after
/// the first accepted connection. Dropping the `PeerListener` (or calling
/// [`cancel`](Self::cancel)) tears the task down without accepting.
pub struct PeerListener {
    port: u16,
    task: JoinHandle<AcceptResult>,
    cancel: oneshot::Sender<()>,
}

impl PeerListener {
    /// Binds an ephemeral port on `ip` and starts waiting for one peer.
    pub async fn bind(ip: IpAddr) -> Result<Self, TransportError> {
        let listener = TcpListener::bind((ip, 0))
            .await
            .map_err(TransportError::AcceptFailed)?;
        let port = listener
            .local_addr()
            .map_err(TransportError::AcceptFailed)?
            .port();
        let (cancel, cancelled) = oneshot::channel();
        let task = tokio::spawn(accept_once(listener, cancelled));
        tracing::debug!(%ip, port, "peer listener bound");
        Ok(Self { port, task, cancel })
    }

    /// The port to hand to the server in `RESP_P2P_READY`.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Waits for the peer to connect.
    ///
    /// Returns `Ok(None)` if the listener was cancelled first.
    pub async fn accept(self) -> AcceptResult {
        let Self { task, cancel, .. } = self;
        let result = task.await.map_err(|e| {
            TransportError::ConnectionClosed(format!("peer listener task failed: {e}"))
        })?;
        drop(cancel);
        result
    }

    /// Stops listening without accepting anything.
    pub fn cancel(self) {
        let _ = self.cancel.send(());
    }
}

async fn accept_once(
    listener: TcpListener,
    cancelled: oneshot::Receiver<()>,
) -> AcceptResult {
    tokio::select! {
        res = listener.accept() => {
            let (stream, addr) = res.map_err(TransportError::AcceptFailed)?;
            tracing::debug!(%addr, "peer connected");
            Ok(Some((stream, addr)))
        }
        // Fires on an explicit cancel and when the owner is dropped.
        _ = cancelled => Ok(None),
    }
}

/// Dials the address relayed in `RESP_P2P_CONNECT`.
pub async fn dial_peer(ip: &str, port: u32) -> Result<TcpStream, TransportError> {
    let port = u16::try_from(port)
        .map_err(|_| TransportError::InvalidAddress(format!("{ip}:{port}")))?;
    let ip: IpAddr = ip
        .parse()
        .map_err(|_| TransportError::InvalidAddress(format!("{ip}:{port}")))?;
    TcpStream::connect((ip, port))
        .await
        .map_err(TransportError::AcceptFailed)
}
