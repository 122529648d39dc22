//! The bounded outbound queue in front of every connection.
//!
//! Nothing in the server writes to a socket directly. Rooms, the
//! rendezvous relay and admin broadcasts all push [`ServerMessage`]s into
//! the target connection's `Outbox`, and that connection's writer task
//! drains it. A push never waits: if the queue is full, the peer isn't
//! keeping up, so the connection is flagged for closing instead of
//! stalling whoever was broadcasting.

use std::sync::Arc;

use ghost_protocol::ServerMessage;
use ghost_transport::ConnectionId;
use tokio::sync::{mpsc, watch};

use crate::SessionError;

/// Sending half of a connection's outbound queue, plus its close signal.
///
/// Cheap to clone; every clone feeds the same queue.
#[derive(Debug, Clone)]
pub struct Outbox {
    conn_id: ConnectionId,
    tx: mpsc::Sender<ServerMessage>,
    closed: Arc<watch::Sender<bool>>,
}

impl Outbox {
    /// Creates an outbox holding at most `capacity` queued messages, and
    /// the receiver the writer task drains.
    pub fn channel(
        conn_id: ConnectionId,
        capacity: usize,
    ) -> (Self, mpsc::Receiver<ServerMessage>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let (closed, _) = watch::channel(false);
        let outbox = Self {
            conn_id,
            tx,
            closed: Arc::new(closed),
        };
        (outbox, rx)
    }

    pub fn conn_id(&self) -> ConnectionId {
        self.conn_id
    }

    /// Queues a message without waiting.
    ///
    /// # Errors
    /// - [`SessionError::SlowConsumer`]: the queue is full. The outbox is
    ///   closed as a side effect.
    /// - [`SessionError::Closed`]: the outbox was closed or the writer
    ///   has gone away.
    pub fn send(&self, msg: ServerMessage) -> Result<(), SessionError> {
        if self.is_closed() {
            return Err(SessionError::Closed(self.conn_id));
        }
        match self.tx.try_send(msg) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(conn_id = %self.conn_id, "outbound queue full, closing");
                self.close();
                Err(SessionError::SlowConsumer(self.conn_id))
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                Err(SessionError::Closed(self.conn_id))
            }
        }
    }

    /// Asks the connection to shut down. Idempotent.
    pub fn close(&self) {
        self.closed.send_replace(true);
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    /// Resolves once [`close`](Self::close) has been called on any clone.
    pub async fn closed(&self) {
        let mut rx = self.closed.subscribe();
        // The sender lives in `self`, so this can't observe a dropped channel.
        let _ = rx.wait_for(|closed| *closed).await;
    }
}
