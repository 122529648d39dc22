//! Operator-facing handle: inspect sessions, broadcast, kick, make rooms.

use std::sync::Arc;

use ghost_protocol::{DataMessage, RoomId, ServerMessage};
use ghost_room::{RoomConfig, RoomInfo, RoomSnapshot};
use ghost_session::SessionSnapshot;
use ghost_transport::ConnectionId;

use crate::server::ServerState;
use crate::GhostError;

/// A cloneable handle onto a running server for admin tooling.
///
/// Get one from [`GhostServer::admin`](crate::GhostServer::admin) before
/// calling `run()`. It never touches a socket directly: kicks go through
/// the same disconnect path as a client hanging up, and broadcasts go
/// through each session's outbox.
#[derive(Clone)]
pub struct AdminHandle {
    state: Arc<ServerState>,
}

impl AdminHandle {
    pub(crate) fn new(state: Arc<ServerState>) -> Self {
        Self { state }
    }

    /// Every live connection: address, pseudo (`None` for guests),
    /// current room and last inbound activity. Ordered by connection id.
    pub async fn sessions(&self) -> Vec<SessionSnapshot> {
        self.state.sessions.lock().await.snapshot()
    }

    /// Sends a `BROADCAST` data message to every connection, in a room
    /// or not, logged in or not.
    ///
    /// Returns how many connections it was queued for.
    pub async fn broadcast(&self, message: &str) -> Result<usize, GhostError> {
        let msg = ServerMessage::data(&DataMessage::Broadcast {
            message: message.to_string(),
        })?;
        let delivered = self.state.sessions.lock().await.broadcast(&msg);
        tracing::info!(delivered, "admin broadcast");
        Ok(delivered)
    }

    /// Disconnects a connection. Returns `false` if it was already gone.
    pub async fn kick(&self, conn_id: ConnectionId) -> bool {
        let kicked = self.state.disconnect(conn_id).await;
        if kicked {
            tracing::info!(%conn_id, "kicked by admin");
        }
        kicked
    }

    /// Creates a new, empty room.
    ///
    /// Fails without creating anything if the name is blank or too long
    /// for `ROOM_LIST`, or the room has no seats.
    pub async fn create_room(&self, config: RoomConfig) -> Result<RoomId, GhostError> {
        Ok(self.state.rooms.lock().await.create_room(config)?)
    }

    /// All rooms in id order.
    pub async fn rooms(&self) -> Vec<RoomInfo> {
        let handles = self.state.rooms.lock().await.room_handles();
        let mut infos = Vec::with_capacity(handles.len());
        for handle in handles {
            if let Ok(info) = handle.info().await {
                infos.push(info);
            }
        }
        infos
    }

    /// One room's roster, fragment and scores.
    pub async fn room(&self, room_id: RoomId) -> Result<RoomSnapshot, GhostError> {
        let handle = self
            .state
            .rooms
            .lock()
            .await
            .room_handles()
            .into_iter()
            .find(|h| h.room_id() == room_id);
        match handle {
            Some(handle) => Ok(handle.snapshot().await?),
            None => Err(ghost_room::RoomError::NotFound(room_id).into()),
        }
    }
}
