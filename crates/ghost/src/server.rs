//! `GhostServer` builder and server loop.
//!
//! This is the entry point for running a Ghost server. It ties together
//! all the layers: transport → protocol → session → room.

use std::sync::Arc;

use ghost_game::Dictionary;
use ghost_room::{RoomConfig, RoomRegistry};
use ghost_session::{SessionConfig, SessionRegistry};
use ghost_transport::{ConnectionId, TcpTransport, Transport};
use tokio::sync::Mutex;

use crate::handler::handle_connection;
use crate::{AdminHandle, GhostError, RendezvousTable, ServerConfig};

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. Each
/// registry has its own mutex, and no code path holds two of them at
/// once.
pub(crate) struct ServerState {
    pub(crate) config: ServerConfig,
    pub(crate) sessions: Mutex<SessionRegistry>,
    pub(crate) rooms: Mutex<RoomRegistry>,
    pub(crate) rendezvous: Mutex<RendezvousTable>,
}

impl ServerState {
    /// Tears a connection's session down: out of its room, out of any
    /// pending rendezvous, out of the registry.
    ///
    /// Safe to call any number of times from any task; only the first
    /// call for a connection does anything. Returns `false` if the
    /// session was already gone.
    pub(crate) async fn disconnect(&self, conn_id: ConnectionId) -> bool {
        let Some(session) = self.sessions.lock().await.remove(conn_id) else {
            return false;
        };
        session.outbox.close();

        let Some(pseudo) = session.pseudo else {
            tracing::info!(%conn_id, "guest disconnected");
            return true;
        };

        if let Err(e) = self.rooms.lock().await.leave_room(&pseudo).await {
            tracing::debug!(%conn_id, %pseudo, error = %e, "leave on disconnect failed");
        }

        let waiting = self.rendezvous.lock().await.forget(&pseudo);
        if !waiting.is_empty() {
            let sessions = self.sessions.lock().await;
            for requester in waiting {
                if let Some(s) = sessions.find_by_pseudo(&requester) {
                    let _ = s.outbox.send(ghost_protocol::ServerMessage::error(
                        ghost_protocol::ErrorCode::PeerUnavailable,
                        format!("{pseudo} disconnected"),
                    ));
                }
            }
        }

        tracing::info!(%conn_id, %pseudo, "player disconnected");
        true
    }
}

/// Builder for configuring and starting a Ghost server.
///
/// # Example
///
/// ```rust,no_run
/// use ghost::{Dictionary, GhostServer, RoomConfig};
///
/// # async fn run() -> Result<(), ghost::GhostError> {
/// let server = GhostServer::builder()
///     .bind("0.0.0.0:5555")
///     .room(RoomConfig::new("Salon", 4))
///     .dictionary(Dictionary::new(["GHOST", "TABLE"]))
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct GhostServerBuilder {
    config: ServerConfig,
    dictionary: Dictionary,
}

impl GhostServerBuilder {
    /// Creates a new builder with default settings and an empty
    /// dictionary.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            dictionary: Dictionary::default(),
        }
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Sets the session configuration.
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.config.session = config;
        self
    }

    /// Adds a room to create at startup.
    pub fn room(mut self, room: RoomConfig) -> Self {
        self.config.rooms.push(room);
        self
    }

    /// Sets the word list every room plays against.
    pub fn dictionary(mut self, dictionary: Dictionary) -> Self {
        self.dictionary = dictionary;
        self
    }

    /// Binds the listener and creates the configured rooms.
    pub async fn build(self) -> Result<GhostServer, GhostError> {
        let transport = TcpTransport::bind(&self.config.bind_addr).await?;

        let mut rooms = RoomRegistry::new(Arc::new(self.dictionary));
        for room in &self.config.rooms {
            rooms.create_room(room.clone())?;
        }

        let state = Arc::new(ServerState {
            sessions: Mutex::new(SessionRegistry::new(self.config.session.clone())),
            rooms: Mutex::new(rooms),
            rendezvous: Mutex::new(RendezvousTable::new(self.config.rendezvous_ttl)),
            config: self.config,
        });

        Ok(GhostServer { transport, state })
    }
}

impl Default for GhostServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Ghost server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct GhostServer {
    transport: TcpTransport,
    state: Arc<ServerState>,
}

impl GhostServer {
    /// Creates a new builder.
    pub fn builder() -> GhostServerBuilder {
        GhostServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// A handle for operator tooling. Stays valid while the server runs.
    pub fn admin(&self) -> AdminHandle {
        AdminHandle::new(Arc::clone(&self.state))
    }

    /// Runs the server accept loop.
    ///
    /// Spawns a handler task for each accepted connection. Runs until the
    /// process is terminated; a failed accept is logged and skipped.
    pub async fn run(mut self) -> Result<(), GhostError> {
        tracing::info!(addr = %self.state.config.bind_addr, "Ghost server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
