//! The session registry: every live connection, indexed by id and pseudo.
//!
//! # Concurrency note
//!
//! `SessionRegistry` is NOT thread-safe by itself. The server keeps it
//! behind a single mutex, which is what makes the check-and-insert in
//! [`login`](SessionRegistry::login) atomic: two connections racing for
//! the same pseudo are serialized, and the second one sees it taken.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::SystemTime;

use ghost_protocol::{RoomId, ServerMessage};
use ghost_transport::ConnectionId;
use tokio::sync::mpsc;

use crate::{Outbox, Session, SessionConfig, SessionError, SessionSnapshot};

/// Tracks every connected session.
///
/// ## Lifecycle
///
/// ```text
/// register() ──→ [guest] ──login()──→ [named] ──remove()──→ gone
///                   │                                ↑
///                   └──────────remove()──────────────┘
/// ```
pub struct SessionRegistry {
    /// All sessions, keyed by connection.
    sessions: HashMap<ConnectionId, Session>,

    /// Index from pseudo to the connection holding it. Kept in sync with
    /// `sessions`: an entry exists exactly when that session is named.
    pseudos: HashMap<String, ConnectionId>,

    config: SessionConfig,
}

impl SessionRegistry {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            sessions: HashMap::new(),
            pseudos: HashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Creates a guest session for a freshly accepted connection.
    ///
    /// Returns the session's outbox and the receiving end of its queue,
    /// which the caller hands to the connection's writer task.
    /// Registering an id twice replaces the old session.
    pub fn register(
        &mut self,
        id: ConnectionId,
        addr: SocketAddr,
    ) -> (Outbox, mpsc::Receiver<ServerMessage>) {
        let (outbox, rx) = Outbox::channel(id, self.config.outbound_queue);
        let session = Session::new(id, addr, outbox.clone());
        if let Some(old) = self.sessions.insert(id, session) {
            if let Some(pseudo) = old.pseudo {
                self.pseudos.remove(&pseudo);
            }
        }
        tracing::debug!(conn_id = %id, %addr, "session registered");
        (outbox, rx)
    }

    /// Names a guest session.
    ///
    /// # Errors
    /// - [`SessionError::InvalidPseudo`]: empty, blank, or too long
    /// - [`SessionError::NotFound`]: unknown connection
    /// - [`SessionError::AlreadyLoggedIn`]: the session already has a pseudo
    /// - [`SessionError::PseudoTaken`]: another live session holds it
    pub fn login(&mut self, id: ConnectionId, pseudo: &str) -> Result<(), SessionError> {
        if pseudo.trim().is_empty() || pseudo.chars().count() > self.config.max_pseudo_len {
            return Err(SessionError::InvalidPseudo(pseudo.to_string()));
        }

        let session = self.sessions.get_mut(&id).ok_or(SessionError::NotFound(id))?;
        if let Some(existing) = &session.pseudo {
            return Err(SessionError::AlreadyLoggedIn(existing.clone()));
        }
        if self.pseudos.contains_key(pseudo) {
            return Err(SessionError::PseudoTaken(pseudo.to_string()));
        }

        session.pseudo = Some(pseudo.to_string());
        self.pseudos.insert(pseudo.to_string(), id);

        tracing::info!(conn_id = %id, %pseudo, "logged in");
        Ok(())
    }

    pub fn get(&self, id: ConnectionId) -> Option<&Session> {
        self.sessions.get(&id)
    }

    /// The pseudo of a named session.
    pub fn pseudo_of(&self, id: ConnectionId) -> Option<&str> {
        self.sessions.get(&id)?.pseudo.as_deref()
    }

    /// Looks up the session that holds `pseudo`.
    pub fn find_by_pseudo(&self, pseudo: &str) -> Option<&Session> {
        let id = self.pseudos.get(pseudo)?;
        self.sessions.get(id)
    }

    /// Records inbound activity.
    pub fn touch(&mut self, id: ConnectionId) {
        if let Some(session) = self.sessions.get_mut(&id) {
            session.last_activity = SystemTime::now();
        }
    }

    /// Records which room the session sits in.
    ///
    /// Returns `false` if the session is gone (it disconnected while the
    /// caller was talking to the room).
    pub fn set_room(&mut self, id: ConnectionId, room: Option<RoomId>) -> bool {
        match self.sessions.get_mut(&id) {
            Some(session) => {
                session.current_room = room;
                true
            }
            None => false,
        }
    }

    /// Removes a session and frees its pseudo.
    ///
    /// Returns the removed session, or `None` if it was already gone, so
    /// calling this twice is harmless.
    pub fn remove(&mut self, id: ConnectionId) -> Option<Session> {
        let session = self.sessions.remove(&id)?;
        if let Some(pseudo) = &session.pseudo {
            self.pseudos.remove(pseudo);
        }
        tracing::debug!(conn_id = %id, "session removed");
        Some(session)
    }

    /// Copies out every session, ordered by connection id.
    pub fn snapshot(&self) -> Vec<SessionSnapshot> {
        let mut all: Vec<_> = self.sessions.values().map(Session::snapshot).collect();
        all.sort_by_key(|s| s.conn_id);
        all
    }

    /// Pushes `msg` to every session, guests included.
    ///
    /// Returns how many outboxes accepted it. A slow consumer is closed
    /// by its outbox and simply not counted.
    pub fn broadcast(&self, msg: &ServerMessage) -> usize {
        self.sessions
            .values()
            .filter(|s| s.outbox.send(msg.clone()).is_ok())
            .count()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================
