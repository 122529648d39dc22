//! Session management for Ghost.
//!
//! This crate handles who is connected:
//!
//! 1. **Sessions**: one [`Session`] per accepted socket, a guest until it
//!    logs in under a pseudo.
//! 2. **Registry**: [`SessionRegistry`] tracks every session and enforces
//!    that a pseudo belongs to at most one live connection.
//! 3. **Outbound queues**: every session owns an [`Outbox`], a bounded
//!    queue of messages a dedicated writer task drains to the socket.
//!
//! # How it fits in the stack
//!
//! ```text
//! Room Layer (above)  ← pushes messages into members' outboxes
//!     ↕
//! Session Layer (this crate)  ← identity, uniqueness, outbound queues
//!     ↕
//! Protocol / Transport (below)  ← ServerMessage, ConnectionId
//! ```

mod error;
mod manager;
mod outbox;
mod session;

pub use error::SessionError;
pub use manager::SessionRegistry;
pub use outbox::Outbox;
pub use session::{Session, SessionConfig, SessionSnapshot};
