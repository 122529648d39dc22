//! # Ghost
//!
//! A multiplayer server for the Ghost word game.
//!
//! Clients connect over TCP, log in under a unique pseudo, browse and join
//! rooms, and take turns adding letters to a shared fragment. The server
//! can also introduce two clients to each other so they open a direct
//! peer-to-peer link.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ghost::prelude::*;
//!
//! # async fn run() -> Result<(), GhostError> {
//! let server = GhostServer::builder()
//!     .bind("127.0.0.1:5555")
//!     .room(RoomConfig::new("Salon", 4))
//!     .dictionary(Dictionary::new(["GHOST", "TABLE", "MAISON"]))
//!     .build()
//!     .await?;
//! let admin = server.admin();
//! tokio::spawn(server.run());
//! admin.broadcast("welcome!").await?;
//! # Ok(())
//! # }
//! ```

mod admin;
mod client;
mod config;
mod error;
mod handler;
mod rendezvous;
mod server;

pub use admin::AdminHandle;
pub use client::GhostClient;
pub use config::{parse_rooms, ServerConfig, ENV_BIND, ENV_DICTIONARY, ENV_ROOMS};
pub use error::GhostError;
pub use rendezvous::{PendingRendezvous, RendezvousError, RendezvousState, RendezvousTable};
pub use server::{GhostServer, GhostServerBuilder};

pub use ghost_game::Dictionary;
pub use ghost_room::RoomConfig;

/// The types most programs need.
pub mod prelude {
    pub use crate::{AdminHandle, GhostClient, GhostError, GhostServer, ServerConfig};
    pub use ghost_game::Dictionary;
    pub use ghost_protocol::{
        ClientMessage, DataMessage, ErrorCode, LoginStatus, NotifyKind, RoomId, ServerMessage,
    };
    pub use ghost_room::RoomConfig;
    pub use ghost_session::{SessionConfig, SessionSnapshot};
    pub use ghost_transport::{dial_peer, ConnectionId, PeerListener};
}
