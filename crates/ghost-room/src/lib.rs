//! Rooms for Ghost.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns one
//! [`GameEngine`](ghost_game::GameEngine) and its members' outboxes.
//! Every join, leave, letter and chat line for a room goes through that
//! task's command channel, so they are applied one at a time and two
//! players can never interleave their turns.
//!
//! # Key types
//!
//! - [`RoomRegistry`]: creates rooms, routes players, keeps the
//!   one-room-per-player index
//! - [`RoomHandle`]: send commands to a running room actor
//! - [`RoomConfig`]: name and seat count
//! - [`RoomInfo`] / [`RoomSnapshot`]: read-only views for listings and
//!   admin tooling

mod config;
mod error;
mod manager;
mod room;

pub use config::{RoomConfig, MAX_ROOM_NAME_LEN};
pub use error::RoomError;
pub use manager::RoomRegistry;
pub use room::{RoomHandle, RoomInfo, RoomSnapshot};
