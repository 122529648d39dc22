//! Server configuration.

use std::time::Duration;

use ghost_room::RoomConfig;
use ghost_session::SessionConfig;
use ghost_transport::DEFAULT_MAX_FRAME_LEN;

use crate::GhostError;

/// Environment variable holding the listen address.
pub const ENV_BIND: &str = "GHOST_BIND";
/// Environment variable holding the room list, `name:max,name:max`.
pub const ENV_ROOMS: &str = "GHOST_ROOMS";
/// Environment variable holding the path to a newline-separated word list.
pub const ENV_DICTIONARY: &str = "GHOST_DICTIONARY";

/// Everything the server needs to know before it starts.
///
/// `Default` gives a server on `127.0.0.1:5555` with no rooms. Override
/// fields directly or go through
/// [`GhostServerBuilder`](crate::GhostServerBuilder).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,

    /// Pseudo length limit and outbound queue size.
    pub session: SessionConfig,

    /// A single frame write slower than this closes the connection.
    pub write_timeout: Duration,

    /// How often the server sends PING.
    pub ping_interval: Duration,

    /// A connection that sends nothing for this long is dropped.
    pub idle_timeout: Duration,

    /// Largest accepted frame body, in bytes.
    pub max_frame_len: usize,

    /// How long a rendezvous request waits for the target's READY.
    pub rendezvous_ttl: Duration,

    /// Rooms created at startup, in id order.
    pub rooms: Vec<RoomConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:5555".to_string(),
            session: SessionConfig::default(),
            write_timeout: Duration::from_secs(5),
            ping_interval: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(30),
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
            rendezvous_ttl: Duration::from_secs(30),
            rooms: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Reads overrides from the process environment.
    pub fn from_env() -> Result<Self, GhostError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from defaults plus whatever `lookup` returns for
    /// [`ENV_BIND`] and [`ENV_ROOMS`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, GhostError> {
        let mut config = Self::default();
        if let Some(bind) = lookup(ENV_BIND) {
            config.bind_addr = bind;
        }
        if let Some(rooms) = lookup(ENV_ROOMS) {
            config.rooms = parse_rooms(&rooms)?;
        }
        Ok(config)
    }
}

/// Parses a room list like `"Salon:4,Duel:2"`.
///
/// Blank entries are skipped. Each entry needs a seat count between 1
/// and 255 and a name that passes [`RoomConfig::validate`].
pub fn parse_rooms(list: &str) -> Result<Vec<RoomConfig>, GhostError> {
    list.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (name, max) = entry
                .rsplit_once(':')
                .ok_or_else(|| GhostError::Config(format!("room {entry:?} is missing :max_players")))?;
            let max: u8 = max
                .trim()
                .parse()
                .map_err(|_| GhostError::Config(format!("room {entry:?} has a bad seat count")))?;
            let config = RoomConfig::new(name.trim(), max);
            config
                .validate()
                .map_err(|e| GhostError::Config(format!("room {entry:?}: {e}")))?;
            Ok(config)
        })
        .collect()
}
