//! Ghost game server.
//!
//! Configuration comes from the environment:
//!
//! - `GHOST_BIND`: listen address (default `127.0.0.1:5555`)
//! - `GHOST_ROOMS`: rooms to create, `name:max,name:max`
//! - `GHOST_DICTIONARY`: path to a newline-separated word list
//! - `RUST_LOG`: log filter (default `info`)

use ghost::{Dictionary, GhostError, GhostServer, RoomConfig, ServerConfig, ENV_DICTIONARY};
use tracing_subscriber::EnvFilter;

/// Words used when no dictionary file is configured.
const FALLBACK_WORDS: &[&str] = &[
    "BONJOUR", "MONDE", "PYTHON", "RESEAU", "SOCKET", "GHOST", "TEST", "MANGER", "TABLE",
    "CHAISE", "MAISON", "APPLE", "BANANA", "ORANGE",
];

#[tokio::main]
async fn main() -> Result<(), GhostError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let mut config = ServerConfig::from_env()?;
    if config.rooms.is_empty() {
        config.rooms = vec![RoomConfig::new("Salon", 4), RoomConfig::new("Duel", 2)];
    }

    let dictionary = load_dictionary()?;
    tracing::info!(words = dictionary.len(), rooms = config.rooms.len(), "starting");

    let server = GhostServer::builder()
        .config(config)
        .dictionary(dictionary)
        .build()
        .await?;

    tokio::select! {
        result = server.run() => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down");
            Ok(())
        }
    }
}

fn load_dictionary() -> Result<Dictionary, GhostError> {
    match std::env::var(ENV_DICTIONARY) {
        Ok(path) => {
            let text = std::fs::read_to_string(&path)?;
            let dictionary = Dictionary::from_text(&text);
            tracing::info!(%path, words = dictionary.len(), "dictionary loaded");
            Ok(dictionary)
        }
        Err(_) => {
            tracing::warn!("{ENV_DICTIONARY} not set, using the built-in word list");
            Ok(Dictionary::new(FALLBACK_WORDS.iter().copied()))
        }
    }
}
