//! Room registry: creates, tracks, and routes players to rooms.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use ghost_game::{Dictionary, TurnReport};
use ghost_protocol::RoomId;
use ghost_session::Outbox;

use crate::room::spawn_room;
use crate::{RoomConfig, RoomError, RoomHandle, RoomInfo, RoomSnapshot};

/// Default command channel size for room actors.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Manages all rooms and tracks which player is in which room.
///
/// Rooms are never destroyed while the server runs; an empty room just
/// waits for its next player.
///
/// The server keeps this behind a mutex. That makes the
/// one-room-per-player check in [`join_room`](Self::join_room) atomic
/// with the join itself.
pub struct RoomRegistry {
    /// Rooms by id. A `BTreeMap` so listings come out in id order.
    rooms: BTreeMap<RoomId, RoomHandle>,

    /// Maps each player to the room they're currently in.
    /// A player can be in at most ONE room at a time.
    player_rooms: HashMap<String, RoomId>,

    dictionary: Arc<Dictionary>,
    next_id: u32,
}

impl RoomRegistry {
    /// Creates an empty registry. Every room it spawns plays against
    /// `dictionary`.
    pub fn new(dictionary: Arc<Dictionary>) -> Self {
        Self {
            rooms: BTreeMap::new(),
            player_rooms: HashMap::new(),
            dictionary,
            next_id: 1,
        }
    }

    /// Spawns a room actor and returns its id.
    ///
    /// # Errors
    /// [`RoomError::InvalidConfig`] if `config` fails
    /// [`RoomConfig::validate`]. No id is used up.
    pub fn create_room(&mut self, config: RoomConfig) -> Result<RoomId, RoomError> {
        config.validate()?;
        let room_id = RoomId(self.next_id);
        self.next_id += 1;

        tracing::info!(%room_id, name = %config.name, max_players = config.max_players, "room created");
        let handle = spawn_room(
            room_id,
            config,
            Arc::clone(&self.dictionary),
            DEFAULT_CHANNEL_SIZE,
        );
        self.rooms.insert(room_id, handle);
        Ok(room_id)
    }

    /// Seats a player in a room.
    ///
    /// Enforces the "one room at a time" invariant.
    ///
    /// # Errors
    /// - [`RoomError::AlreadyInRoom`]: the player already sits somewhere
    /// - [`RoomError::NotFound`]: no such room
    /// - [`RoomError::RoomFull`]: no free seat
    pub async fn join_room(
        &mut self,
        pseudo: &str,
        room_id: RoomId,
        outbox: Outbox,
    ) -> Result<Vec<String>, RoomError> {
        if let Some(current) = self.player_rooms.get(pseudo) {
            return Err(RoomError::AlreadyInRoom(pseudo.to_string(), *current));
        }

        let handle = self.rooms.get(&room_id).ok_or(RoomError::NotFound(room_id))?;
        let players = handle.join(pseudo, outbox).await?;
        self.player_rooms.insert(pseudo.to_string(), room_id);
        Ok(players)
    }

    /// Removes a player from their current room.
    ///
    /// Returns the room they left, or `None` if they weren't in one.
    pub async fn leave_room(&mut self, pseudo: &str) -> Result<Option<RoomId>, RoomError> {
        let Some(room_id) = self.player_rooms.remove(pseudo) else {
            return Ok(None);
        };

        if let Some(handle) = self.rooms.get(&room_id) {
            match handle.leave(pseudo).await {
                // The actor already forgot them; the index was the stale side.
                Ok(()) | Err(RoomError::NotInRoom(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(Some(room_id))
    }

    /// The handle of the room `pseudo` sits in.
    ///
    /// Callers that only need to talk to one room clone this out and
    /// release the registry lock before awaiting the actor.
    pub fn room_of(&self, pseudo: &str) -> Result<RoomHandle, RoomError> {
        let room_id = self
            .player_rooms
            .get(pseudo)
            .ok_or_else(|| RoomError::NotInRoom(pseudo.to_string()))?;
        self.rooms
            .get(room_id)
            .cloned()
            .ok_or(RoomError::NotFound(*room_id))
    }

    /// Routes a letter to the player's room.
    pub async fn play_letter(&self, pseudo: &str, letter: char) -> Result<TurnReport, RoomError> {
        self.room_of(pseudo)?.play_letter(pseudo, letter).await
    }

    /// Routes a chat line to the player's room.
    pub async fn chat(&self, pseudo: &str, message: &str) -> Result<(), RoomError> {
        self.room_of(pseudo)?.chat(pseudo, message).await
    }

    /// Returns the room a player is currently in, if any.
    pub fn player_room(&self, pseudo: &str) -> Option<RoomId> {
        self.player_rooms.get(pseudo).copied()
    }

    pub async fn room_info(&self, room_id: RoomId) -> Result<RoomInfo, RoomError> {
        let handle = self.rooms.get(&room_id).ok_or(RoomError::NotFound(room_id))?;
        handle.info().await
    }

    pub async fn room_snapshot(&self, room_id: RoomId) -> Result<RoomSnapshot, RoomError> {
        let handle = self.rooms.get(&room_id).ok_or(RoomError::NotFound(room_id))?;
        handle.snapshot().await
    }

    /// Lists every room in id order.
    ///
    /// Queries each room actor for its current info. Rooms that fail to
    /// respond are skipped.
    pub async fn list_rooms(&self) -> Vec<RoomInfo> {
        let mut infos = Vec::with_capacity(self.rooms.len());
        for handle in self.rooms.values() {
            if let Ok(info) = handle.info().await {
                infos.push(info);
            }
        }
        infos
    }

    /// Returns cloned handles to all rooms.
    pub fn room_handles(&self) -> Vec<RoomHandle> {
        self.rooms.values().cloned().collect()
    }

    /// Stops every room actor.
    pub async fn shutdown(&mut self) {
        for handle in self.rooms.values() {
            let _ = handle.shutdown().await;
        }
        self.player_rooms.clear();
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
