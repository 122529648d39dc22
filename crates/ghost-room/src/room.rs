//! Room actor: an isolated Tokio task that owns one game.
//!
//! Each room runs in its own task, communicating with the outside world
//! through an mpsc channel. This is the "actor model": no shared mutable
//! state, just message passing. The actor is the only code that touches
//! the room's [`GameEngine`], so commands are applied strictly in the
//! order they arrive.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use ghost_game::{Dictionary, GameEngine, TurnReport};
use ghost_protocol::{DataMessage, NotifyKind, RoomId, RoomSummary, ServerMessage};
use ghost_session::Outbox;
use tokio::sync::{mpsc, oneshot};

use crate::{RoomConfig, RoomError};

/// Commands sent to a room actor through its channel.
///
/// The `oneshot::Sender` in each variant is a "reply channel": the caller
/// sends a command and waits for the response on it.
pub(crate) enum RoomCommand {
    Join {
        pseudo: String,
        outbox: Outbox,
        reply: oneshot::Sender<Result<Vec<String>, RoomError>>,
    },
    Leave {
        pseudo: String,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },
    PlayLetter {
        pseudo: String,
        letter: char,
        reply: oneshot::Sender<Result<TurnReport, RoomError>>,
    },
    Chat {
        pseudo: String,
        message: String,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },
    GetInfo {
        reply: oneshot::Sender<RoomInfo>,
    },
    GetSnapshot {
        reply: oneshot::Sender<RoomSnapshot>,
    },
    Shutdown,
}

/// Room metadata, as shown in a room listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInfo {
    pub room_id: RoomId,
    pub name: String,
    pub player_count: usize,
    pub max_players: u8,
}

impl RoomInfo {
    /// The wire form used in `ROOM_LIST`.
    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            id: self.room_id,
            name: self.name.clone(),
            players: u8::try_from(self.player_count).unwrap_or(u8::MAX),
            max_players: self.max_players,
        }
    }
}

/// Room metadata plus the full game state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSnapshot {
    pub info: RoomInfo,
    /// Seated players in turn order.
    pub players: Vec<String>,
    pub fragment: String,
    pub active_player: Option<String>,
    pub scores: BTreeMap<String, String>,
}

/// Handle to a running room actor. Used to send commands to it.
///
/// Cheap to clone: it's just an `mpsc::Sender` wrapper. The
/// [`RoomRegistry`](crate::RoomRegistry) holds one of these per room.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    /// Seats a player.
    ///
    /// On success the room has already queued `RESP_ROOM` (and a game
    /// state) into `outbox` and told the other members with `NOTIFY`.
    /// Returns the player list, joiner included.
    pub async fn join(&self, pseudo: &str, outbox: Outbox) -> Result<Vec<String>, RoomError> {
        self.request(|reply| RoomCommand::Join {
            pseudo: pseudo.to_string(),
            outbox,
            reply,
        })
        .await?
    }

    pub async fn leave(&self, pseudo: &str) -> Result<(), RoomError> {
        self.request(|reply| RoomCommand::Leave {
            pseudo: pseudo.to_string(),
            reply,
        })
        .await?
    }

    /// Plays a letter. Every member receives the resulting `GAME_STATE`.
    pub async fn play_letter(&self, pseudo: &str, letter: char) -> Result<TurnReport, RoomError> {
        self.request(|reply| RoomCommand::PlayLetter {
            pseudo: pseudo.to_string(),
            letter,
            reply,
        })
        .await?
    }

    /// Relays a chat line to every member, sender included.
    pub async fn chat(&self, pseudo: &str, message: &str) -> Result<(), RoomError> {
        self.request(|reply| RoomCommand::Chat {
            pseudo: pseudo.to_string(),
            message: message.to_string(),
            reply,
        })
        .await?
    }

    pub async fn info(&self) -> Result<RoomInfo, RoomError> {
        self.request(|reply| RoomCommand::GetInfo { reply }).await
    }

    pub async fn snapshot(&self) -> Result<RoomSnapshot, RoomError> {
        self.request(|reply| RoomCommand::GetSnapshot { reply }).await
    }

    /// Tells the room to stop.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))
    }

    /// Sends a command built around a fresh reply channel and waits for
    /// the answer.
    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> RoomCommand,
    ) -> Result<T, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(build(reply_tx))
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))
    }
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    room_id: RoomId,
    config: RoomConfig,
    game: GameEngine,
    /// Per-member outbound queues. The seating order lives in `game`.
    outboxes: HashMap<String, Outbox>,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    /// Runs the actor loop, processing commands until shutdown.
    async fn run(mut self) {
        tracing::info!(room_id = %self.room_id, name = %self.config.name, "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Join { pseudo, outbox, reply } => {
                    let _ = reply.send(self.handle_join(pseudo, outbox));
                }
                RoomCommand::Leave { pseudo, reply } => {
                    let _ = reply.send(self.handle_leave(&pseudo));
                }
                RoomCommand::PlayLetter { pseudo, letter, reply } => {
                    let _ = reply.send(self.handle_play(&pseudo, letter));
                }
                RoomCommand::Chat { pseudo, message, reply } => {
                    let _ = reply.send(self.handle_chat(pseudo, message));
                }
                RoomCommand::GetInfo { reply } => {
                    let _ = reply.send(self.info());
                }
                RoomCommand::GetSnapshot { reply } => {
                    let _ = reply.send(self.snapshot());
                }
                RoomCommand::Shutdown => {
                    tracing::info!(room_id = %self.room_id, "room shutting down");
                    break;
                }
            }
        }

        tracing::info!(room_id = %self.room_id, "room actor stopped");
    }

    fn handle_join(&mut self, pseudo: String, outbox: Outbox) -> Result<Vec<String>, RoomError> {
        if self.outboxes.contains_key(&pseudo) {
            return Err(RoomError::AlreadyInRoom(pseudo, self.room_id));
        }
        if self.outboxes.len() >= usize::from(self.config.max_players) {
            return Err(RoomError::RoomFull(self.room_id));
        }

        // Existing members hear about the newcomer before the newcomer
        // gets the roster.
        self.send_all(&ServerMessage::Notify {
            kind: NotifyKind::Join,
            pseudo: pseudo.clone(),
        });

        self.game.add_player(&pseudo);
        let players = self.game.players().to_vec();
        let _ = outbox.send(ServerMessage::RoomPlayers(players.clone()));
        if let Some(state) = self.game_state(format!("{pseudo} joined")) {
            let _ = outbox.send(state);
        }
        self.outboxes.insert(pseudo.clone(), outbox);

        tracing::info!(
            room_id = %self.room_id,
            %pseudo,
            players = players.len(),
            "player joined"
        );
        Ok(players)
    }

    fn handle_leave(&mut self, pseudo: &str) -> Result<(), RoomError> {
        if self.outboxes.remove(pseudo).is_none() {
            return Err(RoomError::NotInRoom(pseudo.to_string()));
        }
        self.game.remove_player(pseudo);

        tracing::info!(
            room_id = %self.room_id,
            %pseudo,
            players = self.outboxes.len(),
            "player left"
        );

        self.send_all(&ServerMessage::Notify {
            kind: NotifyKind::Leave,
            pseudo: pseudo.to_string(),
        });
        if !self.outboxes.is_empty() {
            self.broadcast_state(format!("{pseudo} left"));
        }
        Ok(())
    }

    fn handle_play(&mut self, pseudo: &str, letter: char) -> Result<TurnReport, RoomError> {
        if !self.outboxes.contains_key(pseudo) {
            return Err(RoomError::NotInRoom(pseudo.to_string()));
        }

        let report = self.game.play_letter(pseudo, letter)?;
        tracing::debug!(
            room_id = %self.room_id,
            %pseudo,
            fragment = %report.fragment,
            outcome = ?report.outcome,
            "letter played"
        );
        self.broadcast_state(report.describe());
        Ok(report)
    }

    fn handle_chat(&mut self, pseudo: String, message: String) -> Result<(), RoomError> {
        if !self.outboxes.contains_key(&pseudo) {
            return Err(RoomError::NotInRoom(pseudo));
        }
        let chat = DataMessage::Chat {
            sender: pseudo,
            message,
        };
        match ServerMessage::data(&chat) {
            Ok(msg) => self.send_all(&msg),
            Err(e) => tracing::error!(room_id = %self.room_id, error = %e, "failed to encode chat"),
        }
        Ok(())
    }

    /// The current game as a `GAME_STATE` message.
    fn game_state(&self, event: String) -> Option<ServerMessage> {
        let state = DataMessage::GameState {
            frag: self.game.fragment().to_string(),
            active_player: self.game.current_player().map(str::to_string),
            event,
            scores: self.game.scores(),
        };
        match ServerMessage::data(&state) {
            Ok(msg) => Some(msg),
            Err(e) => {
                tracing::error!(room_id = %self.room_id, error = %e, "failed to encode game state");
                None
            }
        }
    }

    fn broadcast_state(&self, event: String) {
        if let Some(msg) = self.game_state(event) {
            self.send_all(&msg);
        }
    }

    /// Queues a message for every member. A member whose queue is full
    /// gets closed by its outbox; the room carries on without waiting.
    fn send_all(&self, msg: &ServerMessage) {
        for (pseudo, outbox) in &self.outboxes {
            if let Err(e) = outbox.send(msg.clone()) {
                tracing::debug!(room_id = %self.room_id, %pseudo, error = %e, "dropped room message");
            }
        }
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            room_id: self.room_id,
            name: self.config.name.clone(),
            player_count: self.outboxes.len(),
            max_players: self.config.max_players,
        }
    }

    fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            info: self.info(),
            players: self.game.players().to_vec(),
            fragment: self.game.fragment().to_string(),
            active_player: self.game.current_player().map(str::to_string),
            scores: self.game.scores(),
        }
    }
}

/// Spawns a new room actor task and returns a handle to communicate with it.
///
/// `channel_size` bounds the command queue; senders wait when it is full.
pub(crate) fn spawn_room(
    room_id: RoomId,
    config: RoomConfig,
    dictionary: Arc<Dictionary>,
    channel_size: usize,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_size);

    let actor = RoomActor {
        room_id,
        config,
        game: GameEngine::new(dictionary),
        outboxes: HashMap::new(),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle {
        room_id,
        sender: tx,
    }
}
