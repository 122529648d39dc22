//! The Ghost word game.
//!
//! Players take turns adding one letter to a shared fragment. You lose a
//! round when your letter either completes a real word longer than three
//! letters, or produces a fragment no dictionary word starts with. Each
//! lost round earns the next letter of "GHOST"; spelling it all out means
//! elimination.
//!
//! This crate is pure game rules: no I/O, no async, no locking. The room
//! layer owns one [`GameEngine`] per room and serializes access to it.
//!
//! # Key types
//!
//! - [`Dictionary`]: immutable word set, shared by every engine
//! - [`GameEngine`]: the per-room state machine
//! - [`TurnReport`]: what happened after a letter was played

mod dictionary;
mod engine;
mod error;

pub use dictionary::Dictionary;
pub use engine::{
    GameEngine, GamePhase, Penalty, TurnOutcome, TurnReport,
    MIN_LOSING_WORD_LEN, PENALTY_WORD,
};
pub use error::GameError;
