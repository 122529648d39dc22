//! Error types for the game rules.

/// A move the rules refuse. The game state is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// Someone other than the active player tried to move.
    #[error("not your turn (waiting for {})", .expected.as_deref().unwrap_or("nobody"))]
    NotYourTurn { expected: Option<String> },

    /// The letter is not a single alphabetic character.
    #[error("invalid letter {0:?}")]
    InvalidLetter(String),

    /// The pseudo is not seated in this game.
    #[error("{0} is not playing")]
    UnknownPlayer(String),
}
