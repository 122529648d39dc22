//! Per-room game state and the turn rules.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::{Dictionary, GameError};

/// The word a player spells out, one letter per lost round.
pub const PENALTY_WORD: &str = "GHOST";

/// A fragment that is a dictionary word only loses once it is at least
/// this long. Short words like "CAT" are safe.
pub const MIN_LOSING_WORD_LEN: usize = 4;

/// Whether a game has started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Nobody is seated, so there is no turn.
    Waiting,
    /// At least one player is seated. A lone player still takes every
    /// turn and can lose rounds.
    InProgress,
}

/// How a played letter ended the turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The fragment is still a valid prefix. Play continues.
    Continue,
    /// The fragment completed a dictionary word of at least
    /// [`MIN_LOSING_WORD_LEN`] letters.
    LoseWord,
    /// No dictionary word starts with the fragment.
    LoseInvalid,
}

/// What a lost round cost the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Penalty {
    /// The player earned one more letter of [`PENALTY_WORD`].
    Punished,
    /// The player's score now spells the whole penalty word.
    Eliminated,
}

/// The result of one [`GameEngine::play_letter`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReport {
    /// Who played.
    pub player: String,
    /// The letter, uppercased.
    pub letter: String,
    /// The fragment right after the letter was appended. On a loss the
    /// engine's fragment has already been reset, but this keeps the
    /// word that caused it.
    pub fragment: String,
    pub outcome: TurnOutcome,
    /// Set on a loss.
    pub penalty: Option<Penalty>,
    /// The player's score after this turn.
    pub score: String,
    /// Who moves next, if anyone.
    pub next_player: Option<String>,
}

impl TurnReport {
    /// A one-line, human-readable description of the turn, used as the
    /// `event` field of game state updates.
    pub fn describe(&self) -> String {
        let penalty = match self.penalty {
            Some(Penalty::Eliminated) => format!("{} is eliminated", self.player),
            Some(Penalty::Punished) => format!("{} takes {}", self.player, self.score),
            None => String::new(),
        };
        match self.outcome {
            TurnOutcome::Continue => format!("{} played {}", self.player, self.letter),
            TurnOutcome::LoseWord => {
                format!("{} completed the word {}: {}", self.player, self.fragment, penalty)
            }
            TurnOutcome::LoseInvalid => {
                format!("no word starts with {}: {}", self.fragment, penalty)
            }
        }
    }

    /// Returns `true` if the turn lost the round.
    pub fn is_loss(&self) -> bool {
        self.outcome != TurnOutcome::Continue
    }
}

/// One room's game: the fragment, the seating order, the scores and
/// whose turn it is.
///
/// Seating order is join order. The turn index always points into
/// `players` (or is 0 when nobody is seated), and it is corrected when a
/// player leaves so the right person keeps the turn.
///
/// ```
/// use std::sync::Arc;
/// use ghost_game::{Dictionary, GameEngine, TurnOutcome};
///
/// let dict = Arc::new(Dictionary::new(["CATALOG"]));
/// let mut game = GameEngine::new(dict);
/// game.add_player("ann");
/// game.add_player("bob");
///
/// let report = game.play_letter("ann", 'c').unwrap();
/// assert_eq!(report.outcome, TurnOutcome::Continue);
/// assert_eq!(game.fragment(), "C");
/// assert_eq!(game.current_player(), Some("bob"));
/// ```
#[derive(Debug, Clone)]
pub struct GameEngine {
    dictionary: Arc<Dictionary>,
    fragment: String,
    players: Vec<String>,
    scores: HashMap<String, String>,
    current_turn: usize,
}

impl GameEngine {
    pub fn new(dictionary: Arc<Dictionary>) -> Self {
        Self {
            dictionary,
            fragment: String::new(),
            players: Vec::new(),
            scores: HashMap::new(),
            current_turn: 0,
        }
    }

    pub fn phase(&self) -> GamePhase {
        if self.players.is_empty() {
            GamePhase::Waiting
        } else {
            GamePhase::InProgress
        }
    }

    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    /// Seated players, in turn order.
    pub fn players(&self) -> &[String] {
        &self.players
    }

    pub fn current_turn_index(&self) -> usize {
        self.current_turn
    }

    /// The player whose turn it is, or `None` if nobody is seated.
    pub fn current_player(&self) -> Option<&str> {
        self.players.get(self.current_turn).map(String::as_str)
    }

    /// A player's penalty letters so far ("" for a clean record).
    pub fn score(&self, pseudo: &str) -> Option<&str> {
        self.scores.get(pseudo).map(String::as_str)
    }

    /// All scores, ordered by pseudo.
    pub fn scores(&self) -> BTreeMap<String, String> {
        self.scores
            .iter()
            .map(|(p, s)| (p.clone(), s.clone()))
            .collect()
    }

    /// Seats a player at the end of the turn order with a clean score.
    ///
    /// Adding someone already seated does nothing and returns `false`.
    pub fn add_player(&mut self, pseudo: &str) -> bool {
        if self.players.iter().any(|p| p == pseudo) {
            return false;
        }
        self.players.push(pseudo.to_string());
        self.scores.insert(pseudo.to_string(), String::new());
        true
    }

    /// Removes a player and their score.
    ///
    /// If the leaver sat before the active player, the index shifts down
    /// so the same person keeps the turn. If the leaver *was* the active
    /// player, the turn passes to whoever now sits in that slot (wrapping
    /// to the start). Returns `false` if the player wasn't seated.
    pub fn remove_player(&mut self, pseudo: &str) -> bool {
        let Some(index) = self.players.iter().position(|p| p == pseudo) else {
            return false;
        };
        self.players.remove(index);
        self.scores.remove(pseudo);

        if index < self.current_turn {
            self.current_turn -= 1;
        }
        if self.current_turn >= self.players.len() {
            self.current_turn = 0;
        }
        true
    }

    /// Plays one letter for `pseudo`.
    ///
    /// 1. Only the active player may move.
    /// 2. The letter must be alphabetic with a one-character uppercase form
    ///    (so not `'ß'`). It is uppercased and appended.
    /// 3. If the fragment is now a dictionary word of at least
    ///    [`MIN_LOSING_WORD_LEN`] letters, the player loses the round.
    /// 4. Otherwise, if no word starts with the fragment, the player
    ///    loses the round.
    ///
    /// A loss punishes the player and resets the fragment. Either way the
    /// turn moves to the next seat.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NotYourTurn`] or [`GameError::InvalidLetter`]
    /// without changing any state.
    pub fn play_letter(&mut self, pseudo: &str, letter: char) -> Result<TurnReport, GameError> {
        if self.current_player() != Some(pseudo) {
            return Err(GameError::NotYourTurn {
                expected: self.current_player().map(str::to_string),
            });
        }
        let upper = single_uppercase(letter)
            .ok_or_else(|| GameError::InvalidLetter(letter.to_string()))?;
        self.fragment.push(upper);
        let fragment = self.fragment.clone();

        let outcome = if fragment.chars().count() >= MIN_LOSING_WORD_LEN
            && self.dictionary.contains(&fragment)
        {
            TurnOutcome::LoseWord
        } else if !self.dictionary.has_prefix(&fragment) {
            TurnOutcome::LoseInvalid
        } else {
            TurnOutcome::Continue
        };

        let penalty = if outcome == TurnOutcome::Continue {
            None
        } else {
            self.fragment.clear();
            Some(self.punish(pseudo)?)
        };

        self.advance_turn();

        Ok(TurnReport {
            player: pseudo.to_string(),
            letter: upper.to_string(),
            fragment,
            outcome,
            penalty,
            score: self.score(pseudo).unwrap_or_default().to_string(),
            next_player: self.current_player().map(str::to_string),
        })
    }

    /// Gives `pseudo` the next letter of [`PENALTY_WORD`].
    ///
    /// Once the whole word is spelled out the score stops growing and
    /// every further call reports [`Penalty::Eliminated`].
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownPlayer`] if `pseudo` isn't seated.
    pub fn punish(&mut self, pseudo: &str) -> Result<Penalty, GameError> {
        let score = self
            .scores
            .get_mut(pseudo)
            .ok_or_else(|| GameError::UnknownPlayer(pseudo.to_string()))?;

        if let Some(next) = PENALTY_WORD.chars().nth(score.len()) {
            score.push(next);
        }
        if score.len() >= PENALTY_WORD.len() {
            Ok(Penalty::Eliminated)
        } else {
            Ok(Penalty::Punished)
        }
    }

    fn advance_turn(&mut self) {
        if !self.players.is_empty() {
            self.current_turn = (self.current_turn + 1) % self.players.len();
        }
    }
}

/// The uppercase form of an alphabetic `c`, if it is a single character.
/// `'ß'` uppercases to `"SS"` and is refused.
fn single_uppercase(c: char) -> Option<char> {
    if !c.is_alphabetic() {
        return None;
    }
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) => Some(u),
        _ => None,
    }
}
