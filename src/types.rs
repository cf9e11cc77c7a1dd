//! Core domain types for the tic-tac-toe match record.
//!
//! The persisted record ([`MatchState`]) keeps the exact field names the
//! browser implementations of this game use (`currentGameMoves`, `squareId`,
//! ...) so a record written by one frontend deserializes unchanged in
//! another.

use crate::error::{CorruptState, InvalidMove};
use serde::{Deserialize, Serialize};

/// One of the 9 fixed board cells, numbered 1-9 in row-major order.
///
/// The range invariant is enforced at construction, so out-of-range ids are
/// unrepresentable downstream. Serialized as a bare number; deserialization
/// runs the same range check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SquareId(u8);

impl SquareId {
    /// All 9 cells, in board order.
    pub const ALL: [SquareId; 9] = [
        SquareId(1),
        SquareId(2),
        SquareId(3),
        SquareId(4),
        SquareId(5),
        SquareId(6),
        SquareId(7),
        SquareId(8),
        SquareId(9),
    ];

    /// Creates a square id, rejecting values outside 1-9.
    pub fn new(id: u8) -> Result<Self, InvalidMove> {
        if (1..=9).contains(&id) {
            Ok(Self(id))
        } else {
            Err(InvalidMove::OutOfRange(id))
        }
    }

    /// Returns the numeric id (1-9).
    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for SquareId {
    type Error = InvalidMove;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl From<SquareId> for u8 {
    fn from(id: SquareId) -> Self {
        id.0
    }
}

impl std::fmt::Display for SquareId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered player.
///
/// The two presentation tags (`icon_class`, `color_class`) are opaque to the
/// core; they ride along for whatever frontend consumes the views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Unique, stable identifier.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Frontend icon tag (e.g. `fa-x`).
    pub icon_class: String,
    /// Frontend color tag (e.g. `turquoise`).
    pub color_class: String,
}

impl Player {
    /// Creates a player record.
    pub fn new(
        id: u32,
        name: impl Into<String>,
        icon_class: impl Into<String>,
        color_class: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            icon_class: icon_class.into(),
            color_class: color_class.into(),
        }
    }
}

/// An immutable move fact: which square, by which player.
///
/// Moves are only ever appended to the log, never edited or removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Move {
    /// The claimed cell.
    pub square_id: SquareId,
    /// The player who made the move.
    pub player: Player,
}

impl Move {
    /// Creates a move.
    pub fn new(square_id: SquareId, player: Player) -> Self {
        Self { square_id, player }
    }
}

/// Derived completion status of a game.
///
/// Invariant: `is_complete` is true iff a winner exists or the board is full
/// (9 moves). A `None` winner on a complete game means a tie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStatus {
    /// Whether the game has ended.
    pub is_complete: bool,
    /// The winning player, if any.
    pub winner: Option<Player>,
}

/// A completed game retained in history: its move log plus outcome.
///
/// Created only when a complete game is reset; immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    /// Snapshot of the game's moves, in turn order.
    pub moves: Vec<Move>,
    /// Snapshot of the outcome.
    pub status: GameStatus,
}

/// Archived games, split into the ongoing round and everything before it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct History {
    /// Completed games of the round in progress.
    pub current_round_games: Vec<GameRecord>,
    /// Every game from every finished round.
    pub all_games: Vec<GameRecord>,
}

/// The full persisted match record: the sole unit of persistence.
///
/// Read-modify-written as a whole on every mutation. `Default` is the empty
/// record used when no persisted value exists yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchState {
    /// Move log of the active game, insertion order = turn order.
    pub current_game_moves: Vec<Move>,
    /// Archived games.
    pub history: History,
}

impl MatchState {
    /// Checks the invariants the public mutation API maintains.
    ///
    /// A persisted record can only break these through external corruption
    /// (e.g. another process writing garbage under the same key), so a
    /// failure here is reported as such rather than papered over:
    ///
    /// - no two moves share a `squareId`
    /// - at most 9 moves
    /// - at most one player satisfies a winning pattern
    ///
    /// # Errors
    ///
    /// Returns the first [`CorruptState`] violation found.
    pub fn validate(&self) -> Result<(), CorruptState> {
        let mut seen: Vec<SquareId> = Vec::with_capacity(self.current_game_moves.len());
        for mv in &self.current_game_moves {
            if seen.contains(&mv.square_id) {
                return Err(CorruptState::DuplicateSquare(mv.square_id));
            }
            seen.push(mv.square_id);
        }

        if self.current_game_moves.len() > 9 {
            return Err(CorruptState::TooManyMoves(self.current_game_moves.len()));
        }

        // Group occupied squares by player id, then count pattern holders.
        let mut player_ids: Vec<u32> = Vec::new();
        for mv in &self.current_game_moves {
            if !player_ids.contains(&mv.player.id) {
                player_ids.push(mv.player.id);
            }
        }

        let holders = player_ids
            .iter()
            .filter(|&&id| {
                let squares: Vec<SquareId> = self
                    .current_game_moves
                    .iter()
                    .filter(|m| m.player.id == id)
                    .map(|m| m.square_id)
                    .collect();

                crate::engine::WINNING_PATTERNS
                    .iter()
                    .any(|pattern| pattern.iter().all(|s| squares.contains(s)))
            })
            .count();

        if holders > 1 {
            return Err(CorruptState::MultipleWinners);
        }

        Ok(())
    }
}
