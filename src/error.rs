//! Error types for the match store.
//!
//! All errors surface synchronously at the point of detection; no mutation
//! leaves a partial write behind.

use crate::types::SquareId;

/// A rejected move.
///
/// The store re-validates every move before appending, regardless of any
/// filtering the view layer does, so a bad move never reaches the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum InvalidMove {
    /// The square id is outside the 1-9 board.
    #[display("square id {_0} is outside the 1-9 board")]
    OutOfRange(u8),

    /// The square is already occupied.
    #[display("square {_0} is already occupied")]
    SquareOccupied(SquareId),

    /// The game is already complete; reset it before playing on.
    #[display("the game is already complete")]
    GameComplete,
}

impl std::error::Error for InvalidMove {}

/// A persisted record that violates the model invariants.
///
/// Reachable only through external corruption of the shared storage value,
/// never through the public mutation API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum CorruptState {
    /// Two moves in the log claim the same square.
    #[display("square {_0} appears more than once in the move log")]
    DuplicateSquare(SquareId),

    /// The move log is longer than the board has squares.
    #[display("move log holds {_0} moves, board only has 9 squares")]
    TooManyMoves(usize),

    /// More than one player satisfies a winning pattern.
    #[display("more than one player satisfies a winning pattern")]
    MultipleWinners,
}

impl std::error::Error for CorruptState {}

/// Failure of the external key-value persistence surface.
#[derive(Debug, derive_more::Display)]
#[display("storage error for key '{key}': {source}")]
pub struct StorageError {
    /// The storage key involved.
    pub key: String,
    /// The underlying I/O failure.
    pub source: std::io::Error,
}

impl StorageError {
    /// Wraps an I/O failure with the key it occurred under.
    pub fn new(key: impl Into<String>, source: std::io::Error) -> Self {
        Self {
            key: key.into(),
            source,
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Any failure surfaced by a [`MatchStore`](crate::MatchStore) operation.
#[derive(Debug, derive_more::Display)]
pub enum StoreError {
    /// A move was rejected before touching the log.
    #[display("invalid move: {_0}")]
    Move(InvalidMove),

    /// The persisted record failed invariant validation.
    #[display("corrupt persisted state: {_0}")]
    Corrupt(CorruptState),

    /// The persistence surface failed.
    #[display("{_0}")]
    Storage(StorageError),

    /// The persisted record could not be encoded or decoded.
    #[display("serialization error: {_0}")]
    Serde(serde_json::Error),
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Move(e) => Some(e),
            StoreError::Corrupt(e) => Some(e),
            StoreError::Storage(e) => Some(e),
            StoreError::Serde(e) => Some(e),
        }
    }
}

impl From<InvalidMove> for StoreError {
    fn from(err: InvalidMove) -> Self {
        StoreError::Move(err)
    }
}

impl From<CorruptState> for StoreError {
    fn from(err: CorruptState) -> Self {
        StoreError::Corrupt(err)
    }
}

impl From<StorageError> for StoreError {
    fn from(err: StorageError) -> Self {
        StoreError::Storage(err)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serde(err)
    }
}
