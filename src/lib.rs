//! Tic-tac-toe match engine with persisted round history.
//!
//! The core of a two-player tic-tac-toe app: an append-only move log, views
//! derived from it (whose turn, completion, winner, round scoreboard), and a
//! store that persists the record through an injected key-value surface and
//! notifies subscribers of every change.
//!
//! # Architecture
//!
//! - **engine**: pure derivation — game view and statistics from a move log
//! - **store**: mutation operations, persistence, change notification
//! - **storage**: the key-value port plus in-memory and file adapters
//!
//! The persisted JSON keeps the browser app's field names, so a record
//! written by one frontend loads unchanged in another.
//!
//! # Example
//!
//! ```
//! use tictactoe_match::{MatchStore, MemoryStorage, Player, SquareId};
//!
//! # fn main() -> Result<(), tictactoe_match::StoreError> {
//! let players = [
//!     Player::new(1, "Player 1", "fa-x", "turquoise"),
//!     Player::new(2, "Player 2", "fa-o", "yellow"),
//! ];
//! let mut store = MatchStore::new(MemoryStorage::new(), "game-state-key", players);
//!
//! store.record_move(SquareId::new(5)?)?;
//! let game = store.game()?;
//! assert_eq!(game.current_player.id, 2);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod engine;
mod error;
mod storage;
mod store;
mod types;

// Crate-level exports - derivation
pub use engine::{GameView, PlayerStats, StatsView, WINNING_PATTERNS, derive_game, derive_stats};

// Crate-level exports - errors
pub use error::{CorruptState, InvalidMove, StorageError, StoreError};

// Crate-level exports - persistence port
pub use storage::{FileStorage, MemoryStorage, StateStorage};

// Crate-level exports - store
pub use store::{MatchStore, StateUpdate, Subscriber};

// Crate-level exports - domain types
pub use types::{GameRecord, GameStatus, History, MatchState, Move, Player, SquareId};
