//! Pure state derivation: game view and round statistics from a move log.
//!
//! Every function here is a pure function of its inputs. Nothing is cached
//! and nothing is mutated; the store re-derives on every read so the views
//! always reflect the latest persisted record.

use crate::types::{GameRecord, GameStatus, Move, Player, SquareId};
use serde::Serialize;
use tracing::{debug, instrument};

/// The 8 winning triples of the 3x3 board, in square ids.
pub const WINNING_PATTERNS: [[SquareId; 3]; 8] = {
    const fn sq(id: u8) -> SquareId {
        SquareId::ALL[(id - 1) as usize]
    }
    [
        [sq(1), sq(2), sq(3)],
        [sq(1), sq(5), sq(9)],
        [sq(1), sq(4), sq(7)],
        [sq(2), sq(5), sq(8)],
        [sq(3), sq(5), sq(7)],
        [sq(3), sq(6), sq(9)],
        [sq(4), sq(5), sq(6)],
        [sq(7), sq(8), sq(9)],
    ]
};

/// Derived view of the active game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameView {
    /// The move log the view was derived from.
    pub moves: Vec<Move>,
    /// The player whose turn it is.
    pub current_player: Player,
    /// Completion status.
    pub status: GameStatus,
}

/// A player together with their win count for the current round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    /// The player.
    #[serde(flatten)]
    pub player: Player,
    /// Games won in the current round.
    pub wins: usize,
}

/// Derived round scoreboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsView {
    /// Per-player win counts, in player registration order.
    pub player_with_stats: Vec<PlayerStats>,
    /// Tied games in the current round.
    pub ties: usize,
}

/// Derives the current game view from a move log.
///
/// The turn strictly alternates by move-count parity, starting with
/// `players[0]`, so the current player is a function of log length alone.
/// The winner scan evaluates `players[0]` first and stops at the first
/// pattern holder; logs where both players hold a pattern are rejected
/// upstream by [`MatchState::validate`](crate::MatchState::validate).
#[instrument(skip_all, fields(moves = moves.len()))]
pub fn derive_game(moves: &[Move], players: &[Player; 2]) -> GameView {
    let current_player = players[moves.len() % 2].clone();

    let mut winner = None;
    for player in players {
        let squares: Vec<SquareId> = moves
            .iter()
            .filter(|mv| mv.player.id == player.id)
            .map(|mv| mv.square_id)
            .collect();

        if WINNING_PATTERNS
            .iter()
            .any(|pattern| pattern.iter().all(|s| squares.contains(s)))
        {
            winner = Some(player.clone());
            break;
        }
    }

    let is_complete = winner.is_some() || moves.len() == 9;
    debug!(is_complete, winner = ?winner.as_ref().map(|p| p.id), "derived game view");

    GameView {
        moves: moves.to_vec(),
        current_player,
        status: GameStatus { is_complete, winner },
    }
}

/// Derives the round scoreboard from the archived games of the round.
///
/// Only records reaching the archive are counted, and those are complete by
/// construction, so a `None` winner unambiguously means a tie.
#[instrument(skip_all, fields(games = current_round_games.len()))]
pub fn derive_stats(players: &[Player; 2], current_round_games: &[GameRecord]) -> StatsView {
    let player_with_stats = players
        .iter()
        .map(|player| {
            let wins = current_round_games
                .iter()
                .filter(|game| game.status.winner.as_ref().map(|w| w.id) == Some(player.id))
                .count();
            PlayerStats {
                player: player.clone(),
                wins,
            }
        })
        .collect();

    let ties = current_round_games
        .iter()
        .filter(|game| game.status.winner.is_none())
        .count();

    StatsView {
        player_with_stats,
        ties,
    }
}
