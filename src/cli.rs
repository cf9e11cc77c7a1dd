//! Command-line interface for the terminal frontend.

use clap::Parser;
use std::path::PathBuf;

/// Two-player tic-tac-toe over a persisted match store
#[derive(Parser, Debug)]
#[command(name = "tictactoe_match")]
#[command(about = "Two-player tic-tac-toe with persisted round history", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Directory the match record is persisted in
    #[arg(long, default_value = ".")]
    pub data_dir: PathBuf,

    /// Storage key for the match record
    #[arg(long, default_value = "game-state-key")]
    pub key: String,

    /// Name of the first player (plays X, moves first)
    #[arg(long, default_value = "Player 1")]
    pub player1: String,

    /// Name of the second player (plays O)
    #[arg(long, default_value = "Player 2")]
    pub player2: String,
}
