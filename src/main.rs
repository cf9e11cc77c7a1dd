//! Terminal frontend for the match store.
//!
//! Plays both seats through one store over file-backed storage, standing in
//! for the browser view. All game logic lives in the library; this loop only
//! renders views and forwards gestures.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use std::io::{BufRead, Write};
use tictactoe_match::{
    FileStorage, GameView, MatchStore, Player, SquareId, StatsView, StoreError,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    info!(data_dir = %cli.data_dir.display(), key = %cli.key, "starting match");

    let players = [
        Player::new(1, cli.player1, "fa-x", "turquoise"),
        Player::new(2, cli.player2, "fa-o", "yellow"),
    ];
    let first_player_id = players[0].id;

    let storage = FileStorage::new(&cli.data_dir)?;
    let mut store = MatchStore::new(storage, cli.key, players);

    store.subscribe(move |game, stats| render(game, stats, first_player_id));

    // Initial render from whatever record already exists under the key.
    let (game, stats) = (store.game()?, store.stats()?);
    render(&game, &stats, first_player_id);

    let stdin = std::io::stdin();
    loop {
        print!("[1-9] move, r reset, n new round, q quit > ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let outcome = match line.trim() {
            "q" => break,
            "r" => store.reset_game(),
            "n" => store.start_new_round(),
            input => match input.parse::<u8>() {
                Ok(id) => SquareId::new(id)
                    .map_err(StoreError::from)
                    .and_then(|square| store.record_move(square)),
                Err(_) => {
                    println!("unrecognized input: {input}");
                    continue;
                }
            },
        };

        match outcome {
            Ok(()) => {}
            Err(StoreError::Move(rejected)) => println!("{rejected}"),
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

/// Prints the board, the turn or outcome line, and the round scoreboard.
fn render(game: &GameView, stats: &StatsView, first_player_id: u32) {
    let mut cells: [char; 9] = ['1', '2', '3', '4', '5', '6', '7', '8', '9'];
    for mv in &game.moves {
        let mark = if mv.player.id == first_player_id {
            'X'
        } else {
            'O'
        };
        cells[(mv.square_id.get() - 1) as usize] = mark;
    }

    println!();
    for row in 0..3 {
        let base = row * 3;
        println!(" {} | {} | {}", cells[base], cells[base + 1], cells[base + 2]);
        if row < 2 {
            println!("---+---+---");
        }
    }

    if game.status.is_complete {
        match &game.status.winner {
            Some(winner) => println!("{} wins!", winner.name),
            None => println!("Tie game."),
        }
    } else {
        println!("{} to move.", game.current_player.name);
    }

    let scores: Vec<String> = stats
        .player_with_stats
        .iter()
        .map(|entry| format!("{}: {}", entry.player.name, entry.wins))
        .collect();
    println!("Round: {} | ties: {}", scores.join(" | "), stats.ties);
}
