// SPDX-License-Identifier: MIT OR Apache-2.0

//! Goban CLI - play and review a game from the terminal
//!
//! Reads one command per line from stdin. It is also handy for scripted
//! games: `printf 'begin\nD4\npass\npass\nsgf\n' | goban --size 9`.

use anyhow::{Context, Result};
use clap::Parser;
use goban_cli::commands::{self, Reply};
use goban_cli::config::Args;
use goban_cli::render;
use goban_core::{GameSession, Phase};
use std::io::BufRead;

fn init_logging(args: &Args) {
    tracing_subscriber::fmt()
        .with_max_level(args.max_log_level())
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args);

    let settings = args.settings()?;
    let mut session = match &args.load {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            GameSession::from_sgf(&text, settings.rule)
                .with_context(|| format!("Failed to load {}", path.display()))?
        }
        None => {
            let mut session = GameSession::new();
            session.begin_game(settings)?;
            session
        }
    };
    tracing::info!(?settings, loaded = args.load.is_some(), "CLI session ready");

    print_session(&session);
    prompt(&session);

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("Error reading input")?;
        let line = line.trim();
        if line.is_empty() {
            prompt(&session);
            continue;
        }

        let reply = commands::parse_command(line)
            .and_then(|command| commands::execute(&mut session, &settings, command));
        match reply {
            Ok(Reply::Quit) => break,
            Ok(Reply::Text(text)) => println!("{}", text),
            Ok(Reply::Show(message)) => {
                print_session(&session);
                if let Some(message) = message {
                    println!("{}", message);
                }
            }
            Err(e) => eprintln!("Error: {}", e),
        }
        prompt(&session);
    }

    Ok(())
}

/// Print the board and status line
fn print_session(session: &GameSession) {
    let view = session.view();
    println!("\n{}", render::render_board(&view));
    println!("{}", render::render_status(&view));
}

fn prompt(session: &GameSession) {
    let view = session.view();
    match view.phase {
        Phase::PreGame => println!("\nType 'begin' to start, 'help' for commands:"),
        Phase::GameOver if !view.reviewing => {
            println!("\nGame over. 'review', 'sgf', 'new' or 'quit':")
        }
        _ => println!(
            "\n{} to move. Enter a move (e.g., 'D4'), 'pass', or 'help':",
            render::color_name(view.next_to_play)
        ),
    }
}
