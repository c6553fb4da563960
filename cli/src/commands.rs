// SPDX-License-Identifier: MIT OR Apache-2.0

//! Line commands understood by the CLI and their effect on a session

use crate::render::column_char_to_coord;
use anyhow::{anyhow, Context, Result};
use goban_core::{format_margin, Color, GameSession, GameSettings, PlayOutcome};
use std::path::PathBuf;

pub const HELP: &str = "\
Commands:
  begin               start a game with the configured settings
  play <D4 | x y>     place a stone (letters skip I, rows count from the top)
  pass                pass the turn
  resign [b|w]        resign (defaults to the side to move)
  undo                take back the last move
  review [n]          explore a variation from move n (default: the end)
  exit                leave review and return to the game
  prev | next         step the review cursor
  start | end         jump the review cursor
  step <n>            move the review cursor to move n
  score               live score of the shown position
  sgf [path]          print or save the game record
  json                print the session state as JSON
  new                 discard the game
  help                show this text
  quit                leave";

/// A parsed input line
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Begin,
    Play { x: usize, y: usize },
    Pass,
    Resign(Option<Color>),
    Undo,
    Review(Option<usize>),
    ExitReview,
    Prev,
    Next,
    Start,
    End,
    Step(usize),
    Score,
    Sgf(Option<PathBuf>),
    Json,
    New,
    Help,
    Quit,
}

/// What the input loop should do after a command
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Print the message (if any) and redraw the board
    Show(Option<String>),
    /// Print the message without redrawing
    Text(String),
    Quit,
}

/// Parse one input line
pub fn parse_command(line: &str) -> Result<Command> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Err(anyhow!("Empty command"));
    };
    let args: Vec<&str> = words.collect();

    let command = match head.to_lowercase().as_str() {
        "begin" => Command::Begin,
        "play" | "p" => parse_point(&args)?,
        "pass" => Command::Pass,
        "resign" => Command::Resign(match args.first() {
            None => None,
            Some(who) => Some(parse_color(who)?),
        }),
        "undo" | "u" => Command::Undo,
        "review" => Command::Review(parse_optional_index(&args)?),
        "exit" => Command::ExitReview,
        "prev" => Command::Prev,
        "next" => Command::Next,
        "start" => Command::Start,
        "end" => Command::End,
        "step" => Command::Step(
            parse_optional_index(&args)?.ok_or_else(|| anyhow!("step needs a move number"))?,
        ),
        "score" => Command::Score,
        "sgf" => Command::Sgf(args.first().map(PathBuf::from)),
        "json" => Command::Json,
        "new" => Command::New,
        "help" | "?" => Command::Help,
        "quit" | "q" => Command::Quit,
        // A bare coordinate is a move
        _ if args.is_empty() => parse_point(&[head])?,
        other => return Err(anyhow!("Unknown command '{}'. Type 'help'.", other)),
    };
    Ok(command)
}

fn parse_point(args: &[&str]) -> Result<Command> {
    match args {
        [vertex] => {
            let mut chars = vertex.chars();
            let col = chars
                .next()
                .and_then(column_char_to_coord)
                .ok_or_else(|| anyhow!("Invalid column in '{}'", vertex))?;
            let row: usize = chars
                .as_str()
                .parse()
                .with_context(|| format!("Invalid row in '{}'", vertex))?;
            if row == 0 {
                return Err(anyhow!("Rows are numbered from 1"));
            }
            Ok(Command::Play {
                x: col as usize,
                y: row - 1,
            })
        }
        [x, y] => Ok(Command::Play {
            x: x.parse().with_context(|| format!("Invalid x '{}'", x))?,
            y: y.parse().with_context(|| format!("Invalid y '{}'", y))?,
        }),
        _ => Err(anyhow!("Expected a point like 'D4' or 'x y'")),
    }
}

fn parse_color(word: &str) -> Result<Color> {
    match word.to_lowercase().as_str() {
        "b" | "black" => Ok(Color::Black),
        "w" | "white" => Ok(Color::White),
        _ => Err(anyhow!("Unknown color '{}'", word)),
    }
}

fn parse_optional_index(args: &[&str]) -> Result<Option<usize>> {
    args.first()
        .map(|n| n.parse().with_context(|| format!("Invalid move number '{}'", n)))
        .transpose()
}

/// Apply a command to the session
pub fn execute(
    session: &mut GameSession,
    settings: &GameSettings,
    command: Command,
) -> Result<Reply> {
    let reply = match command {
        Command::Begin => {
            session.begin_game(*settings)?;
            Reply::Show(None)
        }
        Command::Play { x, y } => {
            let outcome = session.play(x, y)?;
            Reply::Show(describe_outcome(&outcome))
        }
        Command::Pass => {
            session.pass()?;
            Reply::Show(None)
        }
        Command::Resign(who) => {
            let color = who.unwrap_or_else(|| session.record().next_color());
            session.resign(color)?;
            Reply::Show(None)
        }
        Command::Undo => {
            session.undo()?;
            Reply::Show(None)
        }
        Command::Review(at) => {
            let cursor = session.enter_review(at)?;
            Reply::Show(Some(format!("Reviewing from move {}", cursor)))
        }
        Command::ExitReview => {
            session.exit_review()?;
            Reply::Show(None)
        }
        Command::Prev => cursor_reply(session.prev_move()?),
        Command::Next => cursor_reply(session.next_move()?),
        Command::Start => cursor_reply(session.jump_start()?),
        Command::End => cursor_reply(session.jump_end()?),
        Command::Step(index) => cursor_reply(session.step_to(index)?),
        Command::Score => {
            let live = session.live_score()?;
            let score = live.score;
            Reply::Text(format!(
                "{:?} rule, komi {}: Black {} (stones {}, territory {}, prisoners {}) \
                 White {} (stones {}, territory {}, prisoners {})",
                score.rule,
                format_margin(score.komi),
                format_margin(score.black_total),
                score.stones_black,
                score.territory_black,
                score.prisoners_black,
                format_margin(score.white_total),
                score.stones_white,
                score.territory_white,
                score.prisoners_white,
            ))
        }
        Command::Sgf(None) => Reply::Text(session.export_sgf()),
        Command::Sgf(Some(path)) => {
            std::fs::write(&path, session.export_sgf())
                .with_context(|| format!("Failed to write {}", path.display()))?;
            Reply::Text(format!("Saved {}", path.display()))
        }
        Command::Json => Reply::Text(serde_json::to_string_pretty(&session.view())?),
        Command::New => {
            session.new_game();
            Reply::Show(None)
        }
        Command::Help => Reply::Text(HELP.to_string()),
        Command::Quit => Reply::Quit,
    };
    Ok(reply)
}

fn cursor_reply(cursor: usize) -> Reply {
    Reply::Show(Some(format!("Move {}", cursor)))
}

fn describe_outcome(outcome: &PlayOutcome) -> Option<String> {
    if let Some(reason) = outcome.rejection {
        return Some(format!("Illegal move: {}", reason));
    }
    let captured = outcome.captured_black + outcome.captured_white;
    (captured > 0).then(|| format!("Captured {} stone(s)", captured))
}
