// SPDX-License-Identifier: MIT OR Apache-2.0

//! ASCII board rendering for the CLI.

use goban_core::{format_margin, Color, Coord, EndReason, Phase, SessionView, Stone, Territory};

/// Render the shown board as ASCII art
pub fn render_board(view: &SessionView) -> String {
    let size = view.settings.size;
    let mut output = String::new();

    let labels = column_labels(size);
    output.push_str(&labels);

    for row in 0..size {
        // Row number (1-indexed from the top)
        output.push_str(&format!("{:2} ", row + 1));

        for col in 0..size {
            let symbol = point_symbol(view, col, row);
            output.push_str(&format!(" {}", symbol));
        }

        output.push_str(&format!(" {}", row + 1));
        output.push('\n');
    }

    output.push_str(&labels);
    output
}

/// One-line summary of whose turn it is, captures and result
pub fn render_status(view: &SessionView) -> String {
    let mut status = match view.phase {
        Phase::PreGame => "Waiting for 'begin'".to_string(),
        Phase::Playing => format!("{:?} to play", view.next_to_play),
        Phase::GameOver => match (view.end_reason, view.resigner) {
            (Some(EndReason::Resign), Some(color)) => format!("Game over: {:?} resigned", color),
            _ => "Game over: both players passed".to_string(),
        },
    };

    if view.phase != Phase::PreGame {
        status.push_str(&format!(
            " | move {}/{} | captures B {} W {}",
            view.shown_index, view.total_moves, view.prisoners.black, view.prisoners.white
        ));
    }
    if view.reviewing {
        status.push_str(&format!(" | reviewing, {:?} to play", view.next_to_play));
    }
    if let Some(result) = view.result {
        status.push_str(&format!(" | result {}", result));
    }
    if let Some(score) = view.score {
        status.push_str(&format!(
            " | B {} W {}",
            format_margin(score.black_total),
            format_margin(score.white_total)
        ));
    }
    status
}

fn point_symbol(view: &SessionView, x: u8, y: u8) -> &'static str {
    let last = view.last_move == Some(Coord::new(x, y));
    match (view.stone_at(x, y), last) {
        (Stone::Black, false) => "●",
        (Stone::White, false) => "○",
        (Stone::Black, true) => "◆",
        (Stone::White, true) => "◇",
        (Stone::Empty, _) => match view.territory_at(x, y) {
            Territory::Black => "■",
            Territory::White => "□",
            Territory::Neutral | Territory::None => {
                if is_star_point(Coord::new(x, y), view.settings.size) {
                    "*"
                } else {
                    "+"
                }
            }
        },
    }
}

fn column_labels(size: u8) -> String {
    let mut labels = String::from("   ");
    for col in 0..size {
        labels.push_str(&format!(" {}", coord_to_column_char(col)));
    }
    labels.push('\n');
    labels
}

/// Convert a column index to a column character (A-Z, skipping I)
pub fn coord_to_column_char(col: u8) -> char {
    if col < 8 {
        (b'A' + col) as char
    } else {
        (b'A' + col + 1) as char // Skip 'I'
    }
}

/// Inverse of [`coord_to_column_char`], case-insensitive
pub fn column_char_to_coord(c: char) -> Option<u8> {
    let c = c.to_ascii_uppercase();
    match c {
        'A'..='H' => Some(c as u8 - b'A'),
        'J'..='Z' => Some(c as u8 - b'A' - 1),
        _ => None,
    }
}

/// Check if a coordinate is a star point on the board
fn is_star_point(coord: Coord, board_size: u8) -> bool {
    let (x, y) = (coord.x, coord.y);

    match board_size {
        9 => matches!((x, y), (2, 2) | (2, 6) | (4, 4) | (6, 2) | (6, 6)),
        13 => matches!((x, y), (3, 3) | (3, 9) | (6, 6) | (9, 3) | (9, 9)),
        19 => [3, 9, 15].contains(&x) && [3, 9, 15].contains(&y),
        _ => false,
    }
}

/// Name used in prompts for the side to move
pub fn color_name(color: Color) -> &'static str {
    match color {
        Color::Black => "Black",
        Color::White => "White",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goban_core::{GameSession, GameSettings, ScoringRule};

    fn started(size: u8) -> GameSession {
        let mut session = GameSession::new();
        session
            .begin_game(GameSettings::new(size, 6.5, ScoringRule::Chinese))
            .unwrap();
        session
    }

    #[test]
    fn test_render_empty_9x9_board() {
        let output = render_board(&started(9).view());

        assert!(output.contains("A B C D E F G H J"));
        assert!(output.contains(" 1 "));
        assert!(output.contains(" 9 "));

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 11); // 2 label rows + 9 board rows
    }

    #[test]
    fn test_render_board_with_stones() {
        let mut session = started(9);
        session.play(4, 4).unwrap();
        session.play(3, 3).unwrap();
        session.play(0, 0).unwrap();

        let output = render_board(&session.view());
        assert!(output.contains("●"));
        assert!(output.contains("○"));
        assert!(output.contains("◆"));
    }

    #[test]
    fn test_render_final_territory() {
        let mut session = started(9);
        session.play(4, 4).unwrap();
        session.pass().unwrap();
        session.pass().unwrap();

        let view = session.view();
        assert!(render_board(&view).contains("■"));
        assert!(render_status(&view).contains("result B+74.5"));
    }

    #[test]
    fn test_column_chars() {
        assert_eq!(coord_to_column_char(0), 'A');
        assert_eq!(coord_to_column_char(7), 'H');
        assert_eq!(coord_to_column_char(8), 'J');
        assert_eq!(coord_to_column_char(18), 'T');
        assert_eq!(column_char_to_coord('j'), Some(8));
        assert_eq!(column_char_to_coord('I'), None);
    }

    #[test]
    fn test_star_points() {
        assert!(is_star_point(Coord::new(4, 4), 9));
        assert!(!is_star_point(Coord::new(0, 0), 9));
        assert!(is_star_point(Coord::new(9, 9), 19));
        assert!(is_star_point(Coord::new(3, 15), 19));
    }
}
