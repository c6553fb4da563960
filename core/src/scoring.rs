// SPDX-License-Identifier: MIT OR Apache-2.0

//! Final scoring under area (Chinese) and territory (Japanese) rules

use crate::board::{Board, PlayOutcome, Territory, TerritoryGrid};
use crate::Color;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Scoring convention for a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ScoringRule {
    /// Area scoring: stones on the board plus surrounded territory
    Chinese,
    /// Territory scoring: surrounded territory plus prisoners
    #[default]
    Japanese,
}

/// Stones taken off the board, credited to the capturing side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Prisoners {
    /// White stones captured by Black
    pub black: u32,
    /// Black stones captured by White
    pub white: u32,
}

impl Prisoners {
    /// Credit the captures of an accepted move made by `mover`
    pub fn credit(&mut self, mover: Color, outcome: &PlayOutcome) {
        match mover {
            Color::Black => self.black += outcome.captured_white,
            Color::White => self.white += outcome.captured_black,
        }
    }
}

/// Score breakdown for one board position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub rule: ScoringRule,
    pub komi: f32,
    pub stones_black: u32,
    pub stones_white: u32,
    pub territory_black: u32,
    pub territory_white: u32,
    pub prisoners_black: u32,
    pub prisoners_white: u32,
    pub black_total: f32,
    pub white_total: f32,
}

impl Score {
    /// Black's total minus White's total
    pub fn margin(&self) -> f32 {
        self.black_total - self.white_total
    }
}

/// Score a position. Komi is credited to White under both rules.
pub fn score(
    board: &Board,
    rule: ScoringRule,
    komi: f32,
    prisoners: Prisoners,
    territory: &TerritoryGrid,
) -> Score {
    let stones_black = board.count_stones(Color::Black) as u32;
    let stones_white = board.count_stones(Color::White) as u32;
    let territory_black = territory.count(Territory::Black) as u32;
    let territory_white = territory.count(Territory::White) as u32;

    let (black_base, white_base) = match rule {
        ScoringRule::Chinese => (
            stones_black + territory_black,
            stones_white + territory_white,
        ),
        ScoringRule::Japanese => (
            territory_black + prisoners.black,
            territory_white + prisoners.white,
        ),
    };

    Score {
        rule,
        komi,
        stones_black,
        stones_white,
        territory_black,
        territory_white,
        prisoners_black: prisoners.black,
        prisoners_white: prisoners.white,
        black_total: black_base as f32,
        white_total: white_base as f32 + komi,
    }
}

/// Render a point value: integral values without decimals, others to one
/// place with ties rounded away from zero (`4.25` is `"4.3"`)
pub fn format_margin(value: f32) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.1}", (value * 10.0).round() / 10.0)
    }
}

/// Outcome of a finished game, rendered as an SGF result code
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameResult {
    /// The other color resigned
    Resignation { winner: Color },
    /// Won on points after both players passed
    Points { winner: Color, margin: f32 },
    Draw,
}

impl GameResult {
    /// Result of `resigner` giving up
    pub fn resignation(resigner: Color) -> Self {
        GameResult::Resignation {
            winner: resigner.opposite(),
        }
    }

    /// Result decided by the score totals
    pub fn from_score(score: &Score) -> Self {
        let diff = score.margin();
        if diff > 0.0 {
            GameResult::Points {
                winner: Color::Black,
                margin: diff,
            }
        } else if diff < 0.0 {
            GameResult::Points {
                winner: Color::White,
                margin: -diff,
            }
        } else {
            GameResult::Draw
        }
    }

    pub fn winner(&self) -> Option<Color> {
        match self {
            GameResult::Resignation { winner } | GameResult::Points { winner, .. } => Some(*winner),
            GameResult::Draw => None,
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameResult::Resignation { winner } => write!(f, "{}+R", winner.letter()),
            GameResult::Points { winner, margin } => {
                write!(f, "{}+{}", winner.letter(), format_margin(*margin))
            }
            GameResult::Draw => write!(f, "Draw"),
        }
    }
}

impl FromStr for GameResult {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("draw") || s == "0" {
            return Ok(GameResult::Draw);
        }

        let (who, rest) = s
            .split_once('+')
            .ok_or_else(|| anyhow!("Unrecognised result code: {}", s))?;
        let winner = match who {
            "B" => Color::Black,
            "W" => Color::White,
            _ => return Err(anyhow!("Unknown winner in result code: {}", s)),
        };

        if rest.eq_ignore_ascii_case("r") || rest.eq_ignore_ascii_case("resign") {
            return Ok(GameResult::Resignation { winner });
        }
        let margin = rest
            .parse::<f32>()
            .map_err(|_| anyhow!("Invalid margin in result code: {}", s))?;
        Ok(GameResult::Points { winner, margin })
    }
}
