// SPDX-License-Identifier: MIT OR Apache-2.0

//! Goban Core - Game Rules, Scoring and Game Records
//!
//! This crate provides the core game functionality including:
//! - Go board representation, legality checks and captures
//! - Area (Chinese) and territory (Japanese) scoring
//! - A main-line game record with undo and a disposable review branch
//! - A session controller driving the whole game lifecycle
//! - SGF (Smart Game Format) export and import of the main line

#![deny(unsafe_code)]
#![deny(clippy::all)]

pub mod board;
pub mod record;
pub mod scoring;
pub mod session;
pub mod sgf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use board::{Board, PlayOutcome, Territory, TerritoryGrid};
pub use record::{GameRecord, ReviewBranch};
pub use scoring::{format_margin, GameResult, Prisoners, Score, ScoringRule};
pub use session::{
    EndReason, GameEnd, GameSession, GameSettings, LiveScore, Phase, SessionError, SessionView,
};

/// Player color in a Go game (Black or White)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    /// Black player (traditionally goes first)
    Black,
    /// White player
    White,
}

impl Color {
    /// Returns the opposite color
    pub fn opposite(&self) -> Self {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    /// Single-letter tag used in result codes and SGF move properties
    pub fn letter(&self) -> char {
        match self {
            Color::Black => 'B',
            Color::White => 'W',
        }
    }
}

/// Contents of a single intersection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Stone {
    #[default]
    Empty,
    Black,
    White,
}

impl Stone {
    /// The color of the stone, or `None` for an empty point
    pub fn color(&self) -> Option<Color> {
        match self {
            Stone::Empty => None,
            Stone::Black => Some(Color::Black),
            Stone::White => Some(Color::White),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Stone::Empty)
    }
}

impl From<Color> for Stone {
    fn from(color: Color) -> Self {
        match color {
            Color::Black => Stone::Black,
            Color::White => Stone::White,
        }
    }
}

impl From<Option<Color>> for Stone {
    fn from(color: Option<Color>) -> Self {
        color.map(Stone::from).unwrap_or_default()
    }
}

/// Board coordinate representing a position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    /// X coordinate (column)
    pub x: u8,
    /// Y coordinate (row)
    pub y: u8,
}

impl Coord {
    /// Create a new coordinate
    pub fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    /// Check if coordinate is valid for a board of given size
    pub fn is_valid(&self, board_size: u8) -> bool {
        self.x < board_size && self.y < board_size
    }
}

/// A move in the game record. A pass carries no point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    /// The player making the move
    pub color: Color,
    /// Where the stone goes; `None` for a pass
    pub point: Option<Coord>,
}

impl Move {
    /// Place a stone of `color` at `coord`
    pub fn place(color: Color, coord: Coord) -> Self {
        Self {
            color,
            point: Some(coord),
        }
    }

    /// Pass the turn
    pub fn pass(color: Color) -> Self {
        Self { color, point: None }
    }

    pub fn is_pass(&self) -> bool {
        self.point.is_none()
    }
}

/// Reasons the board refuses a placement
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IllegalMove {
    /// The coordinate is outside the board
    #[error("coordinate is outside the board")]
    OutOfBounds,

    /// The position is already occupied
    #[error("position already occupied")]
    Occupied,

    /// Immediate recapture at the ko point
    #[error("move violates ko rule")]
    Ko,

    /// The move would leave its own group without liberties
    #[error("move would result in self-capture")]
    Suicide,
}
