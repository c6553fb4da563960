// SPDX-License-Identifier: MIT OR Apache-2.0

//! Board representation, move legality, captures and territory

use crate::{Color, Coord, IllegalMove, Move, Stone};
use serde::{Deserialize, Serialize};

/// Result of [`Board::play`]
///
/// `captured_black` counts black stones removed by the move and
/// `captured_white` white stones. A rejected move never captures anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayOutcome {
    pub accepted: bool,
    pub captured_black: u32,
    pub captured_white: u32,
    /// Why the move was refused, when `accepted` is false
    pub rejection: Option<IllegalMove>,
}

impl PlayOutcome {
    pub(crate) fn accepted(captured_black: u32, captured_white: u32) -> Self {
        Self {
            accepted: true,
            captured_black,
            captured_white,
            rejection: None,
        }
    }

    pub(crate) fn rejected(reason: IllegalMove) -> Self {
        Self {
            accepted: false,
            captured_black: 0,
            captured_white: 0,
            rejection: Some(reason),
        }
    }

    /// Number of stones of `color` removed by this move
    pub fn captured(&self, color: Color) -> u32 {
        match color {
            Color::Black => self.captured_black,
            Color::White => self.captured_white,
        }
    }
}

/// Ownership of a single point after territory evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Territory {
    /// Occupied by a stone
    #[default]
    None,
    Black,
    White,
    /// Empty region bordered by both colors, or by none
    Neutral,
}

/// Per-point ownership map for one board snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerritoryGrid {
    size: u8,
    owners: Vec<Territory>,
}

impl TerritoryGrid {
    /// Build a grid from row-major owners; `None` if the length does not
    /// match `size * size`
    pub fn from_owners(size: u8, owners: Vec<Territory>) -> Option<Self> {
        (owners.len() == size as usize * size as usize).then_some(Self { size, owners })
    }

    pub fn size(&self) -> u8 {
        self.size
    }

    /// Owner of the point at `coord`; off-board points report `None`
    pub fn owner_at(&self, coord: Coord) -> Territory {
        if !coord.is_valid(self.size) {
            return Territory::None;
        }
        self.owners[coord.y as usize * self.size as usize + coord.x as usize]
    }

    /// Number of points marked with `owner`
    pub fn count(&self, owner: Territory) -> usize {
        self.owners.iter().filter(|o| **o == owner).count()
    }
}

/// Represents the Go board with stones and empty positions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    /// Size of the board (typically 9, 13, or 19)
    size: u8,
    /// Positions on the board, row-major
    positions: Vec<Option<Color>>,
    /// Point where the next move may not recapture
    ko: Option<Coord>,
}

impl Board {
    /// Create a new empty board with the specified size
    pub fn new(size: u8) -> Self {
        let cells = (size as usize) * (size as usize);
        Self {
            size,
            positions: vec![None; cells],
            ko: None,
        }
    }

    /// Get the size of the board
    pub fn size(&self) -> u8 {
        self.size
    }

    /// Get the stone at the specified coordinate
    pub fn get(&self, coord: Coord) -> Stone {
        Stone::from(self.color_at(coord))
    }

    /// The color of the stone at `coord`, `None` when empty or off the board
    pub fn color_at(&self, coord: Coord) -> Option<Color> {
        if !coord.is_valid(self.size) {
            return None;
        }
        self.positions[self.coord_to_index(coord)]
    }

    /// The point forbidden to the next move by simple ko
    pub fn ko_point(&self) -> Option<Coord> {
        self.ko
    }

    /// Count stones of specified color on the board
    pub fn count_stones(&self, color: Color) -> usize {
        self.positions
            .iter()
            .filter(|stone| **stone == Some(color))
            .count()
    }

    /// Apply a move, or refuse it without touching the board
    pub fn play(&mut self, mv: Move) -> PlayOutcome {
        let Some(coord) = mv.point else {
            self.ko = None;
            return PlayOutcome::accepted(0, 0);
        };

        if !coord.is_valid(self.size) {
            return PlayOutcome::rejected(IllegalMove::OutOfBounds);
        }
        let idx = self.coord_to_index(coord);
        if self.positions[idx].is_some() {
            return PlayOutcome::rejected(IllegalMove::Occupied);
        }
        if self.ko == Some(coord) {
            tracing::debug!("Ko violation detected at {:?}", coord);
            return PlayOutcome::rejected(IllegalMove::Ko);
        }

        let color = mv.color;
        let opponent = color.opposite();
        self.positions[idx] = Some(color);

        let cells = self.positions.len();
        let mut seen = vec![false; cells];
        let mut group = Vec::with_capacity(cells);
        let mut captured = 0u32;
        let mut last_captured = None;

        for neighbor in self.adjacent_indices(idx) {
            if self.positions[neighbor] != Some(opponent) || seen[neighbor] {
                continue;
            }
            if !self.flood_group(neighbor, &mut seen, &mut group) {
                for &stone in &group {
                    self.positions[stone] = None;
                    last_captured = Some(stone);
                }
                captured += group.len() as u32;
            }
        }

        if captured == 0 {
            seen.fill(false);
            if !self.flood_group(idx, &mut seen, &mut group) {
                self.positions[idx] = None;
                tracing::debug!("Self-capture rejected at {:?}", coord);
                return PlayOutcome::rejected(IllegalMove::Suicide);
            }
        }

        let lone = self
            .adjacent_indices(idx)
            .all(|n| self.positions[n] != Some(color));
        self.ko = match last_captured {
            Some(point) if captured == 1 && lone => Some(self.index_to_coord(point)),
            _ => None,
        };

        match opponent {
            Color::Black => PlayOutcome::accepted(captured, 0),
            Color::White => PlayOutcome::accepted(0, captured),
        }
    }

    /// Classify every empty point by the colors bordering its region
    pub fn compute_territory(&self) -> TerritoryGrid {
        let cells = self.positions.len();
        let mut owners = vec![Territory::None; cells];
        let mut seen = vec![false; cells];
        let mut stack = Vec::with_capacity(cells);
        let mut region = Vec::with_capacity(cells);

        for start in 0..cells {
            if self.positions[start].is_some() || seen[start] {
                continue;
            }

            region.clear();
            stack.push(start);
            seen[start] = true;
            let mut borders_black = false;
            let mut borders_white = false;

            while let Some(current) = stack.pop() {
                region.push(current);
                for neighbor in self.adjacent_indices(current) {
                    match self.positions[neighbor] {
                        Some(Color::Black) => borders_black = true,
                        Some(Color::White) => borders_white = true,
                        None if !seen[neighbor] => {
                            seen[neighbor] = true;
                            stack.push(neighbor);
                        }
                        None => {}
                    }
                }
            }

            let owner = match (borders_black, borders_white) {
                (true, false) => Territory::Black,
                (false, true) => Territory::White,
                _ => Territory::Neutral,
            };
            for &point in &region {
                owners[point] = owner;
            }
        }

        TerritoryGrid {
            size: self.size,
            owners,
        }
    }

    /// Collect the group containing `start` into `group`.
    /// Returns whether the group has at least one liberty.
    fn flood_group(&self, start: usize, seen: &mut [bool], group: &mut Vec<usize>) -> bool {
        let color = self.positions[start];
        let mut stack = Vec::with_capacity(self.positions.len());
        let mut has_liberty = false;

        group.clear();
        stack.push(start);
        seen[start] = true;

        while let Some(current) = stack.pop() {
            group.push(current);
            for neighbor in self.adjacent_indices(current) {
                let stone = self.positions[neighbor];
                if stone.is_none() {
                    has_liberty = true;
                } else if stone == color && !seen[neighbor] {
                    seen[neighbor] = true;
                    stack.push(neighbor);
                }
            }
        }

        has_liberty
    }

    /// Convert a coordinate to a vector index
    fn coord_to_index(&self, coord: Coord) -> usize {
        (coord.y as usize) * (self.size as usize) + (coord.x as usize)
    }

    fn index_to_coord(&self, idx: usize) -> Coord {
        let size = self.size as usize;
        Coord::new((idx % size) as u8, (idx / size) as u8)
    }

    fn adjacent_indices(&self, idx: usize) -> impl Iterator<Item = usize> {
        let size = self.size as usize;
        let (x, y) = (idx % size, idx / size);
        [
            (y > 0).then(|| idx - size),
            (y + 1 < size).then(|| idx + size),
            (x > 0).then(|| idx - 1),
            (x + 1 < size).then(|| idx + 1),
        ]
        .into_iter()
        .flatten()
    }
}
