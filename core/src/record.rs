// SPDX-License-Identifier: MIT OR Apache-2.0

//! Main-line game record, review branch and replay
//!
//! Board contents are always derived from the move list. The main-line tip
//! is kept as a value and rebuilt from scratch after an undo; positions
//! inside a review are replayed on demand.

use crate::board::{Board, PlayOutcome};
use crate::scoring::Prisoners;
use crate::{Color, Coord, Move};
use serde::{Deserialize, Serialize};

/// Color to move after `index` moves: Black on even, White on odd.
/// Passes count as moves.
pub fn color_to_play(index: usize) -> Color {
    if index % 2 == 0 {
        Color::Black
    } else {
        Color::White
    }
}

/// Board state produced by replaying a move sequence
#[derive(Debug, Clone)]
pub struct Replay {
    pub board: Board,
    pub prisoners: Prisoners,
    /// Number of moves applied before replay finished or stopped
    pub applied: usize,
}

impl Replay {
    pub fn new(size: u8) -> Self {
        Self {
            board: Board::new(size),
            prisoners: Prisoners::default(),
            applied: 0,
        }
    }

    /// Apply the next recorded move with strictly alternating color.
    /// Returns `None` if the board refuses it.
    pub fn step(&mut self, point: Option<Coord>) -> Option<PlayOutcome> {
        let color = color_to_play(self.applied);
        let outcome = self.board.play(Move { color, point });
        if !outcome.accepted {
            tracing::error!(
                index = self.applied,
                ?point,
                reason = ?outcome.rejection,
                "Replay inconsistency: recorded move rejected"
            );
            return None;
        }
        self.prisoners.credit(color, &outcome);
        self.applied += 1;
        Some(outcome)
    }
}

/// Replay `moves` onto a fresh board, stopping at the first rejected move
pub fn replay<'a, I>(size: u8, moves: I) -> Replay
where
    I: IntoIterator<Item = &'a Move>,
{
    let mut replay = Replay::new(size);
    for mv in moves {
        if replay.step(mv.point).is_none() {
            break;
        }
    }
    replay
}

/// Divergent continuation explored without touching the main line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewBranch {
    base: usize,
    moves: Vec<Move>,
    cursor: usize,
}

impl ReviewBranch {
    /// Main-line index the branch diverges from
    pub fn base(&self) -> usize {
        self.base
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    /// Ply currently displayed, in `[0, end()]`
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Last reachable cursor position
    pub fn end(&self) -> usize {
        self.base + self.moves.len()
    }

    /// Append a move at the cursor, discarding anything after it.
    /// A cursor inside the main-line prefix re-bases the branch there.
    fn record(&mut self, mv: Move) {
        if self.cursor < self.base {
            self.base = self.cursor;
            self.moves.clear();
        } else {
            self.moves.truncate(self.cursor - self.base);
        }
        self.moves.push(mv);
        self.cursor += 1;
    }

    fn move_at(&self, main: &[Move], index: usize) -> Option<Move> {
        if index < self.base {
            main.get(index).copied()
        } else {
            self.moves.get(index - self.base).copied()
        }
    }
}

/// Recorded game: the authoritative main line plus an optional review branch
#[derive(Debug, Clone)]
pub struct GameRecord {
    size: u8,
    main: Vec<Move>,
    tip: Board,
    prisoners: Prisoners,
    review: Option<ReviewBranch>,
}

impl GameRecord {
    pub fn new(size: u8) -> Self {
        Self {
            size,
            main: Vec::new(),
            tip: Board::new(size),
            prisoners: Prisoners::default(),
            review: None,
        }
    }

    pub fn size(&self) -> u8 {
        self.size
    }

    pub fn main_line(&self) -> &[Move] {
        &self.main
    }

    pub fn len(&self) -> usize {
        self.main.len()
    }

    pub fn is_empty(&self) -> bool {
        self.main.is_empty()
    }

    /// Board after the last main-line move
    pub fn tip(&self) -> &Board {
        &self.tip
    }

    /// Prisoners taken on the main line
    pub fn prisoners(&self) -> Prisoners {
        self.prisoners
    }

    /// Whose turn it is on the main line
    pub fn next_color(&self) -> Color {
        color_to_play(self.main.len())
    }

    /// True when the last two main-line moves are both passes
    pub fn ends_with_double_pass(&self) -> bool {
        matches!(self.main.as_slice(), [.., a, b] if a.is_pass() && b.is_pass())
    }

    pub fn is_reviewing(&self) -> bool {
        self.review.is_some()
    }

    pub fn review(&self) -> Option<&ReviewBranch> {
        self.review.as_ref()
    }

    /// Play at the shown position: the review cursor while reviewing,
    /// otherwise the main-line tip.
    pub fn play(&mut self, point: Option<Coord>) -> PlayOutcome {
        if self.review.is_none() {
            return self.play_main(point);
        }

        let mut shown = self.shown();
        let color = color_to_play(self.shown_index());
        let outcome = shown.board.play(Move { color, point });
        if outcome.accepted {
            if let Some(branch) = self.review.as_mut() {
                branch.record(Move { color, point });
                tracing::debug!(cursor = branch.cursor, ?point, "Review move recorded");
            }
        }
        outcome
    }

    fn play_main(&mut self, point: Option<Coord>) -> PlayOutcome {
        let color = self.next_color();
        let outcome = self.tip.play(Move { color, point });
        if outcome.accepted {
            self.main.push(Move { color, point });
            self.prisoners.credit(color, &outcome);
        }
        outcome
    }

    /// Remove the last main-line move and rebuild the tip by replay
    pub fn undo(&mut self) -> Option<Move> {
        let removed = self.main.pop()?;
        let rebuilt = replay(self.size, &self.main);
        self.tip = rebuilt.board;
        self.prisoners = rebuilt.prisoners;
        Some(removed)
    }

    /// Start a fresh review at `base` (main-line end by default).
    /// Returns the clamped base.
    pub fn enter_review(&mut self, base: Option<usize>) -> usize {
        let base = base.unwrap_or(self.main.len()).min(self.main.len());
        self.review = Some(ReviewBranch {
            base,
            moves: Vec::new(),
            cursor: base,
        });
        base
    }

    /// Drop the review branch. Returns whether one existed.
    pub fn exit_review(&mut self) -> bool {
        self.review.take().is_some()
    }

    pub fn step_back(&mut self) -> Option<usize> {
        self.move_cursor(|cursor, _| cursor.saturating_sub(1))
    }

    pub fn step_forward(&mut self) -> Option<usize> {
        self.move_cursor(|cursor, _| cursor + 1)
    }

    pub fn jump_start(&mut self) -> Option<usize> {
        self.move_cursor(|_, _| 0)
    }

    pub fn jump_end(&mut self) -> Option<usize> {
        self.move_cursor(|_, end| end)
    }

    pub fn step_to(&mut self, index: usize) -> Option<usize> {
        self.move_cursor(|_, _| index)
    }

    fn move_cursor(&mut self, target: impl FnOnce(usize, usize) -> usize) -> Option<usize> {
        let branch = self.review.as_mut()?;
        let end = branch.end();
        branch.cursor = target(branch.cursor, end).min(end);
        tracing::debug!(cursor = branch.cursor, end, "Review cursor moved");
        Some(branch.cursor)
    }

    /// Moves leading to the shown position
    pub fn shown_moves(&self) -> Vec<Move> {
        match &self.review {
            None => self.main.clone(),
            Some(branch) => {
                let from_main = branch.cursor.min(branch.base);
                let from_branch = branch.cursor.saturating_sub(branch.base);
                self.main[..from_main]
                    .iter()
                    .chain(&branch.moves[..from_branch])
                    .copied()
                    .collect()
            }
        }
    }

    /// Number of moves leading to the shown position
    pub fn shown_index(&self) -> usize {
        self.review
            .as_ref()
            .map_or(self.main.len(), |branch| branch.cursor)
    }

    /// Length of the sequence the shown position belongs to
    pub fn shown_total(&self) -> usize {
        self.review.as_ref().map_or(self.main.len(), ReviewBranch::end)
    }

    /// Board and prisoners of the shown position
    pub fn shown(&self) -> Replay {
        match &self.review {
            None => Replay {
                board: self.tip.clone(),
                prisoners: self.prisoners,
                applied: self.main.len(),
            },
            Some(_) => replay(self.size, &self.shown_moves()),
        }
    }

    /// Point of the move that produced the shown position, if any
    pub fn last_move_shown(&self) -> Option<Coord> {
        match &self.review {
            None => self.main.last().and_then(|mv| mv.point),
            Some(branch) => {
                let index = branch.cursor.checked_sub(1)?;
                branch.move_at(&self.main, index).and_then(|mv| mv.point)
            }
        }
    }

    /// Move numbers of review stones still on the board at the cursor,
    /// row-major. Empty outside review.
    pub fn review_move_numbers(&self) -> Vec<Option<u32>> {
        let cells = self.size as usize * self.size as usize;
        let mut numbers = vec![None; cells];
        let Some(branch) = &self.review else {
            return numbers;
        };

        let prefix = branch.cursor.min(branch.base);
        let mut position = replay(self.size, &self.main[..prefix]);
        let mut next_number = 1;
        for mv in &branch.moves[..branch.cursor.saturating_sub(branch.base)] {
            if position.step(mv.point).is_none() {
                break;
            }
            if let Some(coord) = mv.point {
                numbers[coord.y as usize * self.size as usize + coord.x as usize] =
                    Some(next_number);
                next_number += 1;
            }
        }

        for (idx, number) in numbers.iter_mut().enumerate() {
            let coord = Coord::new(
                (idx % self.size as usize) as u8,
                (idx / self.size as usize) as u8,
            );
            if position.board.get(coord).is_empty() {
                *number = None;
            }
        }
        numbers
    }
}
