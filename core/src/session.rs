// SPDX-License-Identifier: MIT OR Apache-2.0

//! Game session controller
//!
//! A [`GameSession`] owns the settings, the [`GameRecord`] and the end-of-game
//! state, and exposes the intents a front end can send. Every intent either
//! completes or returns an error without changing anything.
//!
//! ```text
//! PreGame --begin_game--> Playing --double pass / resign--> GameOver
//!                            ^   \                             |
//!                            |    enter_review / exit_review   |
//!                            +---- (Reviewing overlay) --------+
//! new_game: any state --> PreGame
//! ```

use crate::board::{PlayOutcome, Territory, TerritoryGrid};
use crate::record::GameRecord;
use crate::scoring::{self, format_margin, GameResult, Prisoners, Score, ScoringRule};
use crate::sgf::{self, SgfWriter};
use crate::{Board, Color, Coord, Move, Stone};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Largest board whose points fit single-letter SGF coordinates
pub const MAX_BOARD_SIZE: u8 = 25;

/// Lifecycle phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    PreGame,
    Playing,
    GameOver,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::PreGame => "pre-game",
            Phase::Playing => "playing",
            Phase::GameOver => "game over",
        };
        f.write_str(name)
    }
}

/// Why a game finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndReason {
    DoublePass,
    Resign,
}

/// Settings fixed when a game begins
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    /// Board size (conventionally 9, 13 or 19)
    pub size: u8,
    /// Compensation credited to White
    pub komi: f32,
    /// Scoring convention
    pub rule: ScoringRule,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            size: 19,
            komi: 6.5,
            rule: ScoringRule::Japanese,
        }
    }
}

impl GameSettings {
    pub fn new(size: u8, komi: f32, rule: ScoringRule) -> Self {
        Self { size, komi, rule }
    }

    /// Check the settings describe a playable game
    pub fn validate(&self) -> Result<(), SessionError> {
        if !(2..=MAX_BOARD_SIZE).contains(&self.size) {
            return Err(SessionError::InvalidSettings(format!(
                "board size {} is outside 2..={}",
                self.size, MAX_BOARD_SIZE
            )));
        }
        if !self.komi.is_finite() {
            return Err(SessionError::InvalidSettings(format!(
                "komi {} is not a finite number",
                self.komi
            )));
        }
        Ok(())
    }
}

/// Errors returned by session intents. None of them change the session.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SessionError {
    /// The coordinate is outside the board
    #[error("coordinate ({x}, {y}) is outside the {size}x{size} board")]
    InvalidCoordinate { x: usize, y: usize, size: u8 },

    /// The intent does not apply in the current state
    #[error("{intent} is not applicable while {phase}{}", reviewing_suffix(.reviewing))]
    InvalidTransition {
        intent: &'static str,
        phase: Phase,
        reviewing: bool,
    },

    /// Settings rejected by `begin_game`
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

fn reviewing_suffix(reviewing: &bool) -> &'static str {
    if *reviewing {
        " (reviewing)"
    } else {
        ""
    }
}

/// Final state of a finished game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEnd {
    pub reason: EndReason,
    /// Who resigned, for `EndReason::Resign`
    pub resigner: Option<Color>,
    pub score: Score,
    pub territory: TerritoryGrid,
    pub result: GameResult,
}

/// Score preview for the shown position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveScore {
    pub score: Score,
    pub territory: TerritoryGrid,
}

/// Immutable snapshot of everything a front end needs to draw
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub phase: Phase,
    pub reviewing: bool,
    pub settings: GameSettings,
    /// Number of moves leading to the shown position
    pub shown_index: usize,
    /// Length of the line the shown position belongs to
    pub total_moves: usize,
    pub next_to_play: Color,
    /// Main-line prisoners
    pub prisoners: Prisoners,
    pub end_reason: Option<EndReason>,
    pub resigner: Option<Color>,
    pub result: Option<GameResult>,
    pub last_move: Option<Coord>,
    /// Final score, shown only for a finished game outside review
    pub score: Option<Score>,
    board: Board,
    move_numbers: Vec<Option<u32>>,
    territory: Option<TerritoryGrid>,
}

impl SessionView {
    /// The shown board
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn stone_at(&self, x: u8, y: u8) -> Stone {
        self.board.get(Coord::new(x, y))
    }

    /// Number of a review stone at the shown position
    pub fn move_number_at(&self, x: u8, y: u8) -> Option<u32> {
        let size = self.settings.size;
        if !Coord::new(x, y).is_valid(size) {
            return None;
        }
        self.move_numbers
            .get(y as usize * size as usize + x as usize)
            .copied()
            .flatten()
    }

    /// Final territory owner; `Territory::None` unless the game is over
    /// and not under review
    pub fn territory_at(&self, x: u8, y: u8) -> Territory {
        self.territory
            .as_ref()
            .map_or(Territory::None, |grid| grid.owner_at(Coord::new(x, y)))
    }
}

/// A single game of Go from setup to result
#[derive(Debug, Clone)]
pub struct GameSession {
    settings: GameSettings,
    phase: Phase,
    record: GameRecord,
    end: Option<GameEnd>,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GameSession {
    /// A session waiting for `begin_game`
    pub fn new() -> Self {
        let settings = GameSettings::default();
        Self {
            settings,
            phase: Phase::PreGame,
            record: GameRecord::new(settings.size),
            end: None,
        }
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_started(&self) -> bool {
        self.phase != Phase::PreGame
    }

    pub fn is_reviewing(&self) -> bool {
        self.record.is_reviewing()
    }

    pub fn record(&self) -> &GameRecord {
        &self.record
    }

    pub fn end(&self) -> Option<&GameEnd> {
        self.end.as_ref()
    }

    pub fn result(&self) -> Option<GameResult> {
        self.end.as_ref().map(|end| end.result)
    }

    /// PreGame → Playing with fresh state
    pub fn begin_game(&mut self, settings: GameSettings) -> Result<(), SessionError> {
        if self.phase != Phase::PreGame {
            return Err(self.not_applicable("begin_game"));
        }
        settings.validate()?;

        self.settings = settings;
        self.record = GameRecord::new(settings.size);
        self.end = None;
        self.phase = Phase::Playing;
        tracing::info!(
            size = settings.size,
            komi = settings.komi,
            rule = ?settings.rule,
            "Game started"
        );
        Ok(())
    }

    /// Discard everything and return to PreGame
    pub fn new_game(&mut self) {
        let settings = self.settings;
        *self = Self::new();
        self.settings = settings;
        self.record = GameRecord::new(settings.size);
        tracing::info!("Session reset");
    }

    /// Place a stone for the side to move at the shown position
    pub fn play(&mut self, x: usize, y: usize) -> Result<PlayOutcome, SessionError> {
        self.ensure_can_move("play")?;
        let coord = self.coord(x, y)?;
        Ok(self.apply(Some(coord)))
    }

    /// Pass for the side to move at the shown position
    pub fn pass(&mut self) -> Result<PlayOutcome, SessionError> {
        self.ensure_can_move("pass")?;
        Ok(self.apply(None))
    }

    /// `color` resigns the game. An open review stays open.
    pub fn resign(&mut self, color: Color) -> Result<GameResult, SessionError> {
        if self.phase != Phase::Playing {
            return Err(self.not_applicable("resign"));
        }
        Ok(self.finish(EndReason::Resign, Some(color)))
    }

    /// Take back the last main-line move
    pub fn undo(&mut self) -> Result<Move, SessionError> {
        if self.phase != Phase::Playing || self.is_reviewing() {
            return Err(self.not_applicable("undo"));
        }
        let removed = self
            .record
            .undo()
            .ok_or_else(|| self.not_applicable("undo"))?;
        tracing::debug!(?removed, remaining = self.record.len(), "Move undone");
        Ok(removed)
    }

    /// Start a review at `at` (main-line end by default); returns the cursor
    pub fn enter_review(&mut self, at: Option<usize>) -> Result<usize, SessionError> {
        if !self.is_started() {
            return Err(self.not_applicable("enter_review"));
        }
        let cursor = self.record.enter_review(at);
        tracing::debug!(cursor, "Review started");
        Ok(cursor)
    }

    /// Leave the review; the main-line tip is shown again
    pub fn exit_review(&mut self) -> Result<(), SessionError> {
        if !self.record.exit_review() {
            return Err(self.not_applicable("exit_review"));
        }
        tracing::debug!("Review discarded");
        Ok(())
    }

    pub fn prev_move(&mut self) -> Result<usize, SessionError> {
        let cursor = self.record.step_back();
        cursor.ok_or_else(|| self.not_applicable("prev_move"))
    }

    pub fn next_move(&mut self) -> Result<usize, SessionError> {
        let cursor = self.record.step_forward();
        cursor.ok_or_else(|| self.not_applicable("next_move"))
    }

    pub fn jump_start(&mut self) -> Result<usize, SessionError> {
        let cursor = self.record.jump_start();
        cursor.ok_or_else(|| self.not_applicable("jump_start"))
    }

    pub fn jump_end(&mut self) -> Result<usize, SessionError> {
        let cursor = self.record.jump_end();
        cursor.ok_or_else(|| self.not_applicable("jump_end"))
    }

    pub fn step_to(&mut self, index: usize) -> Result<usize, SessionError> {
        let cursor = self.record.step_to(index);
        cursor.ok_or_else(|| self.not_applicable("step_to"))
    }

    /// Snapshot of the shown position and session status
    pub fn view(&self) -> SessionView {
        let reviewing = self.is_reviewing();
        let shown = self.record.shown();
        let finished = if reviewing { None } else { self.end.as_ref() };

        SessionView {
            phase: self.phase,
            reviewing,
            settings: self.settings,
            shown_index: self.record.shown_index(),
            total_moves: self.record.shown_total(),
            next_to_play: crate::record::color_to_play(self.record.shown_index()),
            prisoners: self.record.prisoners(),
            end_reason: self.end.as_ref().map(|end| end.reason),
            resigner: self.end.as_ref().and_then(|end| end.resigner),
            result: self.result(),
            last_move: self.record.last_move_shown(),
            score: finished.map(|end| end.score),
            board: shown.board,
            move_numbers: self.record.review_move_numbers(),
            territory: finished.map(|end| end.territory.clone()),
        }
    }

    /// Score the shown position without changing anything
    pub fn live_score(&self) -> Result<LiveScore, SessionError> {
        if !self.is_started() {
            return Err(self.not_applicable("live_score"));
        }
        let shown = self.record.shown();
        let territory = shown.board.compute_territory();
        let score = scoring::score(
            &shown.board,
            self.settings.rule,
            self.settings.komi,
            shown.prisoners,
            &territory,
        );
        Ok(LiveScore { score, territory })
    }

    /// Main line as SGF text, with the result once the game is over
    pub fn export_sgf(&self) -> String {
        let mut writer = SgfWriter::new(self.settings.size, Some(self.settings.komi));
        for mv in self.record.main_line() {
            writer.add_move(mv);
        }
        writer.finish(self.result())
    }

    /// Rebuild a session from SGF text by replaying its main line
    pub fn from_sgf(text: &str, rule: ScoringRule) -> anyhow::Result<Self> {
        let game = sgf::parse_game(text)?;
        if game.has_setup {
            bail!("Setup stones (AB/AW/AE) are not supported");
        }
        let settings = GameSettings::new(
            game.size,
            game.komi.unwrap_or(GameSettings::default().komi),
            rule,
        );

        let mut session = Self::new();
        session
            .begin_game(settings)
            .context("SGF game settings are not playable")?;

        for (index, mv) in game.moves.iter().enumerate() {
            if session.phase != Phase::Playing {
                bail!("Move {} follows the end of the game", index + 1);
            }
            let expected = session.record.next_color();
            if mv.color != expected {
                bail!(
                    "Move {} is played by {:?} but it is {:?}'s turn",
                    index + 1,
                    mv.color,
                    expected
                );
            }
            let outcome = match mv.point {
                Some(coord) => session.play(coord.x as usize, coord.y as usize)?,
                None => session.pass()?,
            };
            if !outcome.accepted {
                bail!(
                    "Move {} at {:?} is illegal: {:?}",
                    index + 1,
                    mv.point,
                    outcome.rejection
                );
            }
        }

        if let Some(GameResult::Resignation { winner }) = game.result {
            if session.phase == Phase::Playing {
                session.resign(winner.opposite())?;
            }
        }

        Ok(session)
    }

    fn apply(&mut self, point: Option<Coord>) -> PlayOutcome {
        let reviewing = self.is_reviewing();
        let outcome = self.record.play(point);
        if !outcome.accepted {
            tracing::debug!(?point, reason = ?outcome.rejection, "Move rejected");
            return outcome;
        }

        if !reviewing && self.record.ends_with_double_pass() {
            self.finish(EndReason::DoublePass, None);
        }
        outcome
    }

    /// Score the main-line tip and enter GameOver
    fn finish(&mut self, reason: EndReason, resigner: Option<Color>) -> GameResult {
        let board = self.record.tip();
        let territory = board.compute_territory();
        let score = scoring::score(
            board,
            self.settings.rule,
            self.settings.komi,
            self.record.prisoners(),
            &territory,
        );
        let result = match resigner {
            Some(color) => GameResult::resignation(color),
            None => GameResult::from_score(&score),
        };

        tracing::info!(
            ?reason,
            %result,
            black = format_margin(score.black_total),
            white = format_margin(score.white_total),
            "Game over"
        );
        self.end = Some(GameEnd {
            reason,
            resigner,
            score,
            territory,
            result,
        });
        self.phase = Phase::GameOver;
        result
    }

    fn ensure_can_move(&self, intent: &'static str) -> Result<(), SessionError> {
        match self.phase {
            Phase::Playing => Ok(()),
            Phase::GameOver if self.is_reviewing() => Ok(()),
            _ => Err(self.not_applicable(intent)),
        }
    }

    fn coord(&self, x: usize, y: usize) -> Result<Coord, SessionError> {
        let size = self.settings.size;
        if x >= size as usize || y >= size as usize {
            return Err(SessionError::InvalidCoordinate { x, y, size });
        }
        Ok(Coord::new(x as u8, y as u8))
    }

    fn not_applicable(&self, intent: &'static str) -> SessionError {
        tracing::warn!(intent, phase = %self.phase, "Intent not applicable");
        SessionError::InvalidTransition {
            intent,
            phase: self.phase,
            reviewing: self.is_reviewing(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings() {
        let settings = GameSettings::default();
        assert_eq!(settings.size, 19);
        assert_eq!(settings.komi, 6.5);
        assert_eq!(settings.rule, ScoringRule::Japanese);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn settings_validation() {
        assert!(GameSettings::new(1, 6.5, ScoringRule::Chinese).validate().is_err());
        assert!(GameSettings::new(26, 6.5, ScoringRule::Chinese).validate().is_err());
        assert!(GameSettings::new(9, f32::NAN, ScoringRule::Chinese).validate().is_err());
        assert!(GameSettings::new(25, 0.0, ScoringRule::Chinese).validate().is_ok());
    }

    #[test]
    fn settings_fill_missing_fields_from_defaults() {
        let settings: GameSettings = serde_json::from_str(r#"{"size": 9}"#).unwrap();
        assert_eq!(settings.size, 9);
        assert_eq!(settings.komi, 6.5);
    }

    #[test]
    fn transition_error_message() {
        let session = GameSession::new();
        let err = session.not_applicable("undo");
        assert_eq!(err.to_string(), "undo is not applicable while pre-game");
    }
}
