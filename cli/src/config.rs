// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command-line arguments and game settings resolution

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use goban_core::{GameSettings, ScoringRule};
use std::path::{Path, PathBuf};

/// Command-line arguments
#[derive(Parser, Debug)]
#[clap(
    name = "goban",
    about = "Play and review Go games from the terminal",
    version
)]
pub struct Args {
    /// Board size (9, 13, or 19 are conventional)
    #[clap(short, long)]
    pub size: Option<u8>,

    /// Compensation points for White
    #[clap(short, long, allow_hyphen_values = true)]
    pub komi: Option<f32>,

    /// Scoring rule
    #[clap(short, long, value_enum)]
    pub rule: Option<Rule>,

    /// JSON file with default game settings
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// SGF file to load and continue
    #[clap(long)]
    pub load: Option<PathBuf>,

    /// Enable debug logging
    #[clap(long)]
    pub debug: bool,

    /// Log level when not in debug mode
    #[clap(long, default_value = "warn")]
    pub log_level: tracing::Level,
}

/// Scoring rule as accepted on the command line
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum Rule {
    /// Area scoring
    Chinese,
    /// Territory scoring
    Japanese,
}

impl From<Rule> for ScoringRule {
    fn from(rule: Rule) -> Self {
        match rule {
            Rule::Chinese => ScoringRule::Chinese,
            Rule::Japanese => ScoringRule::Japanese,
        }
    }
}

impl Args {
    /// Settings from the config file (if any) with flags taking precedence
    pub fn settings(&self) -> Result<GameSettings> {
        let mut settings = match &self.config {
            Some(path) => load_settings(path)?,
            None => GameSettings::default(),
        };

        if let Some(size) = self.size {
            settings.size = size;
        }
        if let Some(komi) = self.komi {
            settings.komi = komi;
        }
        if let Some(rule) = self.rule {
            settings.rule = rule.into();
        }

        settings.validate()?;
        Ok(settings)
    }

    pub fn max_log_level(&self) -> tracing::Level {
        if self.debug {
            tracing::Level::DEBUG
        } else {
            self.log_level
        }
    }
}

/// Read settings from a JSON file; missing fields keep their defaults
pub fn load_settings(path: &Path) -> Result<GameSettings> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}
