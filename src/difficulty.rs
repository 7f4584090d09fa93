//! Difficulty profiles and game modes

use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Available AI difficulties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Normal,
    Hard,
}

impl Difficulty {
    pub fn name(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }

    pub fn all() -> &'static [Difficulty] {
        &[Difficulty::Easy, Difficulty::Normal, Difficulty::Hard]
    }

    /// Evaluator weights and pacing for this difficulty
    pub fn profile(&self) -> Profile {
        match self {
            Difficulty::Easy => Profile {
                difficulty: *self,
                height_weight: -0.3,
                lines_weight: 0.5,
                holes_weight: -0.5,
                bumpiness_weight: -0.3,
                randomness: 0.15,
                thinking_time: Duration::from_millis(300),
            },
            Difficulty::Normal => Profile {
                difficulty: *self,
                height_weight: -0.5,
                lines_weight: 1.0,
                holes_weight: -1.0,
                bumpiness_weight: -0.5,
                randomness: 0.08,
                thinking_time: Duration::from_millis(200),
            },
            Difficulty::Hard => Profile {
                difficulty: *self,
                height_weight: -0.8,
                lines_weight: 1.5,
                holes_weight: -2.0,
                bumpiness_weight: -0.5,
                randomness: 0.0,
                thinking_time: Duration::from_millis(100),
            },
        }
    }

    /// Score a Countdown round starts from
    pub fn countdown_start(&self) -> i64 {
        match self {
            Difficulty::Easy => 3000,
            Difficulty::Normal => 2000,
            Difficulty::Hard => 1000,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Difficulty {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::all()
            .iter()
            .copied()
            .find(|d| d.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseError::new("difficulty", s, "easy, normal, hard"))
    }
}

/// Evaluator weights and timing for one difficulty
///
/// A negative weight penalises its metric when high.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Profile {
    pub difficulty: Difficulty,
    pub height_weight: f64,
    pub lines_weight: f64,
    pub holes_weight: f64,
    pub bumpiness_weight: f64,
    /// Relative score perturbation; 0 makes the AI deterministic
    pub randomness: f64,
    pub thinking_time: Duration,
}

impl Profile {
    pub fn name(&self) -> &'static str {
        self.difficulty.name()
    }
}

/// Scoring rules for a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    /// Start at zero and earn points for every piece and clear
    #[default]
    Classic,
    /// Start from a budget that drains as the AI survives
    Countdown,
}

impl GameMode {
    pub fn name(&self) -> &'static str {
        match self {
            GameMode::Classic => "classic",
            GameMode::Countdown => "countdown",
        }
    }

    pub fn all() -> &'static [GameMode] {
        &[GameMode::Classic, GameMode::Countdown]
    }

    /// Opening score for a round at `difficulty`
    pub fn starting_score(&self, difficulty: Difficulty) -> i64 {
        match self {
            GameMode::Classic => 0,
            GameMode::Countdown => difficulty.countdown_start(),
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GameMode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GameMode::all()
            .iter()
            .copied()
            .find(|m| m.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseError::new("game mode", s, "classic, countdown"))
    }
}
