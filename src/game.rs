//! Core round state and the single-piece pipeline steps
//!
//! `Round` is synchronous; the controller drives it between suspension
//! points and publishes a snapshot after every step.

use crate::boost::SpeedBoost;
use crate::difficulty::{Difficulty, GameMode, Profile};
use crate::error::Rejection;
use crate::grid::Grid;
use crate::movegen::Move;
use crate::piece::Piece;
use crate::score::Stats;
use crate::settings::PacingSettings;
use crate::snapshot::{ActivePiece, BoostView, Snapshot};
use crate::tetromino::PieceType;
use serde::Serialize;
use std::collections::VecDeque;
use tokio::time::Instant;

/// Round lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundStatus {
    /// Constructed, waiting for `start`
    Ready,
    Playing,
    Paused,
    GameOver,
}

/// What the opponent's status widget shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "state")]
pub enum Mood {
    Ready,
    Thinking,
    Celebrating { lines: usize },
    Failed,
}

impl Mood {
    /// Key into the text-lookup service
    pub fn text_key(&self) -> &'static str {
        match self {
            Mood::Ready => "ready",
            Mood::Thinking => "thinking",
            Mood::Celebrating { .. } => "celebrating",
            Mood::Failed => "confused",
        }
    }
}

/// One dequeued piece and everything the AI needs to place it
#[derive(Debug, Clone)]
pub struct Job {
    pub kind: PieceType,
    /// Round generation the job belongs to; stale after a reset
    pub generation: u64,
    pub profile: Profile,
    pub multiplier: f64,
    pub grid: Grid,
}

/// A line clear that just happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clear {
    pub lines: usize,
    pub name: &'static str,
}

/// State of one round
#[derive(Debug, Clone)]
pub struct Round {
    pub grid: Grid,
    /// Piece currently descending
    active: Option<Piece>,
    landing_y: i32,
    highlighted: Vec<usize>,
    queue: VecDeque<PieceType>,
    pub stats: Stats,
    pub boost: SpeedBoost,
    pub status: RoundStatus,
    pub mood: Mood,
    pub difficulty: Difficulty,
    pub mode: GameMode,
    thinking: bool,
    processing: bool,
    generation: u64,
    pacing: PacingSettings,
}

impl Round {
    pub fn new(difficulty: Difficulty, mode: GameMode, pacing: &PacingSettings) -> Self {
        Self {
            grid: Grid::new(),
            active: None,
            landing_y: 0,
            highlighted: Vec::new(),
            queue: VecDeque::new(),
            stats: Stats::new(mode, difficulty),
            boost: SpeedBoost::new(pacing),
            status: RoundStatus::Ready,
            mood: Mood::Ready,
            difficulty,
            mode,
            thinking: false,
            processing: false,
            generation: 0,
            pacing: pacing.clone(),
        }
    }

    /// Playing round on a prepared grid
    #[cfg(test)]
    pub(crate) fn with_grid(grid: Grid, difficulty: Difficulty, mode: GameMode) -> Self {
        let mut round = Self::new(difficulty, mode, &PacingSettings::default());
        round.grid = grid;
        round.status = RoundStatus::Playing;
        round
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Current queue capacity; wider while boosted
    pub fn capacity(&self) -> usize {
        if self.boost.active {
            self.pacing.boosted_queue
        } else {
            self.pacing.baseline_queue
        }
    }

    /// The multiplier while speed boost is active
    fn boost_bonus(&self) -> Option<f64> {
        self.boost.active.then_some(self.boost.multiplier)
    }

    /// Begin the first round
    pub fn start(&mut self) -> bool {
        if self.status != RoundStatus::Ready {
            return false;
        }
        self.status = RoundStatus::Playing;
        true
    }

    /// Fresh playing round with the same settings; any job in flight
    /// becomes stale
    pub fn reset(&mut self) {
        let generation = self.generation + 1;
        *self = Self::new(self.difficulty, self.mode, &self.pacing);
        self.generation = generation;
        self.status = RoundStatus::Playing;
    }

    /// Switch to countdown scoring at `difficulty` and restart
    pub fn start_countdown(&mut self, difficulty: Difficulty) {
        self.mode = GameMode::Countdown;
        self.difficulty = difficulty;
        self.reset();
    }

    /// Queue a piece for the AI
    pub fn submit(&mut self, kind: PieceType, now: Instant) -> Result<(), Rejection> {
        match self.status {
            RoundStatus::Ready => return Err(Rejection::NotStarted),
            RoundStatus::Paused => return Err(Rejection::Paused),
            RoundStatus::GameOver => return Err(Rejection::GameOver),
            RoundStatus::Playing => {}
        }

        let capacity = self.capacity();
        if self.queue.len() >= capacity {
            return Err(Rejection::QueueFull { capacity });
        }

        self.boost.register_input(now);
        self.queue.push_back(kind);
        Ok(())
    }

    pub fn pause(&mut self) -> bool {
        if self.status != RoundStatus::Playing {
            return false;
        }
        self.status = RoundStatus::Paused;
        self.boost.reset();
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.status != RoundStatus::Paused {
            return false;
        }
        self.status = RoundStatus::Playing;
        true
    }

    /// Swap the AI profile; refused while a piece is in flight
    pub fn set_difficulty(&mut self, difficulty: Difficulty) -> Result<(), Rejection> {
        if self.processing {
            return Err(Rejection::Busy);
        }
        self.difficulty = difficulty;
        self.boost.reset();
        Ok(())
    }

    /// Take the next piece off the queue if the round can process it
    ///
    /// Returns None (and marks the pipeline idle) when the queue is empty or
    /// the round is not playing, which is where a pause takes effect.
    pub fn next_job(&mut self, now: Instant) -> Option<Job> {
        if self.status != RoundStatus::Playing {
            self.processing = false;
            return None;
        }
        let Some(kind) = self.queue.pop_front() else {
            self.processing = false;
            return None;
        };

        self.boost.tick(now);
        self.stats.record_piece(kind);
        self.processing = true;
        self.thinking = true;
        self.mood = Mood::Thinking;

        Some(Job {
            kind,
            generation: self.generation,
            profile: self.difficulty.profile(),
            multiplier: self.boost.multiplier,
            grid: self.grid.clone(),
        })
    }

    /// Show the chosen placement at the top of the grid
    pub fn begin_drop(&mut self, mv: &Move) {
        self.thinking = false;
        self.landing_y = mv.y;
        self.active = Some(Piece::at(mv.piece.kind, mv.rotation, mv.x, 0));
    }

    /// Move the active piece one row toward its landing row; false once
    /// it has arrived
    pub fn advance_drop(&mut self) -> bool {
        match self.active.as_mut() {
            Some(piece) if piece.y < self.landing_y => {
                piece.y += 1;
                true
            }
            _ => false,
        }
    }

    /// Write the active piece into the grid and highlight any completed rows
    pub fn lock_active(&mut self) -> Vec<usize> {
        if let Some(piece) = self.active.take() {
            self.grid.place(&piece);
        }
        self.highlighted = self.grid.completed_lines();
        self.highlighted.clone()
    }

    /// Remove the highlighted rows and score them
    pub fn clear_highlighted(&mut self) -> Option<Clear> {
        if self.highlighted.is_empty() {
            return None;
        }
        let rows = std::mem::take(&mut self.highlighted);
        self.grid.clear_lines(&rows);
        let lines = rows.len();
        let name = self.stats.record_clear(lines, self.boost_bonus());
        self.mood = Mood::Celebrating { lines };
        Some(Clear { lines, name })
    }

    /// Piece fully resolved without ending the round
    pub fn finish_piece(&mut self) {
        if self.mood == Mood::Thinking {
            self.mood = Mood::Ready;
        }
    }

    /// Terminal transition: the AI could not place a piece or topped out
    pub fn end_round(&mut self) {
        self.stats.record_game_over(self.boost_bonus());
        self.status = RoundStatus::GameOver;
        self.mood = Mood::Failed;
        self.active = None;
        self.highlighted.clear();
        self.thinking = false;
        self.processing = false;
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            grid: Snapshot::grid_rows(&self.grid),
            active_piece: self.active.as_ref().map(ActivePiece::from),
            highlighted_lines: self.highlighted.clone(),
            queue: self.queue.iter().copied().collect(),
            stats: self.stats.clone(),
            thinking: self.thinking,
            boost: BoostView {
                multiplier: self.boost.multiplier,
                active: self.boost.active,
            },
            status: self.status,
            mood: self.mood,
            difficulty: self.difficulty,
            mode: self.mode,
            processing: self.processing,
        }
    }
}
