//! Everything the rendering layer needs to draw one frame

use crate::difficulty::{Difficulty, GameMode};
use crate::game::{Mood, RoundStatus};
use crate::grid::{Grid, GRID_WIDTH};
use crate::piece::Piece;
use crate::score::Stats;
use crate::tetromino::PieceType;
use serde::Serialize;
use std::fmt::Write;

/// The piece currently descending
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivePiece {
    pub kind: PieceType,
    pub x: i32,
    pub y: i32,
    /// Rotation index 0-3
    pub rotation: usize,
    /// Absolute (x, y) of each block
    pub cells: Vec<(i32, i32)>,
}

impl From<&Piece> for ActivePiece {
    fn from(piece: &Piece) -> Self {
        Self {
            kind: piece.kind,
            x: piece.x,
            y: piece.y,
            rotation: piece.rotation.index(),
            cells: piece.block_positions().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoostView {
    pub multiplier: f64,
    pub active: bool,
}

/// Observable state of a round
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    /// Rows top to bottom, one symbol per cell ('.' is empty)
    pub grid: Vec<String>,
    pub active_piece: Option<ActivePiece>,
    /// Completed rows shown before they are removed
    pub highlighted_lines: Vec<usize>,
    /// Pending pieces, next first
    pub queue: Vec<PieceType>,
    pub stats: Stats,
    pub thinking: bool,
    pub boost: BoostView,
    pub status: RoundStatus,
    pub mood: Mood,
    pub difficulty: Difficulty,
    pub mode: GameMode,
    /// A piece is somewhere in the AI, animation or clear pipeline
    pub processing: bool,
}

impl Snapshot {
    pub(crate) fn grid_rows(grid: &Grid) -> Vec<String> {
        grid.rows()
            .map(|row| row.iter().map(|cell| cell.symbol()).collect())
            .collect()
    }

    /// Nothing left to do until new input arrives
    pub fn is_settled(&self) -> bool {
        !self.processing && (self.queue.is_empty() || self.status != RoundStatus::Playing)
    }

    /// Plain-text frame: the grid with the active piece drawn in lowercase
    /// and highlighted rows marked
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let border = "-".repeat(GRID_WIDTH);
        let _ = writeln!(out, "+{}+", border);
        for (y, row) in self.grid.iter().enumerate() {
            let mut line: Vec<char> = row.chars().collect();
            if let Some(piece) = &self.active_piece {
                for &(px, py) in &piece.cells {
                    if py == y as i32 && px >= 0 && (px as usize) < line.len() {
                        line[px as usize] = piece.kind.symbol().to_ascii_lowercase();
                    }
                }
            }
            let marker = if self.highlighted_lines.contains(&y) { '<' } else { ' ' };
            let _ = writeln!(out, "|{}|{}", line.into_iter().collect::<String>(), marker);
        }
        let _ = writeln!(out, "+{}+", border);
        let _ = writeln!(
            out,
            "score {}  lines {}  pieces {}  [{} {}]  {:?}",
            self.stats.score,
            self.stats.lines_cleared,
            self.stats.pieces_sent,
            self.mode,
            self.difficulty,
            self.status
        );
        out
    }
}
