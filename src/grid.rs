//! Grid representation, collision detection and stack metrics

use crate::piece::Piece;
use crate::tetromino::{PieceType, Shape};
use std::fmt;

/// Standard board dimensions
pub const GRID_WIDTH: usize = 10;
pub const GRID_HEIGHT: usize = 20;
/// Any block locked into these top rows ends the round
pub const TOP_OUT_ROWS: usize = 3;

/// A cell on the grid - either empty or filled by a piece type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    #[default]
    Empty,
    Filled(PieceType),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn is_filled(&self) -> bool {
        matches!(self, Cell::Filled(_))
    }

    pub fn symbol(&self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Filled(kind) => kind.symbol(),
        }
    }
}

/// The stacked-cell state
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    /// Stored as [row][col], row 0 is the top
    cells: [[Cell; GRID_WIDTH]; GRID_HEIGHT],
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

impl Grid {
    /// Create a new empty grid
    pub fn new() -> Self {
        Self {
            cells: [[Cell::Empty; GRID_WIDTH]; GRID_HEIGHT],
        }
    }

    /// Get the cell at (x, y); None if out of bounds
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        if !Self::in_bounds(x, y) {
            return None;
        }
        Some(self.cells[y as usize][x as usize])
    }

    /// Set a cell; returns false if out of bounds
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) -> bool {
        if !Self::in_bounds(x, y) {
            return false;
        }
        self.cells[y as usize][x as usize] = cell;
        true
    }

    fn in_bounds(x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < GRID_WIDTH && (y as usize) < GRID_HEIGHT
    }

    /// Whether `piece` (optionally with `shape` swapped in) fits at its
    /// origin offset by (dx, dy): every block in bounds and over an empty cell
    pub fn is_valid_position(&self, piece: &Piece, dx: i32, dy: i32, shape: Option<&Shape>) -> bool {
        let shape = shape.unwrap_or(&piece.shape);
        self.fits(shape, piece.x + dx, piece.y + dy)
    }

    /// Whether `shape` fits with its top-left corner at (x, y)
    pub fn fits(&self, shape: &Shape, x: i32, y: i32) -> bool {
        shape
            .cells()
            .all(|(dx, dy)| self.get(x + dx, y + dy).is_some_and(|cell| cell.is_empty()))
    }

    /// Whether every block of the piece lies within the grid's columns,
    /// ignoring rows and occupancy
    pub fn within_columns(&self, piece: &Piece) -> bool {
        piece
            .block_positions()
            .all(|(x, _)| x >= 0 && (x as usize) < GRID_WIDTH)
    }

    /// Lock a piece onto the grid; blocks outside the grid are skipped
    pub fn place(&mut self, piece: &Piece) {
        for (x, y) in piece.block_positions() {
            self.set(x, y, Cell::Filled(piece.kind));
        }
    }

    /// Indices of completely filled rows, top to bottom
    pub fn completed_lines(&self) -> Vec<usize> {
        (0..GRID_HEIGHT)
            .filter(|&row| self.is_line_full(row))
            .collect()
    }

    /// Remove `rows` (any order, duplicates ignored) and fill the top with
    /// as many empty rows; remaining rows keep their relative order
    pub fn clear_lines(&mut self, rows: &[usize]) {
        let mut removed = [false; GRID_HEIGHT];
        for &row in rows {
            if row < GRID_HEIGHT {
                removed[row] = true;
            }
        }

        // Compact surviving rows toward the bottom
        let mut write_row = GRID_HEIGHT;
        for read_row in (0..GRID_HEIGHT).rev() {
            if removed[read_row] {
                continue;
            }
            write_row -= 1;
            if write_row != read_row {
                self.cells[write_row] = self.cells[read_row];
            }
        }

        // Fill the top with empty rows
        for row in 0..write_row {
            self.cells[row] = [Cell::Empty; GRID_WIDTH];
        }
    }

    fn is_line_full(&self, row: usize) -> bool {
        self.cells[row].iter().all(|cell| cell.is_filled())
    }

    /// Surface height of each column, 0 for an empty column
    pub fn column_heights(&self) -> [usize; GRID_WIDTH] {
        let mut heights = [0; GRID_WIDTH];
        for (col, height) in heights.iter_mut().enumerate() {
            if let Some(top) = (0..GRID_HEIGHT).find(|&row| self.cells[row][col].is_filled()) {
                *height = GRID_HEIGHT - top;
            }
        }
        heights
    }

    /// Distance from the topmost occupied row to the bottom
    pub fn height(&self) -> usize {
        self.cells
            .iter()
            .position(|row| row.iter().any(|cell| cell.is_filled()))
            .map_or(0, |top| GRID_HEIGHT - top)
    }

    /// Empty cells with at least one occupied cell above them in the same column
    pub fn holes(&self) -> usize {
        let mut holes = 0;
        for col in 0..GRID_WIDTH {
            let mut block_found = false;
            for row in 0..GRID_HEIGHT {
                if self.cells[row][col].is_filled() {
                    block_found = true;
                } else if block_found {
                    holes += 1;
                }
            }
        }
        holes
    }

    /// Sum of absolute height differences between adjacent columns
    pub fn bumpiness(&self) -> usize {
        self.column_heights()
            .windows(2)
            .map(|pair| pair[0].abs_diff(pair[1]))
            .sum()
    }

    /// Whether any block sits in the top rows
    pub fn is_top_out(&self) -> bool {
        self.cells[..TOP_OUT_ROWS]
            .iter()
            .any(|row| row.iter().any(|cell| cell.is_filled()))
    }

    pub fn is_empty(&self) -> bool {
        self.cells
            .iter()
            .all(|row| row.iter().all(|cell| cell.is_empty()))
    }

    /// Rows top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Cell; GRID_WIDTH]> {
        self.cells.iter()
    }

    /// One symbol per cell, rows joined by '|'
    pub fn serialize(&self) -> String {
        let mut out = String::with_capacity(GRID_HEIGHT * (GRID_WIDTH + 1));
        for (i, row) in self.cells.iter().enumerate() {
            if i > 0 {
                out.push('|');
            }
            out.extend(row.iter().map(Cell::symbol));
        }
        out
    }

    /// Build a grid from text rows aligned to the bottom; '.' is empty,
    /// a piece letter fills the cell
    #[cfg(test)]
    pub(crate) fn from_rows(rows: &[&str]) -> Self {
        let mut grid = Self::new();
        let offset = GRID_HEIGHT - rows.len();
        for (i, line) in rows.iter().enumerate() {
            for (x, ch) in line.chars().enumerate() {
                if let Ok(kind) = PieceType::try_from(ch) {
                    grid.set(x as i32, (offset + i) as i32, Cell::Filled(kind));
                }
            }
        }
        grid
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.cells {
            let line: String = row.iter().map(Cell::symbol).collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
