//! Tetromino definitions and shapes
//!
//! All 7 standard tetrominoes as bounded boolean matrices. Row 0 of a
//! matrix is its top row. Rotating turns the spawn matrix clockwise.

use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest extent of any tetromino matrix in either direction
pub const MAX_SHAPE: usize = 4;

/// The 7 tetromino types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PieceType {
    I, // long bar
    O, // square
    T,
    S,
    Z,
    J,
    L,
}

impl PieceType {
    /// Get all tetromino types, in display order
    pub fn all() -> [PieceType; 7] {
        [
            PieceType::I,
            PieceType::O,
            PieceType::T,
            PieceType::S,
            PieceType::Z,
            PieceType::J,
            PieceType::L,
        ]
    }

    /// Stable index into per-type tables
    pub fn index(&self) -> usize {
        match self {
            PieceType::I => 0,
            PieceType::O => 1,
            PieceType::T => 2,
            PieceType::S => 3,
            PieceType::Z => 4,
            PieceType::J => 5,
            PieceType::L => 6,
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            PieceType::I => 'I',
            PieceType::O => 'O',
            PieceType::T => 'T',
            PieceType::S => 'S',
            PieceType::Z => 'Z',
            PieceType::J => 'J',
            PieceType::L => 'L',
        }
    }

    /// The shape matrix in rotation state 0
    pub fn spawn_shape(&self) -> Shape {
        match self {
            PieceType::I => Shape::from_rows(&["####"]),
            PieceType::O => Shape::from_rows(&["##", "##"]),
            PieceType::T => Shape::from_rows(&[".#.", "###"]),
            PieceType::S => Shape::from_rows(&[".##", "##."]),
            PieceType::Z => Shape::from_rows(&["##.", ".##"]),
            PieceType::J => Shape::from_rows(&["#..", "###"]),
            PieceType::L => Shape::from_rows(&["..#", "###"]),
        }
    }

    /// The shape matrix after `rotation` clockwise turns of the spawn shape
    pub fn shape(&self, rotation: Rotation) -> Shape {
        let mut shape = self.spawn_shape();
        for _ in 0..rotation.index() {
            shape = shape.rotated_cw();
        }
        shape
    }
}

impl fmt::Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for PieceType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "I" => Ok(PieceType::I),
            "O" => Ok(PieceType::O),
            "T" => Ok(PieceType::T),
            "S" => Ok(PieceType::S),
            "Z" => Ok(PieceType::Z),
            "J" => Ok(PieceType::J),
            "L" => Ok(PieceType::L),
            _ => Err(ParseError::new("piece type", s, "I, O, T, S, Z, J, L")),
        }
    }
}

impl TryFrom<char> for PieceType {
    type Error = ParseError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        let mut buf = [0u8; 4];
        c.encode_utf8(&mut buf).parse()
    }
}

/// A tetromino matrix bounded by `MAX_SHAPE` x `MAX_SHAPE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    rows: usize,
    cols: usize,
    filled: [[bool; MAX_SHAPE]; MAX_SHAPE],
}

impl Shape {
    /// Build from text rows, `#` marking an occupied cell
    fn from_rows(rows: &[&str]) -> Self {
        let mut filled = [[false; MAX_SHAPE]; MAX_SHAPE];
        let mut cols = 0;
        for (r, line) in rows.iter().enumerate() {
            cols = cols.max(line.len());
            for (c, ch) in line.chars().enumerate() {
                filled[r][c] = ch == '#';
            }
        }
        Self {
            rows: rows.len(),
            cols,
            filled,
        }
    }

    pub fn width(&self) -> i32 {
        self.cols as i32
    }

    pub fn height(&self) -> i32 {
        self.rows as i32
    }

    pub fn is_filled(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols && self.filled[row][col]
    }

    /// Occupied cells as (dx, dy) offsets from the matrix's top-left corner
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        (0..self.rows).flat_map(move |r| {
            (0..self.cols)
                .filter(move |&c| self.filled[r][c])
                .map(move |c| (c as i32, r as i32))
        })
    }

    /// Turn the matrix 90 degrees clockwise
    pub fn rotated_cw(&self) -> Shape {
        let mut filled = [[false; MAX_SHAPE]; MAX_SHAPE];
        for r in 0..self.rows {
            for c in 0..self.cols {
                filled[c][self.rows - 1 - r] = self.filled[r][c];
            }
        }
        Shape {
            rows: self.cols,
            cols: self.rows,
            filled,
        }
    }
}

/// Rotation states, indexed 0-3 by clockwise turns from spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    North, // Spawn state
    East,  // Clockwise from North
    South, // 180 from North
    West,  // Counter-clockwise from North
}

impl Rotation {
    pub const ALL: [Rotation; 4] = [
        Rotation::North,
        Rotation::East,
        Rotation::South,
        Rotation::West,
    ];

    pub fn index(&self) -> usize {
        match self {
            Rotation::North => 0,
            Rotation::East => 1,
            Rotation::South => 2,
            Rotation::West => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_shape_has_four_cells() {
        for kind in PieceType::all() {
            for rotation in Rotation::ALL {
                assert_eq!(kind.shape(rotation).cells().count(), 4, "{kind} {rotation:?}");
            }
        }
    }

    #[test]
    fn test_i_piece_turns_vertical() {
        let shape = PieceType::I.shape(Rotation::East);
        assert_eq!((shape.width(), shape.height()), (1, 4));
    }

    #[test]
    fn test_four_turns_is_identity() {
        for kind in PieceType::all() {
            let spawn = kind.spawn_shape();
            let mut shape = spawn;
            for _ in 0..4 {
                shape = shape.rotated_cw();
            }
            assert_eq!(shape, spawn);
        }
    }

    #[test]
    fn test_t_rotates_clockwise() {
        // .#.      #.
        // ###  ->  ##
        //          #.
        let shape = PieceType::T.shape(Rotation::East);
        assert!(shape.is_filled(0, 0));
        assert!(shape.is_filled(1, 0));
        assert!(shape.is_filled(1, 1));
        assert!(shape.is_filled(2, 0));
        assert!(!shape.is_filled(0, 1));
    }

    #[test]
    fn test_shapes_are_tight() {
        // Every row and column of every rotation holds at least one cell
        for kind in PieceType::all() {
            for rotation in Rotation::ALL {
                let shape = kind.shape(rotation);
                for r in 0..shape.height() as usize {
                    assert!((0..shape.width() as usize).any(|c| shape.is_filled(r, c)));
                }
                for c in 0..shape.width() as usize {
                    assert!((0..shape.height() as usize).any(|r| shape.is_filled(r, c)));
                }
            }
        }
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert_eq!("t".parse::<PieceType>(), Ok(PieceType::T));
        assert_eq!(PieceType::try_from('L'), Ok(PieceType::L));
        assert!("X".parse::<PieceType>().is_err());
        assert!("".parse::<PieceType>().is_err());
    }

    #[test]
    fn test_rotation_indices() {
        for (i, rotation) in Rotation::ALL.iter().enumerate() {
            assert_eq!(rotation.index(), i);
        }
    }
}
