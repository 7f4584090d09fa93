//! Move generation: every resting placement of a piece reachable by
//! rotating, sliding and dropping it from the top of the grid

use crate::grid::{Grid, GRID_WIDTH};
use crate::piece::Piece;
use crate::tetromino::Rotation;
use std::collections::HashSet;

/// Columns scanned beyond each wall
pub const SCAN_MARGIN: i32 = 2;

/// One fully resolved resting placement
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Move {
    /// The piece at its resting position
    pub piece: Piece,
    pub x: i32,
    pub y: i32,
    pub rotation: Rotation,
}

impl Move {
    fn new(piece: Piece) -> Self {
        Self {
            x: piece.x,
            y: piece.y,
            rotation: piece.rotation,
            piece,
        }
    }
}

/// All legal resting placements of `piece`, in scan order: rotation state
/// first, then x from left to right
///
/// Each candidate spawns at y = 0; a candidate that does not fit there is
/// blocked at the top of the stack and yields no placement.
pub fn enumerate(grid: &Grid, piece: &Piece) -> Vec<Move> {
    let mut moves = Vec::new();
    let mut seen = HashSet::new();

    for rotation in Rotation::ALL {
        let rotated = piece.with_rotation(rotation);

        for x in -SCAN_MARGIN..GRID_WIDTH as i32 + SCAN_MARGIN {
            let mut test = rotated.clone();
            test.x = x;
            test.y = 0;

            if !grid.within_columns(&test) {
                continue;
            }
            if !grid.is_valid_position(&test, 0, 0, None) {
                continue;
            }

            test.hard_drop(grid);

            if test.y >= 0 && seen.insert((test.x, test.y, rotation)) {
                moves.push(Move::new(test));
            }
        }
    }

    moves
}
