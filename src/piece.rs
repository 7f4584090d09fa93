//! A tetromino instance with its placement state

use crate::grid::{Grid, GRID_WIDTH};
use crate::tetromino::{PieceType, Rotation, Shape};

/// A piece being tested or animated
///
/// `x`/`y` locate the top-left corner of the shape matrix on the grid;
/// row 0 is the top of the grid and y grows downward.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Piece {
    /// The type of tetromino
    pub kind: PieceType,
    /// Current rotation state
    pub rotation: Rotation,
    pub x: i32,
    pub y: i32,
    /// Matrix for the current rotation
    pub shape: Shape,
}

impl Piece {
    /// Create a new piece at spawn position: top row, horizontally centred
    pub fn new(kind: PieceType) -> Self {
        let shape = kind.spawn_shape();
        Self {
            kind,
            rotation: Rotation::North,
            x: (GRID_WIDTH as i32 - shape.width()) / 2,
            y: 0,
            shape,
        }
    }

    /// Create a piece at an explicit placement
    pub fn at(kind: PieceType, rotation: Rotation, x: i32, y: i32) -> Self {
        Self {
            kind,
            rotation,
            x,
            y,
            shape: kind.shape(rotation),
        }
    }

    /// A copy of this piece turned to `rotation`, keeping its origin
    pub fn with_rotation(&self, rotation: Rotation) -> Self {
        Self {
            rotation,
            shape: self.kind.shape(rotation),
            ..self.clone()
        }
    }

    /// Absolute (x, y) grid coordinates of all 4 blocks
    pub fn block_positions(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.shape
            .cells()
            .map(move |(dx, dy)| (self.x + dx, self.y + dy))
    }

    /// Try to move down, returns true if successful
    pub fn move_down(&mut self, grid: &Grid) -> bool {
        if grid.is_valid_position(self, 0, 1, None) {
            self.y += 1;
            true
        } else {
            false
        }
    }

    /// Hard drop - move down as far as possible and return distance dropped
    pub fn hard_drop(&mut self, grid: &Grid) -> i32 {
        let mut distance = 0;
        while self.move_down(grid) {
            distance += 1;
        }
        distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GRID_HEIGHT;

    #[test]
    fn test_spawn_position() {
        let piece = Piece::new(PieceType::T);
        // 3 wide, centred on a 10 wide grid
        assert_eq!(piece.x, 3);
        assert_eq!(piece.y, 0);
        assert_eq!(Piece::new(PieceType::I).x, 3);
        assert_eq!(Piece::new(PieceType::O).x, 4);
    }

    #[test]
    fn test_block_positions() {
        let piece = Piece::at(PieceType::O, Rotation::North, 2, 5);
        let mut positions: Vec<_> = piece.block_positions().collect();
        positions.sort();
        assert_eq!(positions, vec![(2, 5), (2, 6), (3, 5), (3, 6)]);
    }

    #[test]
    fn test_with_rotation_keeps_original() {
        let piece = Piece::new(PieceType::I);
        let turned = piece.with_rotation(Rotation::East);
        assert_eq!(piece.shape.width(), 4);
        assert_eq!(turned.shape.width(), 1);
        assert_eq!(turned.x, piece.x);
    }

    #[test]
    fn test_hard_drop() {
        let grid = Grid::new();
        let mut piece = Piece::new(PieceType::I);
        let distance = piece.hard_drop(&grid);
        assert_eq!(distance, GRID_HEIGHT as i32 - 1);
        assert_eq!(piece.y, GRID_HEIGHT as i32 - 1);
    }

    #[test]
    fn test_move_down_blocked() {
        let mut grid = Grid::new();
        grid.place(&Piece::at(PieceType::O, Rotation::North, 4, 2));
        let mut piece = Piece::new(PieceType::O);
        assert!(!piece.move_down(&grid));
        assert_eq!(piece.y, 0);
    }
}
