//! REVTRIS - Reverse Tetris
//!
//! The player chooses which pieces fall; an AI opponent places each one and
//! tries to keep its stack alive.

pub mod ai;
pub mod audio;
pub mod boost;
pub mod controller;
pub mod difficulty;
pub mod error;
pub mod eval;
pub mod game;
pub mod grid;
pub mod movegen;
pub mod piece;
pub mod score;
pub mod settings;
pub mod snapshot;
pub mod tetromino;

pub use controller::Controller;
pub use difficulty::{Difficulty, GameMode};
pub use error::{ParseError, Rejection};
pub use settings::Settings;
pub use snapshot::Snapshot;
pub use tetromino::PieceType;
