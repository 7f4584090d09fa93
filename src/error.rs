//! Error types for the public API boundary

use std::fmt;

/// An unrecognised name handed in from outside (piece letter, difficulty, mode)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    what: &'static str,
    input: String,
    expected: &'static str,
}

impl ParseError {
    pub(crate) fn new(what: &'static str, input: &str, expected: &'static str) -> Self {
        Self {
            what,
            input: input.to_string(),
            expected,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown {} '{}' (expected one of: {})",
            self.what, self.input, self.expected
        )
    }
}

impl std::error::Error for ParseError {}

/// Why the controller refused a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// No round has been started yet
    NotStarted,
    Paused,
    GameOver,
    /// The piece queue is at its current capacity
    QueueFull { capacity: usize },
    /// A piece is in flight; the command must wait for the pipeline to finish
    Busy,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::NotStarted => f.write_str("round has not started"),
            Rejection::Paused => f.write_str("round is paused"),
            Rejection::GameOver => f.write_str("round is over"),
            Rejection::QueueFull { capacity } => {
                write!(f, "piece queue is full ({} pending)", capacity)
            }
            Rejection::Busy => f.write_str("a piece is being processed"),
        }
    }
}

impl std::error::Error for Rejection {}
