//! Round statistics and scoring rules for both game modes

use crate::difficulty::{Difficulty, GameMode};
use crate::tetromino::PieceType;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Classic: points per processed piece
pub const PIECE_PLACED: i64 = 10;
/// Classic: points per cleared line
pub const LINE_CLEARED: i64 = 100;
/// Classic: extra points per line beyond the first in one clear
pub const MULTIPLE_LINES_BONUS: i64 = 50;
/// Points for ending the round
pub const GAME_CLEAR: i64 = 1000;
/// Countdown: cost of each piece sent
pub const COUNTDOWN_PIECE_COST: i64 = 10;
/// Countdown: penalty per line the AI clears
pub const COUNTDOWN_LINE_PENALTY: i64 = 50;
/// Countdown: extra penalty per line beyond the first in one clear
pub const COUNTDOWN_MULTI_PENALTY: i64 = 25;

/// How many pieces of each type were sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PieceCounts([u32; 7]);

impl PieceCounts {
    pub fn get(&self, kind: PieceType) -> u32 {
        self.0[kind.index()]
    }

    fn increment(&mut self, kind: PieceType) {
        self.0[kind.index()] += 1;
    }

    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }
}

/// Serialized as a map keyed by piece letter, in display order
impl Serialize for PieceCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(7))?;
        for kind in PieceType::all() {
            map.serialize_entry(&kind, &self.get(kind))?;
        }
        map.end()
    }
}

/// Score and counters for one round
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stats {
    /// May go negative in Countdown mode
    pub score: i64,
    pub lines_cleared: u32,
    pub pieces_sent: u32,
    pub piece_counts: PieceCounts,
    #[serde(skip)]
    mode: GameMode,
}

impl Stats {
    pub fn new(mode: GameMode, difficulty: Difficulty) -> Self {
        Self {
            score: mode.starting_score(difficulty),
            lines_cleared: 0,
            pieces_sent: 0,
            piece_counts: PieceCounts::default(),
            mode,
        }
    }

    /// Count a piece taken off the queue and charge or pay for it
    pub fn record_piece(&mut self, kind: PieceType) {
        self.pieces_sent += 1;
        self.piece_counts.increment(kind);
        match self.mode {
            GameMode::Classic => self.score += PIECE_PLACED,
            GameMode::Countdown => self.score -= COUNTDOWN_PIECE_COST,
        }
    }

    /// Score a clear of `lines` rows; `boost` is the multiplier while
    /// speed boost is active. Returns the clear's name for display
    pub fn record_clear(&mut self, lines: usize, boost: Option<f64>) -> &'static str {
        if lines == 0 {
            return "";
        }
        let n = lines as i64;
        self.lines_cleared += lines as u32;

        match self.mode {
            GameMode::Classic => {
                self.score += n * LINE_CLEARED;
                self.score += (n - 1) * MULTIPLE_LINES_BONUS;
                if let Some(multiplier) = boost {
                    self.score += (n as f64 * 10.0 * multiplier).floor() as i64;
                }
            }
            GameMode::Countdown => {
                self.score -= n * COUNTDOWN_LINE_PENALTY;
                self.score -= (n - 1) * COUNTDOWN_MULTI_PENALTY;
            }
        }

        match lines {
            1 => "Single",
            2 => "Double",
            3 => "Triple",
            _ => "Tetris",
        }
    }

    /// Bonus for ending the round, larger while boosted
    pub fn record_game_over(&mut self, boost: Option<f64>) {
        self.score += GAME_CLEAR;
        if let Some(multiplier) = boost {
            self.score += (500.0 * multiplier).floor() as i64;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classic_piece_and_clear() {
        let mut stats = Stats::new(GameMode::Classic, Difficulty::Normal);
        stats.record_piece(PieceType::T);
        assert_eq!(stats.score, 10);
        assert_eq!(stats.record_clear(1, None), "Single");
        assert_eq!(stats.score, 110);
        assert_eq!(stats.lines_cleared, 1);
    }

    #[test]
    fn test_classic_multi_line_bonus() {
        let mut stats = Stats::new(GameMode::Classic, Difficulty::Easy);
        assert_eq!(stats.record_clear(4, None), "Tetris");
        // 4 * 100 + 3 * 50
        assert_eq!(stats.score, 550);
    }

    #[test]
    fn test_classic_boost_bonus() {
        let mut stats = Stats::new(GameMode::Classic, Difficulty::Easy);
        stats.record_clear(2, Some(2.5));
        // 200 + 50 + floor(2 * 10 * 2.5)
        assert_eq!(stats.score, 300);
        stats.record_game_over(Some(1.5));
        assert_eq!(stats.score, 300 + 1000 + 750);
    }

    #[test]
    fn test_countdown_drains() {
        let mut stats = Stats::new(GameMode::Countdown, Difficulty::Hard);
        assert_eq!(stats.score, 1000);
        stats.record_piece(PieceType::I);
        assert_eq!(stats.score, 990);
        stats.record_clear(3, Some(3.0));
        // 3 * 50 + 2 * 25, no boost bonus
        assert_eq!(stats.score, 790);
    }

    #[test]
    fn test_piece_counts() {
        let mut stats = Stats::new(GameMode::Classic, Difficulty::Easy);
        for kind in [PieceType::S, PieceType::S, PieceType::L] {
            stats.record_piece(kind);
        }
        assert_eq!(stats.piece_counts.get(PieceType::S), 2);
        assert_eq!(stats.piece_counts.get(PieceType::I), 0);
        assert_eq!(stats.piece_counts.total(), stats.pieces_sent);
    }
}
