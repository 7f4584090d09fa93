//! Placement scoring: a weighted sum of stack metrics after the move

use crate::difficulty::Profile;
use crate::grid::Grid;
use crate::movegen::Move;
use rand::Rng;

/// Stack metrics measured on the grid right after a placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Features {
    pub completed_lines: usize,
    pub height: usize,
    pub holes: usize,
    pub bumpiness: usize,
}

impl Features {
    /// Place `mv` on a scratch copy of `grid` and measure it
    pub fn after(grid: &Grid, mv: &Move) -> Self {
        let mut scratch = grid.clone();
        scratch.place(&mv.piece);
        Self {
            completed_lines: scratch.completed_lines().len(),
            height: scratch.height(),
            holes: scratch.holes(),
            bumpiness: scratch.bumpiness(),
        }
    }

    pub fn score(&self, profile: &Profile) -> f64 {
        profile.height_weight * self.height as f64
            + profile.lines_weight * self.completed_lines as f64
            + profile.holes_weight * self.holes as f64
            + profile.bumpiness_weight * self.bumpiness as f64
    }
}

/// Unperturbed score of a move; higher is better
pub fn evaluate(grid: &Grid, mv: &Move, profile: &Profile) -> f64 {
    Features::after(grid, mv).score(profile)
}

/// Scale `score` by a random factor in [1 - r/2, 1 + r/2)
pub fn perturb<R: Rng + ?Sized>(score: f64, randomness: f64, rng: &mut R) -> f64 {
    if randomness == 0.0 {
        return score;
    }
    let draw: f64 = rng.gen_range(0.0..1.0);
    score * (1.0 + (draw - 0.5) * randomness)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::difficulty::Difficulty;
    use crate::movegen::enumerate;
    use crate::piece::Piece;
    use crate::tetromino::PieceType;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_flat_o_placement() {
        let grid = Grid::new();
        let moves = enumerate(&grid, &Piece::new(PieceType::O));
        let features = Features::after(&grid, &moves[0]);
        assert_eq!(
            features,
            Features {
                completed_lines: 0,
                height: 2,
                holes: 0,
                bumpiness: 2,
            }
        );
        let hard = Difficulty::Hard.profile();
        assert!((evaluate(&grid, &moves[0], &hard) - (-0.8 * 2.0 - 0.5 * 2.0)).abs() < 1e-9);
    }

    #[test]
    fn test_evaluation_leaves_grid_untouched() {
        let grid = Grid::from_rows(&["IIII.IIIII"]);
        let before = grid.clone();
        for mv in enumerate(&grid, &Piece::new(PieceType::T)) {
            evaluate(&grid, &mv, &Difficulty::Normal.profile());
        }
        assert_eq!(grid, before);
    }

    #[test]
    fn test_line_clear_scores_higher() {
        let grid = Grid::from_rows(&[
            "..LLLLLLLL", //
            "..JJJJJJJJ",
        ]);
        let profile = Difficulty::Hard.profile();
        let moves = enumerate(&grid, &Piece::new(PieceType::O));
        let best = moves
            .iter()
            .max_by(|a, b| {
                evaluate(&grid, a, &profile).total_cmp(&evaluate(&grid, b, &profile))
            })
            .unwrap();
        assert_eq!(Features::after(&grid, best).completed_lines, 2);
        assert_eq!((best.x, best.y), (0, 18));
    }

    #[test]
    fn test_zero_randomness_is_identity() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert_eq!(perturb(-3.5, 0.0, &mut rng), -3.5);
    }

    #[test]
    fn test_perturbation_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..200 {
            let s = perturb(10.0, 0.2, &mut rng);
            assert!((9.0..11.0).contains(&s), "{s}");
        }
    }
}
