//! The AI opponent: picks where each incoming piece goes
//!
//! A decision enumerates every resting placement, scores each one against
//! the active difficulty profile and keeps the best. Decisions are cached
//! per (grid, piece, difficulty). Every decision, cached or not, waits out a
//! short "thinking" delay scaled down by the speed multiplier so the
//! opponent keeps a readable pace.

use crate::difficulty::{Difficulty, Profile};
use crate::eval::{evaluate, perturb};
use crate::grid::Grid;
use crate::movegen::{enumerate, Move};
use crate::piece::Piece;
use crate::settings::AiSettings;
use crate::tetromino::PieceType;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Bounded map from decision key to best move; flushed entirely when full
#[derive(Debug, Clone)]
pub struct MoveCache {
    entries: HashMap<String, Option<Move>>,
    capacity: usize,
}

impl MoveCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Option<Move>> {
        self.entries.get(key)
    }

    /// Insert, evicting every entry first if the cache is full
    pub fn insert(&mut self, key: String, best: Option<Move>) {
        if self.entries.len() >= self.capacity && !self.entries.contains_key(&key) {
            self.entries.clear();
        }
        self.entries.insert(key, best);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Outcome of one decision
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    /// None when the piece has no legal resting place
    pub best: Option<Move>,
    /// How long the engine "thought" before answering
    pub think_time: Duration,
    pub cache_hit: bool,
}

/// Search engine plus its move cache and randomness source
pub struct AiEngine {
    settings: AiSettings,
    cache: MoveCache,
    /// Difficulty the cache entries were computed under
    cached_for: Option<Difficulty>,
    rng: ChaCha8Rng,
}

impl AiEngine {
    pub fn new(settings: &AiSettings) -> Self {
        let seed = settings.seed.unwrap_or_else(rand::random::<u64>);
        Self {
            settings: settings.clone(),
            cache: MoveCache::new(settings.cache_capacity),
            cached_for: None,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn cache(&self) -> &MoveCache {
        &self.cache
    }

    pub fn cache_key(grid: &Grid, kind: PieceType, profile: &Profile) -> String {
        format!("{}-{}-{}", kind.symbol(), grid.serialize(), profile.name())
    }

    /// Delay before a fresh search
    pub fn think_time(&self, profile: &Profile, multiplier: f64) -> Duration {
        let scale = self.settings.think_fraction / multiplier.max(1.0);
        scaled(profile.thinking_time, scale).max(self.settings.min_think())
    }

    /// Delay before answering from the cache; never longer than `think_time`
    pub fn cache_hit_time(&self, profile: &Profile, multiplier: f64) -> Duration {
        let scale = self.settings.think_fraction * self.settings.cache_hit_fraction.min(1.0)
            / multiplier.max(1.0);
        scaled(profile.thinking_time, scale).max(self.settings.min_think())
    }

    /// Best placement for `kind` on `grid`, with its (possibly perturbed)
    /// score; the first candidate wins exact ties
    pub fn search(&mut self, grid: &Grid, kind: PieceType, profile: &Profile) -> Option<(Move, f64)> {
        let mut best: Option<(Move, f64)> = None;

        for mv in enumerate(grid, &Piece::new(kind)) {
            let score = perturb(evaluate(grid, &mv, profile), profile.randomness, &mut self.rng);
            if best.as_ref().is_none_or(|(_, top)| score > *top) {
                best = Some((mv, score));
            }
        }

        best
    }

    /// Decide where `kind` goes, pausing to "think" first
    pub async fn select_move(
        &mut self,
        grid: &Grid,
        kind: PieceType,
        profile: &Profile,
        multiplier: f64,
    ) -> Decision {
        if self.cached_for != Some(profile.difficulty) {
            self.cache.clear();
            self.cached_for = Some(profile.difficulty);
        }

        let key = Self::cache_key(grid, kind, profile);
        if let Some(best) = self.cache.get(&key).cloned() {
            let think_time = self.cache_hit_time(profile, multiplier);
            tokio::time::sleep(think_time).await;
            debug!(piece = %kind, ?think_time, "AI answered from cache");
            return Decision {
                best,
                think_time,
                cache_hit: true,
            };
        }

        let think_time = self.think_time(profile, multiplier);
        tokio::time::sleep(think_time).await;

        let found = self.search(grid, kind, profile);
        match &found {
            Some((mv, score)) => debug!(
                piece = %kind,
                x = mv.x,
                y = mv.y,
                rotation = mv.rotation.index(),
                score,
                ?think_time,
                "AI chose placement"
            ),
            None => debug!(piece = %kind, "AI found no legal placement"),
        }

        let best = found.map(|(mv, _)| mv);
        self.cache.insert(key, best.clone());

        Decision {
            best,
            think_time,
            cache_hit: false,
        }
    }
}

/// `duration * factor`, rounded to the microsecond
fn scaled(duration: Duration, factor: f64) -> Duration {
    Duration::from_micros((duration.as_micros() as f64 * factor).round() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GRID_HEIGHT;
    use crate::tetromino::Rotation;
    use tokio::time::Instant;

    fn engine() -> AiEngine {
        AiEngine::new(&AiSettings {
            seed: Some(1),
            ..AiSettings::default()
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_grid_o_goes_bottom_left() {
        let mut ai = engine();
        let profile = Difficulty::Hard.profile();
        let decision = ai.select_move(&Grid::new(), PieceType::O, &profile, 1.0).await;
        let best = decision.best.unwrap();
        assert_eq!((best.x, best.y, best.rotation), (0, 18, Rotation::North));
        assert!(!decision.cache_hit);
    }

    #[test]
    fn test_deterministic_without_randomness() {
        let grid = Grid::from_rows(&[
            "..T.......", //
            "TTT...OO.I",
            "ZZ.S..OO.I",
        ]);
        let profile = Difficulty::Hard.profile();
        for kind in PieceType::all() {
            let first = engine().search(&grid, kind, &profile);
            for seed in 2..6 {
                let mut other = AiEngine::new(&AiSettings {
                    seed: Some(seed),
                    ..AiSettings::default()
                });
                assert_eq!(other.search(&grid, kind, &profile), first);
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_hit_returns_same_move_faster() {
        let mut ai = engine();
        let grid = Grid::from_rows(&["IIII..IIII"]);
        let profile = Difficulty::Normal.profile();

        let start = Instant::now();
        let first = ai.select_move(&grid, PieceType::O, &profile, 1.0).await;
        let first_elapsed = start.elapsed();

        let start = Instant::now();
        let second = ai.select_move(&grid, PieceType::O, &profile, 1.0).await;
        let second_elapsed = start.elapsed();

        assert!(second.cache_hit);
        assert_eq!(second.best, first.best);
        assert!(second.think_time <= first.think_time);
        assert!(second_elapsed <= first_elapsed);
        assert_eq!(first_elapsed, Duration::from_millis(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_speed_multiplier_shortens_thinking() {
        let mut ai = engine();
        let profile = Difficulty::Easy.profile();
        let slow = ai.think_time(&profile, 1.0);
        let fast = ai.think_time(&profile, 3.0);
        assert_eq!(slow, Duration::from_millis(90));
        assert_eq!(fast, Duration::from_millis(30));
        assert_eq!(ai.think_time(&profile, 100.0), Duration::from_millis(10));

        let start = Instant::now();
        ai.select_move(&Grid::new(), PieceType::T, &profile, 3.0).await;
        assert_eq!(start.elapsed(), fast);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_legal_move() {
        let rows = vec!["LLLLLLLLL."; GRID_HEIGHT];
        let grid = Grid::from_rows(&rows);
        let mut ai = engine();
        let decision = ai
            .select_move(&grid, PieceType::T, &Difficulty::Normal.profile(), 1.0)
            .await;
        assert!(decision.best.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_difficulty_change_flushes_cache() {
        let mut ai = engine();
        let grid = Grid::new();
        ai.select_move(&grid, PieceType::S, &Difficulty::Hard.profile(), 1.0).await;
        assert_eq!(ai.cache().len(), 1);

        let decision = ai
            .select_move(&grid, PieceType::S, &Difficulty::Easy.profile(), 1.0)
            .await;
        assert!(!decision.cache_hit);
        assert_eq!(ai.cache().len(), 1);
    }

    #[test]
    fn test_cache_flushes_when_full() {
        let mut cache = MoveCache::new(2);
        cache.insert("a".into(), None);
        cache.insert("b".into(), None);
        cache.insert("b".into(), None);
        assert_eq!(cache.len(), 2);
        cache.insert("c".into(), None);
        assert_eq!(cache.len(), 1);
        assert!(cache.get("c").is_some());
        assert!(cache.get("a").is_none());
    }

    #[test]
    fn test_cache_key_depends_on_inputs() {
        let grid = Grid::new();
        let hard = Difficulty::Hard.profile();
        let key = AiEngine::cache_key(&grid, PieceType::T, &hard);
        assert_ne!(key, AiEngine::cache_key(&grid, PieceType::L, &hard));
        assert_ne!(key, AiEngine::cache_key(&grid, PieceType::T, &Difficulty::Easy.profile()));
        let busy = Grid::from_rows(&["T........."]);
        assert_ne!(key, AiEngine::cache_key(&busy, PieceType::T, &hard));
    }
}
