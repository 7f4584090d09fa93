//! Speed boost: rapid submissions raise a throughput multiplier that
//! shortens thinking and animation and widens the queue

use crate::settings::PacingSettings;
use tokio::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct SpeedBoost {
    pub active: bool,
    /// Current multiplier, in [1.0, max_multiplier]
    pub multiplier: f64,
    last_input: Option<Instant>,
    input_count: u32,
    max_multiplier: f64,
    multiplier_step: f64,
    decay_rate: f64,
    idle_decay: f64,
    boost_threshold: Duration,
    relax_window: Duration,
    idle_window: Duration,
}

impl SpeedBoost {
    pub fn new(pacing: &PacingSettings) -> Self {
        Self {
            active: false,
            multiplier: 1.0,
            last_input: None,
            input_count: 0,
            max_multiplier: pacing.max_multiplier.max(1.0),
            multiplier_step: pacing.multiplier_step,
            decay_rate: pacing.decay_rate,
            idle_decay: pacing.idle_decay,
            boost_threshold: pacing.boost_threshold(),
            relax_window: pacing.relax_window(),
            idle_window: pacing.idle_window(),
        }
    }

    /// Back to baseline, forgetting the input history
    pub fn reset(&mut self) {
        self.active = false;
        self.multiplier = 1.0;
        self.last_input = None;
        self.input_count = 0;
    }

    pub fn max_multiplier(&self) -> f64 {
        self.max_multiplier
    }

    /// Record an accepted submission at `now`
    pub fn register_input(&mut self, now: Instant) {
        // No previous input counts as an arbitrarily long gap
        let gap = self.last_input.map(|last| now.saturating_duration_since(last));

        match gap {
            Some(gap) if gap < self.boost_threshold => {
                self.input_count += 1;
                self.multiplier = (1.0 + self.input_count as f64 * self.multiplier_step)
                    .min(self.max_multiplier);
                self.active = true;
            }
            Some(gap) if gap <= self.relax_window => {}
            _ => {
                self.input_count = 1;
                self.multiplier = 1.0;
                self.active = false;
            }
        }

        self.last_input = Some(now);
    }

    /// Decay once per processed piece
    pub fn tick(&mut self, now: Instant) {
        let idle = self
            .last_input
            .is_none_or(|last| now.saturating_duration_since(last) > self.idle_window);

        if idle {
            self.multiplier = (self.multiplier * self.idle_decay).max(1.0);
            self.input_count = 0;
            if self.multiplier <= 1.0 {
                self.active = false;
            }
        } else {
            self.multiplier = (self.multiplier * self.decay_rate).max(1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boost() -> SpeedBoost {
        SpeedBoost::new(&PacingSettings::default())
    }

    #[test]
    fn test_first_input_is_baseline() {
        let mut b = boost();
        b.register_input(Instant::now());
        assert!(!b.active);
        assert_eq!(b.multiplier, 1.0);
    }

    #[test]
    fn test_rapid_input_increases_up_to_cap() {
        let mut b = boost();
        let mut now = Instant::now();
        b.register_input(now);

        let mut last = b.multiplier;
        for _ in 0..30 {
            now += Duration::from_millis(50);
            b.register_input(now);
            assert!(b.active);
            assert!(b.multiplier <= b.max_multiplier());
            if last < b.max_multiplier() {
                assert!(b.multiplier > last);
            }
            last = b.multiplier;
        }
        assert_eq!(b.multiplier, 5.0);
    }

    #[test]
    fn test_medium_gap_keeps_state() {
        let mut b = boost();
        let mut now = Instant::now();
        b.register_input(now);
        now += Duration::from_millis(50);
        b.register_input(now);
        let boosted = b.multiplier;

        now += Duration::from_millis(200);
        b.register_input(now);
        assert!(b.active);
        assert_eq!(b.multiplier, boosted);
    }

    #[test]
    fn test_slow_input_resets() {
        let mut b = boost();
        let mut now = Instant::now();
        b.register_input(now);
        now += Duration::from_millis(10);
        b.register_input(now);
        assert!(b.active);

        now += Duration::from_millis(400);
        b.register_input(now);
        assert!(!b.active);
        assert_eq!(b.multiplier, 1.0);
    }

    #[test]
    fn test_idle_decay_returns_to_baseline() {
        let mut b = boost();
        let mut now = Instant::now();
        b.register_input(now);
        for _ in 0..10 {
            now += Duration::from_millis(20);
            b.register_input(now);
        }
        let peak = b.multiplier;
        assert!(peak > 1.0);

        now += Duration::from_millis(600);
        b.tick(now);
        assert!(b.multiplier < peak);
        assert!(b.active);

        for _ in 0..20 {
            b.tick(now);
        }
        assert_eq!(b.multiplier, 1.0);
        assert!(!b.active);
    }

    #[test]
    fn test_gentle_decay_while_input_continues() {
        let mut b = boost();
        let mut now = Instant::now();
        b.register_input(now);
        now += Duration::from_millis(20);
        b.register_input(now);
        let before = b.multiplier;

        b.tick(now + Duration::from_millis(100));
        assert!((b.multiplier - before * 0.95).abs() < 1e-9);
        assert!(b.active);
    }

    #[test]
    fn test_reset() {
        let mut b = boost();
        let now = Instant::now();
        b.register_input(now);
        b.register_input(now + Duration::from_millis(5));
        b.reset();
        assert!(!b.active);
        assert_eq!(b.multiplier, 1.0);
    }
}
