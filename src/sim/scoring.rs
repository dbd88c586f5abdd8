//! Score and combo tracking
//!
//! `ScoreBoard::add` is the only score mutation entry point in the engine;
//! every hit source (ball, bullet, meteor) routes through it with a
//! source-specific base value. Chaining hits inside the combo window grows
//! a multiplier up to x8; any gap beyond the window resets it to x1.
//!
//! Timestamps are simulation-clock milliseconds, not wall time, so combo
//! behavior is reproducible in tests.

use crate::consts::{COMBO_MAX, COMBO_WINDOW_MS};

#[derive(Debug, Clone)]
pub struct ScoreBoard {
    pub score: u64,
    pub combo: u32,
    last_hit_ms: f64,
}

impl Default for ScoreBoard {
    fn default() -> Self {
        Self {
            score: 0,
            combo: 1,
            // Far enough in the past that the first hit never chains
            last_hit_ms: f64::MIN,
        }
    }
}

impl ScoreBoard {
    /// Record a scoring hit at simulation time `now_ms`.
    pub fn add(&mut self, base: u32, now_ms: f64) {
        if now_ms - self.last_hit_ms < COMBO_WINDOW_MS {
            self.combo = (self.combo + 1).min(COMBO_MAX);
        } else {
            self.combo = 1;
        }
        self.last_hit_ms = now_ms;
        self.score += u64::from(base) * u64::from(self.combo);
    }

    /// Reset for a fresh attempt (score kept, combo chain broken).
    pub fn reset_combo(&mut self) {
        self.combo = 1;
        self.last_hit_ms = f64::MIN;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_hit_no_combo() {
        let mut sb = ScoreBoard::default();
        sb.add(10, 0.0);
        assert_eq!(sb.score, 10);
        assert_eq!(sb.combo, 1);
    }

    #[test]
    fn test_combo_grows_inside_window() {
        let mut sb = ScoreBoard::default();
        sb.add(10, 0.0);
        sb.add(10, 500.0);
        assert_eq!(sb.combo, 2);
        assert_eq!(sb.score, 10 + 20);
        sb.add(10, 1000.0);
        assert_eq!(sb.combo, 3);
    }

    #[test]
    fn test_combo_resets_past_window() {
        let mut sb = ScoreBoard::default();
        sb.add(10, 0.0);
        sb.add(10, 100.0);
        assert_eq!(sb.combo, 2);
        // 1400ms gap is NOT inside the window
        sb.add(10, 1500.0);
        assert_eq!(sb.combo, 1);
    }

    #[test]
    fn test_combo_never_exceeds_cap() {
        let mut sb = ScoreBoard::default();
        for i in 0..50 {
            sb.add(10, i as f64 * 10.0);
        }
        assert_eq!(sb.combo, 8);
    }

    #[test]
    fn test_score_is_base_times_combo() {
        let mut sb = ScoreBoard::default();
        sb.add(6, 0.0); // 6 x1
        sb.add(12, 100.0); // 12 x2
        assert_eq!(sb.score, 6 + 24);
    }
}
