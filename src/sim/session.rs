//! Session lifecycle: a `World` plus the progression state machine, the
//! seeded RNG, and the frame clock.
//!
//! The UI layer talks to the engine exclusively through this type: it
//! forwards normalized input each frame via [`GameSession::advance_frame`]
//! and calls the narrow lifecycle entry points when the player interacts
//! with overlays.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::mode::{Mode, ModeEvent, transition};
use super::scoring::ScoreBoard;
use super::state::{PowerupPolicy, Viewport, World};
use super::step::{StepInput, step};
use crate::persistence::{ScoreStore, SpeedPreference, StoreError};

#[derive(Debug)]
pub struct GameSession {
    pub world: World,
    pub mode: Mode,
    pub viewport: Viewport,
    pub speed: SpeedPreference,
    pub paused: bool,
    pub powerup_policy: PowerupPolicy,
    /// Powerups collected this game, checked against the per-game cap
    pub powerups_used: u32,
    pub(crate) rng: Pcg32,
    last_frame_ms: Option<f64>,
}

impl GameSession {
    /// A fresh session in `Ready` mode with level 1 already laid out.
    ///
    /// Two sessions built with the same seed and driven with the same
    /// inputs produce identical worlds frame for frame.
    pub fn new(viewport: Viewport, seed: u64) -> Self {
        let speed = SpeedPreference::default();
        let mut world = World::new(&viewport);
        world.spawn_level(1, &viewport, speed.multiplier());
        Self {
            world,
            mode: Mode::Ready,
            viewport,
            speed,
            paused: false,
            powerup_policy: PowerupPolicy::default(),
            powerups_used: 0,
            rng: Pcg32::seed_from_u64(seed),
            last_frame_ms: None,
        }
    }

    /// Begin a new game from `Ready`: fresh score, level 1, ball seated.
    pub fn start(&mut self) {
        if let Some(next) = transition(self.mode, ModeEvent::Start) {
            self.reset_game();
            self.mode = next;
        }
    }

    /// Dismiss the current overlay. What the next attempt looks like
    /// depends on which overlay was up: next level, the same level again,
    /// or a full game reset.
    pub fn acknowledge(&mut self) {
        let Some(next) = transition(self.mode, ModeEvent::Acknowledge) else {
            return;
        };
        match self.mode {
            Mode::LevelComplete => {
                let level = self.world.level + 1;
                self.world.reset_attempt(&self.viewport);
                self.world.spawn_level(level, &self.viewport, self.speed.multiplier());
            }
            Mode::LevelRestart => {
                // Same level, score kept
                let level = self.world.level;
                self.world.reset_attempt(&self.viewport);
                self.world.spawn_level(level, &self.viewport, self.speed.multiplier());
            }
            Mode::GameComplete | Mode::GameOver => self.reset_game(),
            _ => {}
        }
        self.paused = false;
        self.mode = next;
    }

    fn reset_game(&mut self) {
        self.world.scoreboard = ScoreBoard::default();
        self.powerups_used = 0;
        self.world.reset_attempt(&self.viewport);
        self.world.spawn_level(1, &self.viewport, self.speed.multiplier());
        self.paused = false;
    }

    /// Pause only makes sense while the simulation is stepping; overlays
    /// already hold the world still.
    pub fn toggle_pause(&mut self) {
        if self.mode.is_stepping() {
            self.paused = !self.paused;
        }
    }

    /// Apply a speed preference immediately. An in-flight ball keeps its
    /// velocity; the new speed takes effect on the next launch.
    pub fn set_speed_preference(&mut self, speed: SpeedPreference) {
        self.speed = speed;
        self.world.apply_speed_multiplier(speed.multiplier());
    }

    /// Adopt a resized viewport: paddle geometry and ball radius are
    /// re-derived, the current block layout is kept.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.world.ball.radius = viewport.ball_radius();
        self.world.place_paddle(&viewport);
    }

    /// Drive one display frame. `now_ms` is the caller's monotonic
    /// timestamp; the delta to the previous frame is computed here and
    /// clamped inside the step.
    ///
    /// A panic inside the step is caught and logged; the simulation
    /// resumes on the next frame.
    pub fn advance_frame(&mut self, input: &StepInput, now_ms: f64) {
        let dt_ms = match self.last_frame_ms {
            Some(prev) => ((now_ms - prev) as f32).max(0.0),
            None => 0.0,
        };
        self.last_frame_ms = Some(now_ms);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            step(self, input, dt_ms);
        }));
        if let Err(payload) = result {
            let msg = payload
                .downcast_ref::<&str>()
                .copied()
                .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
                .unwrap_or("non-string panic payload");
            log::error!("simulation step panicked ({msg}); resuming next frame");
        }
    }

    /// Pull the stored speed preference, keeping the default if the store
    /// cannot produce one.
    pub fn load_preferences(&mut self, store: &dyn ScoreStore) {
        match store.speed_preference() {
            Ok(speed) => self.set_speed_preference(speed),
            Err(e) => log::warn!("could not load speed preference, using default: {e}"),
        }
    }

    /// Record the finished game's score as "last" and promote it to
    /// "best" when it beats the stored one.
    pub fn flush_scores(&self, store: &mut dyn ScoreStore) -> Result<(), StoreError> {
        let score = self.world.scoreboard.score;
        store.set_last_score(score)?;
        if score > store.best_score()? {
            store.set_best_score(score)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    fn vp() -> Viewport {
        Viewport::new(600.0, 800.0)
    }

    #[test]
    fn test_new_session_is_ready_with_level_one() {
        let s = GameSession::new(vp(), 1);
        assert_eq!(s.mode, Mode::Ready);
        assert_eq!(s.world.level, 1);
        assert!(!s.world.blocks.is_empty());
        assert!(s.world.ball.on_paddle);
    }

    #[test]
    fn test_start_only_from_ready() {
        let mut s = GameSession::new(vp(), 1);
        s.start();
        assert_eq!(s.mode, Mode::Aiming);
        // A second start is a no-op
        s.world.scoreboard.score = 50;
        s.start();
        assert_eq!(s.mode, Mode::Aiming);
        assert_eq!(s.world.scoreboard.score, 50);
    }

    #[test]
    fn test_acknowledge_level_complete_advances() {
        let mut s = GameSession::new(vp(), 1);
        s.start();
        s.world.scoreboard.score = 120;
        s.mode = Mode::LevelComplete;
        s.acknowledge();
        assert_eq!(s.mode, Mode::Aiming);
        assert_eq!(s.world.level, 2);
        // Score carries into the next level
        assert_eq!(s.world.scoreboard.score, 120);
        assert!(s.world.ball.on_paddle);
        assert!(!s.world.blocks.is_empty());
    }

    #[test]
    fn test_acknowledge_restart_keeps_level_and_score() {
        let mut s = GameSession::new(vp(), 1);
        s.start();
        s.mode = Mode::Aiming;
        s.acknowledge(); // not an overlay, must be a no-op
        assert_eq!(s.mode, Mode::Aiming);

        s.world.scoreboard.score = 75;
        s.world.level = 4;
        s.mode = Mode::LevelRestart;
        s.acknowledge();
        assert_eq!(s.mode, Mode::Aiming);
        assert_eq!(s.world.level, 4);
        assert_eq!(s.world.scoreboard.score, 75);
    }

    #[test]
    fn test_acknowledge_game_complete_resets_everything() {
        let mut s = GameSession::new(vp(), 1);
        s.start();
        s.world.scoreboard.score = 9000;
        s.world.level = 10;
        s.powerups_used = 3;
        s.mode = Mode::GameComplete;
        s.acknowledge();
        assert_eq!(s.mode, Mode::Aiming);
        assert_eq!(s.world.level, 1);
        assert_eq!(s.world.scoreboard.score, 0);
        assert_eq!(s.powerups_used, 0);
    }

    #[test]
    fn test_toggle_pause_gated_by_mode() {
        let mut s = GameSession::new(vp(), 1);
        s.toggle_pause(); // Ready: ignored
        assert!(!s.paused);
        s.start();
        s.toggle_pause();
        assert!(s.paused);
        s.toggle_pause();
        assert!(!s.paused);
    }

    #[test]
    fn test_set_viewport_rederives_geometry() {
        let mut s = GameSession::new(vp(), 1);
        s.set_viewport(Viewport::new(320.0, 568.0));
        assert_eq!(s.world.ball.radius, 6.0);
        assert_eq!(s.world.paddle.w, 100.0);
        // Ball re-seats on the re-placed paddle
        assert_eq!(s.world.ball.pos.x, s.world.paddle.center_x());
    }

    #[test]
    fn test_advance_frame_clock() {
        let mut s = GameSession::new(vp(), 1);
        s.start();
        s.advance_frame(&StepInput::default(), 1000.0);
        // First frame has no predecessor, zero delta
        assert_eq!(s.world.clock_ms, 0.0);
        s.advance_frame(&StepInput::default(), 1016.0);
        assert_eq!(s.world.clock_ms, 16.0);
        // Long gap clamps to one max step
        s.advance_frame(&StepInput::default(), 3016.0);
        assert_eq!(s.world.clock_ms, 48.0);
    }

    // Needs debug assertions: the damage invariant that trips the fault
    // only checks in debug builds.
    #[test]
    #[cfg(debug_assertions)]
    fn test_step_fault_resumes_next_frame() {
        use crate::sim::{Block, Rect};
        use glam::Vec2;

        let mut s = GameSession::new(vp(), 3);
        s.start();
        s.advance_frame(
            &StepInput {
                pointer: None,
                launch: true,
            },
            0.0,
        );
        assert_eq!(s.mode, Mode::Playing);

        // A dead block left in the ball's path makes the block pass panic
        s.world.blocks.push(Block {
            rect: Rect::new(260.0, 380.0, 80.0, 40.0),
            hp: 0,
            max_hp: 1,
            crack: 0.0,
            scratch_seed: 1,
            hit_effect: 0.0,
            level: s.world.level,
        });
        s.world.ball.pos = Vec2::new(300.0, 400.0);
        s.world.ball.vel = Vec2::new(0.0, -200.0);

        let clock = s.world.clock_ms;
        s.advance_frame(&StepInput::default(), 16.0);
        assert!(!s.paused);
        assert!(s.world.clock_ms > clock);

        // The next frame still steps
        let clock = s.world.clock_ms;
        s.advance_frame(&StepInput::default(), 32.0);
        assert!(!s.paused);
        assert!(s.world.clock_ms > clock);
    }

    #[test]
    fn test_flush_scores_promotes_best() {
        let mut store = MemoryStore::default();
        store.set_best_score(500).unwrap();

        let mut s = GameSession::new(vp(), 1);
        s.world.scoreboard.score = 300;
        s.flush_scores(&mut store).unwrap();
        assert_eq!(store.last_score().unwrap(), 300);
        assert_eq!(store.best_score().unwrap(), 500);

        s.world.scoreboard.score = 800;
        s.flush_scores(&mut store).unwrap();
        assert_eq!(store.last_score().unwrap(), 800);
        assert_eq!(store.best_score().unwrap(), 800);
    }

    #[test]
    fn test_load_preferences_applies_speed() {
        let mut store = MemoryStore::default();
        store.set_speed_preference(SpeedPreference::Fast).unwrap();
        let mut s = GameSession::new(vp(), 1);
        s.load_preferences(&store);
        assert_eq!(s.speed, SpeedPreference::Fast);
        assert!((s.world.current_ball_speed - 360.0 * 1.4).abs() < 0.01);
    }
}
