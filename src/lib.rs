//! Skate Smash - a ball-and-paddle arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, level generation,
//!   game progression)
//! - `persistence`: Best/last score and speed preference storage
//!
//! The engine is frame-driven and single-threaded: exactly one simulation
//! step runs per display-refresh callback, with the delta-time clamped
//! before integration. Rendering, raw input normalization and UI are
//! external collaborators that read `World` snapshots or call the narrow
//! setter entry points on `GameSession`.

pub mod persistence;
pub mod sim;

pub use persistence::{JsonFileStore, MemoryStore, ScoreStore, SpeedPreference, StoreError};
pub use sim::{GameSession, Mode, StepInput, World};

/// Game configuration constants
pub mod consts {
    /// Maximum delta-time fed into one simulation step (ms). Longer frame
    /// gaps integrate as slow motion rather than tunneling.
    pub const MAX_STEP_MS: f32 = 32.0;

    /// Paddle defaults - width is viewport-derived, height fixed
    pub const PADDLE_HEIGHT: f32 = 16.0;
    /// Gap between paddle underside and the bottom edge
    pub const PADDLE_BOTTOM_MARGIN: f32 = 18.0;
    pub const PADDLE_MIN_WIDTH: f32 = 100.0;
    pub const PADDLE_MAX_WIDTH: f32 = 220.0;

    /// Ball defaults
    pub const BALL_MIN_RADIUS: f32 = 6.0;
    pub const BALL_MAX_RADIUS: f32 = 12.0;
    /// Base ball speed (px/s) before level and preference multipliers
    pub const BALL_BASE_SPEED: f32 = 360.0;
    /// Default aim angle while the ball rests on the paddle
    pub const AIM_DEFAULT: f32 = -std::f32::consts::FRAC_PI_4;
    /// Aim cone bounds (upward arc only)
    pub const AIM_MIN: f32 = -std::f32::consts::PI * 0.9;
    pub const AIM_MAX: f32 = -std::f32::consts::PI * 0.1;

    /// Projectiles (both travel upward, negative vy)
    pub const BULLET_SPEED: f32 = -800.0;
    pub const BULLET_LIFE_MS: f32 = 900.0;
    /// Auto-fire cadence while the shooter powerup is active
    pub const BULLET_INTERVAL_MS: f64 = 120.0;
    pub const METEOR_SPEED: f32 = -520.0;
    /// Meteor roll on bullet hits (ball hits use the level config)
    pub const BULLET_METEOR_CHANCE: f32 = 0.12;

    /// Combo window (ms) and cap
    pub const COMBO_WINDOW_MS: f64 = 1400.0;
    pub const COMBO_MAX: u32 = 8;
    /// Score bases per hit source
    pub const SCORE_BALL_HIT: u32 = 10;
    pub const SCORE_BULLET_HIT: u32 = 6;
    pub const SCORE_METEOR_HIT: u32 = 12;

    /// Powerups
    pub const POWERUP_DROP_CHANCE: f32 = 0.05;
    pub const POWERUP_FALL_SPEED: f32 = 120.0;
    pub const SHOOTER_DURATION_MS: f64 = 6000.0;
    pub const MAX_POWERUPS_PER_GAME: u32 = 3;

    /// Particle gravity (px/s^2)
    pub const PARTICLE_GRAVITY: f32 = 900.0;

    /// Final level; clearing it completes the game
    pub const MAX_LEVEL: u32 = 10;
    /// How far below the viewport the ball must travel to count as a miss
    pub const MISS_MARGIN: f32 = 40.0;
}

/// Clamp `v` into `[a, b]`
#[inline]
pub fn clampf(v: f32, a: f32, b: f32) -> f32 {
    v.max(a).min(b)
}
