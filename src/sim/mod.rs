//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay deterministic for a
//! given session seed and input sequence:
//! - Clamped delta-time only
//! - Seeded RNG only (pattern generation uses no RNG at all)
//! - No rendering or platform dependencies

pub mod collision;
pub mod level;
pub mod mode;
pub mod pool;
pub mod scoring;
pub mod session;
pub mod state;
pub mod step;

pub use collision::{Axis, Rect, circle_rect_overlap, penetration_axis};
pub use level::{Grid, LevelConfig, PatternId, config_for_level, generate_pattern};
pub use mode::{Mode, ModeEvent, transition};
pub use pool::Pool;
pub use scoring::ScoreBoard;
pub use session::GameSession;
pub use state::{
    Ball, Block, Bullet, Meteor, Paddle, Particle, Powerup, PowerupKind, PowerupPolicy, Viewport,
    World,
};
pub use step::{StepInput, step};
