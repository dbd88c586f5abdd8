//! Core simulation types and the World aggregate
//!
//! `World` exclusively owns every live entity. External collaborators read
//! snapshots through the iterator accessors; only the simulation step
//! mutates it.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::level::{self, BlockLayout, LevelConfig, config_for_level, generate_pattern};
use super::pool::Pool;
use super::scoring::ScoreBoard;
use crate::clampf;
use crate::consts::*;

/// Normalized viewport geometry (CSS pixels, origin top-left, +y down)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Wide enough for the fixed 12-column desktop grid
    #[inline]
    pub fn is_desktop(&self) -> bool {
        self.width >= 600.0
    }

    /// Ball radius scales with the smaller viewport dimension
    pub fn ball_radius(&self) -> f32 {
        let min_dim = self.width.min(self.height);
        clampf((min_dim * 0.018).floor(), BALL_MIN_RADIUS, BALL_MAX_RADIUS)
    }

    /// Paddle width scales with viewport width
    pub fn paddle_width(&self) -> f32 {
        clampf(self.width * 0.28, PADDLE_MIN_WIDTH, PADDLE_MAX_WIDTH)
    }
}

/// The player's paddle, pinned near the bottom edge
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Paddle {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Paddle {
    /// Centered paddle for a viewport
    pub fn place(vp: &Viewport) -> Self {
        let w = vp.paddle_width();
        Self {
            x: vp.width * 0.5 - w * 0.5,
            y: vp.height - PADDLE_HEIGHT - PADDLE_BOTTOM_MARGIN,
            w,
            h: PADDLE_HEIGHT,
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.x + self.w * 0.5
    }
}

/// The ball. While `on_paddle` is true its position is slaved to the
/// paddle and velocity is zero; `aim_angle` only matters in that state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub on_paddle: bool,
    /// Radians, constrained to the upward cone [AIM_MIN, AIM_MAX]
    pub aim_angle: f32,
}

impl Ball {
    pub fn new(radius: f32) -> Self {
        Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            radius,
            on_paddle: true,
            aim_angle: AIM_DEFAULT,
        }
    }

    /// Seat the ball on the paddle center (aiming state)
    pub fn rest_on(&mut self, paddle: &Paddle) {
        self.on_paddle = true;
        self.pos = Vec2::new(paddle.center_x(), paddle.y - self.radius - 2.0);
        self.vel = Vec2::ZERO;
    }

    /// Launch along the current aim angle at the given speed
    pub fn launch(&mut self, speed: f32) {
        self.on_paddle = false;
        self.vel = Vec2::new(self.aim_angle.cos(), self.aim_angle.sin()) * speed;
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }
}

/// A destructible block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub rect: Rect,
    pub hp: u32,
    pub max_hp: u32,
    /// Damage-accumulation scalar in [0,1], drives scratch density
    pub crack: f32,
    /// Deterministic seed for damage decoration (position+level hash)
    pub scratch_seed: u32,
    /// Decaying flash scalar set on ball hits; rendering consumes it but
    /// the simulation owns the decay
    pub hit_effect: f32,
    pub level: u32,
}

impl Block {
    /// Apply one point of damage. Returns true if the block is destroyed.
    pub fn damage(&mut self, crack_delta: f32) -> bool {
        debug_assert!(self.hp > 0, "damage on already-dead block");
        self.hp = self.hp.saturating_sub(1);
        self.crack = (self.crack + crack_delta).min(1.0);
        self.hp == 0
    }

    /// Particle color tracking remaining hit points (green/yellow/red)
    pub fn hp_color(&self) -> u32 {
        let t = self.hp as f32 / self.max_hp as f32;
        if t > 0.66 {
            0x60ff9f
        } else if t > 0.33 {
            0xffcc66
        } else {
            0xff6b6b
        }
    }
}

/// Pooled paddle-fired projectile
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Bullet {
    pub pos: Vec2,
    pub vy: f32,
    pub life_ms: f32,
    pub active: bool,
}

/// Pooled upward rock, spawned stochastically on block hits
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Meteor {
    pub pos: Vec2,
    pub vy: f32,
    pub active: bool,
}

/// Pooled cosmetic debris (gravity-integrated)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life_ms: f32,
    /// 0xRRGGBB
    pub color: u32,
    pub size: f32,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerupKind {
    /// Timed buff: automatic periodic bullet fire from the paddle
    Shooter,
}

/// Falling pickup; not pooled, lifetime tracks level boundaries
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Powerup {
    pub pos: Vec2,
    pub vy: f32,
    pub kind: PowerupKind,
}

/// Drop rules for block destruction, kept separate from the collision
/// path so they are independently testable.
#[derive(Debug, Clone, Copy)]
pub struct PowerupPolicy {
    pub drop_chance: f32,
    /// Per-session cap on collected powerups
    pub cap: u32,
}

impl Default for PowerupPolicy {
    fn default() -> Self {
        Self {
            drop_chance: POWERUP_DROP_CHANCE,
            cap: MAX_POWERUPS_PER_GAME,
        }
    }
}

impl PowerupPolicy {
    /// Roll a drop for a destroyed block. `used` is the session's
    /// collected-powerup counter; once it hits the cap nothing drops.
    pub fn roll<R: Rng>(&self, used: u32, rng: &mut R) -> bool {
        used < self.cap && rng.random::<f32>() < self.drop_chance
    }
}

/// The mutable aggregate for one running session.
///
/// Recreated in content (not reallocated) on restart: pools persist across
/// attempts so the steady state allocates nothing per frame.
#[derive(Debug)]
pub struct World {
    pub paddle: Paddle,
    pub ball: Ball,
    pub blocks: Vec<Block>,
    pub powerups: Vec<Powerup>,

    pub bullet_pool: Pool<Bullet>,
    pub meteor_pool: Pool<Meteor>,
    pub particle_pool: Pool<Particle>,
    /// Live membership lists; every referenced slot has `active == true`
    pub bullets: Vec<u32>,
    pub meteors: Vec<u32>,
    pub particles: Vec<u32>,

    pub scoreboard: ScoreBoard,
    pub level: u32,
    pub config: LevelConfig,
    /// Base speed x level multiplier x speed preference
    pub current_ball_speed: f32,

    /// Simulation clock: sum of clamped frame deltas (ms). Combo window
    /// and shooter timers read this, never wall time.
    pub clock_ms: f64,
    pub shooter_until_ms: f64,
    pub last_bullet_ms: f64,
}

impl World {
    pub fn new(vp: &Viewport) -> Self {
        let paddle = Paddle::place(vp);
        let mut ball = Ball::new(vp.ball_radius());
        ball.rest_on(&paddle);
        Self {
            paddle,
            ball,
            blocks: Vec::new(),
            powerups: Vec::new(),
            bullet_pool: Pool::with_capacity(32),
            meteor_pool: Pool::with_capacity(16),
            particle_pool: Pool::with_capacity(128),
            bullets: Vec::new(),
            meteors: Vec::new(),
            particles: Vec::new(),
            scoreboard: ScoreBoard::default(),
            level: 1,
            config: *config_for_level(1),
            current_ball_speed: BALL_BASE_SPEED,
            clock_ms: 0.0,
            shooter_until_ms: 0.0,
            last_bullet_ms: 0.0,
        }
    }

    /// Re-derive paddle geometry after a viewport change, keeping the ball
    /// seated if it was on the paddle.
    pub fn place_paddle(&mut self, vp: &Viewport) {
        self.paddle = Paddle::place(vp);
        if self.ball.on_paddle {
            self.ball.rest_on(&self.paddle);
        }
    }

    /// Seat the ball on the paddle with the default aim
    pub fn reset_ball(&mut self) {
        self.ball.aim_angle = AIM_DEFAULT;
        self.ball.rest_on(&self.paddle);
    }

    /// Build the block layout for a level and apply its tuning.
    ///
    /// `speed_multiplier` is the player's speed-preference factor.
    pub fn spawn_level(&mut self, level: u32, vp: &Viewport, speed_multiplier: f32) {
        self.blocks.clear();
        let config = *config_for_level(level);
        let layout = BlockLayout::for_viewport(vp);
        let grid = generate_pattern(config.pattern, layout.cols, level);

        for r in 0..grid.rows() {
            for c in 0..grid.cols() {
                if !grid.get(r, c) {
                    continue;
                }
                let rect = layout.rect_for(r, c);
                self.blocks.push(Block {
                    rect,
                    hp: config.hp,
                    max_hp: config.hp,
                    crack: 0.0,
                    scratch_seed: level::scratch_seed(rect.x, rect.y, level),
                    hit_effect: 0.0,
                    level,
                });
            }
        }

        self.level = level;
        self.config = config;
        self.current_ball_speed = BALL_BASE_SPEED * config.ball_speed * speed_multiplier;
        log::info!(
            "level {} spawned: pattern {:?}, {} blocks, hp {}, ball speed {:.0}",
            level,
            config.pattern,
            self.blocks.len(),
            config.hp,
            self.current_ball_speed,
        );
    }

    /// Recompute the ball speed after a live speed-preference change.
    pub fn apply_speed_multiplier(&mut self, speed_multiplier: f32) {
        self.current_ball_speed = BALL_BASE_SPEED * self.config.ball_speed * speed_multiplier;
    }

    /// Drain every pooled entity back to its free list and clear the
    /// per-attempt timers. Blocks and score are untouched.
    pub fn reset_attempt(&mut self, vp: &Viewport) {
        for idx in self.bullets.drain(..) {
            let b = self.bullet_pool.get_mut(idx);
            b.active = false;
            self.bullet_pool.release(idx);
        }
        for idx in self.meteors.drain(..) {
            let m = self.meteor_pool.get_mut(idx);
            m.active = false;
            self.meteor_pool.release(idx);
        }
        for idx in self.particles.drain(..) {
            let p = self.particle_pool.get_mut(idx);
            p.active = false;
            self.particle_pool.release(idx);
        }
        self.powerups.clear();
        self.scoreboard.reset_combo();
        self.shooter_until_ms = 0.0;
        self.last_bullet_ms = 0.0;
        self.place_paddle(vp);
        self.reset_ball();
    }

    /// Fire one bullet from the paddle center
    pub fn spawn_bullet(&mut self) {
        let idx = self.bullet_pool.acquire();
        let b = self.bullet_pool.get_mut(idx);
        b.pos = Vec2::new(self.paddle.center_x(), self.paddle.y - 6.0);
        b.vy = BULLET_SPEED;
        b.life_ms = BULLET_LIFE_MS;
        b.active = true;
        self.bullets.push(idx);
    }

    /// Emit `count_min..=count_max` upward rocks around `(x, y)`
    pub fn spawn_rock_burst<R: Rng>(
        &mut self,
        x: f32,
        y: f32,
        count_min: u32,
        count_max: u32,
        vp: &Viewport,
        rng: &mut R,
    ) {
        let n = rng.random_range(count_min..=count_max);
        for _ in 0..n {
            let idx = self.meteor_pool.acquire();
            let m = self.meteor_pool.get_mut(idx);
            m.pos = Vec2::new(
                clampf(x + rng.random_range(-10.0..10.0), 8.0, vp.width - 8.0),
                y,
            );
            m.vy = METEOR_SPEED * rng.random_range(0.9..1.3);
            m.active = true;
            self.meteors.push(idx);
        }
    }

    /// Spray a ten-particle debris burst at `(x, y)`
    pub fn spawn_burst<R: Rng>(&mut self, x: f32, y: f32, color: u32, rng: &mut R) {
        for _ in 0..10 {
            let idx = self.particle_pool.acquire();
            let p = self.particle_pool.get_mut(idx);
            p.pos = Vec2::new(x, y);
            p.vel = Vec2::new(
                rng.random_range(-120.0..120.0),
                rng.random_range(-220.0..-40.0),
            );
            p.life_ms = 500.0 + rng.random::<f32>() * 500.0;
            p.color = color;
            p.size = rng.random_range(1.5..3.5);
            p.active = true;
            self.particles.push(idx);
        }
    }

    /// Remove a live bullet by position in the live list
    pub fn release_bullet(&mut self, live_pos: usize) {
        let idx = self.bullets.swap_remove(live_pos);
        self.bullet_pool.get_mut(idx).active = false;
        self.bullet_pool.release(idx);
    }

    pub fn release_meteor(&mut self, live_pos: usize) {
        let idx = self.meteors.swap_remove(live_pos);
        self.meteor_pool.get_mut(idx).active = false;
        self.meteor_pool.release(idx);
    }

    pub fn release_particle(&mut self, live_pos: usize) {
        let idx = self.particles.swap_remove(live_pos);
        self.particle_pool.get_mut(idx).active = false;
        self.particle_pool.release(idx);
    }

    /// Read-only live bullet view for the renderer
    pub fn live_bullets(&self) -> impl Iterator<Item = &Bullet> {
        self.bullets.iter().map(|&i| self.bullet_pool.get(i))
    }

    pub fn live_meteors(&self) -> impl Iterator<Item = &Meteor> {
        self.meteors.iter().map(|&i| self.meteor_pool.get(i))
    }

    pub fn live_particles(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter().map(|&i| self.particle_pool.get(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn vp() -> Viewport {
        Viewport::new(600.0, 800.0)
    }

    #[test]
    fn test_viewport_derivations() {
        let v = vp();
        // min_dim 600 -> floor(10.8) = 10
        assert_eq!(v.ball_radius(), 10.0);
        // 600 * 0.28 = 168, inside [100, 220]
        assert_eq!(v.paddle_width(), 168.0);
        assert!(v.is_desktop());

        let narrow = Viewport::new(320.0, 568.0);
        assert_eq!(narrow.ball_radius(), 6.0);
        assert_eq!(narrow.paddle_width(), 100.0);
        assert!(!narrow.is_desktop());
    }

    #[test]
    fn test_ball_rest_and_launch() {
        let v = vp();
        let paddle = Paddle::place(&v);
        let mut ball = Ball::new(v.ball_radius());
        ball.rest_on(&paddle);
        assert!(ball.on_paddle);
        assert_eq!(ball.pos.x, paddle.center_x());
        assert_eq!(ball.vel, Vec2::ZERO);

        ball.aim_angle = -std::f32::consts::FRAC_PI_2;
        ball.launch(360.0);
        assert!(!ball.on_paddle);
        assert!((ball.speed() - 360.0).abs() < 0.01);
        assert!(ball.vel.y < 0.0);
    }

    #[test]
    fn test_spawn_level_uniform_hp() {
        let v = vp();
        let mut world = World::new(&v);
        world.spawn_level(4, &v, 1.0);
        assert!(!world.blocks.is_empty());
        for b in &world.blocks {
            assert_eq!(b.hp, 3);
            assert_eq!(b.max_hp, 3);
            assert_eq!(b.crack, 0.0);
        }
        // Level 4: 360 * 1.3
        assert!((world.current_ball_speed - 468.0).abs() < 0.01);
    }

    #[test]
    fn test_spawn_level_scratch_seeds_reproducible() {
        let v = vp();
        let mut a = World::new(&v);
        let mut b = World::new(&v);
        a.spawn_level(3, &v, 1.0);
        b.spawn_level(3, &v, 1.0);
        let seeds_a: Vec<u32> = a.blocks.iter().map(|bl| bl.scratch_seed).collect();
        let seeds_b: Vec<u32> = b.blocks.iter().map(|bl| bl.scratch_seed).collect();
        assert_eq!(seeds_a, seeds_b);
    }

    #[test]
    fn test_reset_attempt_drains_pools() {
        let v = vp();
        let mut world = World::new(&v);
        let mut rng = Pcg32::seed_from_u64(7);
        world.spawn_bullet();
        world.spawn_rock_burst(300.0, 200.0, 3, 5, &v, &mut rng);
        world.spawn_burst(300.0, 200.0, 0xffffff, &mut rng);
        assert!(!world.bullets.is_empty());
        assert!(!world.meteors.is_empty());
        assert_eq!(world.particles.len(), 10);

        world.reset_attempt(&v);
        assert!(world.bullets.is_empty());
        assert!(world.meteors.is_empty());
        assert!(world.particles.is_empty());
        assert_eq!(world.bullet_pool.free_len(), world.bullet_pool.len());
        assert!(world.ball.on_paddle);
    }

    #[test]
    fn test_powerup_policy_cap() {
        let policy = PowerupPolicy {
            drop_chance: 1.0,
            cap: 3,
        };
        let mut rng = Pcg32::seed_from_u64(1);
        assert!(policy.roll(0, &mut rng));
        assert!(policy.roll(2, &mut rng));
        assert!(!policy.roll(3, &mut rng));
        assert!(!policy.roll(10, &mut rng));
    }

    #[test]
    fn test_block_damage_and_color() {
        let mut b = Block {
            rect: Rect::new(0.0, 0.0, 40.0, 40.0),
            hp: 3,
            max_hp: 3,
            crack: 0.0,
            scratch_seed: 1,
            hit_effect: 0.0,
            level: 1,
        };
        assert_eq!(b.hp_color(), 0x60ff9f);
        // 2/3 is still above the 0.66 green threshold
        assert!(!b.damage(0.34));
        assert_eq!(b.hp, 2);
        assert_eq!(b.hp_color(), 0x60ff9f);
        // 1/3 is above the 0.33 yellow threshold
        assert!(!b.damage(0.34));
        assert_eq!(b.hp_color(), 0xffcc66);
        assert!(b.damage(0.34));
        assert_eq!(b.hp_color(), 0xff6b6b);
        assert!(b.crack <= 1.0);
    }
}
