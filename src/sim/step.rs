//! The per-frame simulation step
//!
//! One call integrates exactly one display frame. The delta is clamped to
//! `MAX_STEP_MS` before use, so a long frame gap plays back as slow motion
//! instead of letting the ball tunnel through blocks. Update order is
//! fixed: paddle, ball, paddle bounce, ball-block collisions, bullets,
//! meteors, powerups, particles, flash decay, board-clear check.

use glam::Vec2;
use rand::Rng;

use super::collision::{Axis, circle_rect_overlap, penetration_axis};
use super::mode::{Mode, ModeEvent, transition};
use super::session::GameSession;
use super::state::{Powerup, PowerupKind, PowerupPolicy, World};
use crate::clampf;
use crate::consts::*;

/// Normalized per-frame input. The pointer is in viewport coordinates and
/// absent while the cursor is outside the play area, in which case the
/// paddle holds its last target.
#[derive(Debug, Clone, Copy, Default)]
pub struct StepInput {
    pub pointer: Option<Vec2>,
    /// Launch request; consumed only while aiming
    pub launch: bool,
}

/// Advance the session by one frame of `dt_ms` milliseconds.
///
/// No-op unless the session is in a stepping mode (aiming or playing) and
/// not paused. The simulation clock also freezes with the step, so the
/// combo window and shooter timer never drain while paused.
pub fn step(session: &mut GameSession, input: &StepInput, dt_ms: f32) {
    if session.paused || !session.mode.is_stepping() {
        return;
    }

    let clamped_ms = dt_ms.min(MAX_STEP_MS);
    let dt = clamped_ms / 1000.0;
    session.world.clock_ms += clamped_ms as f64;

    let now = session.world.clock_ms;
    let vp = session.viewport;
    let policy = session.powerup_policy;
    let mut powerups_used = session.powerups_used;
    let mut mode = session.mode;
    let w = &mut session.world;
    let rng = &mut session.rng;

    // Paddle follows the pointer with exponential smoothing, slightly
    // tighter while the ball is in flight
    if let Some(p) = input.pointer {
        let target = clampf(p.x - w.paddle.w * 0.5, 0.0, vp.width - w.paddle.w);
        let follow = if mode == Mode::Playing { 25.0 } else { 20.0 };
        w.paddle.x += (target - w.paddle.x) * (follow * dt).min(1.0);
    }
    w.paddle.y = vp.height - w.paddle.h - PADDLE_BOTTOM_MARGIN;

    // Ball
    if w.ball.on_paddle {
        w.ball.rest_on(&w.paddle);
        if mode == Mode::Aiming {
            if let Some(p) = input.pointer {
                let d = p - Vec2::new(w.paddle.center_x(), w.paddle.y);
                w.ball.aim_angle = clampf(d.y.atan2(d.x), AIM_MIN, AIM_MAX);
            }
            if input.launch {
                w.ball.launch(w.current_ball_speed);
                if let Some(m) = transition(mode, ModeEvent::Launch) {
                    mode = m;
                }
            }
        }
    } else {
        w.ball.pos += w.ball.vel * dt;
        let r = w.ball.radius;
        if w.ball.pos.x < r {
            w.ball.pos.x = r;
            w.ball.vel.x = -w.ball.vel.x;
        }
        if w.ball.pos.x > vp.width - r {
            w.ball.pos.x = vp.width - r;
            w.ball.vel.x = -w.ball.vel.x;
        }
        if w.ball.pos.y < r {
            w.ball.pos.y = r;
            w.ball.vel.y = -w.ball.vel.y;
        }
        if w.ball.pos.y > vp.height + MISS_MARGIN {
            // Miss. The board and score are left untouched until the
            // restart is acknowledged.
            if let Some(m) = transition(mode, ModeEvent::Miss) {
                session.mode = m;
            }
            return;
        }
    }

    // Paddle bounce, steerable by hit offset from the paddle center
    if !w.ball.on_paddle && circle_rect_overlap(w.ball.pos, w.ball.radius, &w.paddle.rect()) {
        w.ball.pos.y = w.paddle.y - w.ball.radius - 0.1;
        let hit = (w.ball.pos.x - w.paddle.center_x()) / (w.paddle.w * 0.5);
        let speed = w.ball.speed();
        let angle = -std::f32::consts::PI * 0.25 - hit * 0.55;
        w.ball.vel = Vec2::new(angle.cos(), angle.sin()) * speed;
    }

    // Ball vs blocks. Reflection axis comes from where the ball center was
    // at the start of the frame relative to the block's spans.
    let mut i = w.blocks.len();
    while i > 0 {
        i -= 1;
        let rect = w.blocks[i].rect;
        if !circle_rect_overlap(w.ball.pos, w.ball.radius, &rect) {
            continue;
        }
        let prev = w.ball.pos - w.ball.vel * dt;
        match penetration_axis(prev, &rect) {
            Axis::Horizontal => w.ball.vel.x = -w.ball.vel.x,
            Axis::Vertical => w.ball.vel.y = -w.ball.vel.y,
        }

        let destroyed = w.blocks[i].damage(0.34);
        w.blocks[i].hit_effect = 1.0;
        let color = w.blocks[i].hp_color();
        w.scoreboard.add(SCORE_BALL_HIT, now);
        let (bx, by) = (w.ball.pos.x, w.ball.pos.y);
        w.spawn_burst(bx, by, color, rng);
        if rng.random::<f32>() < w.config.meteor_chance {
            w.spawn_rock_burst(rect.center().x, rect.center().y, 3, 5, &vp, rng);
        }
        if destroyed {
            let c = rect.center();
            w.blocks.remove(i);
            maybe_drop_powerup(w, &policy, powerups_used, c.x, c.y, rng);
        }
    }

    // Auto-fire while the shooter buff is active
    if w.shooter_until_ms > now && now - w.last_bullet_ms > BULLET_INTERVAL_MS {
        w.last_bullet_ms = now;
        w.spawn_bullet();
    }

    // Bullets: integrate, cull, then point-in-rect test against blocks
    let mut pos = w.bullets.len();
    while pos > 0 {
        pos -= 1;
        let idx = w.bullets[pos];
        let (bx, by) = {
            let b = w.bullet_pool.get_mut(idx);
            b.pos.y += b.vy * dt;
            b.life_ms -= dt * 1000.0;
            (b.pos.x, b.pos.y)
        };
        if by < -20.0 || w.bullet_pool.get(idx).life_ms <= 0.0 {
            w.release_bullet(pos);
            continue;
        }
        let mut j = w.blocks.len();
        while j > 0 {
            j -= 1;
            let rect = w.blocks[j].rect;
            if !rect.contains_point(Vec2::new(bx, by)) {
                continue;
            }
            let destroyed = w.blocks[j].damage(0.5);
            w.scoreboard.add(SCORE_BULLET_HIT, now);
            w.spawn_burst(bx, by, 0x3bd1ff, rng);
            if rng.random::<f32>() < BULLET_METEOR_CHANCE {
                w.spawn_rock_burst(rect.center().x, rect.center().y, 2, 4, &vp, rng);
            }
            if destroyed {
                let c = rect.center();
                w.blocks.remove(j);
                maybe_drop_powerup(w, &policy, powerups_used, c.x, c.y, rng);
            }
            w.release_bullet(pos);
            break;
        }
    }

    // Meteors: same shape as bullets but no secondary rolls
    let mut pos = w.meteors.len();
    while pos > 0 {
        pos -= 1;
        let idx = w.meteors[pos];
        let (mx, my) = {
            let m = w.meteor_pool.get_mut(idx);
            m.pos.y += m.vy * dt;
            (m.pos.x, m.pos.y)
        };
        if my < -40.0 {
            w.release_meteor(pos);
            continue;
        }
        let mut j = w.blocks.len();
        while j > 0 {
            j -= 1;
            let rect = w.blocks[j].rect;
            if !rect.contains_point(Vec2::new(mx, my)) {
                continue;
            }
            let destroyed = w.blocks[j].damage(0.5);
            w.scoreboard.add(SCORE_METEOR_HIT, now);
            w.spawn_burst(mx, my, 0xff6b6b, rng);
            if destroyed {
                let c = rect.center();
                w.blocks.remove(j);
                maybe_drop_powerup(w, &policy, powerups_used, c.x, c.y, rng);
            }
            w.release_meteor(pos);
            break;
        }
    }

    // Powerups fall toward the paddle
    let paddle_rect = w.paddle.rect();
    let mut pos = w.powerups.len();
    while pos > 0 {
        pos -= 1;
        w.powerups[pos].pos.y += w.powerups[pos].vy * dt;
        let p = w.powerups[pos];
        if p.pos.y > vp.height + 30.0 {
            w.powerups.swap_remove(pos);
            continue;
        }
        if paddle_rect.contains_point(p.pos) {
            powerups_used += 1;
            match p.kind {
                PowerupKind::Shooter => {
                    w.shooter_until_ms = w.shooter_until_ms.max(now) + SHOOTER_DURATION_MS;
                    log::debug!("shooter powerup collected, active until {:.0}ms", w.shooter_until_ms);
                }
            }
            w.powerups.swap_remove(pos);
        }
    }

    // Debris
    let mut pos = w.particles.len();
    while pos > 0 {
        pos -= 1;
        let idx = w.particles[pos];
        let p = w.particle_pool.get_mut(idx);
        p.pos += p.vel * dt;
        p.vel.y += PARTICLE_GRAVITY * dt;
        p.life_ms -= dt * 1000.0;
        if p.life_ms <= 0.0 {
            w.release_particle(pos);
        }
    }

    // Hit flashes fade over roughly a third of a second
    for b in &mut w.blocks {
        if b.hit_effect > 0.0 {
            b.hit_effect = (b.hit_effect - dt * 3.0).max(0.0);
        }
    }

    if w.blocks.is_empty() && mode == Mode::Playing {
        let event = ModeEvent::BoardCleared {
            last_level: w.level >= MAX_LEVEL,
        };
        if let Some(m) = transition(mode, event) {
            mode = m;
        }
    }

    session.powerups_used = powerups_used;
    session.mode = mode;
}

fn maybe_drop_powerup<R: Rng>(
    w: &mut World,
    policy: &PowerupPolicy,
    used: u32,
    x: f32,
    y: f32,
    rng: &mut R,
) {
    if policy.roll(used, rng) {
        w.powerups.push(Powerup {
            pos: Vec2::new(x, y),
            vy: POWERUP_FALL_SPEED,
            kind: PowerupKind::Shooter,
        });
    }
}
