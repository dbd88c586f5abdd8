//! Collision detection and response for circles and axis-aligned rects
//!
//! Everything in the arena is either a circle (ball), a point (bullets,
//! meteors, powerup centers) or an axis-aligned rectangle (paddle, blocks),
//! so two tests cover the whole game: closest-point circle-vs-rect overlap
//! and point containment. Response is deliberately simple: classify the
//! penetration axis from where the ball was one step earlier and invert
//! exactly one velocity component. Tunneling at extreme speed/dt is an
//! accepted limitation - the clamped step keeps it out of normal play.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::clampf;

/// Axis-aligned rectangle (top-left origin, +y down)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    /// Degenerate zero-radius overlap test for bullets/meteors/powerups
    #[inline]
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }
}

/// Which velocity component a block hit inverts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// True iff the closest point on the rect lies within `radius` of `center`.
#[inline]
pub fn circle_rect_overlap(center: Vec2, radius: f32, rect: &Rect) -> bool {
    let closest = Vec2::new(
        clampf(center.x, rect.x, rect.right()),
        clampf(center.y, rect.y, rect.bottom()),
    );
    center.distance_squared(closest) <= radius * radius
}

/// Classify the collision axis from the ball's pre-step position.
///
/// Horizontal if the previous x was outside the rect's x-span (the ball
/// entered through a side face), else vertical. Exactly one axis, never
/// both.
#[inline]
pub fn penetration_axis(prev: Vec2, rect: &Rect) -> Axis {
    if prev.x < rect.x || prev.x > rect.right() {
        Axis::Horizontal
    } else {
        Axis::Vertical
    }
}
