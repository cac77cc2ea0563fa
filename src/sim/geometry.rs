//! Plane geometry helpers shared by the maze model and the collision resolver

use glam::Vec2;
use std::f32::consts::{FRAC_PI_2, TAU};

/// Euclidean distance between two points
#[inline]
pub fn distance(p1: Vec2, p2: Vec2) -> f32 {
    ((p2.x - p1.x).powi(2) + (p2.y - p1.y).powi(2)).sqrt()
}

/// Bearing of the vector from `from` to `to`, in radians.
///
/// The result is quadrant-corrected (as `atan(dy/dx)` plus π when `dx < 0`) and lies in
/// `[-π/2, 3π/2)`. Returns `None` when the points coincide and no direction exists.
pub fn angle(from: Vec2, to: Vec2) -> Option<f32> {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    if dx == 0.0 && dy == 0.0 {
        return None;
    }
    let theta = dy.atan2(dx);
    if !theta.is_finite() {
        return None;
    }
    // atan2 covers (-π, π]; fold the third quadrant up past π
    Some(if theta < -FRAC_PI_2 { theta + TAU } else { theta })
}

/// Clamp `value` into `[-limit, limit]`. A negative limit is taken by its magnitude.
#[inline]
pub fn clamp_magnitude(value: f32, limit: f32) -> f32 {
    let limit = limit.abs();
    value.min(limit).max(-limit)
}

/// Move `value` toward zero by `step` without crossing it (sign-preserving friction)
#[inline]
pub fn decay_toward_zero(value: f32, step: f32) -> f32 {
    if value.abs() <= step {
        0.0
    } else if value > step {
        value - step
    } else {
        value + step
    }
}
