//! Collision detection and response between the ball and wall pieces
//!
//! Each wall piece is a rectangle with round caps at both ends. A ball that
//! penetrates a piece is rolled around the nearest point of the piece's spine
//! (one of the end-caps once the ball is past either end): it is placed back at
//! exactly `cap_radius + ball_radius` from that point, rotated in proportion to
//! the velocity component tangential to the impact, and its velocity is re-derived
//! from the positional correction.

use glam::Vec2;
use std::f32::consts::PI;

use super::geometry::{angle, distance};
use super::maze::{Aabb, Maze, WallUnit};
use super::state::Body;
use crate::tuning::Tuning;

/// Result of testing one ball against one wall piece
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether the ball was corrected
    pub hit: bool,
    /// Cap point the ball rolled around (if hit)
    pub cap: Vec2,
    /// Ball after correction (unchanged on a miss)
    pub body: Body,
}

impl CollisionResult {
    pub fn miss(body: Body) -> Self {
        Self {
            hit: false,
            cap: Vec2::ZERO,
            body,
        }
    }
}

/// Broad phase: the ball's bounding box overlaps the piece's occupied rectangle
#[inline]
pub fn overlaps_unit(pos: Vec2, ball_radius: f32, unit: &WallUnit, cap_radius: f32) -> bool {
    Aabb::from_center_half(pos, Vec2::splat(ball_radius)).overlaps(&unit.bounds(cap_radius))
}

/// Roll the ball around a cap so it ends up tangent to it
///
/// Returns `None` when the ball centre sits on the cap (no impact direction) or the
/// correction is not finite; the caller keeps the previous body in that case.
pub fn roll_around_cap(cap: Vec2, body: &Body, closest_distance: f32) -> Option<Body> {
    // Direction the wall holds the ball back in
    let impact_angle = angle(body.pos, cap)?;

    let velocity_magnitude = distance(Vec2::ZERO, body.vel);
    // A ball at rest has no heading and nothing tangential to the impact
    let diagonal = match angle(Vec2::ZERO, body.vel) {
        Some(heading) => (impact_angle - heading).sin() * velocity_magnitude,
        None => 0.0,
    };

    let rotation_angle = (diagonal / closest_distance).atan();
    let theta = impact_angle + PI - rotation_angle;

    let pos = cap + Vec2::new(theta.cos(), theta.sin()) * closest_distance;
    let vel = body.pos - pos;
    let rolled = Body {
        pos,
        vel,
        next: pos + vel,
    };

    rolled.is_finite().then_some(rolled)
}

/// Test the ball against one wall piece and correct it on penetration
pub fn ball_wall_collision(body: &Body, unit: &WallUnit, tuning: &Tuning) -> CollisionResult {
    if !overlaps_unit(body.pos, tuning.ball_radius(), unit, tuning.cap_radius()) {
        return CollisionResult::miss(*body);
    }

    let closest = tuning.closest_distance();
    let cap = unit.nearest_spine_point(body.pos);
    if distance(body.pos, cap) >= closest {
        // Box corner overlap only
        return CollisionResult::miss(*body);
    }

    match roll_around_cap(cap, body, closest) {
        Some(rolled) => CollisionResult {
            hit: true,
            cap,
            body: rolled,
        },
        None => {
            log::warn!(
                "Skipping wall correction at ({:.2}, {:.2}): no usable impact direction",
                cap.x,
                cap.y
            );
            CollisionResult::miss(*body)
        }
    }
}

/// Correct the ball against every wall piece in layout order
///
/// Corrections apply immediately, so later pieces see the already corrected ball.
/// Returns the number of corrections made.
pub fn resolve_walls(body: &mut Body, maze: &Maze) -> usize {
    let tuning = maze.tuning();
    let mut hits = 0;
    for unit in maze.wall_units() {
        let result = ball_wall_collision(body, unit, tuning);
        if result.hit {
            log::debug!(
                "Ball rolled around cap ({:.1}, {:.1}) of wall at {:?}",
                result.cap.x,
                result.cap.y,
                unit.origin
            );
            *body = result.body;
            hits += 1;
        }
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::maze::{GridCell, MazeLayout, WallSegment};
    use proptest::prelude::*;

    fn horizontal_unit() -> WallUnit {
        WallUnit {
            origin: GridCell::new(1, 2),
            horizontal: true,
            start: Vec2::new(25.0, 50.0),
            end: Vec2::new(50.0, 50.0),
        }
    }

    #[test]
    fn test_head_on_cap_hit_is_redirected() {
        // Ball above and slightly left of the cap, falling straight down into it
        let cap = Vec2::new(37.5, 50.0);
        let body = Body {
            pos: Vec2::new(35.0, 45.0),
            vel: Vec2::new(0.0, 10.0),
            next: Vec2::ZERO,
        };

        let rolled = roll_around_cap(cap, &body, 10.0).unwrap();

        assert!((distance(rolled.pos, cap) - 10.0).abs() < 1e-4);
        assert!(rolled.vel.x.abs() > 0.1);
        assert!(rolled.vel.y.abs() < 10.0);
        assert_eq!(rolled.next, rolled.pos + rolled.vel);
    }

    #[test]
    fn test_velocity_is_positional_correction() {
        let cap = Vec2::new(0.0, 0.0);
        let body = Body {
            pos: Vec2::new(-6.0, 0.0),
            vel: Vec2::new(4.0, 0.0),
            next: Vec2::ZERO,
        };

        let rolled = roll_around_cap(cap, &body, 10.0).unwrap();

        // Head-on: pushed straight back along the impact line
        assert!((rolled.pos - Vec2::new(-10.0, 0.0)).length() < 1e-4);
        assert!((rolled.vel - (body.pos - rolled.pos)).length() < 1e-6);
    }

    #[test]
    fn test_ball_at_rest_is_pushed_straight_out() {
        let cap = Vec2::new(10.0, 10.0);
        let body = Body::at_rest(Vec2::new(10.0, 15.0));

        let rolled = roll_around_cap(cap, &body, 10.0).unwrap();

        assert!((rolled.pos - Vec2::new(10.0, 20.0)).length() < 1e-4);
    }

    #[test]
    fn test_ball_on_cap_is_rejected() {
        let cap = Vec2::new(10.0, 10.0);
        let body = Body {
            pos: cap,
            vel: Vec2::new(1.0, 1.0),
            next: Vec2::ZERO,
        };
        assert!(roll_around_cap(cap, &body, 10.0).is_none());

        // The pair is skipped and the ball kept as it was
        let unit = WallUnit {
            origin: GridCell::new(0, 0),
            horizontal: true,
            start: Vec2::new(0.0, 10.0),
            end: Vec2::new(25.0, 10.0),
        };
        let result = ball_wall_collision(&body, &unit, &Tuning::default());
        assert!(!result.hit);
        assert_eq!(result.body, body);
    }

    #[test]
    fn test_box_corner_overlap_is_not_a_hit() {
        let unit = horizontal_unit();
        // Diagonal from the start cap: boxes overlap, distance to the cap is 11.3
        let body = Body::at_rest(Vec2::new(17.0, 42.0));
        assert!(overlaps_unit(body.pos, 5.0, &unit, 5.0));

        let result = ball_wall_collision(&body, &unit, &Tuning::default());
        assert!(!result.hit);
    }

    #[test]
    fn test_far_ball_misses() {
        let unit = horizontal_unit();
        let body = Body::at_rest(Vec2::new(37.5, 62.5));
        assert!(!overlaps_unit(body.pos, 5.0, &unit, 5.0));
        assert!(!ball_wall_collision(&body, &unit, &Tuning::default()).hit);
    }

    #[test]
    fn test_face_hit_uses_nearest_spine_point() {
        let unit = horizontal_unit();
        let body = Body {
            pos: Vec2::new(40.0, 56.0),
            vel: Vec2::new(0.0, -3.0),
            next: Vec2::ZERO,
        };

        let result = ball_wall_collision(&body, &unit, &Tuning::default());

        assert!(result.hit);
        assert_eq!(result.cap, Vec2::new(40.0, 50.0));
        assert!((result.body.pos - Vec2::new(40.0, 60.0)).length() < 1e-4);
    }

    #[test]
    fn test_resolve_walls_applies_sequentially() {
        // Two pieces meeting at a corner
        let layout = MazeLayout {
            columns: 4,
            rows: 4,
            start: GridCell::new(0, 0),
            goal: GridCell::new(3, 3),
            walls: vec![
                WallSegment::horizontal(1, 1, 1),
                WallSegment::vertical(1, 1, 1),
            ],
            holes: vec![],
        };
        let maze = Maze::new(layout, Tuning::default());
        let mut body = Body {
            pos: Vec2::new(29.0, 29.0),
            vel: Vec2::new(-2.0, -2.0),
            next: Vec2::ZERO,
        };

        let hits = resolve_walls(&mut body, &maze);

        // The first correction still leaves the ball inside the second piece
        assert_eq!(hits, 2);
        assert!(body.is_finite());
        assert!(distance(body.pos, Vec2::new(25.0, 25.0)) > 10.0);
    }

    #[test]
    fn test_shared_cap_of_collinear_pieces_corrects_once() {
        // Two pieces of one straight wall share the cap at (50, 50)
        let layout = MazeLayout {
            columns: 4,
            rows: 4,
            start: GridCell::new(0, 0),
            goal: GridCell::new(3, 3),
            walls: vec![WallSegment::horizontal(1, 2, 2)],
            holes: vec![],
        };
        let maze = Maze::new(layout, Tuning::default());
        let joint = Vec2::new(50.0, 50.0);
        assert_eq!(maze.wall_units()[0].end, joint);
        assert_eq!(maze.wall_units()[1].start, joint);

        let mut body = Body {
            pos: Vec2::new(50.0, 43.0),
            vel: Vec2::new(0.0, 10.0),
            next: Vec2::ZERO,
        };

        let hits = resolve_walls(&mut body, &maze);

        assert_eq!(hits, 1);
        assert!((distance(body.pos, joint) - 10.0).abs() < 1e-4);
        assert!((body.pos - Vec2::new(50.0, 40.0)).length() < 1e-4);
    }

    proptest! {
        #[test]
        fn rolled_ball_is_tangent_to_cap(
            offset_angle in 0.0f32..std::f32::consts::TAU,
            depth in 0.05f32..9.9,
            vx in -10.0f32..10.0,
            vy in -10.0f32..10.0,
        ) {
            let cap = Vec2::new(100.0, 100.0);
            let body = Body {
                pos: cap + Vec2::new(offset_angle.cos(), offset_angle.sin()) * depth,
                vel: Vec2::new(vx, vy),
                next: Vec2::ZERO,
            };

            let rolled = roll_around_cap(cap, &body, 10.0).unwrap();

            prop_assert!((distance(rolled.pos, cap) - 10.0).abs() < 1e-3);
            prop_assert!((rolled.vel - (body.pos - rolled.pos)).length() < 1e-3);
        }

        #[test]
        fn wall_hit_leaves_ball_tangent_to_cap(
            x in 20.0f32..55.0,
            y in 41.0f32..59.0,
            vx in -10.0f32..10.0,
            vy in -10.0f32..10.0,
        ) {
            let unit = horizontal_unit();
            let body = Body { pos: Vec2::new(x, y), vel: Vec2::new(vx, vy), next: Vec2::ZERO };
            prop_assume!(distance(body.pos, unit.nearest_spine_point(body.pos)) > 0.01);

            let result = ball_wall_collision(&body, &unit, &Tuning::default());
            if result.hit {
                prop_assert!((distance(result.body.pos, result.cap) - 10.0).abs() < 1e-3);
            } else {
                prop_assert_eq!(result.body, body);
            }
        }
    }
}
