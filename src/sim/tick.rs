//! Per-frame simulation tick
//!
//! Advances one ball by the frame's elapsed time: acceleration clamp and friction,
//! velocity integration, wall correction, then goal and hole checks.

use glam::Vec2;

use super::collision::resolve_walls;
use super::geometry::{clamp_magnitude, decay_toward_zero};
use super::maze::Maze;
use super::state::{Body, GameStatus, SimulationContext};
use crate::consts::MAX_FRAME_DT;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Fresh raw acceleration from the input adapter; `None` keeps the decaying previous one
    pub acceleration: Option<Vec2>,
    /// Restart the game before anything else
    pub reset: bool,
}

/// What rendering needs after a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    pub body: Body,
    pub status: GameStatus,
    /// Wall corrections applied this tick
    pub collisions: usize,
}

/// Advance the game by one frame of `dt` seconds
pub fn tick(ctx: &mut SimulationContext, maze: &Maze, input: &TickInput, dt: f32) -> TickOutcome {
    if input.reset {
        ctx.reset(maze);
    }

    // Terminal states stop integrating until reset
    if ctx.status.is_terminal() {
        return outcome(ctx, 0);
    }

    if let Some(raw) = input.acceleration {
        if raw.is_finite() {
            ctx.acceleration = raw;
        } else {
            log::warn!("Ignoring non-finite acceleration {:?}", raw);
        }
    }

    // Long frames are capped like the frame clock caps them
    let dt = if dt.is_finite() && dt >= 0.0 {
        dt.min(MAX_FRAME_DT)
    } else {
        log::warn!("Ignoring invalid frame delta {}", dt);
        0.0
    };

    let tuning = *maze.tuning();
    let limit = tuning.max_acceleration;

    // Clamp, then friction
    ctx.acceleration = Vec2::new(
        decay_toward_zero(clamp_magnitude(ctx.acceleration.x, limit), tuning.friction),
        decay_toward_zero(clamp_magnitude(ctx.acceleration.y, limit), tuning.friction),
    );

    // Velocity shares the acceleration bound
    let body = &mut ctx.body;
    body.vel += ctx.acceleration;
    body.vel = Vec2::new(
        clamp_magnitude(body.vel.x, limit),
        clamp_magnitude(body.vel.y, limit),
    );
    body.pos += body.vel * dt;

    let collisions = resolve_walls(body, maze);

    ctx.frames += 1;

    if maze.in_goal(ctx.body.pos) {
        ctx.status = GameStatus::Won;
        log::info!("Goal reached after {} frames", ctx.frames);
    }

    if ctx.status == GameStatus::InProgress {
        if let Some(hole) = maze.hole_at(ctx.body.pos) {
            ctx.status = GameStatus::Lost;
            log::info!("Fell into hole at {:?} after {} frames", hole, ctx.frames);
        }
    }

    log::trace!(
        "frame {}: pos ({:.2}, {:.2}) vel ({:.2}, {:.2})",
        ctx.frames,
        ctx.body.pos.x,
        ctx.body.pos.y,
        ctx.body.vel.x,
        ctx.body.vel.y
    );

    outcome(ctx, collisions)
}

fn outcome(ctx: &SimulationContext, collisions: usize) -> TickOutcome {
    TickOutcome {
        body: ctx.body,
        status: ctx.status,
        collisions,
    }
}

/// Turns animation-frame timestamps into frame deltas
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    previous_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds since the previous timestamp (0 on the first frame), capped at `MAX_FRAME_DT`
    pub fn advance(&mut self, timestamp_ms: f64) -> f32 {
        let dt = match self.previous_ms {
            Some(previous) => ((timestamp_ms - previous) / 1000.0) as f32,
            None => 0.0,
        };
        self.previous_ms = Some(timestamp_ms);
        dt.clamp(0.0, MAX_FRAME_DT)
    }

    /// Forget the previous frame (after a reset or a pause)
    pub fn reset(&mut self) {
        self.previous_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::maze::{GridCell, MazeLayout};
    use crate::tuning::Tuning;

    fn open_field() -> Maze {
        let layout = MazeLayout {
            columns: 40,
            rows: 40,
            start: GridCell::new(1, 7),
            goal: GridCell::new(39, 39),
            walls: vec![],
            holes: vec![],
        };
        Maze::new(layout, Tuning::default())
    }

    #[test]
    fn test_acceleration_is_clamped_then_slowed() {
        let maze = open_field();
        let mut ctx = SimulationContext::new(&maze);
        let input = TickInput {
            acceleration: Some(Vec2::new(50.0, -50.0)),
            ..Default::default()
        };

        tick(&mut ctx, &maze, &input, 0.016);

        assert!((ctx.acceleration.x - 9.9).abs() < 1e-5);
        assert!((ctx.acceleration.y + 9.9).abs() < 1e-5);
        assert!((ctx.body.vel.x - 9.9).abs() < 1e-5);
    }

    #[test]
    fn test_acceleration_decays_without_new_input() {
        let maze = open_field();
        let mut ctx = SimulationContext::new(&maze);
        ctx.acceleration = Vec2::new(0.25, 0.0);

        let idle = TickInput::default();
        for _ in 0..3 {
            tick(&mut ctx, &maze, &idle, 0.016);
        }

        assert_eq!(ctx.acceleration, Vec2::ZERO);
        // Velocity keeps what it gained
        assert!(ctx.body.vel.x > 0.0);
    }

    #[test]
    fn test_velocity_shares_acceleration_bound() {
        let maze = open_field();
        let mut ctx = SimulationContext::new(&maze);
        let input = TickInput {
            acceleration: Some(Vec2::new(10.0, 10.0)),
            ..Default::default()
        };
        for _ in 0..10 {
            tick(&mut ctx, &maze, &input, 0.016);
        }
        assert_eq!(ctx.body.vel, Vec2::new(10.0, 10.0));
    }

    #[test]
    fn test_non_finite_inputs_are_ignored() {
        let maze = open_field();
        let mut ctx = SimulationContext::new(&maze);
        let start = ctx.body.pos;
        let input = TickInput {
            acceleration: Some(Vec2::new(f32::NAN, 1.0)),
            ..Default::default()
        };

        tick(&mut ctx, &maze, &input, f32::INFINITY);

        assert_eq!(ctx.acceleration, Vec2::ZERO);
        assert_eq!(ctx.body.pos, start);
        assert!(ctx.body.is_finite());
    }

    #[test]
    fn test_huge_frame_delta_is_capped() {
        let maze = open_field();
        let mut ctx = SimulationContext::new(&maze);
        let start = ctx.body.pos;
        let input = TickInput {
            acceleration: Some(Vec2::new(10.0, 0.0)),
            ..Default::default()
        };

        let outcome = tick(&mut ctx, &maze, &input, f32::MAX);

        assert!(outcome.body.is_finite());
        assert_eq!(outcome.status, GameStatus::InProgress);
        let moved = outcome.body.pos.x - start.x;
        assert!((moved - 9.9 * MAX_FRAME_DT).abs() < 1e-4);
    }

    #[test]
    fn test_goal_detection() {
        let maze = Maze::classic();
        let mut ctx = SimulationContext::new(&maze);
        ctx.body.pos = maze.cell_center(maze.goal());
        ctx.body.vel = Vec2::new(-7.0, 4.0);

        let outcome = tick(&mut ctx, &maze, &TickInput::default(), 0.016);

        assert_eq!(outcome.status, GameStatus::Won);
    }

    #[test]
    fn test_hole_detection() {
        let maze = Maze::classic();
        let mut ctx = SimulationContext::new(&maze);
        ctx.body.pos = maze.cell_center(GridCell::new(0, 3));

        let outcome = tick(&mut ctx, &maze, &TickInput::default(), 0.016);

        assert_eq!(outcome.status, GameStatus::Lost);
    }

    #[test]
    fn test_terminal_state_stops_integration() {
        let maze = Maze::classic();
        let mut ctx = SimulationContext::new(&maze);
        ctx.status = GameStatus::Won;
        let before = ctx.body;
        let input = TickInput {
            acceleration: Some(Vec2::new(10.0, 0.0)),
            ..Default::default()
        };

        let outcome = tick(&mut ctx, &maze, &input, 0.016);

        assert_eq!(outcome.status, GameStatus::Won);
        assert_eq!(outcome.body, before);
        assert_eq!(ctx.frames, 0);
    }

    #[test]
    fn test_reset_input_restarts_terminal_game() {
        let maze = Maze::classic();
        let mut ctx = SimulationContext::new(&maze);
        ctx.status = GameStatus::Lost;
        ctx.body.pos = Vec2::new(80.0, 80.0);

        let input = TickInput {
            reset: true,
            ..Default::default()
        };
        let outcome = tick(&mut ctx, &maze, &input, 0.0);

        assert_eq!(outcome.status, GameStatus::InProgress);
        assert_eq!(outcome.body.pos, maze.start_position());
    }

    #[test]
    fn test_frame_clock() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.advance(1000.0), 0.0);
        assert!((clock.advance(1016.0) - 0.016).abs() < 1e-6);
        // Long gaps are capped
        assert_eq!(clock.advance(5000.0), MAX_FRAME_DT);
        // Clock going backwards never yields a negative delta
        assert_eq!(clock.advance(4000.0), 0.0);

        clock.reset();
        assert_eq!(clock.advance(9000.0), 0.0);
    }
}
