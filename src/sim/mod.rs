//! Maze simulation module
//!
//! All gameplay logic lives here. This module must stay free of platform code:
//! - One synchronous `tick` per animation frame, driven by the caller
//! - Stable wall iteration order (layout order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod geometry;
pub mod maze;
pub mod state;
pub mod tick;

pub use collision::{CollisionResult, ball_wall_collision, overlaps_unit, resolve_walls, roll_around_cap};
pub use geometry::{angle, clamp_magnitude, decay_toward_zero, distance};
pub use maze::{Aabb, GridCell, Maze, MazeLayout, WallCap, WallSegment, WallUnit};
pub use state::{Body, GameStatus, SimulationContext};
pub use tick::{FrameClock, TickInput, TickOutcome, tick};
