//! Game state and core simulation types

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::maze::Maze;

/// Outcome of the current game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameStatus {
    #[default]
    InProgress,
    /// Ball reached the goal cell
    Won,
    /// Ball fell into a hole
    Lost,
}

impl GameStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }
}

/// The simulated ball
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Authoritative centre position
    pub pos: Vec2,
    /// Velocity, applied scaled by frame time
    pub vel: Vec2,
    /// One-step look-ahead left by the last wall correction (diagnostics only)
    pub next: Vec2,
}

impl Body {
    /// A ball at rest
    pub fn at_rest(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            next: Vec2::ZERO,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.pos.is_finite() && self.vel.is_finite() && self.next.is_finite()
    }
}

/// Everything one game session mutates, owned by the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationContext {
    pub body: Body,
    pub status: GameStatus,
    /// Current acceleration, decayed by friction every frame
    pub acceleration: Vec2,
    /// Frames integrated since the last reset
    pub frames: u64,
}

impl SimulationContext {
    /// Fresh session with the ball at the maze start
    pub fn new(maze: &Maze) -> Self {
        Self {
            body: Body::at_rest(maze.start_position()),
            status: GameStatus::InProgress,
            acceleration: Vec2::ZERO,
            frames: 0,
        }
    }

    /// Replace the ball and restart the game
    pub fn reset(&mut self, maze: &Maze) {
        *self = Self::new(maze);
        log::info!(
            "Game reset, ball at ({:.1}, {:.1})",
            self.body.pos.x,
            self.body.pos.y
        );
    }
}
