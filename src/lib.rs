//! Tilt Maze - steer a ball through a maze of walls and holes by tilting the device
//!
//! Core modules:
//! - `sim`: Frame-driven simulation (geometry, maze model, collision, game state)
//! - `tuning`: Data-driven geometry and physics constants
//! - `settings`: Player preferences
//! - `platform`: Browser/native input adapters
//! - `relay`: WebSocket relay forwarding tilt data between peers (native only)

pub mod platform;
#[cfg(not(target_arch = "wasm32"))]
pub mod relay;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use settings::Settings;
pub use tuning::{ConfigError, Tuning};

/// Game configuration constants
pub mod consts {
    /// Width of one grid cell (a path between two walls)
    pub const PATH_WIDTH: f32 = 25.0;
    /// Wall thickness; wall end-caps have radius `WALL_WIDTH / 2`
    pub const WALL_WIDTH: f32 = 10.0;
    /// Ball diameter
    pub const BALL_SIZE: f32 = 10.0;
    /// Side of the square hole region, centred in its cell
    pub const HOLE_SIZE: f32 = 18.0;

    /// Bound for both acceleration and velocity, per axis
    pub const MAX_ACCELERATION: f32 = 10.0;
    /// Amount acceleration decays toward zero every frame
    pub const FRICTION: f32 = 0.1;

    /// Largest frame delta fed to the simulation (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Nominal frame delta for headless runs (seconds)
    pub const FRAME_DT: f32 = 1.0 / 60.0;
}
