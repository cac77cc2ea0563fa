//! Data-driven geometry and physics constants
//!
//! One `Tuning` is bound to a maze and read by both the maze model and the
//! collision resolver, so the coordinate system is always shared.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Errors raised while loading tuning or maze layout data
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The input was not valid JSON for the expected shape
    Parse(String),
    /// The input parsed but describes an unusable configuration
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "PARSE_ERROR: {}", msg),
            Self::Invalid(msg) => write!(f, "INVALID_CONFIG: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Geometry and physics constants for one maze session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Grid cell side length
    pub path_width: f32,
    /// Wall thickness (cap radius is half of this)
    pub wall_width: f32,
    /// Ball diameter
    pub ball_size: f32,
    /// Hole square side
    pub hole_size: f32,
    /// Per-axis bound shared by acceleration and velocity
    pub max_acceleration: f32,
    /// Per-frame acceleration decay
    pub friction: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            path_width: PATH_WIDTH,
            wall_width: WALL_WIDTH,
            ball_size: BALL_SIZE,
            hole_size: HOLE_SIZE,
            max_acceleration: MAX_ACCELERATION,
            friction: FRICTION,
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Check every constant is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("path_width", self.path_width),
            ("wall_width", self.wall_width),
            ("ball_size", self.ball_size),
            ("hole_size", self.hole_size),
            ("max_acceleration", self.max_acceleration),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{} must be finite and positive, got {}",
                    name, value
                )));
            }
        }
        if !self.friction.is_finite() || self.friction < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "friction must be finite and non-negative, got {}",
                self.friction
            )));
        }
        if self.hole_size >= self.path_width {
            return Err(ConfigError::Invalid(format!(
                "hole_size {} must be smaller than path_width {}",
                self.hole_size, self.path_width
            )));
        }
        if self.wall_width + self.ball_size >= self.path_width {
            return Err(ConfigError::Invalid(format!(
                "ball ({}) does not fit between walls ({}) on a {} path",
                self.ball_size, self.wall_width, self.path_width
            )));
        }
        Ok(())
    }

    #[inline]
    pub fn ball_radius(&self) -> f32 {
        self.ball_size / 2.0
    }

    #[inline]
    pub fn cap_radius(&self) -> f32 {
        self.wall_width / 2.0
    }

    /// Minimum centre-to-cap separation between ball and wall
    #[inline]
    pub fn closest_distance(&self) -> f32 {
        self.cap_radius() + self.ball_radius()
    }

    /// Load tuning from a JSON file (native only)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Parse(format!("{}: {}", path.display(), e)))?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }
}
