//! Input adapters producing the raw acceleration fed to `tick`

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::settings::Settings;

/// Front-to-back tilt range reported by the sensor (degrees)
pub const BETA_RANGE: f32 = 180.0;
/// Left-to-right tilt range reported by the sensor (degrees)
pub const GAMMA_RANGE: f32 = 90.0;

/// A device orientation reading, as sent between relay peers
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Orientation {
    /// Front-to-back tilt in degrees, [-180, 180]
    pub beta: f32,
    /// Left-to-right tilt in degrees, [-90, 90]
    pub gamma: f32,
}

impl Orientation {
    pub fn new(beta: f32, gamma: f32) -> Self {
        Self { beta, gamma }
    }

    /// Same reading with each angle forced into its sensor range (non-finite becomes level)
    pub fn clamped(&self) -> Self {
        let fix = |value: f32, range: f32| {
            if value.is_finite() {
                value.clamp(-range, range)
            } else {
                0.0
            }
        };
        Self {
            beta: fix(self.beta, BETA_RANGE),
            gamma: fix(self.gamma, GAMMA_RANGE),
        }
    }

    /// Acceleration for this tilt, assuming the device is held in portrait
    ///
    /// Full tilt maps to `max_acceleration`; screen y grows downward, so tilting the
    /// top edge away (positive beta) accelerates up.
    pub fn to_acceleration(&self, max_acceleration: f32, settings: &Settings) -> Vec2 {
        let reading = self.clamped();
        let scale = max_acceleration * settings.effective_sensitivity();
        let mut accel = Vec2::new(
            reading.gamma / GAMMA_RANGE * scale,
            -reading.beta / BETA_RANGE * scale,
        );
        if settings.invert_x {
            accel.x = -accel.x;
        }
        if settings.invert_y {
            accel.y = -accel.y;
        }
        accel
    }
}

/// Seeded random-walk tilt, for demo runs without a sensor
#[derive(Debug, Clone)]
pub struct WanderingTilt {
    rng: Pcg32,
    current: Orientation,
    /// Largest change per reading (degrees)
    max_step: f32,
}

impl WanderingTilt {
    pub fn new(seed: u64, max_step: f32) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            current: Orientation::default(),
            max_step: max_step.abs(),
        }
    }

    /// Next reading, a small random step from the previous one
    pub fn next_reading(&mut self) -> Orientation {
        if self.max_step > 0.0 {
            let step = self.max_step;
            let beta = self.current.beta + self.rng.random_range(-step..=step);
            let gamma = self.current.gamma + self.rng.random_range(-step..=step);
            self.current = Orientation::new(beta, gamma).clamped();
        }
        self.current
    }
}
