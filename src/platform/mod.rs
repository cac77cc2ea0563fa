//! Platform abstraction layer
//!
//! Turns device input into simulation input:
//! - Device orientation (beta/gamma) to acceleration
//! - Seeded wandering tilt for headless runs

pub mod input;

pub use input::{Orientation, WanderingTilt};
