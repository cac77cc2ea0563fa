//! Player preferences
//!
//! Persisted in LocalStorage on the web, defaults natively.

use serde::{Deserialize, Serialize};

use crate::tuning::ConfigError;

/// Tilt control preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Multiplier applied to the tilt-derived acceleration
    pub sensitivity: f32,
    /// Flip left/right tilt
    pub invert_x: bool,
    /// Flip forward/back tilt
    pub invert_y: bool,
    /// Move the on-screen joystick head with the tilt
    pub show_joystick: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sensitivity: 1.0,
            invert_x: false,
            invert_y: false,
            show_joystick: true,
        }
    }
}

impl Settings {
    /// Sensitivity usable as a multiplier (invalid values fall back to 1)
    pub fn effective_sensitivity(&self) -> f32 {
        if self.sensitivity.is_finite() && self.sensitivity > 0.0 {
            self.sensitivity
        } else {
            1.0
        }
    }

    /// Parse stored preferences; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Preferences persisted in LocalStorage, defaults when absent or unreadable
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let stored = local_storage()
            .and_then(|storage| storage.get_item(STORAGE_KEY).ok().flatten());
        match stored.as_deref().map(Self::from_json) {
            Some(Ok(settings)) => {
                log::info!("Loaded settings from LocalStorage");
                settings
            }
            Some(Err(e)) => {
                log::warn!("Discarding stored settings: {}", e);
                Self::default()
            }
            None => Self::default(),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    /// Persist to LocalStorage; failures are logged and otherwise ignored
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let Some(storage) = local_storage() else {
            log::warn!("LocalStorage unavailable, settings not saved");
            return;
        };
        match serde_json::to_string(self) {
            Ok(json) => {
                if storage.set_item(STORAGE_KEY, &json).is_err() {
                    log::warn!("LocalStorage rejected settings");
                }
            }
            Err(e) => log::warn!("Settings not serializable: {}", e),
        }
    }
}

#[cfg(target_arch = "wasm32")]
const STORAGE_KEY: &str = "tilt_maze_settings";

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: Settings = serde_json::from_str(r#"{ "invert_y": true }"#).unwrap();
        assert!(settings.invert_y);
        assert_eq!(settings.sensitivity, 1.0);
        assert!(settings.show_joystick);
    }

    #[test]
    fn test_stored_settings_roundtrip() {
        let settings = Settings {
            sensitivity: 0.5,
            invert_x: true,
            invert_y: false,
            show_joystick: false,
        };
        let json = serde_json::to_string(&settings).unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), settings);
    }

    #[test]
    fn test_corrupt_settings_are_a_parse_error() {
        assert!(matches!(
            Settings::from_json("{ \"sensitivity\": "),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_effective_sensitivity() {
        let mut settings = Settings {
            sensitivity: 1.5,
            ..Default::default()
        };
        assert_eq!(settings.effective_sensitivity(), 1.5);
        settings.sensitivity = -2.0;
        assert_eq!(settings.effective_sensitivity(), 1.0);
        settings.sensitivity = f32::NAN;
        assert_eq!(settings.effective_sensitivity(), 1.0);
    }
}
