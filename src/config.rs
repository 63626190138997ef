//! World configuration
//!
//! World units are independent of the pixel size of the canvas; the viewport
//! scales one onto the other at draw time.

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_FRAME_TIME, MAX_SUBSTEPS, SIM_DT};
use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// World bounds in simulation units
    pub width: f32,
    pub height: f32,
    /// Fixed simulation step (seconds)
    pub step: f32,
    /// Canvas size in pixels
    pub screen_width: f32,
    pub screen_height: f32,
    /// Most fixed steps run per frame
    pub max_substeps: u32,
    /// Longest wall-clock delta banked per frame (seconds)
    pub max_frame_time: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 500.0,
            height: 500.0,
            step: SIM_DT,
            screen_width: 500.0,
            screen_height: 500.0,
            max_substeps: MAX_SUBSTEPS,
            max_frame_time: MAX_FRAME_TIME,
        }
    }
}

impl WorldConfig {
    /// Parse and validate. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: WorldConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("width", self.width),
            ("height", self.height),
            ("step", self.step),
            ("screen_width", self.screen_width),
            ("screen_height", self.screen_height),
            ("max_frame_time", self.max_frame_time),
        ];
        for (name, value) in positive {
            if !(value > 0.0 && value.is_finite()) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if self.max_substeps == 0 {
            return Err(ConfigError::Invalid("max_substeps must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = WorldConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.step - 1.0 / 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = WorldConfig::from_json(r#"{ "width": 21, "height": 30 }"#).unwrap();
        assert_eq!(config.width, 21.0);
        assert_eq!(config.height, 30.0);
        assert_eq!(config.screen_width, 500.0);
        assert_eq!(config.max_substeps, MAX_SUBSTEPS);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            WorldConfig::from_json(r#"{ "step": 0 }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            WorldConfig::from_json(r#"{ "max_substeps": 0 }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            WorldConfig::from_json("{ width: }"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_json_round_trip() {
        let config = WorldConfig {
            width: 21.0,
            height: 30.0,
            ..Default::default()
        };
        let json = config.to_json().unwrap();
        assert_eq!(WorldConfig::from_json(&json).unwrap(), config);
    }
}
