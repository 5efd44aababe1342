//=========================================================================
// Engine Configuration
//=========================================================================
//
// Serializable engine settings, loadable from TOML.
//
// Sections:
//   [window]   title / width / height
//   [physics]  gravity / timestep / velocity + position iterations
//   [input]    channel capacity / per-frame drain bound / axis dead zone
//
// Missing fields fall back to defaults, so a config file only needs to
// name what it overrides.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

//=== ConfigError =========================================================

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// TOML was malformed or had wrong types.
    #[error("failed to parse config: {0}")]
    Parse(String),

    /// Config could not be rendered back to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(String),

    /// A value was parsed but is out of range.
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

//=== WindowConfig ========================================================

/// Window creation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Keystone Engine".to_string(),
            width: 800,
            height: 600,
        }
    }
}

//=== PhysicsConfig =======================================================

/// Fixed-step physics parameters.
///
/// The step is applied once per frame regardless of measured frame time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// World gravity in m/s².
    pub gravity: [f32; 2],

    /// Fixed step duration in seconds.
    pub timestep: f32,

    /// Constraint solver velocity iterations per step.
    pub velocity_iterations: usize,

    /// Position stabilization iterations per step.
    pub position_iterations: usize,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: [0.0, -10.0],
            timestep: 1.0 / 60.0,
            velocity_iterations: 6,
            position_iterations: 2,
        }
    }
}

//=== InputConfig =========================================================

/// Input pipeline parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Capacity of the platform → core event channel.
    pub channel_capacity: usize,

    /// Upper bound of events drained per frame (prevents starvation).
    pub max_events_per_frame: usize,

    /// Controller axis values below this magnitude read as zero.
    pub axis_dead_zone: f32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 256,
            max_events_per_frame: 128,
            axis_dead_zone: 0.15,
        }
    }
}

//=== EngineConfig ========================================================

/// Complete engine configuration.
///
/// # Example
///
/// ```
/// use keystone_engine::config::EngineConfig;
///
/// let config = EngineConfig::from_toml_str(r#"
///     [window]
///     title = "Demo"
///
///     [physics]
///     velocity_iterations = 8
/// "#).unwrap();
///
/// assert_eq!(config.window.title, "Demo");
/// assert_eq!(config.window.width, 800);
/// assert_eq!(config.physics.velocity_iterations, 8);
/// assert_eq!(config.physics.position_iterations, 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub window: WindowConfig,
    pub physics: PhysicsConfig,
    pub input: InputConfig,
}

impl EngineConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Renders the configuration as pretty TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Rejects values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid {
                field: "window.width/height",
                reason: format!("{}x{} has a zero dimension", self.window.width, self.window.height),
            });
        }
        if !(self.physics.timestep > 0.0) {
            return Err(ConfigError::Invalid {
                field: "physics.timestep",
                reason: format!("must be positive, got {}", self.physics.timestep),
            });
        }
        if self.physics.velocity_iterations == 0 {
            return Err(ConfigError::Invalid {
                field: "physics.velocity_iterations",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.input.channel_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "input.channel_capacity",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.input.max_events_per_frame == 0 {
            return Err(ConfigError::Invalid {
                field: "input.max_events_per_frame",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_fixed_step_contract() {
        let config = EngineConfig::default();
        assert_eq!(config.physics.timestep, 1.0 / 60.0);
        assert_eq!(config.physics.velocity_iterations, 6);
        assert_eq!(config.physics.position_iterations, 2);
        assert_eq!(config.physics.gravity, [0.0, -10.0]);
    }

    #[test]
    fn empty_document_yields_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            [window]
            width = 1280
            height = 720

            [input]
            axis_dead_zone = 0.2
            "#,
        )
        .unwrap();

        assert_eq!(config.window.width, 1280);
        assert_eq!(config.window.height, 720);
        assert_eq!(config.window.title, "Keystone Engine");
        assert_eq!(config.input.axis_dead_zone, 0.2);
        assert_eq!(config.input.channel_capacity, 256);
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = EngineConfig::from_toml_str("[window\nwidth = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn wrong_type_is_parse_error() {
        let err = EngineConfig::from_toml_str("[window]\nwidth = \"wide\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn zero_timestep_is_rejected() {
        let err = EngineConfig::from_toml_str("[physics]\ntimestep = 0.0").unwrap_err();
        match err {
            ConfigError::Invalid { field, .. } => assert_eq!(field, "physics.timestep"),
            other => panic!("Expected Invalid, got {:?}", other),
        }
    }

    #[test]
    fn zero_window_dimension_is_rejected() {
        let err = EngineConfig::from_toml_str("[window]\nheight = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn serialized_config_parses_back() {
        let mut config = EngineConfig::default();
        config.window.title = "Round".to_string();
        config.physics.velocity_iterations = 10;

        let text = config.to_toml_string().unwrap();
        let parsed = EngineConfig::from_toml_str(&text).unwrap();

        assert_eq!(parsed, config);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = EngineConfig::load("/definitely/not/here/keystone.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
