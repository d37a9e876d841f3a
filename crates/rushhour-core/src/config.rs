//! Simulation configuration.
//!
//! [`SimConfig`] carries every tunable of the navigation heuristics and the
//! orchestrator. It deserializes from JSON with every field optional.
//!
//! # Example
//!
//! ```
//! use rushhour_core::config::SimConfig;
//!
//! let config = SimConfig::from_json_str(r#"{ "seed": 7, "decision_chance": 1.0 }"#).unwrap();
//! assert_eq!(config.seed, 7);
//! assert_eq!(config.block_size, 4);
//! ```

use std::path::Path;

use cobble::AxisOrder;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::navigation::TurnTable;

/// Errors from loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// The config text is not valid JSON for [`SimConfig`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    /// A value is outside its allowed range.
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Tunables for a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// RNG seed
    pub seed: u64,
    /// Intersection block edge length in tiles
    pub block_size: i32,
    /// Pixel tolerance around a tile centre for intersection decisions
    pub decision_radius: i32,
    /// Probability that a decision runs when inside the window
    pub decision_chance: f32,
    /// Ticks without decisions after a committed turn
    pub cooldown_ticks: u32,
    /// Lower bound of a random brake pressure step
    pub brake_step_min: f32,
    /// Upper bound of a random brake pressure step
    pub brake_step_max: f32,
    /// Traffic speed in pixels per tick
    pub traffic_speed: i32,
    /// Player speed in pixels per tick
    pub player_speed: i32,
    /// Speed divisor while yielding to the player
    pub yield_divisor: i32,
    /// Resolver axis order
    pub axis_order: AxisOrder,
    /// Default marker lifetime in ticks
    pub marker_ttl: u32,
    /// Intersection turn rules
    pub turn_table: TurnTable,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            block_size: 4,
            decision_radius: 1,
            decision_chance: 0.5,
            cooldown_ticks: 8,
            brake_step_min: 0.05,
            brake_step_max: 0.25,
            traffic_speed: 2,
            player_speed: 2,
            yield_divisor: 2,
            axis_order: AxisOrder::XThenY,
            marker_ttl: 30,
            turn_table: TurnTable::rotary(),
        }
    }
}

impl SimConfig {
    /// Parse and validate a JSON config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`from_json_str`](Self::from_json_str).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Serialize to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if serialization fails.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check value ranges independent of any map.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.block_size < 2 {
            return Err(ConfigError::Invalid("block_size must be at least 2"));
        }
        if self.decision_radius < 0 {
            return Err(ConfigError::Invalid("decision_radius must not be negative"));
        }
        if !(0.0..=1.0).contains(&self.decision_chance) {
            return Err(ConfigError::Invalid("decision_chance must be within [0, 1]"));
        }
        if self.cooldown_ticks == 0 {
            return Err(ConfigError::Invalid("cooldown_ticks must be positive"));
        }
        if !self.brake_step_min.is_finite() || self.brake_step_min <= 0.0 {
            return Err(ConfigError::Invalid("brake_step_min must be positive and finite"));
        }
        if !self.brake_step_max.is_finite() {
            return Err(ConfigError::Invalid("brake_step_max must be finite"));
        }
        if self.brake_step_max < self.brake_step_min {
            return Err(ConfigError::Invalid(
                "brake_step_max must not be below brake_step_min",
            ));
        }
        if self.traffic_speed < 0 || self.player_speed < 0 {
            return Err(ConfigError::Invalid("speeds must not be negative"));
        }
        if self.yield_divisor < 1 {
            return Err(ConfigError::Invalid("yield_divisor must be at least 1"));
        }
        Ok(())
    }

    /// Check values that depend on the map's tile size.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the decision window does not fit
    /// inside a tile.
    pub fn validate_for_tile_size(&self, tile_size: i32) -> Result<(), ConfigError> {
        self.validate()?;
        if 2 * self.decision_radius >= tile_size {
            return Err(ConfigError::Invalid(
                "decision_radius too large for the map's tile size",
            ));
        }
        Ok(())
    }
}
