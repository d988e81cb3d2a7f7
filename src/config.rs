//! Race tuning and setup
//!
//! Loaded from JSON; any key left out falls back to the matching
//! constant in [`crate::consts`].

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{ConfigError, ConfigResult, non_negative, positive};
use crate::sim::effects::EffectTuning;
use crate::sim::progress::FinishRules;
use crate::sim::vehicle::VehicleSpec;

/// Every tunable of a race session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceConfig {
    // === Timing ===
    /// Simulation ticks per second
    pub tick_rate: f32,

    // === Progression ===
    pub level_count: u32,
    /// Distance a vehicle must have covered before a finish counts
    pub min_finish_distance: f32,
    /// Seconds since level start before a finish counts
    pub min_finish_time: f32,
    /// Begin each level immediately instead of waiting for a start input
    pub auto_start: bool,

    // === Vehicles ===
    pub max_velocity: f32,
    pub rotation_rate: f32,
    pub acceleration: f32,
    pub start_heading: f32,
    pub primary_start: (f32, f32),
    pub opponent_start: (f32, f32),
    /// Car silhouette bounding box
    pub car_size: (u32, u32),

    // === Effects ===
    pub effect_duration: f32,
    pub boost_factor: f32,
    pub trap_factor: f32,

    // === Items ===
    pub items_per_kind: usize,
    pub boost_size: (u32, u32),
    pub trap_size: (u32, u32),
    pub spawn_attempts: u32,
    /// Seed for item placement
    pub seed: u64,

    // === Path following ===
    pub waypoint_arrival_radius: f32,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            tick_rate: TICK_RATE,

            level_count: LEVEL_COUNT,
            min_finish_distance: MIN_FINISH_DISTANCE,
            min_finish_time: MIN_FINISH_TIME,
            auto_start: false,

            max_velocity: MAX_VELOCITY,
            rotation_rate: ROTATION_RATE,
            acceleration: ACCELERATION,
            start_heading: START_HEADING,
            primary_start: PRIMARY_START,
            opponent_start: OPPONENT_START,
            car_size: CAR_SIZE,

            effect_duration: EFFECT_DURATION,
            boost_factor: BOOST_FACTOR,
            trap_factor: TRAP_FACTOR,

            items_per_kind: ITEMS_PER_KIND,
            boost_size: ITEM_SIZE,
            trap_size: ITEM_SIZE,
            spawn_attempts: SPAWN_ATTEMPTS,
            seed: 0,

            waypoint_arrival_radius: WAYPOINT_ARRIVAL_RADIUS,
        }
    }
}

impl RaceConfig {
    /// Parse and validate a JSON config
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config
            .validate()
            .inspect_err(|e| log::warn!("Rejected race config: {e}"))?;
        Ok(config)
    }

    /// Read and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded race config from {}", path.display());
        Ok(config)
    }

    /// Reject configurations the simulation cannot run
    pub fn validate(&self) -> ConfigResult<()> {
        positive("tick_rate", self.tick_rate)?;
        positive("max_velocity", self.max_velocity)?;
        positive("acceleration", self.acceleration)?;
        positive("boost_factor", self.boost_factor)?;
        positive("trap_factor", self.trap_factor)?;
        non_negative("rotation_rate", self.rotation_rate)?;
        non_negative("effect_duration", self.effect_duration)?;
        non_negative("waypoint_arrival_radius", self.waypoint_arrival_radius)?;
        if !self.start_heading.is_finite() {
            return Err(ConfigError::OutOfRange {
                name: "start_heading",
                value: self.start_heading,
                range: "finite",
            });
        }
        self.finish_rules()?;
        Ok(())
    }

    /// Seconds per tick
    pub fn dt(&self) -> f32 {
        1.0 / self.tick_rate
    }

    /// Progression constants for [`crate::sim::RaceProgress`]
    pub fn finish_rules(&self) -> ConfigResult<FinishRules> {
        FinishRules::new(
            self.level_count,
            self.min_finish_distance,
            self.min_finish_time,
        )
    }

    pub fn effect_tuning(&self) -> EffectTuning {
        EffectTuning {
            duration: self.effect_duration,
            boost_factor: self.boost_factor,
            trap_factor: self.trap_factor,
        }
    }

    pub fn primary_spec(&self) -> VehicleSpec {
        self.vehicle_spec(self.primary_start)
    }

    pub fn opponent_spec(&self) -> VehicleSpec {
        self.vehicle_spec(self.opponent_start)
    }

    fn vehicle_spec(&self, start: (f32, f32)) -> VehicleSpec {
        VehicleSpec {
            start: Vec2::new(start.0, start.1),
            start_heading: self.start_heading,
            max_velocity: self.max_velocity,
            rotation_rate: self.rotation_rate,
            acceleration: self.acceleration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(RaceConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = RaceConfig::from_json_str(r#"{ "level_count": 5, "seed": 42 }"#).unwrap();
        assert_eq!(config.level_count, 5);
        assert_eq!(config.seed, 42);
        assert_eq!(config.max_velocity, MAX_VELOCITY);
        assert_eq!(config.trap_size, ITEM_SIZE);
    }

    #[test]
    fn test_zero_levels_rejected() {
        let err = RaceConfig::from_json_str(r#"{ "level_count": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroLevels));
    }

    #[test]
    fn test_bad_values_rejected() {
        let config = RaceConfig {
            tick_rate: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = RaceConfig {
            min_finish_time: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_json() {
        let err = RaceConfig::from_json_str("{ level_count: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = RaceConfig::load("/nonexistent/race.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_json_round_trip_preserves_values() {
        let config = RaceConfig {
            auto_start: true,
            seed: 7,
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(RaceConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_specs_use_start_positions() {
        let config = RaceConfig::default();
        assert_eq!(config.primary_spec().start, Vec2::new(490.0, 10.0));
        assert_eq!(config.opponent_spec().start, Vec2::new(490.0, 50.0));
        assert!((config.dt() - SIM_DT).abs() < 1e-9);
    }
}
