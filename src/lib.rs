//! Mask Racer - a two-car track racing simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (kinematics, mask collisions, race progression)
//! - `config`: Data-driven race tuning loaded from JSON
//! - `error`: Construction-time configuration errors

pub mod config;
pub mod error;
pub mod sim;

pub use config::RaceConfig;
pub use error::ConfigError;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation rate (ticks per second)
    pub const TICK_RATE: f32 = 60.0;
    /// Fixed simulation timestep
    pub const SIM_DT: f32 = 1.0 / TICK_RATE;

    /// Below this speed a vehicle snaps to rest instead of drifting
    pub const VELOCITY_EPSILON: f32 = 0.01;

    /// Vehicle defaults
    pub const MAX_VELOCITY: f32 = 4.0;
    pub const ROTATION_RATE: f32 = 6.0; // degrees per tick
    pub const ACCELERATION: f32 = 0.1; // velocity per tick
    pub const START_HEADING: f32 = 270.0; // degrees, facing +x
    pub const PRIMARY_START: (f32, f32) = (490.0, 10.0);
    pub const OPPONENT_START: (f32, f32) = (490.0, 50.0);
    pub const CAR_SIZE: (u32, u32) = (16, 28); // silhouette width x height

    /// Pickup effects
    pub const EFFECT_DURATION: f32 = 3.0; // seconds
    pub const BOOST_FACTOR: f32 = 1.3;
    pub const TRAP_FACTOR: f32 = 0.7;

    /// Race progression
    pub const LEVEL_COUNT: u32 = 3;
    pub const MIN_FINISH_DISTANCE: f32 = 5000.0; // pixels travelled per level gate
    pub const MIN_FINISH_TIME: f32 = 20.0; // seconds since level start

    /// Path following
    pub const WAYPOINT_ARRIVAL_RADIUS: f32 = 20.0;

    /// Item placement
    pub const SPAWN_ATTEMPTS: u32 = 1000;
    pub const ITEMS_PER_KIND: usize = 5;
    pub const ITEM_SIZE: (u32, u32) = (25, 15);
}

/// Normalize an angle in degrees to [0, 360)
#[inline]
pub fn normalize_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Signed shortest rotation from `from` to `to`, in degrees, within (-180, 180]
#[inline]
pub fn shortest_angle_delta(from: f32, to: f32) -> f32 {
    let delta = normalize_degrees(to - from);
    if delta > 180.0 { delta - 360.0 } else { delta }
}
