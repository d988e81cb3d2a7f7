//! Race progression
//!
//! Levels run `Waiting -> Racing -> (Waiting of the next level | Finished)`.
//! A finish-line touch only completes a level once the finish gate holds:
//! the level is running, enough time has passed, the car has driven far
//! enough and it is moving forward.

use serde::{Deserialize, Serialize};

use super::vehicle::Vehicle;
use crate::error::{ConfigError, ConfigResult, non_negative};

/// Which car: the tracked (human) side or its opponent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Primary,
    Opponent,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Primary, Side::Opponent];

    /// Slot in a two-vehicle array
    pub fn index(self) -> usize {
        match self {
            Side::Primary => 0,
            Side::Opponent => 1,
        }
    }
}

/// Level count and finish gate thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinishRules {
    level_count: u32,
    min_distance: f32,
    min_time: f32,
}

impl FinishRules {
    pub fn new(level_count: u32, min_distance: f32, min_time: f32) -> ConfigResult<Self> {
        if level_count == 0 {
            return Err(ConfigError::ZeroLevels);
        }
        Ok(Self {
            level_count,
            min_distance: non_negative("min_finish_distance", min_distance)?,
            min_time: non_negative("min_finish_time", min_time)?,
        })
    }

    pub fn level_count(&self) -> u32 {
        self.level_count
    }

    pub fn min_distance(&self) -> f32 {
        self.min_distance
    }

    pub fn min_time(&self) -> f32 {
        self.min_time
    }
}

/// Where the race is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RacePhase {
    /// Level set up, waiting for the start signal
    Waiting,
    /// Level clock running
    Racing,
    /// Someone won; frozen until acknowledged
    Finished { winner: Side },
}

/// What a valid finish did to the race
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelOutcome {
    /// The primary car cleared a non-final level
    Advanced { completed: u32, next: u32 },
    /// The race is over
    Won { winner: Side },
}

/// Level counter, level clock and phase of one race session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceProgress {
    rules: FinishRules,
    /// 1-based
    level: u32,
    started: bool,
    level_start_time: f32,
    phase: RacePhase,
}

impl RaceProgress {
    pub fn new(rules: FinishRules) -> Self {
        Self {
            rules,
            level: 1,
            started: false,
            level_start_time: 0.0,
            phase: RacePhase::Waiting,
        }
    }

    pub fn rules(&self) -> &FinishRules {
        &self.rules
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn phase(&self) -> RacePhase {
        self.phase
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_final_level(&self) -> bool {
        self.level >= self.rules.level_count
    }

    /// Start the level clock. Only valid while waiting; returns whether the
    /// level started.
    pub fn start_level(&mut self, now: f32) -> bool {
        if self.phase != RacePhase::Waiting {
            return false;
        }
        self.started = true;
        self.level_start_time = now;
        self.phase = RacePhase::Racing;
        log::info!("Level {} started", self.level);
        true
    }

    /// Seconds since the level started, 0 if it has not
    pub fn elapsed(&self, now: f32) -> f32 {
        if self.started {
            (now - self.level_start_time).max(0.0)
        } else {
            0.0
        }
    }

    /// The finish gate. Every condition must hold.
    pub fn is_ready_for_finish(&self, vehicle: &Vehicle, now: f32) -> bool {
        self.started
            && now - self.level_start_time >= self.rules.min_time
            && vehicle.total_distance() >= self.rules.min_distance
            && vehicle.velocity() > 0.0
    }

    /// Record a valid finish by `side`. The primary car advances through
    /// levels and wins on the last one; an opponent finish wins outright.
    pub fn complete_level(&mut self, side: Side) -> LevelOutcome {
        self.started = false;
        match side {
            Side::Primary if !self.is_final_level() => {
                let completed = self.level;
                self.level += 1;
                self.phase = RacePhase::Waiting;
                log::info!("Level {completed} complete, advancing to {}", self.level);
                LevelOutcome::Advanced {
                    completed,
                    next: self.level,
                }
            }
            winner => {
                self.phase = RacePhase::Finished { winner };
                log::info!("Race won by {winner:?} on level {}", self.level);
                LevelOutcome::Won { winner }
            }
        }
    }

    /// Back to level 1, waiting for the start signal
    pub fn reset(&mut self) {
        self.level = 1;
        self.started = false;
        self.level_start_time = 0.0;
        self.phase = RacePhase::Waiting;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::effects::EffectTuning;
    use crate::sim::vehicle::{VehicleSpec, car_silhouette};
    use glam::Vec2;

    fn rules() -> FinishRules {
        FinishRules::new(3, 100.0, 20.0).unwrap()
    }

    /// A car that has driven `distance` and ends at `velocity`
    fn driven_car(distance: f32, velocity: f32) -> Vehicle {
        let spec = VehicleSpec {
            start: Vec2::new(0.0, 0.0),
            start_heading: 0.0,
            max_velocity: 4.0,
            rotation_rate: 6.0,
            acceleration: 0.1,
        };
        let mut car = Vehicle::new(spec, &car_silhouette(4, 4), EffectTuning::default());
        while car.total_distance() < distance {
            car.accelerate_forward();
        }
        // Braking lands on exactly 0 when asked to stop
        while car.velocity() > velocity.max(0.0) {
            car.decelerate();
        }
        while car.velocity() > velocity + 1e-4 {
            car.accelerate_backward();
        }
        car
    }

    #[test]
    fn test_zero_levels_rejected() {
        assert!(matches!(
            FinishRules::new(0, 0.0, 0.0),
            Err(ConfigError::ZeroLevels)
        ));
        assert!(FinishRules::new(1, -1.0, 0.0).is_err());
    }

    #[test]
    fn test_start_level() {
        let mut progress = RaceProgress::new(rules());
        assert_eq!(progress.phase(), RacePhase::Waiting);
        assert_eq!(progress.elapsed(50.0), 0.0);

        assert!(progress.start_level(10.0));
        assert_eq!(progress.phase(), RacePhase::Racing);
        assert!(progress.is_started());
        assert_eq!(progress.elapsed(15.0), 5.0);

        // Already racing
        assert!(!progress.start_level(12.0));
        assert_eq!(progress.elapsed(15.0), 5.0);
    }

    #[test]
    fn test_finish_gate_requires_everything() {
        let mut progress = RaceProgress::new(rules());
        let ready = driven_car(150.0, 2.0);

        // Not started
        assert!(!progress.is_ready_for_finish(&ready, 100.0));

        progress.start_level(0.0);
        assert!(progress.is_ready_for_finish(&ready, 20.0));
        // Too early
        assert!(!progress.is_ready_for_finish(&ready, 19.9));
        // Too short
        assert!(!progress.is_ready_for_finish(&driven_car(20.0, 2.0), 30.0));
        // Stopped
        let stopped = driven_car(150.0, 0.0);
        assert_eq!(stopped.velocity(), 0.0);
        assert!(!progress.is_ready_for_finish(&stopped, 30.0));
        // Reversing
        assert!(!progress.is_ready_for_finish(&driven_car(150.0, -1.0), 30.0));
    }

    #[test]
    fn test_primary_advances_then_wins() {
        let mut progress = RaceProgress::new(rules());
        progress.start_level(0.0);
        assert_eq!(
            progress.complete_level(Side::Primary),
            LevelOutcome::Advanced { completed: 1, next: 2 }
        );
        assert_eq!(progress.phase(), RacePhase::Waiting);
        assert!(!progress.is_started());

        progress.start_level(30.0);
        progress.complete_level(Side::Primary);
        assert_eq!(progress.level(), 3);
        assert!(progress.is_final_level());

        progress.start_level(60.0);
        assert_eq!(
            progress.complete_level(Side::Primary),
            LevelOutcome::Won { winner: Side::Primary }
        );
        assert_eq!(
            progress.phase(),
            RacePhase::Finished { winner: Side::Primary }
        );
        // Frozen until reset
        assert!(!progress.start_level(70.0));

        progress.reset();
        assert_eq!(progress.level(), 1);
        assert_eq!(progress.phase(), RacePhase::Waiting);
    }

    #[test]
    fn test_opponent_finish_wins_outright() {
        let mut progress = RaceProgress::new(rules());
        progress.start_level(0.0);
        assert_eq!(
            progress.complete_level(Side::Opponent),
            LevelOutcome::Won { winner: Side::Opponent }
        );
        assert_eq!(progress.level(), 1);
    }

    #[test]
    fn test_single_level_race() {
        let mut progress = RaceProgress::new(FinishRules::new(1, 0.0, 0.0).unwrap());
        progress.start_level(0.0);
        assert_eq!(
            progress.complete_level(Side::Primary),
            LevelOutcome::Won { winner: Side::Primary }
        );
    }

    #[test]
    fn test_side_helpers() {
        assert_eq!(Side::Primary.index(), 0);
        assert_eq!(Side::Opponent.index(), 1);
    }
}
