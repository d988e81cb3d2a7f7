//! Per-tick driving intent
//!
//! A [`Controller`] looks at its vehicle (and, for a human, the held keys)
//! and decides how to steer and throttle this tick. The vehicle itself has
//! no idea who is driving it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::vehicle::Vehicle;
use crate::{normalize_degrees, shortest_angle_delta};

/// Steering for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Steer {
    Left,
    Right,
    #[default]
    Straight,
}

/// Throttle for one tick. `Coast` actively sheds speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Throttle {
    Forward,
    Reverse,
    #[default]
    Coast,
}

/// What a controller wants its vehicle to do this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Intent {
    pub steer: Steer,
    pub throttle: Throttle,
}

impl Intent {
    pub const COAST: Self = Self {
        steer: Steer::Straight,
        throttle: Throttle::Coast,
    };
    pub const ACCELERATE: Self = Self {
        steer: Steer::Straight,
        throttle: Throttle::Forward,
    };
    pub const BRAKE: Self = Self {
        steer: Steer::Straight,
        throttle: Throttle::Reverse,
    };
    pub const LEFT_AND_ACCELERATE: Self = Self {
        steer: Steer::Left,
        throttle: Throttle::Forward,
    };
    pub const RIGHT_AND_ACCELERATE: Self = Self {
        steer: Steer::Right,
        throttle: Throttle::Forward,
    };
}

/// Snapshot of the driving keys, polled once per tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KeyState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

/// A source of per-tick intent for one vehicle
pub trait Controller {
    /// Decide this tick's intent
    fn intent(&mut self, vehicle: &Vehicle, keys: &KeyState) -> Intent;

    /// Called whenever the controlled vehicle is sent back to the start
    fn reset(&mut self) {}
}

/// Keyboard driver
#[derive(Debug, Clone, Copy, Default)]
pub struct HumanController;

impl Controller for HumanController {
    fn intent(&mut self, _vehicle: &Vehicle, keys: &KeyState) -> Intent {
        // Opposing keys cancel out
        let steer = match (keys.left, keys.right) {
            (true, false) => Steer::Left,
            (false, true) => Steer::Right,
            _ => Steer::Straight,
        };
        let throttle = match (keys.forward, keys.backward) {
            (true, false) => Throttle::Forward,
            (false, true) => Throttle::Reverse,
            _ => Throttle::Coast,
        };
        Intent { steer, throttle }
    }
}

/// Steers toward a fixed sequence of waypoints, at full throttle
#[derive(Debug, Clone)]
pub struct PathFollower {
    waypoints: Vec<Vec2>,
    cursor: usize,
    finished: bool,
    arrival_radius: f32,
}

impl PathFollower {
    pub fn new(waypoints: Vec<Vec2>, arrival_radius: f32) -> Self {
        let finished = waypoints.is_empty();
        Self {
            waypoints,
            cursor: 0,
            finished,
            arrival_radius,
        }
    }

    /// Index of the waypoint currently being chased (or last reached)
    pub fn current_index(&self) -> usize {
        self.cursor
    }

    /// True once the last waypoint has been reached
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn waypoints(&self) -> &[Vec2] {
        &self.waypoints
    }

    /// Heading (degrees) that points the vehicle from `from` at `to`
    fn bearing(from: Vec2, to: Vec2) -> f32 {
        let d = to - from;
        // Forward is (-sin h, -cos h)
        normalize_degrees((-d.x).atan2(-d.y).to_degrees())
    }
}

impl Controller for PathFollower {
    fn intent(&mut self, vehicle: &Vehicle, _keys: &KeyState) -> Intent {
        if self.finished {
            return Intent::COAST;
        }

        let position = vehicle.position();
        if position.distance(self.waypoints[self.cursor]) < self.arrival_radius {
            if self.cursor + 1 >= self.waypoints.len() {
                log::debug!("Path follower reached final waypoint {}", self.cursor);
                self.finished = true;
                return Intent::COAST;
            }
            self.cursor += 1;
        }

        let desired = Self::bearing(position, self.waypoints[self.cursor]);
        let delta = shortest_angle_delta(vehicle.heading(), desired);
        let steer = if delta > 0.0 {
            Steer::Left
        } else if delta < 0.0 {
            Steer::Right
        } else {
            Steer::Straight
        };
        Intent {
            steer,
            throttle: Throttle::Forward,
        }
    }

    fn reset(&mut self) {
        self.cursor = 0;
        self.finished = self.waypoints.is_empty();
    }
}

/// What an external decision process sees each tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub x: f32,
    pub y: f32,
    pub velocity: f32,
    /// Degrees in [0, 360)
    pub heading: f32,
    pub total_distance: f32,
}

impl Observation {
    pub fn from_vehicle(vehicle: &Vehicle) -> Self {
        let position = vehicle.position();
        Self {
            x: position.x,
            y: position.y,
            velocity: vehicle.velocity(),
            heading: normalize_degrees(vehicle.heading()),
            total_distance: vehicle.total_distance(),
        }
    }

    /// `[x, y, velocity, heading, total_distance]`
    pub fn to_array(&self) -> [f32; 5] {
        [
            self.x,
            self.y,
            self.velocity,
            self.heading,
            self.total_distance,
        ]
    }
}

/// The discrete actions an external policy can choose from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum PolicyAction {
    Coast = 0,
    Forward = 1,
    LeftForward = 2,
    RightForward = 3,
}

impl PolicyAction {
    pub const COUNT: usize = 4;

    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(Self::Coast),
            1 => Some(Self::Forward),
            2 => Some(Self::LeftForward),
            3 => Some(Self::RightForward),
            _ => None,
        }
    }

    pub fn intent(self) -> Intent {
        match self {
            Self::Coast => Intent::COAST,
            Self::Forward => Intent::ACCELERATE,
            Self::LeftForward => Intent::LEFT_AND_ACCELERATE,
            Self::RightForward => Intent::RIGHT_AND_ACCELERATE,
        }
    }
}

/// An outside decision process: observation in, action index out
pub trait Policy {
    fn select_action(&mut self, observation: &Observation) -> i64;
}

impl<F> Policy for F
where
    F: FnMut(&Observation) -> i64,
{
    fn select_action(&mut self, observation: &Observation) -> i64 {
        self(observation)
    }
}

/// Adapts a [`Policy`] to the [`Controller`] interface
#[derive(Debug, Clone)]
pub struct PolicyController<P> {
    policy: P,
    last_action: Option<PolicyAction>,
}

impl<P: Policy> PolicyController<P> {
    pub fn new(policy: P) -> Self {
        Self {
            policy,
            last_action: None,
        }
    }

    /// The action applied on the most recent tick
    pub fn last_action(&self) -> Option<PolicyAction> {
        self.last_action
    }
}

impl<P: Policy> Controller for PolicyController<P> {
    fn intent(&mut self, vehicle: &Vehicle, _keys: &KeyState) -> Intent {
        let observation = Observation::from_vehicle(vehicle);
        let index = self.policy.select_action(&observation);
        let action = PolicyAction::from_index(index).unwrap_or_else(|| {
            log::debug!("Policy chose out-of-range action {index}, coasting");
            PolicyAction::Coast
        });
        self.last_action = Some(action);
        action.intent()
    }
}
