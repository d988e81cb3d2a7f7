//! Vehicle kinematics
//!
//! Heading is in degrees with screen-space conventions: heading 0 faces -y,
//! increasing heading turns left (counter-clockwise on screen). Velocity is
//! a signed scalar along the heading.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use super::controller::{Intent, Steer, Throttle};
use super::effects::{EffectKind, EffectStack, EffectTuning};
use super::mask::Mask;
use crate::consts::VELOCITY_EPSILON;
use crate::normalize_degrees;

/// Fixed per-vehicle parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehicleSpec {
    pub start: Vec2,
    pub start_heading: f32,
    /// Top speed with no effects active
    pub max_velocity: f32,
    /// Degrees turned per rotate call
    pub rotation_rate: f32,
    /// Velocity change per accelerate call
    pub acceleration: f32,
}

/// Read-only placement for display
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec2,
    /// Degrees in [0, 360)
    pub heading: f32,
}

/// A car rectangle with its corner pixels clipped
pub fn car_silhouette(width: u32, height: u32) -> Mask {
    let (w, h) = (width as i32, height as i32);
    Mask::from_fn(width, height, |x, y| {
        let corner_x = x == 0 || x == w - 1;
        let corner_y = y == 0 || y == h - 1;
        !(corner_x && corner_y)
    })
}

/// One car on the track
#[derive(Debug, Clone)]
pub struct Vehicle {
    spec: VehicleSpec,
    position: Vec2,
    last_position: Vec2,
    heading: f32,
    velocity: f32,
    /// Top speed after effects
    max_velocity: f32,
    total_distance: f32,
    /// Silhouette edge, computed once
    shape: Mask,
    effects: EffectStack,
}

impl Vehicle {
    /// Place a vehicle at its start. The collision shape is the outline of
    /// `silhouette`.
    pub fn new(spec: VehicleSpec, silhouette: &Mask, tuning: EffectTuning) -> Self {
        let shape = silhouette.outline();
        log::debug!(
            "Vehicle at {} with {}x{} silhouette ({} edge px)",
            spec.start,
            shape.width(),
            shape.height(),
            shape.count()
        );
        Self {
            spec,
            position: spec.start,
            last_position: spec.start,
            heading: spec.start_heading,
            velocity: 0.0,
            max_velocity: spec.max_velocity,
            total_distance: 0.0,
            shape,
            effects: EffectStack::new(tuning),
        }
    }

    // === Accessors ===

    pub fn spec(&self) -> &VehicleSpec {
        &self.spec
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn last_position(&self) -> Vec2 {
        self.last_position
    }

    /// Raw heading in degrees (unbounded)
    pub fn heading(&self) -> f32 {
        self.heading
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn max_velocity(&self) -> f32 {
        self.max_velocity
    }

    pub fn total_distance(&self) -> f32 {
        self.total_distance
    }

    pub fn shape(&self) -> &Mask {
        &self.shape
    }

    pub fn effects(&self) -> &EffectStack {
        &self.effects
    }

    pub fn pose(&self) -> Pose {
        Pose {
            position: self.position,
            heading: normalize_degrees(self.heading),
        }
    }

    // === Kinematics ===

    /// Turn by one rotation step
    pub fn rotate(&mut self, steer: Steer) {
        match steer {
            Steer::Left => self.heading += self.spec.rotation_rate,
            Steer::Right => self.heading -= self.spec.rotation_rate,
            Steer::Straight => {}
        }
    }

    /// Speed up toward the top speed, then move
    pub fn accelerate_forward(&mut self) {
        self.velocity = (self.velocity + self.spec.acceleration).min(self.max_velocity);
        self.integrate();
    }

    /// Speed up in reverse toward half the top speed, then move
    pub fn accelerate_backward(&mut self) {
        self.velocity = (self.velocity - self.spec.acceleration).max(-self.max_velocity / 2.0);
        self.integrate();
    }

    /// Shed speed toward zero; keep rolling while there is any left
    pub fn decelerate(&mut self) {
        let step = self.spec.acceleration / 2.0;
        if self.velocity > 0.0 {
            self.velocity = (self.velocity - step).max(0.0);
        } else if self.velocity < 0.0 {
            self.velocity = (self.velocity + step).min(0.0);
        }
        if self.velocity.abs() > VELOCITY_EPSILON {
            self.integrate();
        }
    }

    /// Move one step along the heading. Near-zero speed snaps to rest.
    pub fn integrate(&mut self) {
        if self.velocity.abs() < VELOCITY_EPSILON {
            self.velocity = 0.0;
            return;
        }
        self.last_position = self.position;

        let radians = self.heading.to_radians();
        let displacement = Vec2::new(-radians.sin(), -radians.cos()) * self.velocity;
        self.position += displacement;
        self.total_distance += displacement.length();
    }

    /// Reverse direction and immediately step away from the contact
    pub fn bounce(&mut self) {
        self.velocity = -self.velocity;
        self.integrate();
    }

    /// Carry out one tick of controller intent: steer first, then throttle
    pub fn apply_intent(&mut self, intent: Intent) {
        self.rotate(intent.steer);
        match intent.throttle {
            Throttle::Forward => self.accelerate_forward(),
            Throttle::Reverse => self.accelerate_backward(),
            Throttle::Coast => self.decelerate(),
        }
    }

    /// Back to the start line at rest, facing the start heading, with no
    /// effects. Distance travelled is kept.
    pub fn reset(&mut self) {
        self.position = self.spec.start;
        self.last_position = self.spec.start;
        self.heading = self.spec.start_heading;
        self.velocity = 0.0;
        self.effects.clear();
        self.refresh_max_velocity();
    }

    /// Stamp the current position as the last settled one
    pub fn settle(&mut self) {
        self.last_position = self.position;
    }

    // === Effects ===

    pub fn apply_effect(&mut self, kind: EffectKind, now: f32) {
        self.effects.apply(kind, now);
        self.refresh_max_velocity();
    }

    /// Expire old effects; the speed bound is only recomputed if the stack changed
    pub fn clear_expired_effects(&mut self, now: f32) {
        if self.effects.clear_expired(now) {
            self.refresh_max_velocity();
        }
    }

    fn refresh_max_velocity(&mut self) {
        self.max_velocity = self.spec.max_velocity * self.effects.multiplier();
        self.velocity = self.velocity.clamp(-self.max_velocity, self.max_velocity);
    }

    // === Collision ===

    /// First overlapping pixel between this vehicle's shape and `mask`
    /// placed with its top-left corner at `origin` in track space.
    pub fn collide(&self, mask: &Mask, origin: Vec2) -> Option<IVec2> {
        let offset = IVec2::new(
            (self.position.x - origin.x) as i32,
            (self.position.y - origin.y) as i32,
        );
        mask.overlap(&self.shape, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn test_vehicle() -> Vehicle {
        let spec = VehicleSpec {
            start: Vec2::new(100.0, 100.0),
            start_heading: 0.0,
            max_velocity: 4.0,
            rotation_rate: 6.0,
            acceleration: 0.1,
        };
        Vehicle::new(spec, &car_silhouette(16, 28), EffectTuning::default())
    }

    #[test]
    fn test_coast_from_rest_stays_put() {
        let mut car = test_vehicle();
        for _ in 0..10 {
            car.apply_intent(Intent::COAST);
        }
        assert_eq!(car.position(), Vec2::new(100.0, 100.0));
        assert_eq!(car.total_distance(), 0.0);
        assert_eq!(car.velocity(), 0.0);
    }

    #[test]
    fn test_accelerate_is_capped() {
        let mut car = test_vehicle();
        let mut last_distance = 0.0;
        for i in 1..=60 {
            car.accelerate_forward();
            let expected = (i as f32 * 0.1).min(4.0);
            assert!((car.velocity() - expected).abs() < 1e-4, "tick {i}");
            assert!(car.total_distance() > last_distance);
            last_distance = car.total_distance();
        }
        assert_eq!(car.velocity(), 4.0);
    }

    #[test]
    fn test_heading_zero_moves_up() {
        let mut car = test_vehicle();
        car.accelerate_forward();
        let p = car.position();
        assert!((p.x - 100.0).abs() < 1e-5);
        assert!((p.y - 99.9).abs() < 1e-5);
    }

    #[test]
    fn test_heading_270_moves_right() {
        let mut car = test_vehicle();
        car.heading = 270.0;
        car.velocity = 2.0;
        car.integrate();
        assert!((car.position().x - 102.0).abs() < 1e-4);
        assert!((car.position().y - 100.0).abs() < 1e-4);
    }

    #[test]
    fn test_reverse_is_capped_at_half() {
        let mut car = test_vehicle();
        for _ in 0..100 {
            car.accelerate_backward();
        }
        assert!((car.velocity() + 2.0).abs() < 1e-5);
        // Moving backwards still adds distance
        assert!(car.total_distance() > 0.0);
    }

    #[test]
    fn test_micro_velocity_snaps_to_rest() {
        let mut car = test_vehicle();
        car.velocity = 0.005;
        car.integrate();
        assert_eq!(car.velocity(), 0.0);
        assert_eq!(car.position(), Vec2::new(100.0, 100.0));
    }

    #[test]
    fn test_decelerate_coasts_to_stop() {
        let mut car = test_vehicle();
        car.velocity = 0.3;
        car.decelerate();
        assert!((car.velocity() - 0.25).abs() < 1e-6);
        assert!(car.position().y < 100.0);
        for _ in 0..10 {
            car.decelerate();
        }
        assert_eq!(car.velocity(), 0.0);

        car.velocity = -0.3;
        car.decelerate();
        assert!((car.velocity() + 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_bounce_reverses_and_steps() {
        let mut car = test_vehicle();
        car.velocity = 3.0;
        let before = car.position();
        car.bounce();
        assert_eq!(car.velocity(), -3.0);
        // Heading 0 with negative velocity moves +y
        assert!((car.position().y - (before.y + 3.0)).abs() < 1e-4);
        assert_eq!(car.last_position(), before);
    }

    #[test]
    fn test_rotate() {
        let mut car = test_vehicle();
        car.rotate(Steer::Left);
        car.rotate(Steer::Left);
        car.rotate(Steer::Right);
        car.rotate(Steer::Straight);
        assert_eq!(car.heading(), 6.0);
        car.heading = -6.0;
        assert!((car.pose().heading - 354.0).abs() < 1e-4);
    }

    #[test]
    fn test_effects_change_bound_and_clamp() {
        let mut car = test_vehicle();
        car.apply_effect(EffectKind::Boost, 0.0);
        assert!((car.max_velocity() - 5.2).abs() < 1e-5);
        for _ in 0..60 {
            car.accelerate_forward();
        }
        assert!((car.velocity() - 5.2).abs() < 1e-4);

        // Boost runs out while at full speed: speed falls back within bound
        car.clear_expired_effects(3.0);
        assert_eq!(car.max_velocity(), 4.0);
        assert_eq!(car.velocity(), 4.0);

        car.apply_effect(EffectKind::Trap, 4.0);
        assert!((car.velocity() - 2.8).abs() < 1e-5);
    }

    #[test]
    fn test_reset_restores_start_and_clears_effects() {
        let mut car = test_vehicle();
        car.apply_effect(EffectKind::Boost, 0.0);
        car.rotate(Steer::Left);
        for _ in 0..20 {
            car.accelerate_forward();
        }
        let travelled = car.total_distance();
        car.reset();
        assert_eq!(car.position(), Vec2::new(100.0, 100.0));
        assert_eq!(car.heading(), 0.0);
        assert_eq!(car.velocity(), 0.0);
        assert_eq!(car.max_velocity(), 4.0);
        assert!(car.effects().is_empty());
        assert_eq!(car.total_distance(), travelled);
    }

    #[test]
    fn test_collide_offset() {
        let car = test_vehicle(); // occupies x 100..116, y 100..128
        let wall = Mask::filled(10, 10);
        assert!(car.collide(&wall, Vec2::new(0.0, 0.0)).is_none());
        assert!(car.collide(&wall, Vec2::new(95.0, 95.0)).is_some());
        // Wall entirely inside the outline touches no edge pixel
        let dot = Mask::filled(2, 2);
        assert!(car.collide(&dot, Vec2::new(106.0, 110.0)).is_none());
    }

    proptest! {
        #[test]
        fn prop_distance_grows_by_displacement(
            steps in proptest::collection::vec((0u8..3, 0u8..3), 1..80)
        ) {
            let mut car = test_vehicle();
            for (steer, throttle) in steps {
                let intent = Intent {
                    steer: [Steer::Left, Steer::Right, Steer::Straight][steer as usize],
                    throttle: [Throttle::Forward, Throttle::Reverse, Throttle::Coast][throttle as usize],
                };
                let before_pos = car.position();
                let before_dist = car.total_distance();
                car.apply_intent(intent);
                let moved = (car.position() - before_pos).length();
                prop_assert!(car.total_distance() >= before_dist);
                prop_assert!((car.total_distance() - before_dist - moved).abs() < 1e-3);
                prop_assert!(car.velocity().abs() <= car.max_velocity() + 1e-6);
            }
        }
    }
}
