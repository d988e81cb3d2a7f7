//! Collision resolution
//!
//! Every contact is resolved against pixel masks: the vehicle's border shape
//! is tested against the track walls, the finish strip, the other car and
//! item footprints. Resolution always ends in one [`Outcome`]; there is no
//! half-resolved state carried into the next tick.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use super::items::{Item, ItemKind, ItemMasks, ItemSpawner};
use super::progress::{LevelOutcome, RaceProgress, Side};
use super::track::TrackGeometry;
use super::vehicle::Vehicle;

/// What the track did to a vehicle this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Outcome {
    /// Clear road
    #[default]
    None,
    /// Hit a wall and bounced
    WallBounce,
    /// Touched the finish before the gate opened and bounced
    FinishDenied,
    /// Valid finish
    Finished(LevelOutcome),
}

/// Full result of resolving one vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Resolution {
    pub outcome: Outcome,
    /// The two cars touched and both bounced
    pub vehicle_contact: bool,
}

/// Resolve `vehicle`'s contacts for this tick.
///
/// Walls win over the finish line when both are touched. A finish touch
/// that fails the gate bounces the car and skips the vehicle contact test.
/// A valid finish completes the level and sends both cars back to the start.
pub fn resolve(
    vehicle: &mut Vehicle,
    side: Side,
    mut opponent: Option<&mut Vehicle>,
    track: &TrackGeometry,
    progress: &mut RaceProgress,
    now: f32,
) -> Resolution {
    let mut resolution = Resolution::default();

    if vehicle.collide(track.border(), Vec2::ZERO).is_some() {
        log::debug!("{side:?} hit a wall at {}", vehicle.position());
        vehicle.bounce();
        resolution.outcome = Outcome::WallBounce;
    } else if vehicle
        .collide(track.finish(), track.finish_anchor().as_vec2())
        .is_some()
    {
        if !progress.is_ready_for_finish(vehicle, now) {
            log::debug!(
                "{side:?} finish denied (distance {:.0}, velocity {:.2})",
                vehicle.total_distance(),
                vehicle.velocity()
            );
            vehicle.bounce();
            vehicle.settle();
            resolution.outcome = Outcome::FinishDenied;
            return resolution;
        }

        let level_outcome = progress.complete_level(side);
        vehicle.reset();
        if let Some(other) = opponent.as_deref_mut() {
            other.reset();
        }
        resolution.outcome = Outcome::Finished(level_outcome);
    }

    if let Some(other) = opponent
        && vehicle.collide(other.shape(), other.position()).is_some()
    {
        log::debug!("Vehicles touched at {}", vehicle.position());
        vehicle.bounce();
        other.bounce();
        resolution.vehicle_contact = true;
    }

    vehicle.settle();
    resolution
}

/// A pickup taken this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pickup {
    pub kind: ItemKind,
    pub position: IVec2,
    /// `(produced, requested)` if no replacement could be placed
    pub shortage: Option<(usize, usize)>,
}

/// Pick up at most one trap and then at most one boost touched by
/// `vehicle`. Each taken item is replaced by a freshly placed one of the same
/// kind and its effect is applied from `now`.
pub fn collect_items(
    vehicle: &mut Vehicle,
    items: &mut Vec<Item>,
    masks: &ItemMasks,
    spawner: &mut ItemSpawner,
    track: &TrackGeometry,
    now: f32,
) -> Vec<Pickup> {
    let mut pickups = Vec::new();

    for kind in [ItemKind::Trap, ItemKind::Boost] {
        let mask = masks.for_kind(kind);
        let Some(index) = items
            .iter()
            .position(|item| item.kind == kind && vehicle.collide(mask, item.origin()).is_some())
        else {
            continue;
        };

        let taken = items.remove(index);
        let (replacement, batch) = spawner.spawn(track, kind, 1, masks.size(kind));
        items.extend(replacement);
        vehicle.apply_effect(kind.effect(), now);
        log::debug!("Picked up {kind:?} at {}", taken.position);

        pickups.push(Pickup {
            kind,
            position: taken.position,
            shortage: batch.shortage(),
        });
    }

    pickups
}
