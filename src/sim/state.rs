//! Race session state
//!
//! Everything a race needs between ticks lives here. Time is a logical
//! clock (ticks times the fixed timestep) and item placement uses a seeded
//! RNG, so the same config and inputs always replay the same race.

use serde::{Deserialize, Serialize};

use super::controller::{Controller, Observation};
use super::effects::EffectKind;
use super::items::{Item, ItemKind, ItemMasks, ItemSpawner};
use super::progress::{RacePhase, RaceProgress, Side};
use super::track::TrackGeometry;
use super::vehicle::{Pose, Vehicle, car_silhouette};
use crate::config::RaceConfig;
use crate::error::ConfigResult;

/// Why a vehicle bounced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BounceCause {
    Wall,
    FinishDenied,
}

/// Things that happened during a tick, for the host to present
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RaceEvent {
    LevelStarted { level: u32 },
    ItemCollected { side: Side, kind: ItemKind },
    /// Fewer items could be placed than asked for
    ItemShortage { kind: ItemKind, produced: usize, requested: usize },
    Bounced { side: Side, cause: BounceCause },
    VehicleContact,
    LevelCompleted { side: Side, completed: u32, next: u32 },
    RaceWon { winner: Side },
    RaceReset,
}

/// Read-only display data
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hud {
    pub level: u32,
    /// Whole seconds since the level started, 0 before it starts
    pub elapsed_secs: u32,
    /// Primary car speed
    pub velocity: f32,
    pub phase: RacePhase,
}

/// One race session
pub struct RaceState {
    pub(crate) config: RaceConfig,
    pub(crate) track: TrackGeometry,
    /// Indexed by [`Side::index`]
    pub(crate) vehicles: [Vehicle; 2],
    pub(crate) controllers: [Box<dyn Controller>; 2],
    pub(crate) items: Vec<Item>,
    pub(crate) item_masks: ItemMasks,
    pub(crate) spawner: ItemSpawner,
    pub(crate) progress: RaceProgress,
    /// Racing ticks elapsed
    pub(crate) time_ticks: u64,
    /// Raised outside a tick, handed out by the next one
    pub(crate) pending_events: Vec<RaceEvent>,
    dt: f32,
}

impl RaceState {
    /// Validate `config`, place both cars at their starts and lay out the
    /// first set of items. Any shortage in that first layout is reported by
    /// the first [`tick`](super::tick::tick).
    pub fn new(
        config: RaceConfig,
        track: TrackGeometry,
        primary: Box<dyn Controller>,
        opponent: Box<dyn Controller>,
    ) -> ConfigResult<Self> {
        config.validate()?;
        let progress = RaceProgress::new(config.finish_rules()?);

        let silhouette = car_silhouette(config.car_size.0, config.car_size.1);
        let tuning = config.effect_tuning();
        let vehicles = [
            Vehicle::new(config.primary_spec(), &silhouette, tuning),
            Vehicle::new(config.opponent_spec(), &silhouette, tuning),
        ];

        let mut state = Self {
            item_masks: ItemMasks::new(config.boost_size, config.trap_size),
            spawner: ItemSpawner::new(config.seed, config.spawn_attempts),
            dt: config.dt(),
            config,
            track,
            vehicles,
            controllers: [primary, opponent],
            items: Vec::new(),
            progress,
            time_ticks: 0,
            pending_events: Vec::new(),
        };
        state.pending_events = state.respawn_items();

        log::info!(
            "Race ready: {} levels, {} items on a {}x{} track",
            state.progress.rules().level_count(),
            state.items.len(),
            state.track.width(),
            state.track.height()
        );
        Ok(state)
    }

    // === Accessors ===

    pub fn config(&self) -> &RaceConfig {
        &self.config
    }

    pub fn track(&self) -> &TrackGeometry {
        &self.track
    }

    pub fn progress(&self) -> &RaceProgress {
        &self.progress
    }

    pub fn phase(&self) -> RacePhase {
        self.progress.phase()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn vehicle(&self, side: Side) -> &Vehicle {
        &self.vehicles[side.index()]
    }

    pub fn pose(&self, side: Side) -> Pose {
        self.vehicle(side).pose()
    }

    /// Swap in a new driver, e.g. to hand a car to an external policy
    pub fn set_controller(&mut self, side: Side, controller: Box<dyn Controller>) {
        self.controllers[side.index()] = controller;
    }

    /// Events waiting for the next tick
    pub fn pending_events(&self) -> &[RaceEvent] {
        &self.pending_events
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    /// Logical time in seconds
    pub fn now(&self) -> f32 {
        self.time_ticks as f32 * self.dt
    }

    /// The 5-value policy input for one car
    pub fn observation(&self, side: Side) -> Observation {
        Observation::from_vehicle(self.vehicle(side))
    }

    pub fn hud(&self) -> Hud {
        let now = self.now();
        Hud {
            level: self.progress.level(),
            elapsed_secs: self.progress.elapsed(now).round() as u32,
            velocity: self.vehicle(Side::Primary).velocity(),
            phase: self.progress.phase(),
        }
    }

    // === Setup ===

    /// Both cars back to their starts, drivers back to their first step
    pub fn reset_vehicles(&mut self) {
        for vehicle in &mut self.vehicles {
            vehicle.reset();
        }
        self.reset_controllers();
    }

    pub(crate) fn reset_controllers(&mut self) {
        for controller in &mut self.controllers {
            controller.reset();
        }
    }

    /// Throw away every item and lay out a fresh set of each kind
    pub fn respawn_items(&mut self) -> Vec<RaceEvent> {
        let mut events = Vec::new();
        self.items.clear();
        for kind in [ItemKind::Boost, ItemKind::Trap] {
            let (items, batch) = self.spawner.spawn(
                &self.track,
                kind,
                self.config.items_per_kind,
                self.item_masks.size(kind),
            );
            self.items.extend(items);
            if let Some((produced, requested)) = batch.shortage() {
                events.push(RaceEvent::ItemShortage {
                    kind,
                    produced,
                    requested,
                });
            }
        }
        events
    }

    /// Back to level 1, waiting for a start signal
    pub fn reset_race(&mut self) -> Vec<RaceEvent> {
        log::info!("Race reset");
        self.progress.reset();
        self.reset_vehicles();
        let mut events = vec![RaceEvent::RaceReset];
        events.extend(self.respawn_items());
        events
    }

    /// Apply an effect directly, as an item pickup would
    pub fn apply_effect(&mut self, side: Side, kind: EffectKind) {
        let now = self.now();
        self.vehicles[side.index()].apply_effect(kind, now);
    }
}
