//! Deterministic simulation module
//!
//! All race logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only, on a logical clock
//! - Seeded RNG only
//! - Stable update order (primary car before opponent)
//! - No rendering, input polling or platform dependencies

pub mod collision;
pub mod controller;
pub mod effects;
pub mod items;
pub mod mask;
pub mod progress;
pub mod state;
pub mod tick;
pub mod track;
pub mod vehicle;

pub use collision::{Outcome, Pickup, Resolution, collect_items, resolve};
pub use controller::{
    Controller, HumanController, Intent, KeyState, Observation, PathFollower, Policy,
    PolicyAction, PolicyController, Steer, Throttle,
};
pub use effects::{Effect, EffectKind, EffectStack, EffectTuning};
pub use items::{Item, ItemKind, ItemMasks, ItemSpawner, SpawnBatch};
pub use mask::Mask;
pub use progress::{FinishRules, LevelOutcome, RacePhase, RaceProgress, Side};
pub use state::{BounceCause, Hud, RaceEvent, RaceState};
pub use tick::{TickInput, tick};
pub use track::{LoopLayout, TrackGeometry};
pub use vehicle::{Pose, Vehicle, VehicleSpec, car_silhouette};
