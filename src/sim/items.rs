//! Boost and trap pickups and their placement
//!
//! Items are placed by rejection sampling against the drivable mask so that
//! the whole footprint sits on road. Placement uses a seeded RNG and a fixed
//! attempt budget; running out of attempts yields fewer items, never a hang.

use glam::{IVec2, Vec2};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::effects::EffectKind;
use super::mask::Mask;
use super::track::TrackGeometry;

/// Pickup types; each grants the matching effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Boost,
    Trap,
}

impl ItemKind {
    pub fn effect(self) -> EffectKind {
        match self {
            ItemKind::Boost => EffectKind::Boost,
            ItemKind::Trap => EffectKind::Trap,
        }
    }
}

/// A pickup lying on the track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub kind: ItemKind,
    /// Footprint centre in track space
    pub position: IVec2,
    pub size: (u32, u32),
}

impl Item {
    /// Top-left corner of the footprint
    pub fn origin(&self) -> Vec2 {
        let half = IVec2::new((self.size.0 / 2) as i32, (self.size.1 / 2) as i32);
        (self.position - half).as_vec2()
    }
}

/// Solid collision footprints, one per item kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemMasks {
    boost: Mask,
    trap: Mask,
}

impl ItemMasks {
    pub fn new(boost_size: (u32, u32), trap_size: (u32, u32)) -> Self {
        Self {
            boost: Mask::filled(boost_size.0, boost_size.1),
            trap: Mask::filled(trap_size.0, trap_size.1),
        }
    }

    pub fn for_kind(&self, kind: ItemKind) -> &Mask {
        match kind {
            ItemKind::Boost => &self.boost,
            ItemKind::Trap => &self.trap,
        }
    }

    pub fn size(&self, kind: ItemKind) -> (u32, u32) {
        self.for_kind(kind).size()
    }
}

/// Result of a placement request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnBatch {
    pub positions: Vec<IVec2>,
    pub requested: usize,
}

impl SpawnBatch {
    /// `(produced, requested)` if the attempt budget ran out early
    pub fn shortage(&self) -> Option<(usize, usize)> {
        (self.positions.len() < self.requested).then_some((self.positions.len(), self.requested))
    }
}

/// True when all four corners of a `width` x `height` footprint centred on
/// `(x, y)` are road
pub fn footprint_on_road(track: &TrackGeometry, x: i32, y: i32, width: u32, height: u32) -> bool {
    let half_w = (width / 2) as i32;
    let half_h = (height / 2) as i32;
    [
        (x - half_w, y - half_h),
        (x + half_w, y - half_h),
        (x - half_w, y + half_h),
        (x + half_w, y + half_h),
    ]
    .into_iter()
    .all(|(cx, cy)| track.is_drivable(cx, cy))
}

/// Seeded rejection sampler for item positions
#[derive(Debug, Clone)]
pub struct ItemSpawner {
    rng: Pcg32,
    attempt_budget: u32,
}

impl ItemSpawner {
    pub fn new(seed: u64, attempt_budget: u32) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            attempt_budget,
        }
    }

    /// Draw up to `count` positions whose footprint lies on road. Stops
    /// after the attempt budget whether or not `count` was reached.
    pub fn generate_positions(
        &mut self,
        track: &TrackGeometry,
        count: usize,
        width: u32,
        height: u32,
    ) -> SpawnBatch {
        let mut positions = Vec::with_capacity(count);
        let (track_w, track_h) = (track.width() as i32, track.height() as i32);

        if track_w > 0 && track_h > 0 {
            let mut attempts = 0;
            while positions.len() < count && attempts < self.attempt_budget {
                let x = self.rng.random_range(0..track_w);
                let y = self.rng.random_range(0..track_h);
                if footprint_on_road(track, x, y, width, height) {
                    positions.push(IVec2::new(x, y));
                }
                attempts += 1;
            }
        }

        let batch = SpawnBatch {
            positions,
            requested: count,
        };
        if let Some((produced, requested)) = batch.shortage() {
            log::warn!("Only {produced} item positions generated out of {requested}");
        }
        batch
    }

    /// Place `count` items of one kind
    pub fn spawn(
        &mut self,
        track: &TrackGeometry,
        kind: ItemKind,
        count: usize,
        size: (u32, u32),
    ) -> (Vec<Item>, SpawnBatch) {
        let batch = self.generate_positions(track, count, size.0, size.1);
        let items = batch
            .positions
            .iter()
            .map(|&position| Item {
                kind,
                position,
                size,
            })
            .collect();
        (items, batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::track::LoopLayout;
    use proptest::prelude::*;
    use std::sync::LazyLock;

    static LOOP_TRACK: LazyLock<TrackGeometry> =
        LazyLock::new(|| LoopLayout::default().build().unwrap());

    fn loop_track() -> &'static TrackGeometry {
        &LOOP_TRACK
    }

    #[test]
    fn test_footprint_check() {
        let track = loop_track();
        // Middle of the top straight
        assert!(footprint_on_road(track, 300, 68, 25, 15));
        // Straddling the outer wall
        assert!(!footprint_on_road(track, 300, 10, 25, 15));
        // Off the map
        assert!(!footprint_on_road(track, -50, 68, 25, 15));
    }

    #[test]
    fn test_generates_requested_count() {
        let track = loop_track();
        let mut spawner = ItemSpawner::new(1, 1000);
        let batch = spawner.generate_positions(track, 5, 25, 15);
        assert_eq!(batch.positions.len(), 5);
        assert!(batch.shortage().is_none());
    }

    #[test]
    fn test_same_seed_same_positions() {
        let track = loop_track();
        let a = ItemSpawner::new(99, 1000).generate_positions(track, 5, 25, 15);
        let b = ItemSpawner::new(99, 1000).generate_positions(track, 5, 25, 15);
        assert_eq!(a, b);
    }

    #[test]
    fn test_shortage_when_nothing_fits() {
        let blocked = TrackGeometry::new(
            Mask::new(50, 50),
            Mask::new(50, 50),
            Mask::new(1, 1),
            IVec2::ZERO,
        )
        .unwrap();
        let mut spawner = ItemSpawner::new(3, 1000);
        let batch = spawner.generate_positions(&blocked, 5, 25, 15);
        assert!(batch.positions.is_empty());
        assert_eq!(batch.shortage(), Some((0, 5)));
    }

    #[test]
    fn test_partial_fill_within_budget() {
        let track = loop_track();
        // Ten attempts cannot find two hundred spots
        let mut spawner = ItemSpawner::new(5, 10);
        let batch = spawner.generate_positions(track, 200, 25, 15);
        assert!(batch.positions.len() <= 10);
        assert_eq!(batch.shortage().map(|(_, want)| want), Some(200));
    }

    #[test]
    fn test_spawn_tags_items() {
        let track = loop_track();
        let mut spawner = ItemSpawner::new(8, 1000);
        let (items, _) = spawner.spawn(track, ItemKind::Trap, 3, (25, 15));
        assert_eq!(items.len(), 3);
        assert!(items.iter().all(|i| i.kind == ItemKind::Trap && i.size == (25, 15)));
        let origin = items[0].origin();
        assert_eq!(origin, (items[0].position - IVec2::new(12, 7)).as_vec2());
    }

    #[test]
    fn test_item_masks_match_sizes() {
        let masks = ItemMasks::new((25, 15), (10, 10));
        assert_eq!(masks.size(ItemKind::Boost), (25, 15));
        assert_eq!(masks.for_kind(ItemKind::Trap).count(), 100);
    }

    proptest! {
        #[test]
        fn prop_positions_fit_on_road(seed in any::<u64>(), w in 1u32..60, h in 1u32..60) {
            let track = loop_track();
            let mut spawner = ItemSpawner::new(seed, 200);
            let batch = spawner.generate_positions(track, 5, w, h);
            for p in batch.positions {
                prop_assert!(footprint_on_road(track, p.x, p.y, w, h));
            }
        }
    }
}
