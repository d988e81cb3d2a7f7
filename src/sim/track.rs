//! Track geometry
//!
//! The drivable area, the walls and the finish line, each as a pixel mask.
//! Built once before a race and never mutated afterwards.

use glam::{IVec2, Vec2};

use super::mask::Mask;
use crate::error::{ConfigError, ConfigResult};

/// Immutable track masks shared by vehicles, collision and item placement
#[derive(Debug, Clone)]
pub struct TrackGeometry {
    drivable: Mask,
    border: Mask,
    finish: Mask,
    /// Top-left corner of the finish mask in track space
    finish_anchor: IVec2,
}

impl TrackGeometry {
    /// Assemble a track from loaded masks. The drivable and border masks must
    /// cover the same area; the finish mask is placed at `finish_anchor`.
    pub fn new(
        drivable: Mask,
        border: Mask,
        finish: Mask,
        finish_anchor: IVec2,
    ) -> ConfigResult<Self> {
        if border.size() != drivable.size() {
            return Err(ConfigError::MaskSizeMismatch {
                mask: "border",
                got: border.size(),
                expected: drivable.size(),
            });
        }
        Ok(Self {
            drivable,
            border,
            finish,
            finish_anchor,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.drivable.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.drivable.height()
    }

    pub fn drivable(&self) -> &Mask {
        &self.drivable
    }

    pub fn border(&self) -> &Mask {
        &self.border
    }

    pub fn finish(&self) -> &Mask {
        &self.finish
    }

    pub fn finish_anchor(&self) -> IVec2 {
        self.finish_anchor
    }

    /// Whether a track-space pixel is road; anything off the map is not
    #[inline]
    pub fn is_drivable(&self, x: i32, y: i32) -> bool {
        self.drivable.get(x, y)
    }
}

/// A rectangular circuit: an outer wall, a walled infield island and a
/// corridor of road between them, with the finish line across the top
/// straight. Cars start on the top straight facing +x and lap clockwise.
#[derive(Debug, Clone, Copy)]
pub struct LoopLayout {
    pub width: u32,
    pub height: u32,
    /// Wall thickness (outer wall and infield edge)
    pub wall: u32,
    /// Road width between the outer wall and the infield
    pub lane: u32,
    /// Left edge of the finish strip
    pub finish_x: u32,
    pub finish_width: u32,
}

impl Default for LoopLayout {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            wall: 8,
            lane: 120,
            finish_x: 440,
            finish_width: 8,
        }
    }
}

impl LoopLayout {
    fn is_outer_wall(&self, x: i32, y: i32) -> bool {
        let (w, h, wall) = (self.width as i32, self.height as i32, self.wall as i32);
        x < wall || y < wall || x >= w - wall || y >= h - wall
    }

    /// Infield rectangle (inclusive min, exclusive max)
    fn infield(&self) -> (IVec2, IVec2) {
        let inset = (self.wall + self.lane) as i32;
        (
            IVec2::new(inset, inset),
            IVec2::new(self.width as i32 - inset, self.height as i32 - inset),
        )
    }

    fn is_infield(&self, x: i32, y: i32) -> bool {
        let (min, max) = self.infield();
        x >= min.x && y >= min.y && x < max.x && y < max.y
    }

    fn is_infield_wall(&self, x: i32, y: i32) -> bool {
        if !self.is_infield(x, y) {
            return false;
        }
        let (min, max) = self.infield();
        let wall = self.wall as i32;
        x < min.x + wall || y < min.y + wall || x >= max.x - wall || y >= max.y - wall
    }

    /// Rasterize the layout into track masks
    pub fn build(&self) -> ConfigResult<TrackGeometry> {
        let drivable = Mask::from_fn(self.width, self.height, |x, y| {
            !self.is_outer_wall(x, y) && !self.is_infield(x, y)
        });
        let border = Mask::from_fn(self.width, self.height, |x, y| {
            self.is_outer_wall(x, y) || self.is_infield_wall(x, y)
        });
        let finish = Mask::filled(self.finish_width, self.lane);
        let anchor = IVec2::new(self.finish_x as i32, self.wall as i32);

        log::debug!(
            "Built {}x{} loop track: {} drivable px, {} wall px",
            self.width,
            self.height,
            drivable.count(),
            border.count()
        );
        TrackGeometry::new(drivable, border, finish, anchor)
    }

    /// One clockwise lap along the road centreline, starting from the top
    /// straight and ending just past the finish line. `pivot` is subtracted
    /// from each point so the waypoints line up with a vehicle's top-left
    /// position rather than its centre.
    pub fn centerline_waypoints(&self, pivot: Vec2) -> Vec<Vec2> {
        let c = (self.wall + self.lane / 2) as f32;
        let (w, h) = (self.width as f32, self.height as f32);
        let round = (self.lane / 2) as f32;
        let past_finish = (self.finish_x + self.finish_width) as f32 + round;

        [
            Vec2::new(w - c - round, c),
            Vec2::new(w - c, c + round),
            Vec2::new(w - c, h - c - round),
            Vec2::new(w - c - round, h - c),
            Vec2::new(c + round, h - c),
            Vec2::new(c, h - c - round),
            Vec2::new(c, c + round),
            Vec2::new(c + round, c),
            Vec2::new(past_finish, c),
        ]
        .into_iter()
        .map(|p| p - pivot)
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatched_masks_rejected() {
        let result = TrackGeometry::new(
            Mask::new(10, 10),
            Mask::new(10, 11),
            Mask::new(2, 2),
            IVec2::ZERO,
        );
        assert!(matches!(
            result,
            Err(ConfigError::MaskSizeMismatch { mask: "border", .. })
        ));
    }

    #[test]
    fn test_loop_road_and_walls_are_disjoint() {
        let layout = LoopLayout::default();
        let track = layout.build().unwrap();
        assert_eq!(track.width(), 800);
        assert_eq!(track.height(), 600);

        for y in 0..track.height() as i32 {
            for x in 0..track.width() as i32 {
                assert!(!(track.is_drivable(x, y) && track.border().get(x, y)));
            }
        }
    }

    #[test]
    fn test_loop_regions() {
        let track = LoopLayout::default().build().unwrap();
        // Outer wall
        assert!(track.border().get(0, 0));
        assert!(!track.is_drivable(3, 300));
        // Top straight
        assert!(track.is_drivable(400, 60));
        // Infield edge is a wall, infield middle is neither
        assert!(track.border().get(130, 300));
        assert!(!track.border().get(400, 300));
        assert!(!track.is_drivable(400, 300));
        // Off the map
        assert!(!track.is_drivable(-1, 60));
        assert!(!track.is_drivable(800, 60));
    }

    #[test]
    fn test_finish_spans_top_straight() {
        let layout = LoopLayout::default();
        let track = layout.build().unwrap();
        assert_eq!(track.finish_anchor(), IVec2::new(440, 8));
        assert_eq!(track.finish().size(), (8, 120));
    }

    #[test]
    fn test_waypoints_are_on_the_road() {
        let layout = LoopLayout::default();
        let track = layout.build().unwrap();
        let waypoints = layout.centerline_waypoints(Vec2::ZERO);
        assert_eq!(waypoints.len(), 9);
        for p in waypoints {
            assert!(track.is_drivable(p.x as i32, p.y as i32), "{p} is off the road");
        }
    }
}
