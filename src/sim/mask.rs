//! Pixel masks for silhouette collision
//!
//! A mask is a fixed-size grid of set/unset pixels. Every query is total:
//! coordinates outside the grid read as unset, so collision and placement
//! code can probe any real-valued position without bounds checks.

use glam::IVec2;

/// A rectangular bit grid addressed by integer pixel coordinates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl Mask {
    /// An empty mask
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![false; width as usize * height as usize],
        }
    }

    /// A mask with every pixel set
    pub fn filled(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![true; width as usize * height as usize],
        }
    }

    /// Build a mask by evaluating `f(x, y)` for every pixel
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(i32, i32) -> bool) -> Self {
        let mut mask = Self::new(width, height);
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                if f(x, y) {
                    mask.set(x, y, true);
                }
            }
        }
        mask
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            None
        } else {
            Some(y as usize * self.width as usize + x as usize)
        }
    }

    /// Whether a pixel is set; out-of-bounds reads as unset
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> bool {
        self.index(x, y).is_some_and(|i| self.bits[i])
    }

    /// Set or clear a pixel; out-of-bounds writes are ignored
    pub fn set(&mut self, x: i32, y: i32, value: bool) {
        if let Some(i) = self.index(x, y) {
            self.bits[i] = value;
        }
    }

    /// Number of set pixels
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// The silhouette edge: set pixels that touch the mask boundary or
    /// have an unset 4-neighbour.
    pub fn outline(&self) -> Mask {
        let (w, h) = (self.width as i32, self.height as i32);
        Mask::from_fn(self.width, self.height, |x, y| {
            self.get(x, y)
                && (x == 0
                    || y == 0
                    || x == w - 1
                    || y == h - 1
                    || !self.get(x - 1, y)
                    || !self.get(x + 1, y)
                    || !self.get(x, y - 1)
                    || !self.get(x, y + 1))
        })
    }

    /// First pixel (in row-major order of this mask) where `other`, placed
    /// with its top-left corner at `offset` in this mask's coordinates,
    /// overlaps a set pixel of this mask.
    pub fn overlap(&self, other: &Mask, offset: IVec2) -> Option<IVec2> {
        let x0 = offset.x.max(0);
        let y0 = offset.y.max(0);
        let x1 = (offset.x + other.width as i32).min(self.width as i32);
        let y1 = (offset.y + other.height as i32).min(self.height as i32);

        for y in y0..y1 {
            for x in x0..x1 {
                if self.get(x, y) && other.get(x - offset.x, y - offset.y) {
                    return Some(IVec2::new(x, y));
                }
            }
        }
        None
    }
}
