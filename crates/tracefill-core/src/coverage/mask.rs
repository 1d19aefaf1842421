use tracefill_engine::coords::{Rect, Vec2};

/// Binary inside/outside image of one fill region, plus its placement in
/// level space.
///
/// Pixel `(x, y)` covers level-space point `origin + (x, y) / pixels_per_unit`.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionMask {
    width: u32,
    height: u32,
    inside: Vec<bool>,

    origin: Vec2,
    pixels_per_unit: f32,
}

/// Inclusive-exclusive pixel bounds `[x0, x1) x [y0, y1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelBounds {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl PixelBounds {
    #[inline]
    pub fn width(self) -> u32 {
        (self.x1 - self.x0).max(0) as u32
    }

    #[inline]
    pub fn height(self) -> u32 {
        (self.y1 - self.y0).max(0) as u32
    }
}

impl RegionMask {
    /// Panics if `inside` does not hold exactly `width * height` entries.
    pub fn new(width: u32, height: u32, inside: Vec<bool>) -> Self {
        assert_eq!(
            inside.len(),
            width as usize * height as usize,
            "mask data does not match its dimensions"
        );
        Self {
            width,
            height,
            inside,
            origin: Vec2::zero(),
            pixels_per_unit: 1.0,
        }
    }

    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> bool) -> Self {
        let mut inside = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                inside.push(f(x, y));
            }
        }
        Self::new(width, height, inside)
    }

    /// Any non-zero byte counts as inside.
    pub fn from_luma8(width: u32, height: u32, luma: &[u8]) -> Self {
        Self::new(width, height, luma.iter().map(|v| *v != 0).collect())
    }

    /// Places the mask in level space.
    pub fn with_placement(mut self, origin: Vec2, pixels_per_unit: f32) -> Self {
        assert!(pixels_per_unit > 0.0, "pixels_per_unit must be positive");
        self.origin = origin;
        self.pixels_per_unit = pixels_per_unit;
        self
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
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    #[inline]
    pub fn pixels_per_unit(&self) -> f32 {
        self.pixels_per_unit
    }

    /// Out-of-bounds coordinates are outside.
    #[inline]
    pub fn is_inside(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return false;
        }
        self.inside[y as usize * self.width as usize + x as usize]
    }

    pub fn inside_count(&self) -> usize {
        self.inside.iter().filter(|v| **v).count()
    }

    /// Tight bounds of the inside pixels, `None` for an empty mask.
    pub fn bounds(&self) -> Option<PixelBounds> {
        let mut b: Option<PixelBounds> = None;
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                if !self.inside[y as usize * self.width as usize + x as usize] {
                    continue;
                }
                b = Some(match b {
                    None => PixelBounds { x0: x, y0: y, x1: x + 1, y1: y + 1 },
                    Some(b) => PixelBounds {
                        x0: b.x0.min(x),
                        y0: b.y0.min(y),
                        x1: b.x1.max(x + 1),
                        y1: b.y1.max(y + 1),
                    },
                });
            }
        }
        b
    }

    /// Copy of the window `bounds`; pixels beyond this mask are outside.
    ///
    /// The crop keeps the level-space placement of every pixel.
    pub fn crop(&self, bounds: PixelBounds) -> RegionMask {
        let (w, h) = (bounds.width(), bounds.height());
        let mut out = RegionMask::from_fn(w, h, |x, y| {
            self.is_inside(i64::from(bounds.x0) + i64::from(x), i64::from(bounds.y0) + i64::from(y))
        });
        let shift = Vec2::new(bounds.x0 as f32, bounds.y0 as f32) / self.pixels_per_unit;
        out.origin = self.origin + shift;
        out.pixels_per_unit = self.pixels_per_unit;
        out
    }

    /// Level-space point to (fractional) pixel coordinates.
    #[inline]
    pub fn to_pixel(&self, level: Vec2) -> Vec2 {
        (level - self.origin) * self.pixels_per_unit
    }

    /// Level-space rectangle covered by the whole image.
    pub fn level_rect(&self) -> Rect {
        let size = Vec2::new(self.width as f32, self.height as f32) / self.pixels_per_unit;
        Rect::from_origin_size(self.origin, size)
    }

    /// One `u32` per pixel, 1 for inside, as uploaded to the GPU.
    pub fn to_words(&self) -> Vec<u32> {
        self.inside.iter().map(|v| u32::from(*v)).collect()
    }

    #[inline]
    pub(crate) fn inside_slice(&self) -> &[bool] {
        &self.inside
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disk(size: u32, r: f32) -> RegionMask {
        let c = size as f32 / 2.0;
        RegionMask::from_fn(size, size, |x, y| {
            let (dx, dy) = (x as f32 - c, y as f32 - c);
            dx * dx + dy * dy <= r * r
        })
    }

    #[test]
    fn out_of_bounds_is_outside() {
        let m = RegionMask::from_fn(4, 4, |_, _| true);
        assert!(m.is_inside(0, 0));
        assert!(!m.is_inside(-1, 0));
        assert!(!m.is_inside(4, 0));
        assert!(!m.is_inside(0, 4));
    }

    #[test]
    fn bounds_are_tight() {
        let m = RegionMask::from_fn(10, 10, |x, y| (3..6).contains(&x) && (2..4).contains(&y));
        assert_eq!(m.bounds(), Some(PixelBounds { x0: 3, y0: 2, x1: 6, y1: 4 }));
        assert_eq!(m.inside_count(), 6);
    }

    #[test]
    fn empty_mask_has_no_bounds() {
        let m = RegionMask::from_luma8(3, 3, &[0; 9]);
        assert_eq!(m.bounds(), None);
        assert_eq!(m.inside_count(), 0);
    }

    #[test]
    fn padded_crop_preserves_inside_pixels_and_placement() {
        let m = disk(64, 10.0).with_placement(Vec2::new(-4.0, -4.0), 8.0);
        let b = m.bounds().expect("disk is not empty");
        let padded = PixelBounds { x0: b.x0 - 5, y0: b.y0 - 5, x1: b.x1 + 5, y1: b.y1 + 5 };

        let c = m.crop(padded);
        assert_eq!(c.inside_count(), m.inside_count());
        assert_eq!(c.width(), b.width() + 10);

        let level = Vec2::new(0.0, 0.0);
        let in_full = m.to_pixel(level);
        let in_crop = c.to_pixel(level);
        assert!((in_full.x - in_crop.x - padded.x0 as f32).abs() < 1e-4);
        assert!((in_full.y - in_crop.y - padded.y0 as f32).abs() < 1e-4);
    }
}
