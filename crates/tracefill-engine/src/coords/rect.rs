use super::Vec2;

/// Axis-aligned rectangle (top-left origin, non-negative size).
///
/// Used both in level units (fill regions) and in mask pixel space
/// (quadrant cells).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub const fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    #[inline]
    pub fn min(self) -> Vec2 {
        self.origin
    }

    #[inline]
    pub fn max(self) -> Vec2 {
        self.origin + self.size
    }

    /// Euclidean distance from `p` to the closest point of the rectangle (0 inside).
    #[inline]
    pub fn distance_to(self, p: Vec2) -> f32 {
        let (min, max) = (self.min(), self.max());
        let dx = (min.x - p.x).max(0.0).max(p.x - max.x);
        let dy = (min.y - p.y).max(0.0).max(p.y - max.y);
        (dx * dx + dy * dy).sqrt()
    }
}
