/// Straight-alpha RGBA color with components in `[0, 1]`.
///
/// Paint colors travel through the coverage estimator packed as RGBA8; a packed
/// value of zero means "unpainted", so packing always forces a non-zero alpha.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ColorRgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl ColorRgba {
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub const fn black() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }

    #[inline]
    pub const fn white() -> Self {
        Self::new(1.0, 1.0, 1.0, 1.0)
    }

    /// Creates a color from straight sRGB bytes (`0`–`255`).
    #[inline]
    pub fn from_srgb_u8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, a as f32 / 255.0)
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite() && self.a.is_finite()
    }

    /// Packs into `0xAABBGGRR` with alpha forced to at least 1/255.
    pub fn to_packed_rgba8(self) -> u32 {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u32;
        let a = q(self.a).max(1);
        q(self.r) | (q(self.g) << 8) | (q(self.b) << 16) | (a << 24)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_black_is_never_zero() {
        assert_ne!(ColorRgba::black().to_packed_rgba8(), 0);
        assert_ne!(ColorRgba::new(0.0, 0.0, 0.0, 0.0).to_packed_rgba8(), 0);
    }

    #[test]
    fn packed_white_is_all_ones() {
        assert_eq!(ColorRgba::white().to_packed_rgba8(), 0xFFFF_FFFF);
    }
}
