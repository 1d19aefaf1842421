use anyhow::Result;
use bytemuck::{Pod, Zeroable};

use super::mask::RegionMask;

/// Brush disc as uploaded to the rasterisation kernel.
///
/// Layout matches `Stamp` in `shaders/coverage.wgsl` (16 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct BrushStamp {
    /// Mask pixel coordinates.
    pub center: [f32; 2],
    pub radius: f32,
    /// Packed RGBA8; never zero.
    pub color: u32,
}

/// Result of one coverage reduction.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct CoverageCounts {
    /// Pixels inside the region.
    pub inside: u32,
    /// Inside pixels that carry paint.
    pub painted: u32,
}

impl CoverageCounts {
    /// Painted fraction of the region; an empty region counts as fully painted.
    #[inline]
    pub fn fraction(&self) -> f32 {
        if self.inside == 0 {
            1.0
        } else {
            self.painted as f32 / self.inside as f32
        }
    }
}

/// Paint accumulation and coverage reduction for one fill stage at a time.
pub trait CoverageBackend {
    /// Short label for logs.
    fn name(&self) -> &'static str;

    /// Allocates a cleared accumulation buffer the size of `mask` and uploads it.
    fn begin_stage(&mut self, mask: &RegionMask) -> Result<()>;

    /// Paints `stamps` into the accumulation buffer in order.
    fn rasterize(&mut self, stamps: &[BrushStamp]) -> Result<()>;

    /// Counts inside and painted pixels. Counters are reset on every call.
    fn measure(&mut self) -> Result<CoverageCounts>;

    /// Paints `stamps` and then measures.
    fn rasterize_and_measure(&mut self, stamps: &[BrushStamp]) -> Result<CoverageCounts> {
        self.rasterize(stamps)?;
        self.measure()
    }

    /// Releases per-stage resources.
    fn end_stage(&mut self);
}

impl<B: CoverageBackend + ?Sized> CoverageBackend for Box<B> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn begin_stage(&mut self, mask: &RegionMask) -> Result<()> {
        (**self).begin_stage(mask)
    }

    fn rasterize(&mut self, stamps: &[BrushStamp]) -> Result<()> {
        (**self).rasterize(stamps)
    }

    fn measure(&mut self) -> Result<CoverageCounts> {
        (**self).measure()
    }

    fn rasterize_and_measure(&mut self, stamps: &[BrushStamp]) -> Result<CoverageCounts> {
        (**self).rasterize_and_measure(stamps)
    }

    fn end_stage(&mut self) {
        (**self).end_stage()
    }
}

/// Single-threaded reference backend.
///
/// Produces the same counts as the compute kernels: pixel `(x, y)` is
/// painted by a stamp when its integer coordinate lies within the radius.
#[derive(Debug, Default)]
pub struct CpuCoverage {
    width: u32,
    height: u32,
    mask: Vec<bool>,
    accum: Vec<u32>,
}

impl CpuCoverage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Packed colour at `(x, y)`, 0 when unpainted or out of range.
    pub fn pixel(&self, x: u32, y: u32) -> u32 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.accum[(y * self.width + x) as usize]
    }
}

impl CoverageBackend for CpuCoverage {
    fn name(&self) -> &'static str {
        "cpu"
    }

    fn begin_stage(&mut self, mask: &RegionMask) -> Result<()> {
        self.width = mask.width();
        self.height = mask.height();
        self.mask = mask.inside_slice().to_vec();
        self.accum = vec![0; self.mask.len()];
        Ok(())
    }

    fn rasterize(&mut self, stamps: &[BrushStamp]) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Ok(());
        }

        for s in stamps {
            let r = s.radius.max(0.0);
            let [cx, cy] = s.center;

            let x0 = (cx - r).floor().max(0.0) as u32;
            let y0 = (cy - r).floor().max(0.0) as u32;
            let x1 = ((cx + r).ceil().max(-1.0) + 1.0).min(self.width as f32) as u32;
            let y1 = ((cy + r).ceil().max(-1.0) + 1.0).min(self.height as f32) as u32;

            for y in y0..y1 {
                for x in x0..x1 {
                    let (dx, dy) = (x as f32 - cx, y as f32 - cy);
                    if dx * dx + dy * dy <= r * r {
                        self.accum[(y * self.width + x) as usize] = s.color;
                    }
                }
            }
        }
        Ok(())
    }

    fn measure(&mut self) -> Result<CoverageCounts> {
        let mut counts = CoverageCounts::default();
        for (inside, color) in self.mask.iter().zip(&self.accum) {
            if *inside {
                counts.inside += 1;
                if *color != 0 {
                    counts.painted += 1;
                }
            }
        }
        Ok(counts)
    }

    fn end_stage(&mut self) {
        self.width = 0;
        self.height = 0;
        self.mask = Vec::new();
        self.accum = Vec::new();
    }
}
