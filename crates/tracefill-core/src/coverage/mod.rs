//! Paint coverage for fill stages.
//!
//! This module is responsible for:
//! - accumulating brush paint over a region mask (GPU compute or CPU)
//! - periodically reducing the accumulation to a painted fraction
//! - the quadrant grid that gates early continue

mod backend;
mod brush;
mod estimator;
mod gpu;
mod grid;
mod mask;

pub use backend::{BrushStamp, CoverageBackend, CoverageCounts, CpuCoverage};
pub use brush::{BrushRamp, PaintEvent, PaintEvents};
pub use estimator::{BrushOutcome, CoverageConfig, CoverageEstimator, FillSession};
pub use gpu::GpuCoverage;
pub use grid::{Quadrant, QuadrantGrid};
pub use mask::{PixelBounds, RegionMask};
