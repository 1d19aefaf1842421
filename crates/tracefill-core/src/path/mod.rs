//! Traceable outlines and arc-length queries over them.

mod model;
mod outline;

pub use model::{ArcLengthCache, PathModel};
pub use outline::{Outline, ARCLEN_ACCURACY};

use tracefill_engine::coords::Vec2;

/// Curve point to engine vector, in level units.
#[inline]
pub(crate) fn from_point(p: kurbo::Point) -> Vec2 {
    Vec2::new(p.x as f32, p.y as f32)
}
