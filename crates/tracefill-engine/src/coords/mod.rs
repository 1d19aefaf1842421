//! Coordinate and geometry types shared by the game core and its collaborators.
//!
//! Canonical CPU space:
//! - level units, as supplied by the asset-import collaborator
//! - origin top-left
//! - +X right, +Y down
//!
//! Region masks live in pixel space; `RegionMask` in the core crate maps
//! level units to its pixels.

mod color;
mod rect;
mod vec2;

pub use color::ColorRgba;
pub use rect::Rect;
pub use vec2::Vec2;
