//! Input subsystem.
//!
//! Public API is platform-agnostic. The presentation layer translates its
//! window-system or touch events into `InputEvent`s (in level units) and feeds
//! them through `InputState::apply_event`, which records per-frame transitions
//! into an `InputFrame`.

mod frame;
mod state;
mod types;

pub use frame::InputFrame;
pub use state::InputState;
pub use types::{InputEvent, PointerButtonEvent, PointerId, PointerPhase};
