//! Time subsystem.
//!
//! Two clocks drive the game loop:
//! - `FrameClock`: one `tick()` per presented frame, clamped delta time
//! - `FixedStep`: converts frame deltas into a whole number of fixed ticks
//!   for timing-sensitive controllers (stroke pacing, brush sampling)

mod fixed_step;
mod frame_clock;

pub use fixed_step::FixedStep;
pub use frame_clock::{FrameClock, FrameTime};
