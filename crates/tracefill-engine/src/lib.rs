//! tracefill engine crate.
//!
//! Platform-agnostic plumbing used by the game core and by whatever
//! presentation layer hosts it: geometry types, headless GPU device,
//! pointer input, frame/fixed timing and logging setup.

pub mod coords;
pub mod device;
pub mod input;
pub mod logging;
pub mod time;
