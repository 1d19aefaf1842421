//! tracefill core crate.
//!
//! Game logic for tracing outlines and painting regions:
//! - arc-length evaluation of cubic outlines (`path`)
//! - stroke pacing and judgement (`stroke`)
//! - paint coverage on the GPU or CPU (`coverage`)
//! - the stage state machine with undo and scoring (`stage`)

pub mod config;
pub mod coverage;
pub mod error;
pub mod level;
pub mod path;
pub mod stage;
pub mod stroke;

pub use config::GameConfig;
pub use error::{LevelError, LevelErrorKind};
pub use level::{FillShape, Level};
