//! Stroke pacing, continuation forgiveness and release judgement.

mod controller;
mod speed;

pub use controller::{
    stroke_error, within_tolerance, StrokeConfig, StrokeProgressController, StrokeStep,
};
pub use speed::{SpeedCurve, SpeedModel};
