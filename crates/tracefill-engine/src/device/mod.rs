//! Headless GPU device management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue without a surface
//! - blocking readback of small result buffers
//!
//! Rendering is owned by the presentation layer; the game core only records
//! compute work (paint accumulation, coverage reduction).

mod gpu;
mod init;

pub use gpu::Gpu;
pub use init::GpuInit;
