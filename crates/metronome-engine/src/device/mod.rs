//! GPU device + surface management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue
//! - creating & configuring the Surface, including the present mode that
//!   decides whether the display paces the loop
//! - acquiring frames and providing encoders/views for rendering

mod gpu;
mod init;

pub use gpu::{Gpu, GpuFrame, SurfaceErrorAction};
pub use init::GpuInit;
