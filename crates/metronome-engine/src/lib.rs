//! Metronome engine crate.
//!
//! A fixed-timestep application loop (`core::Engine`) driven by a monotonic
//! clock and frame limiter (`time`), plus the winit/wgpu window it usually
//! runs against.

pub mod config;
pub mod core;
pub mod device;
pub mod error;
pub mod logging;
pub mod render;
pub mod time;
pub mod window;

pub use config::{EngineConfig, TimingConfig, WindowConfig};
pub use error::{ConfigError, EngineError};
