//! Core engine-facing contracts.
//!
//! This module defines the stable interface between the loop and the pluggable
//! collaborators: a `Window` that owns the display surface and a `GameLogic`
//! that produces frames. `Engine` drives both at a fixed simulation rate.

mod engine;
mod logic;
mod state;
mod window;

pub use engine::{Engine, LaunchMode, LoopHandle};
pub use logic::GameLogic;
pub use state::LoopState;
pub use window::Window;
