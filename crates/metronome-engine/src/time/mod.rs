//! Time subsystem.
//!
//! Provides the loop's notion of time without coupling to the runtime:
//! - `Clock` turns a `TimeSource` into per-iteration deltas
//! - `FixedStepScheduler` converts those deltas into fixed-size update ticks
//!   and paces frames when the display does not
//! - `CancelToken` lets another thread interrupt the loop and its frame wait

mod cancel;
mod clock;
mod scheduler;
mod source;

pub use cancel::CancelToken;
pub use clock::Clock;
pub use scheduler::{FixedStepScheduler, FrameWait, Tick, Ticks};
pub use source::{ManualSource, MonotonicSource, TimeSource};
