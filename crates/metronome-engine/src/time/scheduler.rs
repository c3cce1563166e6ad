use std::iter::FusedIterator;
use std::time::Duration;

use crate::config::TimingConfig;
use crate::error::ConfigError;

use super::cancel::CancelToken;

/// One fixed simulation step.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Tick {
    /// Constant step length in seconds (`1 / updates_per_second`).
    pub interval: f64,

    /// Position of this tick within the current drain, starting at 0.
    pub index: u32,
}

/// Result of a frame-slot wait.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameWait {
    /// The frame slot has been used up.
    Completed,
    /// A stop was requested while waiting.
    Cancelled,
}

/// Fixed-timestep scheduler and frame limiter.
///
/// Variable-length frame deltas go in through `accumulate`; `drain_ticks`
/// turns the accumulated time into a whole number of constant-size ticks,
/// carrying the remainder into the next frame. Simulation is therefore
/// advanced by the same step regardless of how fast frames are produced.
///
/// Invariant: after a drain completes, `0 <= accumulator < fixed_interval`.
#[derive(Debug, Clone)]
pub struct FixedStepScheduler {
    fixed_interval: f64,
    frame_slot: f64,
    accumulator: f64,
    max_accumulated: Option<f64>,
    sleep_granularity: Duration,
}

impl FixedStepScheduler {
    pub fn new(config: &TimingConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let fixed_interval = 1.0 / f64::from(config.updates_per_second);
        let frame_slot = 1.0 / f64::from(config.frames_per_second);

        Ok(Self {
            fixed_interval,
            frame_slot,
            accumulator: 0.0,
            max_accumulated: config
                .max_ticks_per_frame
                .map(|n| f64::from(n) * fixed_interval),
            sleep_granularity: config.sleep_granularity(),
        })
    }

    /// Seconds per update tick.
    pub fn fixed_interval(&self) -> f64 {
        self.fixed_interval
    }

    /// Minimum seconds per frame when the display does not pace presentation.
    pub fn frame_slot(&self) -> f64 {
        self.frame_slot
    }

    /// Unconsumed simulation time in seconds.
    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    /// Fraction of a tick left in the accumulator, in `[0, 1)` after a drain.
    ///
    /// Renderers can use it to interpolate between the previous and the
    /// current simulation state.
    pub fn alpha(&self) -> f64 {
        self.accumulator / self.fixed_interval
    }

    /// Adds a frame delta to the accumulator.
    ///
    /// Negative and non-finite deltas carry no time and are ignored. When a
    /// backlog cap is configured, time beyond the cap is dropped so a slow
    /// update cannot feed an ever-growing tick backlog.
    pub fn accumulate(&mut self, delta: f64) {
        if !delta.is_finite() || delta <= 0.0 {
            return;
        }

        self.accumulator += delta;

        if let Some(max) = self.max_accumulated {
            if self.accumulator > max {
                log::warn!(
                    "simulation is {:.1}ms behind; dropping backlog beyond {:.1}ms",
                    self.accumulator * 1000.0,
                    max * 1000.0
                );
                self.accumulator = max;
            }
        }
    }

    /// Returns the ticks due for the accumulated time.
    ///
    /// The iterator is lazy: each `next()` consumes one `fixed_interval`
    /// from the accumulator. Dropping it early leaves the remaining time for
    /// the next frame.
    pub fn drain_ticks(&mut self) -> Ticks<'_> {
        Ticks {
            scheduler: self,
            emitted: 0,
        }
    }

    /// Whether the loop has to pace frames itself.
    pub fn should_limit(&self, display_sync_active: bool) -> bool {
        !display_sync_active
    }

    /// Blocks until `frame_slot` seconds have passed since `last_loop_start`.
    ///
    /// Sleeps in steps of the configured granularity and re-reads `now` after
    /// each step, which tolerates coarse OS sleep resolution. A zero
    /// granularity yields the thread instead of sleeping. `cancel` is checked
    /// before every step.
    pub fn wait_for_frame_slot<F>(
        &self,
        last_loop_start: f64,
        mut now: F,
        cancel: &CancelToken,
    ) -> FrameWait
    where
        F: FnMut() -> f64,
    {
        let end = last_loop_start + self.frame_slot;

        loop {
            if cancel.is_cancelled() {
                log::debug!("frame wait interrupted by stop request");
                return FrameWait::Cancelled;
            }

            if now() >= end {
                return FrameWait::Completed;
            }

            if self.sleep_granularity.is_zero() {
                std::thread::yield_now();
            } else {
                std::thread::sleep(self.sleep_granularity);
            }
        }
    }
}

/// Lazy sequence of due ticks; see [`FixedStepScheduler::drain_ticks`].
#[derive(Debug)]
pub struct Ticks<'a> {
    scheduler: &'a mut FixedStepScheduler,
    emitted: u32,
}

impl Iterator for Ticks<'_> {
    type Item = Tick;

    fn next(&mut self) -> Option<Tick> {
        let interval = self.scheduler.fixed_interval;
        if self.scheduler.accumulator < interval {
            return None;
        }

        self.scheduler.accumulator -= interval;
        let tick = Tick {
            interval,
            index: self.emitted,
        };
        self.emitted += 1;
        Some(tick)
    }
}

// The accumulator only shrinks while draining.
impl FusedIterator for Ticks<'_> {}
