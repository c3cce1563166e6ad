use super::source::{MonotonicSource, TimeSource};

/// Loop clock producing elapsed-time deltas between polls.
///
/// `Clock` is owned by a single loop so independent loops never share
/// delta-time state. It keeps two anchors:
/// - `last_poll`: advanced by every `elapsed()` call
/// - `last_loop_start`: advanced once per completed frame, used by the
///   frame limiter as the start of the current frame slot
///
/// Timestamps never move backwards. If the underlying source does, the step
/// is reported and `elapsed()` yields `0.0` until the source catches up.
#[derive(Debug, Clone)]
pub struct Clock<S = MonotonicSource> {
    source: S,
    last_poll: f64,
    last_loop_start: f64,
    frame_index: u64,
}

impl Clock<MonotonicSource> {
    pub fn new() -> Self {
        Self::with_source(MonotonicSource::new())
    }
}

impl Default for Clock<MonotonicSource> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: TimeSource> Clock<S> {
    pub fn with_source(source: S) -> Self {
        Self {
            source,
            last_poll: 0.0,
            last_loop_start: 0.0,
            frame_index: 0,
        }
    }

    /// Records the current time as both the poll and the loop-start anchor.
    ///
    /// Must run once before the first `elapsed()` call; the loop does this
    /// during initialization, after the window is realized.
    pub fn init(&mut self) {
        let now = self.source.now();
        self.last_poll = now;
        self.last_loop_start = now;
        self.frame_index = 0;
    }

    /// Returns seconds since the previous poll and advances the poll anchor.
    pub fn elapsed(&mut self) -> f64 {
        let now = self.source.now();
        let dt = now - self.last_poll;

        if !dt.is_finite() || dt < 0.0 {
            log::warn!(
                "time source stepped backwards ({:.6}s -> {:.6}s); clamping delta to zero",
                self.last_poll,
                now
            );
            return 0.0;
        }

        self.last_poll = now;
        dt
    }

    /// Current timestamp; does not touch any anchor.
    pub fn now(&self) -> f64 {
        self.source.now()
    }

    /// Marks the end of a completed frame / start of the next frame slot.
    pub fn mark_loop_start(&mut self) {
        let now = self.source.now();
        self.last_loop_start = self.last_loop_start.max(now);
        self.frame_index = self.frame_index.wrapping_add(1);
    }

    pub fn last_loop_start(&self) -> f64 {
        self.last_loop_start
    }

    pub fn last_poll(&self) -> f64 {
        self.last_poll
    }

    /// Number of frames marked since `init()`.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }
}
