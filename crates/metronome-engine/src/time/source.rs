use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Source of timestamps in seconds, measured from an arbitrary fixed origin.
pub trait TimeSource {
    fn now(&self) -> f64;
}

/// Wall-clock source backed by `Instant`.
#[derive(Debug, Copy, Clone)]
pub struct MonotonicSource {
    origin: Instant,
}

impl MonotonicSource {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicSource {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Manually driven source for deterministic loops (tests, replays).
///
/// Clones share the same timestamp, so a test can keep one handle and pass
/// another into the engine. With a non-zero `step`, every read advances the
/// time by `step` after returning the current value; this lets a frame wait
/// make progress without a real clock.
#[derive(Debug, Clone)]
pub struct ManualSource {
    bits: Arc<AtomicU64>,
    step: f64,
}

impl ManualSource {
    pub fn new(start: f64) -> Self {
        Self::with_step(start, 0.0)
    }

    pub fn with_step(start: f64, step: f64) -> Self {
        Self {
            bits: Arc::new(AtomicU64::new(start.to_bits())),
            step,
        }
    }

    /// Current time without triggering the auto-advance.
    pub fn peek(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }

    pub fn set(&self, t: f64) {
        self.bits.store(t.to_bits(), Ordering::Release);
    }

    pub fn advance(&self, dt: f64) {
        self.fetch_add(dt);
    }

    fn fetch_add(&self, dt: f64) -> f64 {
        let mut current = self.bits.load(Ordering::Acquire);
        loop {
            let next = (f64::from_bits(current) + dt).to_bits();
            match self
                .bits
                .compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(prev) => return f64::from_bits(prev),
                Err(actual) => current = actual,
            }
        }
    }
}

impl TimeSource for ManualSource {
    fn now(&self) -> f64 {
        if self.step == 0.0 {
            self.peek()
        } else {
            self.fetch_add(self.step)
        }
    }
}
