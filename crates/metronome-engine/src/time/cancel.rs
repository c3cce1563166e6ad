use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared stop request.
///
/// The loop thread polls it before every iteration and at every frame-wait
/// step. Any clone can request the stop, from any thread.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}
