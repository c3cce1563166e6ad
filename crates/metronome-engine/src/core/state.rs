use std::fmt;

/// Lifecycle of an `Engine`.
///
/// `NotStarted -> Running -> Stopping -> Stopped`. A failed initialization
/// goes straight from `NotStarted` to `Stopping`; `Stopped` is only ever
/// reached through `Stopping`, after cleanup.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum LoopState {
    #[default]
    NotStarted,
    Running,
    Stopping,
    Stopped,
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LoopState::NotStarted => "not started",
            LoopState::Running => "running",
            LoopState::Stopping => "stopping",
            LoopState::Stopped => "stopped",
        })
    }
}
