//! Engine configuration.
//!
//! All values are fixed at construction; nothing is reconfigured while the
//! loop runs. Every section can be deserialized from TOML with missing keys
//! falling back to defaults:
//!
//! ```toml
//! [window]
//! title = "metronome"
//! width = 600
//! height = 480
//! vsync = false
//!
//! [timing]
//! updates_per_second = 30
//! frames_per_second = 75
//! max_ticks_per_frame = 10
//! sleep_granularity_ms = 1
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub window: WindowConfig,
    pub timing: TimingConfig,
}

impl EngineConfig {
    pub fn from_toml_str(src: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(src)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let src = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&src)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.window.validate()?;
        self.timing.validate()
    }
}

/// Initial window parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,

    /// Initial size in logical pixels.
    pub width: u32,
    pub height: u32,

    /// Let the display pace presentation. When the surface ends up without
    /// vertical sync, the loop's own frame limiter takes over.
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "metronome".to_string(),
            width: 600,
            height: 480,
            vsync: true,
        }
    }
}

impl WindowConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("window.width", self.width)?;
        positive("window.height", self.height)
    }
}

/// Update and frame rates for the fixed-step scheduler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Fixed simulation rate; each tick advances `1 / updates_per_second`.
    pub updates_per_second: u32,

    /// Frame-rate target used when the display does not throttle.
    pub frames_per_second: u32,

    /// Largest number of ticks a single frame may owe. Older time is dropped.
    /// `None` lets the backlog grow without bound.
    pub max_ticks_per_frame: Option<u32>,

    /// Sleep step of the frame limiter. Zero yields instead of sleeping.
    pub sleep_granularity_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            updates_per_second: 30,
            frames_per_second: 75,
            max_ticks_per_frame: Some(10),
            sleep_granularity_ms: 1,
        }
    }
}

impl TimingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("timing.updates_per_second", self.updates_per_second)?;
        positive("timing.frames_per_second", self.frames_per_second)?;
        if let Some(n) = self.max_ticks_per_frame {
            positive("timing.max_ticks_per_frame", n)?;
        }
        Ok(())
    }

    pub fn sleep_granularity(&self) -> Duration {
        Duration::from_millis(self.sleep_granularity_ms)
    }
}

fn positive(field: &'static str, value: u32) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::NotPositive { field });
    }
    Ok(())
}
