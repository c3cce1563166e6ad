use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Configuration problems, detected before the loop starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },

    #[error("failed to read config file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config")]
    Parse(#[from] toml::de::Error),
}

/// Initialization step that failed.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum InitStage {
    Window,
    Game,
}

impl fmt::Display for InitStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InitStage::Window => "window",
            InitStage::Game => "game logic",
        })
    }
}

/// Loop phase that failed.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoopPhase {
    Input,
    Update,
    Render,
    Present,
}

impl fmt::Display for LoopPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LoopPhase::Input => "input",
            LoopPhase::Update => "update",
            LoopPhase::Render => "render",
            LoopPhase::Present => "present",
        })
    }
}

/// Fatal engine errors. Each one stops the loop after cleanup.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid configuration")]
    Config(#[from] ConfigError),

    #[error("{stage} initialization failed")]
    Init {
        stage: InitStage,
        #[source]
        source: anyhow::Error,
    },

    #[error("{phase} failed in iteration {iteration}")]
    Runtime {
        phase: LoopPhase,
        iteration: u64,
        #[source]
        source: anyhow::Error,
    },

    #[error("engine has already been run")]
    AlreadyStarted,

    #[error("failed to spawn the game loop thread")]
    Spawn(#[source] std::io::Error),

    #[error("game loop thread panicked: {0}")]
    Panicked(String),
}

impl EngineError {
    /// Message plus every cause, joined with `": "`.
    pub fn report(&self) -> String {
        let mut out = self.to_string();
        let mut cause = std::error::Error::source(self);
        while let Some(err) = cause {
            out.push_str(": ");
            out.push_str(&err.to_string());
            cause = err.source();
        }
        out
    }
}
