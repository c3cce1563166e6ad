//! Metronome demo: one triangle driven by the fixed-timestep loop.
//!
//! Usage:
//!   metronome-demo [--config <file.toml>] [--no-vsync] [--ups <n>] [--fps <n>]
//!
//! Up/Down change the background brightness, Escape quits.

mod game;
mod renderer;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use metronome_engine::core::Engine;
use metronome_engine::logging::{LoggingConfig, init_logging};
use metronome_engine::window::WinitWindow;
use metronome_engine::{EngineConfig, EngineError};

use crate::game::TriangleGame;

#[derive(Parser)]
#[command(name = "metronome-demo")]
#[command(about = "Fixed-timestep loop demo rendering a single triangle")]
struct Args {
    /// TOML config file; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Window title
    #[arg(long)]
    title: Option<String>,

    /// Window width in logical pixels
    #[arg(long)]
    width: Option<u32>,

    /// Window height in logical pixels
    #[arg(long)]
    height: Option<u32>,

    /// Disable vertical sync and let the frame limiter pace rendering
    #[arg(long)]
    no_vsync: bool,

    /// Simulation updates per second
    #[arg(long)]
    ups: Option<u32>,

    /// Frame-rate target when vsync is off
    #[arg(long)]
    fps: Option<u32>,

    /// Log filter, e.g. "debug" or "metronome_engine=trace"
    #[arg(long)]
    log: Option<String>,
}

impl Args {
    fn engine_config(&self) -> Result<EngineConfig, EngineError> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::load(path)?,
            None => EngineConfig::default(),
        };

        if let Some(title) = &self.title {
            config.window.title = title.clone();
        }
        if let Some(width) = self.width {
            config.window.width = width;
        }
        if let Some(height) = self.height {
            config.window.height = height;
        }
        if self.no_vsync {
            config.window.vsync = false;
        }
        if let Some(ups) = self.ups {
            config.timing.updates_per_second = ups;
        }
        if let Some(fps) = self.fps {
            config.timing.frames_per_second = fps;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    init_logging(LoggingConfig {
        env_filter: args.log.clone(),
        ..LoggingConfig::default()
    });

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Init and loop failures are reported by the engine itself.
            if matches!(err, EngineError::Spawn(_) | EngineError::Panicked(_)) {
                log::error!("{}", err.report());
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), EngineError> {
    let config = args
        .engine_config()
        .inspect_err(|err| log::error!("{}", err.report()))?;
    log::info!(
        "starting \"{}\": {} UPS, {} FPS target, vsync {}",
        config.window.title,
        config.timing.updates_per_second,
        config.timing.frames_per_second,
        if config.window.vsync { "on" } else { "off" }
    );

    let EngineConfig { window, timing } = config;
    let handle = Engine::start(move || {
        Engine::new(&timing, WinitWindow::new(window), TriangleGame::new())
    })?;

    handle.join()
}
