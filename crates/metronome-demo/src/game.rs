use anyhow::Result;
use metronome_engine::core::{GameLogic, Window};
use metronome_engine::window::{KeyCode, WinitWindow};

use crate::renderer::TriangleRenderer;

/// Brightness change per second while an arrow key is held.
const FADE_RATE: f64 = 0.5;

/// Direction the brightness moves this frame, sampled in `input`.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
enum Fade {
    #[default]
    Hold,
    Up,
    Down,
}

/// Single-triangle scene over a clear color the player can brighten or dim.
///
/// Brightness only changes in `update`, so it moves by the same amount per
/// simulated second whatever the frame rate.
pub struct TriangleGame {
    renderer: TriangleRenderer,
    fade: Fade,
    brightness: f64,
    ticks: u64,
}

impl TriangleGame {
    pub fn new() -> Self {
        Self {
            renderer: TriangleRenderer::new(),
            fade: Fade::Hold,
            brightness: 0.1,
            ticks: 0,
        }
    }

    fn step(&mut self, interval: f64) {
        let delta = match self.fade {
            Fade::Hold => return,
            Fade::Up => FADE_RATE * interval,
            Fade::Down => -FADE_RATE * interval,
        };
        self.brightness = (self.brightness + delta).clamp(0.0, 1.0);
    }

    fn clear_color(&self) -> wgpu::Color {
        let b = self.brightness;
        wgpu::Color {
            r: b * 0.6,
            g: b * 0.7,
            b,
            a: 1.0,
        }
    }
}

impl Default for TriangleGame {
    fn default() -> Self {
        Self::new()
    }
}

impl GameLogic<WinitWindow> for TriangleGame {
    fn init(&mut self) -> Result<()> {
        log::info!("triangle demo ready; Up/Down fade the background, Escape quits");
        Ok(())
    }

    fn input(&mut self, window: &mut WinitWindow) -> Result<()> {
        if window.is_key_down(KeyCode::Escape) {
            window.request_close();
        }

        let up = window.is_key_down(KeyCode::ArrowUp);
        let down = window.is_key_down(KeyCode::ArrowDown);
        self.fade = match (up, down) {
            (true, false) => Fade::Up,
            (false, true) => Fade::Down,
            _ => Fade::Hold,
        };
        Ok(())
    }

    fn update(&mut self, interval: f64) -> Result<()> {
        self.step(interval);
        self.ticks += 1;
        Ok(())
    }

    fn render(&mut self, window: &mut WinitWindow) -> Result<()> {
        if let Some((width, height)) = take_resize(window) {
            log::info!("window resized to {width}x{height}");
        }

        let clear = self.clear_color();
        let renderer = &mut self.renderer;
        window.draw(clear, |ctx, target| renderer.render(ctx, target))
    }

    fn cleanup(&mut self) {
        log::info!(
            "triangle demo finished after {} ticks (brightness {:.2})",
            self.ticks,
            self.brightness
        );
        self.renderer.release();
    }
}

/// New drawable size if the window was resized since the last call.
fn take_resize<W: Window>(window: &mut W) -> Option<(u32, u32)> {
    window
        .consume_resized_flag()
        .then(|| (window.width(), window.height()))
}
