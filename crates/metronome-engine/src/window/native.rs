use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window as NativeWindow, WindowId};

use crate::config::WindowConfig;
use crate::core::Window;
use crate::device::{Gpu, GpuInit, SurfaceErrorAction};
use crate::render::{RenderCtx, RenderTarget};

/// Per-pump wait while the window is being created.
const INIT_PUMP_TIMEOUT: Duration = Duration::from_millis(10);

/// Pumps before giving up on window creation (about five seconds).
const INIT_PUMP_ATTEMPTS: u32 = 500;

/// Native window + wgpu surface driven by pumping the winit event loop.
///
/// The loop owns the cadence: winit events are drained once per `present()`
/// instead of winit calling into the application. Everything here is bound to
/// the thread that called `init()`.
pub struct WinitWindow {
    event_loop: Option<EventLoop<()>>,
    state: WindowState,

    /// Frame rendered by `draw` and waiting for `present`.
    pending: Option<wgpu::SurfaceTexture>,
}

/// Event-facing half, handed to winit while pumping.
struct WindowState {
    config: WindowConfig,
    gpu_init: GpuInit,

    window: Option<Arc<NativeWindow>>,
    gpu: Option<Gpu>,

    keys_down: HashSet<KeyCode>,
    close_requested: bool,
    resized: bool,

    /// Failure raised inside a winit callback, surfaced after the pump.
    error: Option<anyhow::Error>,
}

impl WinitWindow {
    pub fn new(config: WindowConfig) -> Self {
        let gpu_init = GpuInit {
            vsync: config.vsync,
            ..GpuInit::default()
        };
        Self::with_gpu_init(config, gpu_init)
    }

    pub fn with_gpu_init(config: WindowConfig, gpu_init: GpuInit) -> Self {
        Self {
            event_loop: None,
            state: WindowState {
                config,
                gpu_init,
                window: None,
                gpu: None,
                keys_down: HashSet::new(),
                close_requested: false,
                resized: false,
                error: None,
            },
            pending: None,
        }
    }

    /// Whether `key` is currently held.
    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.state.keys_down.contains(&key)
    }

    /// Asks the loop to stop after the current iteration.
    pub fn request_close(&mut self) {
        self.state.close_requested = true;
    }

    /// Clears the next surface frame with `clear`, lets `draw` record into
    /// it, and submits the commands. The frame is shown by `present()`.
    ///
    /// A lost or outdated surface is reconfigured and the frame skipped.
    pub fn draw<F>(&mut self, clear: wgpu::Color, draw: F) -> Result<()>
    where
        F: FnOnce(&RenderCtx<'_>, &mut RenderTarget<'_>),
    {
        let Some(gpu) = self.state.gpu.as_mut() else {
            bail!("draw called before the window was initialized");
        };

        // A frame drawn but never presented would block acquisition.
        self.pending = None;

        let mut frame = match gpu.begin_frame() {
            Ok(frame) => frame,
            Err(err) => match gpu.handle_surface_error(&err) {
                SurfaceErrorAction::Fatal => {
                    return Err(err).context("surface frame acquisition failed");
                }
                action => {
                    log::debug!("skipping frame after surface error {err:?}: {action:?}");
                    return Ok(());
                }
            },
        };

        // Clear pass, dropped before the draw closure borrows the encoder.
        {
            let _rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("metronome clear"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
        }

        {
            let ctx = RenderCtx::new(gpu.device(), gpu.queue(), gpu.surface_format(), gpu.size());
            let mut target = RenderTarget::new(&mut frame.encoder, &frame.view);
            draw(&ctx, &mut target);
        }

        gpu.submit(frame.encoder);
        drop(frame.view);
        self.pending = Some(frame.surface_texture);
        Ok(())
    }

    fn pump(&mut self, timeout: Option<Duration>) -> Result<()> {
        let Some(event_loop) = self.event_loop.as_mut() else {
            bail!("window is not initialized");
        };

        let status = event_loop.pump_app_events(timeout, &mut self.state);

        if let Some(err) = self.state.error.take() {
            return Err(err);
        }
        if let PumpStatus::Exit(code) = status {
            log::debug!("winit event loop exited with code {code}");
            self.state.close_requested = true;
        }
        Ok(())
    }
}

impl Window for WinitWindow {
    fn init(&mut self) -> Result<()> {
        self.event_loop = Some(build_event_loop()?);

        for _ in 0..INIT_PUMP_ATTEMPTS {
            self.pump(Some(INIT_PUMP_TIMEOUT))?;

            if self.state.gpu.is_some() {
                log::info!(
                    "window \"{}\" ready ({}x{})",
                    self.state.config.title,
                    self.width(),
                    self.height()
                );
                return Ok(());
            }
            if self.state.close_requested {
                bail!("window closed during initialization");
            }
        }

        bail!(
            "window was not created within {}ms",
            INIT_PUMP_TIMEOUT.as_millis() * u128::from(INIT_PUMP_ATTEMPTS)
        )
    }

    fn close_requested(&self) -> bool {
        self.state.close_requested
    }

    fn present(&mut self) -> Result<()> {
        if let Some(texture) = self.pending.take() {
            if let Some(window) = &self.state.window {
                window.pre_present_notify();
            }
            texture.present();
        }

        self.pump(Some(Duration::ZERO))
    }

    fn display_sync_active(&self) -> bool {
        self.state
            .gpu
            .as_ref()
            .map_or(self.state.config.vsync, Gpu::display_synced)
    }

    fn width(&self) -> u32 {
        self.state.gpu.as_ref().map_or(0, |gpu| gpu.size().width)
    }

    fn height(&self) -> u32 {
        self.state.gpu.as_ref().map_or(0, |gpu| gpu.size().height)
    }

    fn consume_resized_flag(&mut self) -> bool {
        std::mem::take(&mut self.state.resized)
    }

    fn requires_main_thread() -> bool {
        // AppKit/UIKit only accept windowing calls from the main thread.
        cfg!(any(target_os = "macos", target_os = "ios"))
    }
}

impl WindowState {
    fn create(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = NativeWindow::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(LogicalSize::new(
                f64::from(self.config.width),
                f64::from(self.config.height),
            ));

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let gpu = pollster::block_on(Gpu::new(Arc::clone(&window), &self.gpu_init))
            .context("GPU initialization failed")?;

        self.window = Some(window);
        self.gpu = Some(gpu);
        Ok(())
    }
}

impl ApplicationHandler for WindowState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(err) = self.create(event_loop) {
            self.error = Some(err);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                self.close_requested = true;
            }

            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = self.gpu.as_mut() {
                    gpu.resize(new_size);
                }
                self.resized = true;
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                if let (Some(window), Some(gpu)) = (self.window.as_ref(), self.gpu.as_mut()) {
                    gpu.resize(window.inner_size());
                }
                self.resized = true;
            }

            WindowEvent::Focused(false) => {
                // Avoid stuck keys when focus changes mid-press.
                self.keys_down.clear();
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    match event.state {
                        ElementState::Pressed => {
                            self.keys_down.insert(code);
                        }
                        ElementState::Released => {
                            self.keys_down.remove(&code);
                        }
                    }
                }
            }

            _ => {}
        }
    }
}

/// Builds the event loop on the current thread.
///
/// winit refuses non-main threads unless told otherwise; the loop may run on
/// a dedicated thread wherever the platform allows it.
fn build_event_loop() -> Result<EventLoop<()>> {
    let mut builder = EventLoop::builder();

    #[cfg(target_os = "windows")]
    {
        use winit::platform::windows::EventLoopBuilderExtWindows;
        builder.with_any_thread(true);
    }

    #[cfg(all(
        unix,
        not(any(target_os = "macos", target_os = "ios", target_os = "android"))
    ))]
    {
        use winit::platform::x11::EventLoopBuilderExtX11;
        builder.with_any_thread(true);
    }

    builder.build().context("failed to create winit EventLoop")
}
