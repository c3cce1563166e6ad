//! Native window backed by winit and a wgpu surface.

mod native;

pub use native::WinitWindow;
pub use winit::keyboard::KeyCode;
