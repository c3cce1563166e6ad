//! Rendering handles passed to game code.
//!
//! The loop does not know how a frame is drawn; `WinitWindow::draw` hands
//! these to the game's draw closure.

mod ctx;

pub use ctx::{RenderCtx, RenderTarget};
