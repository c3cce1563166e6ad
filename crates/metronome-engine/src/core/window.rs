/// Display surface contract used by the loop.
///
/// Implementations own the native window, its event polling, and
/// presentation. The loop only asks the questions below; rendering goes
/// through whatever API the concrete window exposes to its `GameLogic`.
pub trait Window {
    /// Realizes the window and its graphics context.
    fn init(&mut self) -> anyhow::Result<()>;

    /// Whether the user or the platform asked the window to close.
    fn close_requested(&self) -> bool;

    /// Presents the rendered frame and processes pending platform events.
    fn present(&mut self) -> anyhow::Result<()>;

    /// Whether presentation is paced by the display (vertical sync).
    fn display_sync_active(&self) -> bool;

    /// Drawable width in physical pixels.
    fn width(&self) -> u32;

    /// Drawable height in physical pixels.
    fn height(&self) -> u32;

    /// Returns `true` once after each resize, then `false` until the next.
    fn consume_resized_flag(&mut self) -> bool;

    /// Whether windowing calls must come from the process's main thread.
    ///
    /// Queried once, before the loop is launched, to pick a launch mode.
    fn requires_main_thread() -> bool
    where
        Self: Sized,
    {
        false
    }
}
