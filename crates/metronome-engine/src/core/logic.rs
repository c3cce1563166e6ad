/// Application contract implemented by games and tools.
///
/// Hooks are called from the loop thread only, in this order per iteration:
/// `input`, `update` once per due tick, `render`. Any error is fatal to the
/// loop; `cleanup` still runs exactly once.
pub trait GameLogic<W: ?Sized> {
    /// Called once after the window and clock are initialized.
    fn init(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Reads input for the coming frame.
    fn input(&mut self, _window: &mut W) -> anyhow::Result<()> {
        Ok(())
    }

    /// Advances the simulation by exactly `interval` seconds.
    fn update(&mut self, interval: f64) -> anyhow::Result<()>;

    /// Draws the current state. The loop presents right after.
    fn render(&mut self, window: &mut W) -> anyhow::Result<()>;

    /// Releases resources. Called once per run, on every exit path.
    fn cleanup(&mut self) {}
}
