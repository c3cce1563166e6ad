use std::any::Any;
use std::thread;

use crate::config::TimingConfig;
use crate::error::{EngineError, InitStage, LoopPhase};
use crate::time::{CancelToken, Clock, FixedStepScheduler, MonotonicSource, TimeSource};

use super::logic::GameLogic;
use super::state::LoopState;
use super::window::Window;

const LOOP_THREAD_NAME: &str = "game-loop";

/// Where the loop runs.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LaunchMode {
    /// On the calling thread, for windowing layers bound to the main thread.
    Inline,
    /// On a dedicated, named thread.
    Dedicated,
}

impl LaunchMode {
    pub fn for_window<W: Window>() -> Self {
        if W::requires_main_thread() {
            LaunchMode::Inline
        } else {
            LaunchMode::Dedicated
        }
    }
}

/// Handle returned by [`Engine::start`].
pub struct LoopHandle {
    mode: LaunchMode,
    inner: HandleInner,
}

enum HandleInner {
    Finished(Result<(), EngineError>),
    Running(thread::JoinHandle<Result<(), EngineError>>),
}

impl LoopHandle {
    pub fn mode(&self) -> LaunchMode {
        self.mode
    }

    pub fn is_finished(&self) -> bool {
        match &self.inner {
            HandleInner::Finished(_) => true,
            HandleInner::Running(handle) => handle.is_finished(),
        }
    }

    /// Waits for the loop and returns its result.
    pub fn join(self) -> Result<(), EngineError> {
        match self.inner {
            HandleInner::Finished(result) => result,
            HandleInner::Running(handle) => handle
                .join()
                .unwrap_or_else(|payload| Err(EngineError::Panicked(panic_message(&*payload)))),
        }
    }
}

/// Fixed-timestep application loop.
///
/// Each iteration:
/// 1. take the elapsed time from the clock and feed the scheduler
/// 2. `game.input(window)`
/// 3. `game.update(interval)` once per due tick
/// 4. `game.render(window)`, then `window.present()`
/// 5. wait out the frame slot unless the display paces presentation
///
/// The loop ends when the window requests close, when the stop handle is
/// cancelled, or on the first error. `GameLogic::cleanup` runs exactly once
/// per `run()`, whichever way it ends.
pub struct Engine<W, G, S = MonotonicSource> {
    window: W,
    game: G,
    clock: Clock<S>,
    scheduler: FixedStepScheduler,
    cancel: CancelToken,
    state: LoopState,
    iterations: u64,
}

impl<W, G> Engine<W, G, MonotonicSource>
where
    W: Window,
    G: GameLogic<W>,
{
    pub fn new(timing: &TimingConfig, window: W, game: G) -> Result<Self, EngineError> {
        Self::with_time_source(timing, window, game, MonotonicSource::new())
    }
}

impl<W, G, S> Engine<W, G, S>
where
    W: Window,
    G: GameLogic<W>,
    S: TimeSource,
{
    pub fn with_time_source(
        timing: &TimingConfig,
        window: W,
        game: G,
        source: S,
    ) -> Result<Self, EngineError> {
        Ok(Self {
            window,
            game,
            clock: Clock::with_source(source),
            scheduler: FixedStepScheduler::new(timing)?,
            cancel: CancelToken::new(),
            state: LoopState::NotStarted,
            iterations: 0,
        })
    }

    /// Replaces the stop handle, e.g. with one created before the engine.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that stops the loop when cancelled, from any thread.
    pub fn stop_handle(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Completed iterations (rendered and presented frames).
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Builds and runs an engine in the launch mode its window type needs.
    ///
    /// `build` runs on the thread that will run the loop, so window types
    /// holding thread-bound platform handles never cross threads. In
    /// [`LaunchMode::Inline`] the loop has already finished when this returns.
    pub fn start<F>(build: F) -> Result<LoopHandle, EngineError>
    where
        F: FnOnce() -> Result<Self, EngineError> + Send + 'static,
        W: 'static,
        G: 'static,
        S: 'static,
    {
        let mode = LaunchMode::for_window::<W>();
        log::debug!("launching game loop ({mode:?})");

        let inner = match mode {
            LaunchMode::Inline => HandleInner::Finished(build_and_run(build)),
            LaunchMode::Dedicated => {
                let handle = thread::Builder::new()
                    .name(LOOP_THREAD_NAME.to_string())
                    .spawn(move || build_and_run(build))
                    .map_err(EngineError::Spawn)?;
                HandleInner::Running(handle)
            }
        };

        Ok(LoopHandle { mode, inner })
    }

    /// Initializes the collaborators and runs the loop to completion.
    ///
    /// Fatal errors are logged here with their full cause chain and returned.
    pub fn run(&mut self) -> Result<(), EngineError> {
        if self.state != LoopState::NotStarted {
            return Err(EngineError::AlreadyStarted);
        }

        let teardown = Teardown { engine: self };
        let result = teardown
            .engine
            .init()
            .and_then(|()| teardown.engine.game_loop());
        drop(teardown);

        if let Err(err) = &result {
            log::error!("game loop aborted: {}", err.report());
        }
        result
    }

    fn init(&mut self) -> Result<(), EngineError> {
        // The game may need a realized window/graphics context.
        self.window.init().map_err(|source| EngineError::Init {
            stage: InitStage::Window,
            source,
        })?;
        self.clock.init();
        self.game.init().map_err(|source| EngineError::Init {
            stage: InitStage::Game,
            source,
        })?;

        self.state = LoopState::Running;
        log::info!(
            "game loop running: {}x{}, tick {:.2}ms, frame slot {:.2}ms",
            self.window.width(),
            self.window.height(),
            self.scheduler.fixed_interval() * 1000.0,
            self.scheduler.frame_slot() * 1000.0
        );
        Ok(())
    }

    fn game_loop(&mut self) -> Result<(), EngineError> {
        loop {
            if self.window.close_requested() {
                log::info!("window close requested");
                return Ok(());
            }
            if self.cancel.is_cancelled() {
                log::info!("stop requested");
                return Ok(());
            }
            self.iteration()?;
        }
    }

    fn iteration(&mut self) -> Result<(), EngineError> {
        let iteration = self.iterations + 1;

        let delta = self.clock.elapsed();
        self.scheduler.accumulate(delta);

        self.game
            .input(&mut self.window)
            .map_err(runtime_error(LoopPhase::Input, iteration))?;

        for tick in self.scheduler.drain_ticks() {
            self.game
                .update(tick.interval)
                .map_err(runtime_error(LoopPhase::Update, iteration))?;
        }

        self.game
            .render(&mut self.window)
            .map_err(runtime_error(LoopPhase::Render, iteration))?;
        self.window
            .present()
            .map_err(runtime_error(LoopPhase::Present, iteration))?;

        if self.scheduler.should_limit(self.window.display_sync_active()) {
            let clock = &self.clock;
            self.scheduler
                .wait_for_frame_slot(clock.last_loop_start(), || clock.now(), &self.cancel);
        }

        self.clock.mark_loop_start();
        self.iterations = iteration;
        Ok(())
    }
}

/// Runs cleanup when dropped, so it also happens on `?` returns and unwinds.
struct Teardown<'a, W, G, S>
where
    W: Window,
    G: GameLogic<W>,
    S: TimeSource,
{
    engine: &'a mut Engine<W, G, S>,
}

impl<W, G, S> Drop for Teardown<'_, W, G, S>
where
    W: Window,
    G: GameLogic<W>,
    S: TimeSource,
{
    fn drop(&mut self) {
        let engine = &mut *self.engine;

        engine.state = LoopState::Stopping;
        log::debug!("cleaning up after {} iterations", engine.iterations);
        engine.game.cleanup();
        engine.state = LoopState::Stopped;

        log::info!("game loop {}", engine.state);
    }
}

fn build_and_run<W, G, S, F>(build: F) -> Result<(), EngineError>
where
    W: Window,
    G: GameLogic<W>,
    S: TimeSource,
    F: FnOnce() -> Result<Engine<W, G, S>, EngineError>,
{
    let mut engine = build()
        .inspect_err(|err| log::error!("failed to build engine: {}", err.report()))?;
    engine.run()
}

fn runtime_error(phase: LoopPhase, iteration: u64) -> impl FnOnce(anyhow::Error) -> EngineError {
    move |source| EngineError::Runtime {
        phase,
        iteration,
        source,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use super::*;
    use crate::time::ManualSource;

    // ── fakes ─────────────────────────────────────────────────────────────

    /// Ordered record of collaborator calls, shareable across threads.
    #[derive(Debug, Clone, Default)]
    struct Journal(Arc<Mutex<Vec<String>>>);

    impl Journal {
        fn push(&self, entry: impl Into<String>) {
            self.0.lock().unwrap().push(entry.into());
        }

        fn entries(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }

        fn count(&self, entry: &str) -> usize {
            self.entries().iter().filter(|e| *e == entry).count()
        }
    }

    struct FakeWindow {
        journal: Journal,
        fail_init: bool,
        close_after_presents: Option<u32>,
        presents: u32,
        vsync: bool,
        time: Option<ManualSource>,
        advance_on_init: f64,
        advance_per_present: f64,
    }

    impl FakeWindow {
        fn new(journal: &Journal) -> Self {
            Self {
                journal: journal.clone(),
                fail_init: false,
                close_after_presents: None,
                presents: 0,
                vsync: true,
                time: None,
                advance_on_init: 0.0,
                advance_per_present: 0.0,
            }
        }

        fn closing_after(mut self, presents: u32) -> Self {
            self.close_after_presents = Some(presents);
            self
        }

        fn driving(mut self, time: &ManualSource, per_present: f64) -> Self {
            self.time = Some(time.clone());
            self.advance_per_present = per_present;
            self
        }
    }

    impl Window for FakeWindow {
        fn init(&mut self) -> anyhow::Result<()> {
            self.journal.push("window.init");
            if self.fail_init {
                anyhow::bail!("no display");
            }
            if let Some(time) = &self.time {
                time.advance(self.advance_on_init);
            }
            Ok(())
        }

        fn close_requested(&self) -> bool {
            self.close_after_presents
                .is_some_and(|n| self.presents >= n)
        }

        fn present(&mut self) -> anyhow::Result<()> {
            self.presents += 1;
            self.journal.push("present");
            if let Some(time) = &self.time {
                time.advance(self.advance_per_present);
            }
            Ok(())
        }

        fn display_sync_active(&self) -> bool {
            self.vsync
        }

        fn width(&self) -> u32 {
            640
        }

        fn height(&self) -> u32 {
            480
        }

        fn consume_resized_flag(&mut self) -> bool {
            false
        }
    }

    /// Same fake, but bound to the launching thread.
    struct MainThreadWindow(FakeWindow);

    impl Window for MainThreadWindow {
        fn init(&mut self) -> anyhow::Result<()> {
            self.0.init()
        }

        fn close_requested(&self) -> bool {
            self.0.close_requested()
        }

        fn present(&mut self) -> anyhow::Result<()> {
            self.0.present()
        }

        fn display_sync_active(&self) -> bool {
            self.0.display_sync_active()
        }

        fn width(&self) -> u32 {
            self.0.width()
        }

        fn height(&self) -> u32 {
            self.0.height()
        }

        fn consume_resized_flag(&mut self) -> bool {
            self.0.consume_resized_flag()
        }

        fn requires_main_thread() -> bool {
            true
        }
    }

    #[derive(Default)]
    struct ScriptedGame {
        journal: Journal,
        fail_init: bool,
        /// `(iteration, tick)`, both 1-based.
        fail_update_at: Option<(u64, u32)>,
        fail_render_at: Option<u64>,
        panic_on_update: bool,
        record_thread: bool,
        iteration: u64,
        tick: u32,
    }

    impl ScriptedGame {
        fn new(journal: &Journal) -> Self {
            Self {
                journal: journal.clone(),
                ..Self::default()
            }
        }
    }

    impl<W: Window> GameLogic<W> for ScriptedGame {
        fn init(&mut self) -> anyhow::Result<()> {
            self.journal.push("game.init");
            if self.record_thread {
                let name = thread::current().name().unwrap_or("").to_string();
                self.journal.push(format!("thread:{name}"));
            }
            if self.fail_init {
                anyhow::bail!("assets missing");
            }
            Ok(())
        }

        fn input(&mut self, _window: &mut W) -> anyhow::Result<()> {
            self.iteration += 1;
            self.tick = 0;
            self.journal.push("input");
            Ok(())
        }

        fn update(&mut self, interval: f64) -> anyhow::Result<()> {
            assert!(interval > 0.0);
            self.tick += 1;
            self.journal.push("update");
            if self.panic_on_update {
                panic!("boom");
            }
            if self.fail_update_at == Some((self.iteration, self.tick)) {
                anyhow::bail!("update {} of iteration {} failed", self.tick, self.iteration);
            }
            Ok(())
        }

        fn render(&mut self, window: &mut W) -> anyhow::Result<()> {
            assert!(window.width() > 0 && window.height() > 0);
            self.journal.push("render");
            if self.fail_render_at == Some(self.iteration) {
                anyhow::bail!("lost device");
            }
            Ok(())
        }

        fn cleanup(&mut self) {
            self.journal.push("cleanup");
        }
    }

    fn timing(ups: u32, fps: u32) -> TimingConfig {
        TimingConfig {
            updates_per_second: ups,
            frames_per_second: fps,
            max_ticks_per_frame: None,
            sleep_granularity_ms: 0,
        }
    }

    fn engine(
        window: FakeWindow,
        game: ScriptedGame,
        time: &ManualSource,
    ) -> Engine<FakeWindow, ScriptedGame, ManualSource> {
        Engine::with_time_source(&timing(16, 60), window, game, time.clone()).unwrap()
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    #[test]
    fn new_engine_is_not_started() {
        let journal = Journal::default();
        let time = ManualSource::new(0.0);
        let e = engine(FakeWindow::new(&journal), ScriptedGame::new(&journal), &time);

        assert_eq!(e.state(), LoopState::NotStarted);
        assert_eq!(e.iterations(), 0);
        assert!(journal.entries().is_empty());
    }

    #[test]
    fn invalid_timing_is_rejected_at_construction() {
        let journal = Journal::default();
        let result = Engine::new(
            &timing(0, 60),
            FakeWindow::new(&journal),
            ScriptedGame::new(&journal),
        );
        assert!(matches!(result, Err(EngineError::Config(_))));
    }

    #[test]
    fn init_runs_window_then_clock_then_game() {
        let journal = Journal::default();
        let time = ManualSource::new(0.0);

        // Window init takes five simulated seconds. If the clock were
        // initialized first, the first frame would owe 80 ticks.
        let mut window = FakeWindow::new(&journal).closing_after(1);
        window.time = Some(time.clone());
        window.advance_on_init = 5.0;

        let mut e = engine(window, ScriptedGame::new(&journal), &time);
        e.run().unwrap();

        assert_eq!(
            journal.entries(),
            ["window.init", "game.init", "input", "render", "present", "cleanup"]
        );
    }

    #[test]
    fn close_during_iteration_five_stops_after_its_render() {
        let journal = Journal::default();
        let time = ManualSource::new(0.0);
        let window = FakeWindow::new(&journal)
            .closing_after(5)
            .driving(&time, 0.125);

        let mut e = engine(window, ScriptedGame::new(&journal), &time);
        e.run().unwrap();

        assert_eq!(e.state(), LoopState::Stopped);
        assert_eq!(e.iterations(), 5);
        assert_eq!(journal.count("input"), 5);
        assert_eq!(journal.count("render"), 5);
        assert_eq!(journal.count("cleanup"), 1);
        assert_eq!(journal.entries().last().map(String::as_str), Some("cleanup"));
        // 4 frames of 0.125s at 16 ups.
        assert_eq!(journal.count("update"), 8);
    }

    #[test]
    fn update_failure_stops_before_render() {
        let journal = Journal::default();
        let time = ManualSource::new(0.0);
        // 0.1875s per frame is exactly three 1/16s ticks.
        let window = FakeWindow::new(&journal).driving(&time, 0.1875);
        let mut game = ScriptedGame::new(&journal);
        game.fail_update_at = Some((3, 2));

        let mut e = engine(window, game, &time);
        let err = e.run().unwrap_err();

        match &err {
            EngineError::Runtime {
                phase, iteration, ..
            } => {
                assert_eq!(*phase, LoopPhase::Update);
                assert_eq!(*iteration, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.report().contains("update 2 of iteration 3 failed"));

        assert_eq!(e.state(), LoopState::Stopped);
        assert_eq!(e.iterations(), 2);
        assert_eq!(journal.count("render"), 2);
        assert_eq!(journal.count("update"), 5);
        assert_eq!(journal.count("cleanup"), 1);

        let entries = journal.entries();
        assert_eq!(entries[entries.len() - 4..], ["input", "update", "update", "cleanup"]);
    }

    #[test]
    fn render_failure_skips_present() {
        let journal = Journal::default();
        let time = ManualSource::new(0.0);
        let mut game = ScriptedGame::new(&journal);
        game.fail_render_at = Some(2);

        let mut e = engine(FakeWindow::new(&journal), game, &time);
        let err = e.run().unwrap_err();

        assert!(matches!(
            err,
            EngineError::Runtime { phase: LoopPhase::Render, iteration: 2, .. }
        ));
        assert_eq!(journal.count("render"), 2);
        assert_eq!(journal.count("present"), 1);
        assert_eq!(journal.count("cleanup"), 1);
    }

    #[test]
    fn window_init_failure_never_enters_the_loop() {
        let journal = Journal::default();
        let time = ManualSource::new(0.0);
        let mut window = FakeWindow::new(&journal);
        window.fail_init = true;

        let mut e = engine(window, ScriptedGame::new(&journal), &time);
        let err = e.run().unwrap_err();

        assert!(matches!(
            err,
            EngineError::Init { stage: InitStage::Window, .. }
        ));
        assert_eq!(e.state(), LoopState::Stopped);
        assert_eq!(journal.entries(), ["window.init", "cleanup"]);
    }

    #[test]
    fn game_init_failure_never_enters_the_loop() {
        let journal = Journal::default();
        let time = ManualSource::new(0.0);
        let mut game = ScriptedGame::new(&journal);
        game.fail_init = true;

        let mut e = engine(FakeWindow::new(&journal), game, &time);
        let err = e.run().unwrap_err();

        assert!(matches!(
            err,
            EngineError::Init { stage: InitStage::Game, .. }
        ));
        assert_eq!(journal.entries(), ["window.init", "game.init", "cleanup"]);
    }

    #[test]
    fn second_run_is_rejected() {
        let journal = Journal::default();
        let time = ManualSource::new(0.0);
        let window = FakeWindow::new(&journal).closing_after(1);

        let mut e = engine(window, ScriptedGame::new(&journal), &time);
        e.run().unwrap();

        assert!(matches!(e.run(), Err(EngineError::AlreadyStarted)));
        assert_eq!(journal.count("window.init"), 1);
        assert_eq!(journal.count("cleanup"), 1);
    }

    #[test]
    fn panic_in_update_still_runs_cleanup() {
        let journal = Journal::default();
        let time = ManualSource::new(0.0);
        let window = FakeWindow::new(&journal).driving(&time, 0.125);
        let mut game = ScriptedGame::new(&journal);
        game.panic_on_update = true;

        let mut e = engine(window, game, &time);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| e.run()));

        assert!(outcome.is_err());
        assert_eq!(e.state(), LoopState::Stopped);
        assert_eq!(journal.count("cleanup"), 1);
    }

    // ── stop requests ─────────────────────────────────────────────────────

    #[test]
    fn stop_before_run_renders_nothing() {
        let journal = Journal::default();
        let time = ManualSource::new(0.0);

        let mut e = engine(FakeWindow::new(&journal), ScriptedGame::new(&journal), &time);
        e.stop_handle().cancel();
        e.run().unwrap();

        assert_eq!(e.iterations(), 0);
        assert_eq!(journal.entries(), ["window.init", "game.init", "cleanup"]);
    }

    #[test]
    fn token_created_before_the_engine_stops_it() {
        let journal = Journal::default();
        let time = ManualSource::new(0.0);
        let stop = CancelToken::new();

        let mut e = engine(FakeWindow::new(&journal), ScriptedGame::new(&journal), &time)
            .with_cancel_token(stop.clone());
        stop.cancel();

        assert!(e.stop_handle().is_cancelled());
        e.run().unwrap();

        assert_eq!(e.iterations(), 0);
        assert_eq!(e.state(), LoopState::Stopped);
        assert_eq!(journal.count("cleanup"), 1);
    }

    #[test]
    fn stop_request_interrupts_the_frame_wait() {
        let journal = Journal::default();
        // Frozen time: without the stop request the frame slot never ends.
        let time = ManualSource::new(0.0);
        let mut window = FakeWindow::new(&journal);
        window.vsync = false;

        let mut e = engine(window, ScriptedGame::new(&journal), &time);
        let stop = e.stop_handle();
        let canceller = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            stop.cancel();
        });

        e.run().unwrap();
        canceller.join().unwrap();

        assert_eq!(e.iterations(), 1);
        assert_eq!(journal.count("render"), 1);
        assert_eq!(journal.count("cleanup"), 1);
    }

    // ── frame limiter ─────────────────────────────────────────────────────

    #[test]
    fn limiter_paces_frames_without_display_sync() {
        let journal = Journal::default();
        // Every time read advances the simulated clock by 1ms.
        let time = ManualSource::with_step(0.0, 0.001);
        let mut window = FakeWindow::new(&journal).closing_after(3);
        window.vsync = false;

        let mut e = Engine::with_time_source(
            &timing(30, 75),
            window,
            ScriptedGame::new(&journal),
            time.clone(),
        )
        .unwrap();
        e.run().unwrap();

        assert_eq!(e.iterations(), 3);
        assert!(time.peek() >= 3.0 / 75.0 - 1e-9, "only {}s passed", time.peek());
    }

    #[test]
    fn display_sync_skips_the_limiter() {
        let journal = Journal::default();
        let time = ManualSource::with_step(0.0, 0.001);
        let window = FakeWindow::new(&journal).closing_after(3);

        let mut e = engine(window, ScriptedGame::new(&journal), &time);
        e.run().unwrap();

        // Only the clock's own reads: init, then elapsed + mark per frame.
        assert!(time.peek() < 0.01, "{}s passed", time.peek());
    }

    // ── launch modes ──────────────────────────────────────────────────────

    #[test]
    fn launch_mode_follows_the_window_capability() {
        assert_eq!(LaunchMode::for_window::<FakeWindow>(), LaunchMode::Dedicated);
        assert_eq!(LaunchMode::for_window::<MainThreadWindow>(), LaunchMode::Inline);
    }

    #[test]
    fn start_runs_on_a_dedicated_thread() {
        let journal = Journal::default();
        let j = journal.clone();

        let handle = Engine::start(move || {
            let mut game = ScriptedGame::new(&j);
            game.record_thread = true;
            Engine::new(&timing(30, 75), FakeWindow::new(&j).closing_after(2), game)
        })
        .unwrap();

        assert_eq!(handle.mode(), LaunchMode::Dedicated);
        handle.join().unwrap();

        assert!(journal.entries().contains(&format!("thread:{LOOP_THREAD_NAME}")));
        assert_eq!(journal.count("render"), 2);
        assert_eq!(journal.count("cleanup"), 1);
    }

    #[test]
    fn start_runs_inline_for_main_thread_windows() {
        let journal = Journal::default();
        let j = journal.clone();

        let handle = Engine::start(move || {
            let mut game = ScriptedGame::new(&j);
            game.record_thread = true;
            let window = MainThreadWindow(FakeWindow::new(&j).closing_after(2));
            Engine::new(&timing(30, 75), window, game)
        })
        .unwrap();

        assert_eq!(handle.mode(), LaunchMode::Inline);
        assert!(handle.is_finished());
        handle.join().unwrap();

        let here = thread::current().name().unwrap_or("").to_string();
        assert!(journal.entries().contains(&format!("thread:{here}")));
        assert_eq!(journal.count("cleanup"), 1);
    }

    #[test]
    fn build_failure_is_returned_from_join() {
        let handle = Engine::<FakeWindow, ScriptedGame, MonotonicSource>::start(|| {
            Err(EngineError::Config(crate::error::ConfigError::NotPositive {
                field: "timing.updates_per_second",
            }))
        })
        .unwrap();

        assert!(matches!(handle.join(), Err(EngineError::Config(_))));
    }

    #[test]
    fn panicking_loop_thread_is_reported() {
        let journal = Journal::default();
        let j = journal.clone();

        let handle = Engine::start(move || {
            let mut game = ScriptedGame::new(&j);
            game.panic_on_update = true;
            let time = ManualSource::with_step(0.0, 0.01);
            Engine::with_time_source(&timing(30, 75), FakeWindow::new(&j), game, time)
        })
        .unwrap();

        match handle.join() {
            Err(EngineError::Panicked(msg)) => assert_eq!(msg, "boom"),
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(journal.count("cleanup"), 1);
    }
}
