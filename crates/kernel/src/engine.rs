use crate::clock::Clock;
use crate::registry::{Registry, RegistryHandle, Shared};
use pvz_common::GameConfig;
use std::time::Duration;

/// Error reported by a participant from its `update` or `render`.
///
/// The engine logs it, counts it, and moves on to the next participant.
#[derive(Debug, thiserror::Error)]
pub enum ParticipantError {
    #[error("{0}")]
    Failed(String),
    #[error("participant is already borrowed")]
    Busy,
}

/// Receives fixed-step updates from the engine.
pub trait Updateable {
    fn update(&mut self, dt: f64) -> Result<(), ParticipantError>;

    /// Name used in log messages.
    fn label(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Receives one render call per pump.
pub trait Renderable {
    fn render(&mut self, dt: f64) -> Result<(), ParticipantError>;

    fn label(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Per-frame numbers handed to [`LoopHooks::render`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStats {
    /// Pumps counted in the last completed FPS window.
    pub fps: u32,
    /// Clamped wall-clock delta of this pump, in seconds.
    pub delta_time: f64,
    /// Fixed steps run during this pump.
    pub fixed_steps: u32,
    pub paused: bool,
}

/// The engine's callbacks into its owner.
///
/// `update` runs once per fixed step before registered updateables; `render`
/// runs once per pump before registered renderables.
pub trait LoopHooks {
    fn update(&mut self, dt: f64);

    fn render(&mut self, dt: f64, stats: &FrameStats);

    /// Called when an FPS window closes.
    fn fps_updated(&mut self, _fps: u32) {}

    /// Checked by the driver between pumps; returning true stops the engine.
    fn wants_stop(&self) -> bool {
        false
    }
}

/// No callbacks.
impl LoopHooks for () {
    fn update(&mut self, _dt: f64) {}

    fn render(&mut self, _dt: f64, _stats: &FrameStats) {}
}

/// Timing parameters of the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopConfig {
    /// Size of one simulation step.
    pub fixed_time_step: Duration,
    /// Frame deltas above this are clamped to it.
    pub max_frame_time: Duration,
    /// Length of the FPS counting window.
    pub fps_window: Duration,
    /// Log every FPS rollover at debug level.
    pub log_fps: bool,
}

impl LoopConfig {
    /// Loop config for `steps_per_second` with default clamping.
    pub fn with_rate(steps_per_second: u32) -> Self {
        Self {
            fixed_time_step: Duration::from_nanos(
                1_000_000_000 / u64::from(steps_per_second.max(1)),
            ),
            ..Self::default()
        }
    }
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self::from(&GameConfig::default())
    }
}

impl From<&GameConfig> for LoopConfig {
    fn from(config: &GameConfig) -> Self {
        Self {
            fixed_time_step: config.performance.fixed_time_step(),
            max_frame_time: config.performance.max_frame_time(),
            fps_window: Duration::from_secs(1),
            log_fps: config.debug.show_fps,
        }
    }
}

/// What one call to [`Engine::pump`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpOutcome {
    /// The engine is not running; nothing happened and nothing should be
    /// scheduled.
    Stopped,
    /// A frame was processed; schedule the next pump.
    Continue(FrameReport),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    /// Delta after clamping.
    pub delta: Duration,
    /// Whether the raw delta exceeded `max_frame_time`.
    pub clamped: bool,
    pub fixed_steps: u32,
    pub paused: bool,
}

/// Lifetime counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub pumps: u64,
    pub fixed_steps: u64,
    pub renders: u64,
    pub participant_failures: u64,
}

/// Fixed-timestep game loop.
///
/// Each [`pump`](Engine::pump) measures the wall-clock delta since the last
/// one, clamps it, feeds it into an accumulator and drains the accumulator in
/// whole fixed steps. Rendering happens once per pump with the variable delta.
///
/// # Invariants
/// - After every pump, `0 <= accumulator < fixed_time_step`.
/// - The delta used for accumulation never exceeds `max_frame_time`.
/// - While paused, no fixed steps run; rendering continues.
pub struct Engine<C: Clock> {
    config: LoopConfig,
    clock: C,

    running: bool,
    paused: bool,

    last_time: Duration,
    current_time: Duration,
    delta_time: Duration,
    accumulator: Duration,

    fps: u32,
    frame_count: u32,
    fps_window_start: Duration,

    updateables: Registry<dyn Updateable>,
    renderables: Registry<dyn Renderable>,
    stats: EngineStats,
}

impl<C: Clock> Engine<C> {
    pub fn new(config: LoopConfig, clock: C) -> Self {
        assert!(
            !config.fixed_time_step.is_zero(),
            "fixed_time_step must be non-zero"
        );
        tracing::debug!(
            step = ?config.fixed_time_step,
            max_frame = ?config.max_frame_time,
            "engine initialized"
        );
        Self {
            config,
            clock,
            running: false,
            paused: false,
            last_time: Duration::ZERO,
            current_time: Duration::ZERO,
            delta_time: Duration::ZERO,
            accumulator: Duration::ZERO,
            fps: 0,
            frame_count: 0,
            fps_window_start: Duration::ZERO,
            updateables: Registry::new(),
            renderables: Registry::new(),
            stats: EngineStats::default(),
        }
    }

    /// Start the loop. Does nothing if already running.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.paused = false;
        self.last_time = self.clock.now();
        self.fps_window_start = self.last_time;
        tracing::info!("engine started");
    }

    /// Stop the loop. The next pump observes this and does nothing.
    pub fn stop(&mut self) {
        self.running = false;
        tracing::info!("engine stopped");
    }

    /// Flip the pause flag and return its new value.
    ///
    /// Resuming re-baselines the clock so the time spent paused is never
    /// integrated.
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        if !self.paused {
            self.last_time = self.clock.now();
        }
        tracing::info!(paused = self.paused, "pause toggled");
        self.paused
    }

    /// Process one frame.
    pub fn pump(&mut self, hooks: &mut dyn LoopHooks) -> PumpOutcome {
        if !self.running {
            return PumpOutcome::Stopped;
        }

        self.current_time = self.clock.now();
        let raw = self.current_time.saturating_sub(self.last_time);
        self.last_time = self.current_time;

        let clamped = raw > self.config.max_frame_time;
        self.delta_time = raw.min(self.config.max_frame_time);
        if clamped {
            tracing::debug!(raw = ?raw, clamped_to = ?self.delta_time, "frame delta clamped");
        }

        self.update_fps(hooks);

        let mut fixed_steps = 0u32;
        if !self.paused {
            self.accumulator += self.delta_time;
            let step = self.config.fixed_time_step;
            while self.accumulator >= step {
                self.update(step.as_secs_f64(), hooks);
                self.accumulator -= step;
                fixed_steps += 1;
            }
        }

        let stats = self.frame_stats(fixed_steps);
        self.render_with(self.delta_time.as_secs_f64(), &stats, hooks);
        self.stats.pumps += 1;

        tracing::trace!(
            delta = ?self.delta_time,
            fixed_steps,
            accumulator = ?self.accumulator,
            "pump"
        );

        PumpOutcome::Continue(FrameReport {
            delta: self.delta_time,
            clamped,
            fixed_steps,
            paused: self.paused,
        })
    }

    /// Run one fixed step: hooks first, then every registered updateable.
    pub fn update(&mut self, dt: f64, hooks: &mut dyn LoopHooks) {
        self.updateables.apply_pending();
        hooks.update(dt);

        for participant in self.updateables.iter() {
            let result = match participant.try_borrow_mut() {
                Ok(mut p) => p.update(dt).map_err(|e| (p.label(), e)),
                Err(_) => Err(("<borrowed>", ParticipantError::Busy)),
            };
            if let Err((label, error)) = result {
                tracing::warn!(participant = label, %error, "update failed");
                self.stats.participant_failures += 1;
            }
        }
        self.stats.fixed_steps += 1;
    }

    /// Render once: hooks first, then every registered renderable.
    pub fn render(&mut self, dt: f64, hooks: &mut dyn LoopHooks) {
        let stats = self.frame_stats(0);
        self.render_with(dt, &stats, hooks);
    }

    fn render_with(&mut self, dt: f64, stats: &FrameStats, hooks: &mut dyn LoopHooks) {
        self.renderables.apply_pending();
        hooks.render(dt, stats);

        for participant in self.renderables.iter() {
            let result = match participant.try_borrow_mut() {
                Ok(mut p) => p.render(dt).map_err(|e| (p.label(), e)),
                Err(_) => Err(("<borrowed>", ParticipantError::Busy)),
            };
            if let Err((label, error)) = result {
                tracing::warn!(participant = label, %error, "render failed");
                self.stats.participant_failures += 1;
            }
        }
        self.stats.renders += 1;
    }

    fn update_fps(&mut self, hooks: &mut dyn LoopHooks) {
        self.frame_count += 1;
        if self.current_time.saturating_sub(self.fps_window_start) >= self.config.fps_window {
            self.fps = self.frame_count;
            self.frame_count = 0;
            self.fps_window_start = self.current_time;
            hooks.fps_updated(self.fps);
            if self.config.log_fps {
                tracing::debug!(fps = self.fps, "fps");
            }
        }
    }

    fn frame_stats(&self, fixed_steps: u32) -> FrameStats {
        FrameStats {
            fps: self.fps,
            delta_time: self.delta_time.as_secs_f64(),
            fixed_steps,
            paused: self.paused,
        }
    }

    // --- Registry ---

    /// Register for fixed-step updates. Returns false if already registered.
    pub fn register_updateable(&mut self, participant: Shared<dyn Updateable>) -> bool {
        self.updateables.insert(participant)
    }

    /// Returns false if `participant` was not registered.
    pub fn unregister_updateable<T: ?Sized>(&mut self, participant: &Shared<T>) -> bool {
        self.updateables.remove(participant)
    }

    /// Register for per-pump rendering. Returns false if already registered.
    pub fn register_renderable(&mut self, participant: Shared<dyn Renderable>) -> bool {
        self.renderables.insert(participant)
    }

    pub fn unregister_renderable<T: ?Sized>(&mut self, participant: &Shared<T>) -> bool {
        self.renderables.remove(participant)
    }

    pub fn is_updateable_registered<T: ?Sized>(&self, participant: &Shared<T>) -> bool {
        self.updateables.contains(participant)
    }

    pub fn is_renderable_registered<T: ?Sized>(&self, participant: &Shared<T>) -> bool {
        self.renderables.contains(participant)
    }

    pub fn updateable_count(&self) -> usize {
        self.updateables.len()
    }

    pub fn renderable_count(&self) -> usize {
        self.renderables.len()
    }

    /// Queue update-registry changes from inside a pass.
    pub fn updateable_handle(&self) -> RegistryHandle<dyn Updateable> {
        self.updateables.handle()
    }

    /// Queue render-registry changes from inside a pass.
    pub fn renderable_handle(&self) -> RegistryHandle<dyn Renderable> {
        self.renderables.handle()
    }

    // --- Accessors ---

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Pumps counted in the last completed FPS window.
    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Last clamped frame delta, in seconds.
    pub fn delta_time(&self) -> f64 {
        self.delta_time.as_secs_f64()
    }

    pub fn delta(&self) -> Duration {
        self.delta_time
    }

    pub fn accumulator(&self) -> Duration {
        self.accumulator
    }

    pub fn fixed_time_step(&self) -> Duration {
        self.config.fixed_time_step
    }

    pub fn max_frame_time(&self) -> Duration {
        self.config.max_frame_time
    }

    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}
