use crate::clock::{Clock, ManualClock};
use crate::engine::{Engine, LoopHooks, PumpOutcome};
use std::time::{Duration, Instant};

/// Decides when the next pump happens.
///
/// Stands in for the host's "call me before the next repaint" primitive.
pub trait FrameScheduler {
    /// Wait until the next frame is due. Returns false to end the loop.
    fn wait_next_frame(&mut self) -> bool;
}

/// Real-time pacing: sleeps so frames start `frame_interval` apart.
///
/// When a frame overruns, the next one starts immediately and the schedule
/// restarts from there instead of trying to catch up.
#[derive(Debug)]
pub struct PacedScheduler {
    frame_interval: Duration,
    next_deadline: Option<Instant>,
    frames_left: Option<u64>,
}

impl PacedScheduler {
    pub fn new(frame_interval: Duration) -> Self {
        Self {
            frame_interval,
            next_deadline: None,
            frames_left: None,
        }
    }

    /// Stop after `frames` more frames.
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.frames_left = Some(frames);
        self
    }
}

impl FrameScheduler for PacedScheduler {
    fn wait_next_frame(&mut self) -> bool {
        if let Some(left) = self.frames_left.as_mut() {
            if *left == 0 {
                return false;
            }
            *left -= 1;
        }

        let now = Instant::now();
        let deadline = self.next_deadline.unwrap_or(now + self.frame_interval);
        if deadline > now {
            std::thread::sleep(deadline - now);
            self.next_deadline = Some(deadline + self.frame_interval);
        } else {
            self.next_deadline = Some(now + self.frame_interval);
        }
        true
    }
}

/// Simulated pacing: each frame advances a [`ManualClock`] by a fixed
/// interval without waiting.
#[derive(Debug)]
pub struct SimulatedScheduler {
    clock: ManualClock,
    frame_interval: Duration,
    frames_left: u64,
}

impl SimulatedScheduler {
    pub fn new(clock: ManualClock, frame_interval: Duration, frames: u64) -> Self {
        Self {
            clock,
            frame_interval,
            frames_left: frames,
        }
    }

    pub fn frames_left(&self) -> u64 {
        self.frames_left
    }
}

impl FrameScheduler for SimulatedScheduler {
    fn wait_next_frame(&mut self) -> bool {
        if self.frames_left == 0 {
            return false;
        }
        self.frames_left -= 1;
        self.clock.advance(self.frame_interval);
        true
    }
}

/// Totals from a [`run`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Pumps that processed a frame.
    pub frames: u64,
    pub fixed_steps: u64,
    /// True if the loop ended because the engine was stopped rather than
    /// because the scheduler ran out.
    pub stopped_by_engine: bool,
}

/// Start `engine` and pump it until the scheduler ends the loop or the engine
/// stops.
///
/// The first pump happens immediately; every later one waits on `scheduler`.
/// When the hooks ask to stop, the engine is stopped and the following pump
/// ends the loop.
pub fn run<C: Clock>(
    engine: &mut Engine<C>,
    hooks: &mut dyn LoopHooks,
    scheduler: &mut dyn FrameScheduler,
) -> RunSummary {
    let _span = tracing::info_span!("game_loop").entered();
    engine.start();

    let mut summary = RunSummary::default();
    loop {
        match engine.pump(hooks) {
            PumpOutcome::Stopped => {
                summary.stopped_by_engine = true;
                break;
            }
            PumpOutcome::Continue(report) => {
                summary.frames += 1;
                summary.fixed_steps += u64::from(report.fixed_steps);
            }
        }
        if hooks.wants_stop() {
            engine.stop();
            continue;
        }
        if !scheduler.wait_next_frame() {
            break;
        }
    }

    tracing::info!(
        frames = summary.frames,
        fixed_steps = summary.fixed_steps,
        "game loop finished"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{FrameStats, LoopConfig};

    #[test]
    fn simulated_run_counts_frames_and_steps() {
        let clock = ManualClock::new();
        let mut engine = Engine::new(LoopConfig::with_rate(50), clock.clone());
        let mut scheduler = SimulatedScheduler::new(clock.clone(), Duration::from_millis(40), 10);

        let summary = run(&mut engine, &mut (), &mut scheduler);

        // One immediate pump plus ten scheduled ones; 400ms at 20ms per step.
        assert_eq!(summary.frames, 11);
        assert_eq!(summary.fixed_steps, 20);
        assert!(!summary.stopped_by_engine);
        assert_eq!(clock.now(), Duration::from_millis(400));
        assert_eq!(scheduler.frames_left(), 0);
    }

    #[test]
    fn zero_frame_scheduler_pumps_once() {
        let clock = ManualClock::new();
        let mut engine = Engine::new(LoopConfig::default(), clock.clone());
        let mut scheduler = SimulatedScheduler::new(clock, Duration::from_millis(16), 0);
        let summary = run(&mut engine, &mut (), &mut scheduler);
        assert_eq!(summary.frames, 1);
        assert_eq!(summary.fixed_steps, 0);
    }

    #[derive(Default)]
    struct StopAfterThree {
        renders: u32,
    }

    impl LoopHooks for StopAfterThree {
        fn update(&mut self, _dt: f64) {}

        fn render(&mut self, _dt: f64, _stats: &FrameStats) {
            self.renders += 1;
        }

        fn wants_stop(&self) -> bool {
            self.renders >= 3
        }
    }

    #[test]
    fn paced_scheduler_honours_frame_limit() {
        let mut scheduler = PacedScheduler::new(Duration::from_millis(1)).with_frame_limit(2);
        assert!(scheduler.wait_next_frame());
        assert!(scheduler.wait_next_frame());
        assert!(!scheduler.wait_next_frame());
    }

    #[test]
    fn paced_scheduler_waits_roughly_one_interval() {
        let mut scheduler = PacedScheduler::new(Duration::from_millis(5)).with_frame_limit(1);
        let start = Instant::now();
        assert!(scheduler.wait_next_frame());
        assert!(start.elapsed() >= Duration::from_millis(5));
    }

    #[test]
    fn hooks_can_stop_the_loop() {
        let clock = ManualClock::new();
        let mut engine = Engine::new(LoopConfig::default(), clock.clone());
        let mut hooks = StopAfterThree::default();
        let mut scheduler = SimulatedScheduler::new(clock, Duration::from_millis(16), 100);

        let summary = run(&mut engine, &mut hooks, &mut scheduler);

        assert!(summary.stopped_by_engine);
        assert_eq!(summary.frames, 3);
        assert_eq!(hooks.renders, 3);
        assert!(!engine.is_running());
    }
}
