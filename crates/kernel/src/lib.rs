//! Game Loop Kernel: fixed-timestep engine, participant registry, clocks and
//! frame scheduling.
//!
//! # Invariants
//! - Simulation advances only in whole fixed steps; leftover time stays in the
//!   accumulator and is always smaller than one step.
//! - Frame deltas are clamped before accumulation.
//! - Registry membership changes never happen in the middle of a pass.

pub mod clock;
pub mod engine;
pub mod registry;
pub mod scheduler;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{
    Engine, EngineStats, FrameReport, FrameStats, LoopConfig, LoopHooks, ParticipantError,
    PumpOutcome, Renderable, Updateable,
};
pub use registry::{Registry, RegistryHandle, Shared};
pub use scheduler::{FrameScheduler, PacedScheduler, RunSummary, SimulatedScheduler, run};

pub fn crate_info() -> &'static str {
    "pvz-kernel v0.1.0"
}
