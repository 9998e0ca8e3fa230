//! Rendering: layered 2D renderer over a canvas-style drawing context.
//!
//! # Invariants
//! - The renderer draws; it never mutates game state.
//! - Layers paint in ascending z order and are emptied at the start of every
//!   frame.
//! - Drawing goes through the [`Context2d`] trait, so any backend that can
//!   provide one works. [`RecordingCanvas`] is the headless backend.

mod camera;
mod context;
mod recording;
mod renderer;
mod viewport;

pub use camera::Camera;
pub use context::{Canvas, Context2d, Drawable, Label, Shadow, TextAlign, TextStyle};
pub use recording::{DrawCommand, RecordingCanvas, RecordingContext};
pub use renderer::{Paint, RenderError, RenderSettings, Renderer, fps_color};
pub use viewport::{DisplaySize, fit_to_container};

pub fn crate_info() -> &'static str {
    "pvz-render v0.1.0"
}
