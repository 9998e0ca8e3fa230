use glam::Vec2;
use pvz_common::ScaleMode;

/// On-screen size of the canvas element; the drawing size stays logical.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplaySize {
    pub width: u32,
    pub height: u32,
}

impl DisplaySize {
    /// Display pixels per logical pixel along each axis.
    pub fn scale(&self, logical: Vec2) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32) / logical
    }
}

/// Size to display a `logical` canvas inside `container`.
///
/// `Fit` letterboxes, `Fill` covers and crops, `Stretch` ignores the aspect
/// ratio. Results are floored to whole pixels. Degenerate inputs fall back to
/// the container size.
pub fn fit_to_container(container: Vec2, logical: Vec2, mode: ScaleMode) -> DisplaySize {
    let floor = |v: Vec2| DisplaySize {
        width: v.x.max(0.0).floor() as u32,
        height: v.y.max(0.0).floor() as u32,
    };
    if logical.x <= 0.0 || logical.y <= 0.0 || container.x <= 0.0 || container.y <= 0.0 {
        return floor(container);
    }

    let aspect = logical.x / logical.y;
    let wider = container.x / container.y > aspect;
    let size = match mode {
        ScaleMode::Stretch => container,
        // Height-bound when the container is wider than the canvas.
        ScaleMode::Fit if wider => Vec2::new(container.y * aspect, container.y),
        ScaleMode::Fit => Vec2::new(container.x, container.x / aspect),
        ScaleMode::Fill if wider => Vec2::new(container.x, container.x / aspect),
        ScaleMode::Fill => Vec2::new(container.y * aspect, container.y),
    };
    floor(size)
}
