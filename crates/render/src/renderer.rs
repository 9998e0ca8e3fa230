use crate::camera::Camera;
use crate::context::{Canvas, Context2d, Drawable, TextAlign, TextStyle};
use glam::Vec2;
use pvz_common::{Color, GameConfig, GridConfig, ZIndex};
use std::collections::BTreeMap;
use std::f32::consts::TAU;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("canvas does not provide a 2D context")]
    ContextUnavailable,
}

/// Whether a shape is filled or outlined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Paint {
    #[default]
    Fill,
    Stroke,
}

const GRID_BACKDROP: Color = Color::rgba(0, 0, 0, 0.3);
const GRID_BORDER_WIDTH: f32 = 3.0;
const FPS_BACKDROP: Color = Color::rgba(0, 0, 0, 0.5);
const FPS_GOOD: Color = Color::rgb(0x4c, 0xaf, 0x50);
const FPS_OK: Color = Color::rgb(0xff, 0x98, 0x00);
const FPS_BAD: Color = Color::rgb(0xf4, 0x43, 0x36);

/// Badge colour for an FPS reading.
pub fn fps_color(fps: u32) -> Color {
    match fps {
        55.. => FPS_GOOD,
        30.. => FPS_OK,
        _ => FPS_BAD,
    }
}

/// The parts of [`GameConfig`] the renderer reads.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    pub background: Color,
    pub grid: GridConfig,
    pub grid_border: Color,
    pub show_fps: bool,
    pub enable_shadows: bool,
    pub z_index: ZIndex,
}

impl From<&GameConfig> for RenderSettings {
    fn from(config: &GameConfig) -> Self {
        Self {
            background: config.canvas.background_color,
            grid: config.grid.clone(),
            grid_border: config.colors.grid,
            show_fps: config.debug.show_fps,
            enable_shadows: config.performance.enable_shadows,
            z_index: config.z_index.clone(),
        }
    }
}

/// Layered 2D renderer bound to one canvas.
///
/// A frame is `begin_frame`, any number of direct draws and layer additions,
/// `render_layers`, then `end_frame`. The camera transform is applied between
/// `begin_frame` and `end_frame`; the background clear is not affected by it.
///
/// # Invariants
/// - Layers are painted in ascending z order; within a layer, in insertion
///   order.
/// - `begin_frame` empties every layer but keeps the layer keys.
/// - Every `begin_frame` save is matched by the `end_frame` restore.
pub struct Renderer<V: Canvas> {
    canvas: V,
    ctx: V::Context,
    width: u32,
    height: u32,
    camera: Camera,
    layers: BTreeMap<i32, Vec<Box<dyn Drawable>>>,
    settings: RenderSettings,
}

impl<V: Canvas> Renderer<V> {
    pub fn new(mut canvas: V, config: &GameConfig) -> Result<Self, RenderError> {
        let ctx = canvas.context_2d().ok_or(RenderError::ContextUnavailable)?;
        let width = canvas.width();
        let height = canvas.height();
        let mut renderer = Self {
            canvas,
            ctx,
            width,
            height,
            camera: Camera::new(&config.camera),
            layers: BTreeMap::new(),
            settings: RenderSettings::from(config),
        };
        renderer.init_layers();
        tracing::info!(width, height, "renderer initialized");
        Ok(renderer)
    }

    /// Create an empty layer for every configured z-index.
    pub fn init_layers(&mut self) {
        for z in self.settings.z_index.all() {
            self.layers.entry(z).or_default();
        }
    }

    /// Fill the whole surface with the background colour.
    pub fn clear(&mut self) {
        self.ctx.set_fill_style(self.settings.background);
        self.ctx.fill_rect(0.0, 0.0, self.width as f32, self.height as f32);
    }

    pub fn begin_frame(&mut self) {
        self.clear();
        self.ctx.save();
        let cam = self.camera;
        self.ctx.translate(-cam.position.x, -cam.position.y);
        self.ctx.scale(cam.zoom(), cam.zoom());
        for layer in self.layers.values_mut() {
            layer.clear();
        }
    }

    pub fn end_frame(&mut self) {
        self.ctx.restore();
    }

    /// Queue `drawable` on layer `z`, creating the layer if needed.
    pub fn add_to_layer(&mut self, z: i32, drawable: Box<dyn Drawable>) {
        self.layers.entry(z).or_default().push(drawable);
    }

    /// Paint every queued drawable, lowest z first, skipping invisible ones.
    pub fn render_layers(&mut self) {
        let mut painted = 0usize;
        for drawable in self.layers.values().flatten() {
            if drawable.is_visible() {
                drawable.render(&mut self.ctx);
                painted += 1;
            }
        }
        tracing::trace!(painted, "layers rendered");
    }

    pub fn layer_len(&self, z: i32) -> usize {
        self.layers.get(&z).map_or(0, Vec::len)
    }

    /// Z-indices of all known layers, ascending.
    pub fn layer_keys(&self) -> impl Iterator<Item = i32> + '_ {
        self.layers.keys().copied()
    }

    pub fn draw_grid(&mut self) {
        let grid = &self.settings.grid;
        let ctx = &mut self.ctx;
        let (x0, y0) = (grid.offset_x, grid.offset_y);
        let (w, h) = (grid.width(), grid.height());

        ctx.set_stroke_style(grid.line_color);
        ctx.set_line_width(grid.line_width);

        ctx.set_fill_style(GRID_BACKDROP);
        ctx.fill_rect(x0, y0, w, h);

        for col in 0..=grid.cols {
            let x = x0 + col as f32 * grid.cell_size;
            ctx.begin_path();
            ctx.move_to(x, y0);
            ctx.line_to(x, y0 + h);
            ctx.stroke();
        }
        for row in 0..=grid.rows {
            let y = y0 + row as f32 * grid.cell_size;
            ctx.begin_path();
            ctx.move_to(x0, y);
            ctx.line_to(x0 + w, y);
            ctx.stroke();
        }

        ctx.set_stroke_style(self.settings.grid_border);
        ctx.set_line_width(GRID_BORDER_WIDTH);
        ctx.stroke_rect(x0, y0, w, h);
    }

    pub fn draw_rect(&mut self, origin: Vec2, size: Vec2, color: Color, paint: Paint) {
        self.ctx.set_fill_style(color);
        self.ctx.set_stroke_style(color);
        match paint {
            Paint::Fill => self.ctx.fill_rect(origin.x, origin.y, size.x, size.y),
            Paint::Stroke => self.ctx.stroke_rect(origin.x, origin.y, size.x, size.y),
        }
    }

    pub fn draw_circle(&mut self, center: Vec2, radius: f32, color: Color, paint: Paint) {
        self.ctx.set_fill_style(color);
        self.ctx.set_stroke_style(color);
        self.ctx.begin_path();
        self.ctx.arc(center.x, center.y, radius, 0.0, TAU);
        match paint {
            Paint::Fill => self.ctx.fill(),
            Paint::Stroke => self.ctx.stroke(),
        }
    }

    pub fn draw_text(&mut self, text: &str, position: Vec2, style: &TextStyle) {
        self.ctx.set_font(&style.font);
        self.ctx.set_fill_style(style.color);
        self.ctx.set_text_align(style.align);
        self.ctx.fill_text(text, position.x, position.y);
    }

    /// FPS badge in the top-right corner. Does nothing unless FPS display is
    /// enabled.
    pub fn draw_fps(&mut self, fps: u32) {
        if !self.settings.show_fps {
            return;
        }
        let x = self.width as f32 - 10.0;
        let y = 30.0;
        self.ctx.set_fill_style(FPS_BACKDROP);
        self.ctx.fill_rect(x - 80.0, y - 25.0, 75.0, 30.0);
        let style = TextStyle::new("bold 16px Arial", fps_color(fps), TextAlign::Right);
        self.draw_text(&format!("FPS: {fps}"), Vec2::new(x - 5.0, y), &style);
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        self.camera.screen_to_world(screen)
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        self.camera.world_to_screen(world)
    }

    pub fn set_camera_position(&mut self, x: f32, y: f32) {
        self.camera.position = Vec2::new(x, y);
    }

    pub fn set_camera_zoom(&mut self, zoom: f32) {
        self.camera.set_zoom(zoom);
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Change the logical drawing size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.canvas.set_size(width, height);
        tracing::debug!(width, height, "renderer resized");
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn canvas(&self) -> &V {
        &self.canvas
    }

    pub fn context(&self) -> &V::Context {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut V::Context {
        &mut self.ctx
    }
}
