use crate::context::{Canvas, Context2d, Shadow, TextAlign};
use pvz_common::Color;

/// One recorded [`Context2d`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Save,
    Restore,
    Translate { x: f32, y: f32 },
    Scale { x: f32, y: f32 },
    SetFillStyle(Color),
    SetStrokeStyle(Color),
    SetLineWidth(f32),
    SetFont(String),
    SetTextAlign(TextAlign),
    SetShadow(Shadow),
    FillRect { x: f32, y: f32, width: f32, height: f32 },
    StrokeRect { x: f32, y: f32, width: f32, height: f32 },
    BeginPath,
    MoveTo { x: f32, y: f32 },
    LineTo { x: f32, y: f32 },
    Arc { x: f32, y: f32, radius: f32, start_angle: f32, end_angle: f32 },
    Fill,
    Stroke,
    FillText { text: String, x: f32, y: f32 },
}

impl DrawCommand {
    /// True for calls that put pixels on the surface.
    pub fn is_paint(&self) -> bool {
        matches!(
            self,
            DrawCommand::FillRect { .. }
                | DrawCommand::StrokeRect { .. }
                | DrawCommand::Fill
                | DrawCommand::Stroke
                | DrawCommand::FillText { .. }
        )
    }
}

/// Headless [`Context2d`] that records every call.
///
/// Also tracks the save/restore depth; an unmatched `restore` is recorded but
/// leaves the depth at zero, as a real canvas would ignore it.
#[derive(Debug, Default)]
pub struct RecordingContext {
    commands: Vec<DrawCommand>,
    depth: usize,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Drain the recorded commands, keeping the save depth.
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Current number of unmatched `save` calls.
    pub fn save_depth(&self) -> usize {
        self.depth
    }

    /// Texts drawn with `fill_text`, in order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|cmd| match cmd {
            DrawCommand::FillText { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    fn push(&mut self, cmd: DrawCommand) {
        self.commands.push(cmd);
    }
}

impl Context2d for RecordingContext {
    fn save(&mut self) {
        self.depth += 1;
        self.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.push(DrawCommand::Restore);
    }

    fn translate(&mut self, x: f32, y: f32) {
        self.push(DrawCommand::Translate { x, y });
    }

    fn scale(&mut self, x: f32, y: f32) {
        self.push(DrawCommand::Scale { x, y });
    }

    fn set_fill_style(&mut self, color: Color) {
        self.push(DrawCommand::SetFillStyle(color));
    }

    fn set_stroke_style(&mut self, color: Color) {
        self.push(DrawCommand::SetStrokeStyle(color));
    }

    fn set_line_width(&mut self, width: f32) {
        self.push(DrawCommand::SetLineWidth(width));
    }

    fn set_font(&mut self, font: &str) {
        self.push(DrawCommand::SetFont(font.to_string()));
    }

    fn set_text_align(&mut self, align: TextAlign) {
        self.push(DrawCommand::SetTextAlign(align));
    }

    fn set_shadow(&mut self, shadow: Shadow) {
        self.push(DrawCommand::SetShadow(shadow));
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.push(DrawCommand::FillRect {
            x,
            y,
            width,
            height,
        });
    }

    fn stroke_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.push(DrawCommand::StrokeRect {
            x,
            y,
            width,
            height,
        });
    }

    fn begin_path(&mut self) {
        self.push(DrawCommand::BeginPath);
    }

    fn move_to(&mut self, x: f32, y: f32) {
        self.push(DrawCommand::MoveTo { x, y });
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.push(DrawCommand::LineTo { x, y });
    }

    fn arc(&mut self, x: f32, y: f32, radius: f32, start_angle: f32, end_angle: f32) {
        self.push(DrawCommand::Arc {
            x,
            y,
            radius,
            start_angle,
            end_angle,
        });
    }

    fn fill(&mut self) {
        self.push(DrawCommand::Fill);
    }

    fn stroke(&mut self) {
        self.push(DrawCommand::Stroke);
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32) {
        self.push(DrawCommand::FillText {
            text: text.to_string(),
            x,
            y,
        });
    }
}

/// Headless [`Canvas`] handing out [`RecordingContext`]s.
#[derive(Debug, Clone)]
pub struct RecordingCanvas {
    width: u32,
    height: u32,
    has_context: bool,
}

impl RecordingCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            has_context: true,
        }
    }

    /// A canvas that refuses to provide a 2D context.
    pub fn detached(width: u32, height: u32) -> Self {
        Self {
            has_context: false,
            ..Self::new(width, height)
        }
    }
}

impl Canvas for RecordingCanvas {
    type Context = RecordingContext;

    fn context_2d(&mut self) -> Option<RecordingContext> {
        self.has_context.then(RecordingContext::new)
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }
}
