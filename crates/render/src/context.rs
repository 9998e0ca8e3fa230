use glam::Vec2;
use pvz_common::Color;

/// Horizontal anchoring of text relative to its draw position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Drop shadow applied to subsequent fills and text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadow {
    pub color: Color,
    pub blur: f32,
    pub offset: Vec2,
}

impl Shadow {
    /// No shadow: zero blur and offset.
    pub const NONE: Shadow = Shadow {
        color: Color::rgba(0, 0, 0, 0.0),
        blur: 0.0,
        offset: Vec2::ZERO,
    };

    pub fn is_none(&self) -> bool {
        self.blur == 0.0 && self.offset == Vec2::ZERO
    }
}

impl Default for Shadow {
    fn default() -> Self {
        Self::NONE
    }
}

/// Immediate-mode 2D drawing surface in the style of a canvas 2D context.
///
/// Transform and style calls affect every later draw call until the matching
/// `restore`. Angles are in radians.
pub trait Context2d {
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, x: f32, y: f32);
    fn scale(&mut self, x: f32, y: f32);

    fn set_fill_style(&mut self, color: Color);
    fn set_stroke_style(&mut self, color: Color);
    fn set_line_width(&mut self, width: f32);
    fn set_font(&mut self, font: &str);
    fn set_text_align(&mut self, align: TextAlign);
    fn set_shadow(&mut self, shadow: Shadow);

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32);
    fn stroke_rect(&mut self, x: f32, y: f32, width: f32, height: f32);

    fn begin_path(&mut self);
    fn move_to(&mut self, x: f32, y: f32);
    fn line_to(&mut self, x: f32, y: f32);
    fn arc(&mut self, x: f32, y: f32, radius: f32, start_angle: f32, end_angle: f32);
    fn fill(&mut self);
    fn stroke(&mut self);

    fn fill_text(&mut self, text: &str, x: f32, y: f32);
}

/// A drawing surface that may or may not provide a 2D context.
pub trait Canvas {
    type Context: Context2d + 'static;

    /// Acquire the 2D context, or `None` if the surface cannot provide one.
    fn context_2d(&mut self) -> Option<Self::Context>;

    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Change the logical drawing size.
    fn set_size(&mut self, width: u32, height: u32);
}

/// Something that can be queued on a render layer.
pub trait Drawable {
    fn render(&self, ctx: &mut dyn Context2d);

    /// Invisible drawables are skipped by layer rendering.
    fn is_visible(&self) -> bool {
        true
    }
}

/// Text style for [`Renderer::draw_text`](crate::Renderer::draw_text) and
/// [`Label`].
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font: String,
    pub color: Color,
    pub align: TextAlign,
}

impl TextStyle {
    pub fn new(font: impl Into<String>, color: Color, align: TextAlign) -> Self {
        Self {
            font: font.into(),
            color,
            align,
        }
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self::new("16px Arial", Color::WHITE, TextAlign::Left)
    }
}

/// A line of text that lives on a layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub position: Vec2,
    pub style: TextStyle,
    /// Shadow drawn under this label only; reset afterwards.
    pub shadow: Option<Shadow>,
}

impl Label {
    pub fn new(text: impl Into<String>, position: Vec2, style: TextStyle) -> Self {
        Self {
            text: text.into(),
            position,
            style,
            shadow: None,
        }
    }

    pub fn with_shadow(mut self, shadow: Shadow) -> Self {
        self.shadow = Some(shadow);
        self
    }
}

impl Drawable for Label {
    fn render(&self, ctx: &mut dyn Context2d) {
        if let Some(shadow) = self.shadow {
            ctx.set_shadow(shadow);
        }
        ctx.set_font(&self.style.font);
        ctx.set_fill_style(self.style.color);
        ctx.set_text_align(self.style.align);
        ctx.fill_text(&self.text, self.position.x, self.position.y);
        if self.shadow.is_some() {
            ctx.set_shadow(Shadow::NONE);
        }
    }

    fn is_visible(&self) -> bool {
        !self.text.is_empty()
    }
}
