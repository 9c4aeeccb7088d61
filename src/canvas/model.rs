use serde::{Deserialize, Serialize};

pub const MIN_BRUSH_SIZE: u32 = 1;
pub const MAX_BRUSH_SIZE: u32 = 100;
pub const MIN_TEXT_SIZE: u32 = 8;
pub const MAX_TEXT_SIZE: u32 = 120;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    Brush,
    Eraser,
    Spray,
    Line,
    Rectangle,
    Circle,
    Text,
}

impl Tool {
    pub const ALL: [Tool; 7] = [
        Tool::Brush,
        Tool::Eraser,
        Tool::Spray,
        Tool::Line,
        Tool::Rectangle,
        Tool::Circle,
        Tool::Text,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Tool::Brush => "Brush",
            Tool::Eraser => "Eraser",
            Tool::Spray => "Spray",
            Tool::Line => "Line",
            Tool::Rectangle => "Rectangle",
            Tool::Circle => "Circle",
            Tool::Text => "Text",
        }
    }

    /// Shape tools only show a preview while dragging and rasterize on release.
    pub fn shape_kind(self) -> Option<ShapeKind> {
        match self {
            Tool::Line => Some(ShapeKind::Line),
            Tool::Rectangle => Some(ShapeKind::Rectangle),
            Tool::Circle => Some(ShapeKind::Circle),
            Tool::Brush | Tool::Eraser | Tool::Spray | Tool::Text => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Line,
    Rectangle,
    Circle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeMode {
    Normal,
    Erase,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn to_rgba_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn from_rgba_array(color: [u8; 4]) -> Self {
        Self::rgba(color[0], color[1], color[2], color[3])
    }
}

/// Position in canvas-content pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Raw pointer position in view pixels, before the zoom is inverted.
///
/// Tools only accept [`Point`], so a `ViewPoint` has to pass through
/// [`crate::canvas::view::ViewTransform::to_canvas`] first.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewPoint {
    pub x: f32,
    pub y: f32,
}

impl ViewPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Shared configuration read by the tool engine and the compositor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSettings {
    pub tool: Tool,
    pub color: Color,
    pub background: Color,
    brush_size: u32,
    text_size: u32,
    pub text: String,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self::new(Tool::Brush, Color::BLACK, Color::WHITE)
    }
}

impl ToolSettings {
    /// Default sizes and no pending text; adjust sizes through the clamping setters.
    pub fn new(tool: Tool, color: Color, background: Color) -> Self {
        Self {
            tool,
            color,
            background,
            brush_size: 10,
            text_size: 24,
            text: String::new(),
        }
    }

    pub fn brush_size(&self) -> u32 {
        self.brush_size
    }

    pub fn set_brush_size(&mut self, size: u32) {
        self.brush_size = size.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE);
    }

    pub fn text_size(&self) -> u32 {
        self.text_size
    }

    pub fn set_text_size(&mut self, size: u32) {
        self.text_size = size.clamp(MIN_TEXT_SIZE, MAX_TEXT_SIZE);
    }

    /// Text the text tool would stamp, or `None` when there is nothing to place.
    pub fn pending_text(&self) -> Option<&str> {
        let trimmed = self.text.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_ignores_alpha() {
        assert_eq!(Color::rgb(1, 2, 255).to_hex(), "#0102ff");
        assert_eq!(Color::rgba(255, 128, 0, 10).to_hex(), "#ff8000");
    }

    #[test]
    fn brush_and_text_sizes_are_clamped() {
        let mut settings = ToolSettings::default();
        settings.set_brush_size(0);
        assert_eq!(settings.brush_size(), MIN_BRUSH_SIZE);
        settings.set_brush_size(500);
        assert_eq!(settings.brush_size(), MAX_BRUSH_SIZE);
        settings.set_text_size(2);
        assert_eq!(settings.text_size(), MIN_TEXT_SIZE);
    }

    #[test]
    fn new_keeps_default_sizes() {
        let settings = ToolSettings::new(Tool::Circle, Color::rgb(9, 8, 7), Color::BLACK);
        assert_eq!(settings.tool, Tool::Circle);
        assert_eq!(settings.color, Color::rgb(9, 8, 7));
        assert_eq!(settings.background, Color::BLACK);
        assert_eq!(settings.brush_size(), 10);
        assert_eq!(settings.text_size(), 24);
    }

    #[test]
    fn whitespace_only_text_is_not_pending() {
        let mut settings = ToolSettings::default();
        settings.text = "   ".into();
        assert_eq!(settings.pending_text(), None);
        settings.text = "  hi ".into();
        assert_eq!(settings.pending_text(), Some("hi"));
    }

    #[test]
    fn only_shape_tools_have_a_shape_kind() {
        assert_eq!(Tool::Circle.shape_kind(), Some(ShapeKind::Circle));
        assert_eq!(Tool::Spray.shape_kind(), None);
        assert_eq!(Tool::Text.shape_kind(), None);
    }
}
