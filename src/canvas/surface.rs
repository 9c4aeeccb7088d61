use crate::canvas::error::CanvasError;
use crate::canvas::model::{Color, Point, ShapeKind, StrokeMode};
use crate::canvas::{raster, text};
use image::RgbaImage;

/// One transparent raster layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    pixels: RgbaImage,
}

/// Immutable full-pixel capture of a [`Surface`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pixels: RgbaImage,
}

impl Snapshot {
    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn byte_len(&self) -> usize {
        self.pixels.as_raw().len()
    }
}

impl Surface {
    /// A fully transparent surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Color {
        raster::get_pixel(&self.pixels, x, y)
    }

    pub fn image(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn is_blank(&self) -> bool {
        self.pixels.pixels().all(|px| px.0[3] == 0)
    }

    pub fn clear(&mut self) {
        raster::fill(&mut self.pixels, Color::TRANSPARENT);
    }

    pub fn paint_stroke(
        &mut self,
        from: Point,
        to: Point,
        color: Color,
        width: f32,
        mode: StrokeMode,
    ) {
        raster::stroke_segment(&mut self.pixels, from, to, color, width, mode);
    }

    /// Rasterizes an outline shape. Rectangles take two opposite corners;
    /// circles take the center and a point on the circle.
    pub fn paint_shape(&mut self, kind: ShapeKind, p1: Point, p2: Point, color: Color, width: f32) {
        paint_shape_into(&mut self.pixels, kind, p1, p2, color, width);
    }

    pub fn fill_disc(&mut self, center: Point, diameter: f32, color: Color) {
        raster::fill_disc(&mut self.pixels, center, diameter, color);
    }

    /// Returns `false` when no font is available or nothing was drawn.
    pub fn stamp_text(&mut self, baseline: Point, value: &str, size: f32, color: Color) -> bool {
        match text::default_font() {
            Some(font) => text::draw_text(&mut self.pixels, font, baseline, value, size, color),
            None => {
                tracing::warn!("text tool has no font to rasterize with");
                false
            }
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            pixels: self.pixels.clone(),
        }
    }

    /// Replaces every pixel with the snapshot's contents; never blends.
    pub fn restore(&mut self, snapshot: &Snapshot) -> Result<(), CanvasError> {
        if snapshot.dimensions() != self.dimensions() {
            return Err(CanvasError::SnapshotSizeMismatch {
                snapshot: snapshot.dimensions(),
                surface: self.dimensions(),
            });
        }
        self.pixels.copy_from_slice(snapshot.pixels.as_raw());
        Ok(())
    }
}

/// Shared by surfaces and the compositor's live preview.
pub(crate) fn paint_shape_into(
    img: &mut RgbaImage,
    kind: ShapeKind,
    p1: Point,
    p2: Point,
    color: Color,
    width: f32,
) {
    match kind {
        ShapeKind::Line => {
            raster::stroke_segment(img, p1, p2, color, width, StrokeMode::Normal);
        }
        ShapeKind::Rectangle => {
            raster::stroke_rect(img, p1, p2, color, width);
        }
        ShapeKind::Circle => {
            raster::stroke_circle(img, p1, p1.distance(p2), color, width);
        }
    }
}
