use crate::canvas::layers::LayerStack;
use crate::canvas::model::{Color, Point, ShapeKind};
use crate::canvas::raster;
use crate::canvas::surface::paint_shape_into;
use image::RgbaImage;

/// Shape previews use a fixed stroke regardless of the brush size.
pub const PREVIEW_STROKE_WIDTH: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapePreview {
    pub kind: ShapeKind,
    pub start: Point,
    pub end: Point,
    pub color: Color,
}

/// Produces the displayed frame, reusing its buffer between frames.
#[derive(Debug, Default)]
pub struct Compositor {
    frame: RgbaImage,
    #[cfg(test)]
    allocation_count: usize,
}

impl Compositor {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_size(&mut self, size: (u32, u32)) {
        if self.frame.dimensions() != size {
            self.frame = RgbaImage::new(size.0, size.1);
            #[cfg(test)]
            {
                self.allocation_count += 1;
            }
        }
    }

    /// Background, then every layer bottom to top, then the preview if any.
    pub fn render(
        &mut self,
        stack: &LayerStack,
        background: Color,
        preview: Option<&ShapePreview>,
    ) -> &RgbaImage {
        self.ensure_size(stack.dimensions());
        compose_into(&mut self.frame, stack, background);
        if let Some(preview) = preview {
            paint_shape_into(
                &mut self.frame,
                preview.kind,
                preview.start,
                preview.end,
                preview.color,
                PREVIEW_STROKE_WIDTH,
            );
        }
        &self.frame
    }
}

/// The committed picture without any preview; what gets exported.
pub fn flatten(stack: &LayerStack, background: Color) -> RgbaImage {
    let (width, height) = stack.dimensions();
    let mut out = RgbaImage::new(width, height);
    compose_into(&mut out, stack, background);
    out
}

fn compose_into(out: &mut RgbaImage, stack: &LayerStack, background: Color) {
    raster::fill(out, background);
    for layer in stack.layers() {
        raster::blend_image(out, layer.surface().image());
    }
}
