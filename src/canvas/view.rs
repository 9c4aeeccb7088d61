use crate::canvas::model::{Point, ViewPoint};

pub const DEFAULT_MIN_ZOOM: f32 = 0.3;
pub const DEFAULT_MAX_ZOOM: f32 = 3.0;
pub const DEFAULT_ZOOM_STEP: f32 = 0.1;

/// Zoom around the canvas center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    scale: f32,
    center: Point,
    min_scale: f32,
    max_scale: f32,
    step: f32,
}

impl ViewTransform {
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_limits(
            width,
            height,
            DEFAULT_MIN_ZOOM,
            DEFAULT_MAX_ZOOM,
            DEFAULT_ZOOM_STEP,
        )
    }

    /// Limits are sorted and must be positive; a bad configuration falls back to the defaults.
    pub fn with_limits(width: u32, height: u32, min: f32, max: f32, step: f32) -> Self {
        let (mut min_scale, mut max_scale) = if min <= max { (min, max) } else { (max, min) };
        if !(min_scale.is_finite() && max_scale.is_finite()) || min_scale <= 0.0 {
            tracing::warn!(min, max, "invalid zoom limits, using defaults");
            min_scale = DEFAULT_MIN_ZOOM;
            max_scale = DEFAULT_MAX_ZOOM;
        }
        let step = if step.is_finite() && step > 0.0 {
            step
        } else {
            DEFAULT_ZOOM_STEP
        };
        Self {
            scale: 1.0_f32.clamp(min_scale, max_scale),
            center: Point::new(width as f32 / 2.0, height as f32 / 2.0),
            min_scale,
            max_scale,
            step,
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn limits(&self) -> (f32, f32) {
        (self.min_scale, self.max_scale)
    }

    /// `canvas = (view - center) / scale + center`
    pub fn to_canvas(&self, view: ViewPoint) -> Point {
        Point::new(
            (view.x - self.center.x) / self.scale + self.center.x,
            (view.y - self.center.y) / self.scale + self.center.y,
        )
    }

    pub fn to_view(&self, canvas: Point) -> ViewPoint {
        ViewPoint::new(
            (canvas.x - self.center.x) * self.scale + self.center.x,
            (canvas.y - self.center.y) * self.scale + self.center.y,
        )
    }

    /// Returns `true` when the scale actually changed.
    pub fn zoom_in(&mut self) -> bool {
        self.set_scale(self.scale + self.step)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.set_scale(self.scale - self.step)
    }

    pub fn reset(&mut self) -> bool {
        self.set_scale(1.0)
    }

    fn set_scale(&mut self, scale: f32) -> bool {
        // Repeated float steps drift; snap to hundredths.
        let next = ((scale * 100.0).round() / 100.0).clamp(self.min_scale, self.max_scale);
        if (next - self.scale).abs() < f32::EPSILON {
            return false;
        }
        self.scale = next;
        tracing::debug!(scale = next, "zoom changed");
        true
    }
}
