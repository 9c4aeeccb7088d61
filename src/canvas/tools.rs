use crate::canvas::compositor::ShapePreview;
use crate::canvas::layers::{LayerId, LayerStack};
use crate::canvas::model::{Point, StrokeMode, Tool, ToolSettings};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

const SPRAY_DOTS_PER_SAMPLE: usize = 3;

/// Transient state of one pointer-down to pointer-up cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gesture {
    pub tool: Tool,
    /// Layer that was active at pointer-down; the whole gesture paints here.
    pub layer: LayerId,
    pub start: Point,
    pub last: Point,
    pub current: Point,
}

/// Turns pointer samples into surface mutations for the current tool.
#[derive(Debug, Clone)]
pub struct ToolEngine {
    gesture: Option<Gesture>,
    rng: StdRng,
}

impl Default for ToolEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolEngine {
    pub fn new() -> Self {
        Self {
            gesture: None,
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic spray pattern.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            gesture: None,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn is_gesturing(&self) -> bool {
        self.gesture.is_some()
    }

    pub fn gesture(&self) -> Option<&Gesture> {
        self.gesture.as_ref()
    }

    pub fn pointer_down(&mut self, stack: &mut LayerStack, settings: &ToolSettings, point: Point) {
        if let Some(stale) = self.gesture {
            tracing::warn!(
                tool = ?stale.tool,
                "pointer down during an open gesture, committing it"
            );
            self.pointer_up(stack, settings, stale.current);
        }

        let layer = stack.active_id();
        if settings.tool == Tool::Text {
            let Some(text) = settings.pending_text() else {
                return;
            };
            let _ = stack.save(layer);
            if let Some(surface) = stack.surface_mut(layer) {
                let stamped =
                    surface.stamp_text(point, text, settings.text_size() as f32, settings.color);
                tracing::debug!(layer = layer.raw(), stamped, "text stamped");
            }
            return;
        }

        let _ = stack.save(layer);
        self.gesture = Some(Gesture {
            tool: settings.tool,
            layer,
            start: point,
            last: point,
            current: point,
        });

        let width = settings.brush_size() as f32;
        if let Some(mode) = stroke_mode(settings.tool) {
            if let Some(surface) = stack.surface_mut(layer) {
                surface.paint_stroke(point, point, settings.color, width, mode);
            }
        }
    }

    pub fn pointer_move(&mut self, stack: &mut LayerStack, settings: &ToolSettings, point: Point) {
        let Some(gesture) = self.gesture.as_mut() else {
            return;
        };
        gesture.current = point;
        let Some(surface) = stack.surface_mut(gesture.layer) else {
            return;
        };
        let size = settings.brush_size() as f32;

        match gesture.tool {
            Tool::Brush | Tool::Eraser => {
                if let Some(mode) = stroke_mode(gesture.tool) {
                    surface.paint_stroke(gesture.last, point, settings.color, size, mode);
                }
                gesture.last = point;
            }
            Tool::Spray => {
                for _ in 0..SPRAY_DOTS_PER_SAMPLE {
                    let angle = self.rng.gen_range(0.0..TAU);
                    let radius = self.rng.gen_range(0.0..size * 2.0);
                    let max_diameter = size / 3.0;
                    let diameter = if max_diameter > 1.0 {
                        self.rng.gen_range(1.0..max_diameter)
                    } else {
                        1.0
                    };
                    let dot = Point::new(
                        point.x + angle.cos() * radius,
                        point.y + angle.sin() * radius,
                    );
                    surface.fill_disc(dot, diameter, settings.color);
                }
                gesture.last = point;
            }
            Tool::Line | Tool::Rectangle | Tool::Circle | Tool::Text => {}
        }
    }

    pub fn pointer_up(&mut self, stack: &mut LayerStack, settings: &ToolSettings, point: Point) {
        let Some(gesture) = self.gesture.take() else {
            return;
        };
        let Some(kind) = gesture.tool.shape_kind() else {
            return;
        };
        if let Some(surface) = stack.surface_mut(gesture.layer) {
            surface.paint_shape(
                kind,
                gesture.start,
                point,
                settings.color,
                settings.brush_size() as f32,
            );
            tracing::debug!(layer = gesture.layer.raw(), shape = ?kind, "shape committed");
        }
    }

    /// Present only while a line, rectangle or circle is being dragged.
    pub fn preview(&self, settings: &ToolSettings) -> Option<ShapePreview> {
        let gesture = self.gesture.as_ref()?;
        let kind = gesture.tool.shape_kind()?;
        Some(ShapePreview {
            kind,
            start: gesture.start,
            end: gesture.current,
            color: settings.color,
        })
    }
}

fn stroke_mode(tool: Tool) -> Option<StrokeMode> {
    match tool {
        Tool::Brush => Some(StrokeMode::Normal),
        Tool::Eraser => Some(StrokeMode::Erase),
        _ => None,
    }
}
