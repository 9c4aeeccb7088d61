//! Layered raster canvas: surfaces, per-layer history, tools and compositing.
//!
//! Everything in here is toolkit-independent; the egui front end in
//! [`crate::gui`] only feeds pointer samples and commands into [`Editor`]
//! and uploads the frame it renders.

pub mod compositor;
pub mod editor;
pub mod error;
pub mod export;
pub mod history;
pub mod layers;
pub mod model;
pub mod raster;
pub mod shortcuts;
pub mod surface;
pub mod text;
pub mod tools;
pub mod view;

pub use compositor::{Compositor, ShapePreview};
pub use editor::{CommandOutcome, Editor, EditorCommand, EditorConfig};
pub use error::CanvasError;
pub use layers::{LayerId, LayerStack};
pub use model::{Color, Point, ShapeKind, StrokeMode, Tool, ToolSettings, ViewPoint};
pub use surface::{Snapshot, Surface};
