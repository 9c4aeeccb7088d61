use crate::canvas::compositor::{self, Compositor};
use crate::canvas::error::CanvasError;
use crate::canvas::layers::LayerStack;
use crate::canvas::model::{Tool, ToolSettings, ViewPoint};
use crate::canvas::tools::ToolEngine;
use crate::canvas::view::ViewTransform;
use crate::settings::SketchSettings;
use image::RgbaImage;

/// Discrete UI actions, from buttons or keyboard shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorCommand {
    NewLayer,
    SelectLayer(usize),
    ClearActiveLayer,
    Undo,
    Redo,
    ZoomIn,
    ZoomOut,
    ZoomReset,
    SetTool(Tool),
    SetBrushSize(u32),
    BrushPreset(usize),
    /// File I/O is left to the caller; see [`CommandOutcome::ExportRequested`].
    Export,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Applied,
    NoChange,
    ExportRequested,
}

impl From<bool> for CommandOutcome {
    fn from(changed: bool) -> Self {
        if changed {
            CommandOutcome::Applied
        } else {
            CommandOutcome::NoChange
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    pub width: u32,
    pub height: u32,
    pub history_limit: Option<usize>,
    pub tools: ToolSettings,
    pub brush_presets: Vec<u32>,
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub zoom_step: f32,
    pub spray_seed: Option<u64>,
}

impl EditorConfig {
    pub fn from_settings(settings: &SketchSettings) -> Self {
        let mut tools = ToolSettings::new(
            settings.default_tool,
            settings.default_color,
            settings.background_color,
        );
        tools.set_brush_size(settings.default_brush_size);
        tools.set_text_size(settings.default_text_size);
        Self {
            width: settings.canvas_width,
            height: settings.canvas_height,
            history_limit: settings.history_limit,
            tools,
            brush_presets: settings.brush_presets.clone(),
            min_zoom: settings.min_zoom,
            max_zoom: settings.max_zoom,
            zoom_step: settings.zoom_step,
            spray_seed: None,
        }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self::from_settings(&SketchSettings::default())
    }
}

/// Single entry point for everything the UI can do to the picture.
#[derive(Debug)]
pub struct Editor {
    layers: LayerStack,
    tools: ToolEngine,
    settings: ToolSettings,
    view: ViewTransform,
    compositor: Compositor,
    brush_presets: Vec<u32>,
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        let tools = match config.spray_seed {
            Some(seed) => ToolEngine::with_seed(seed),
            None => ToolEngine::new(),
        };
        Self {
            layers: LayerStack::new(config.width, config.height, config.history_limit),
            tools,
            settings: config.tools,
            view: ViewTransform::with_limits(
                config.width,
                config.height,
                config.min_zoom,
                config.max_zoom,
                config.zoom_step,
            ),
            compositor: Compositor::new(),
            brush_presets: config.brush_presets,
        }
    }

    pub fn layers(&self) -> &LayerStack {
        &self.layers
    }

    pub fn tool_settings(&self) -> &ToolSettings {
        &self.settings
    }

    /// Color, background and text are edited in place by the toolbar.
    pub fn tool_settings_mut(&mut self) -> &mut ToolSettings {
        &mut self.settings
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn brush_presets(&self) -> &[u32] {
        &self.brush_presets
    }

    pub fn is_gesturing(&self) -> bool {
        self.tools.is_gesturing()
    }

    pub fn can_undo(&self) -> bool {
        self.layers
            .history(self.layers.active_id())
            .is_some_and(|history| history.undo_len() > 0)
    }

    pub fn can_redo(&self) -> bool {
        self.layers
            .history(self.layers.active_id())
            .is_some_and(|history| history.redo_len() > 0)
    }

    pub fn pointer_down(&mut self, at: ViewPoint) {
        let point = self.view.to_canvas(at);
        self.tools.pointer_down(&mut self.layers, &self.settings, point);
    }

    pub fn pointer_move(&mut self, at: ViewPoint) {
        let point = self.view.to_canvas(at);
        self.tools.pointer_move(&mut self.layers, &self.settings, point);
    }

    pub fn pointer_up(&mut self, at: ViewPoint) {
        let point = self.view.to_canvas(at);
        self.tools.pointer_up(&mut self.layers, &self.settings, point);
    }

    pub fn apply(&mut self, command: EditorCommand) -> Result<CommandOutcome, CanvasError> {
        tracing::debug!(?command, "editor command");
        let outcome = match command {
            EditorCommand::NewLayer => {
                let _ = self.layers.add_layer();
                CommandOutcome::Applied
            }
            EditorCommand::SelectLayer(index) => {
                self.layers.set_active(index)?;
                CommandOutcome::Applied
            }
            EditorCommand::ClearActiveLayer => {
                self.layers.clear_active();
                CommandOutcome::Applied
            }
            EditorCommand::Undo => self.layers.undo_active().into(),
            EditorCommand::Redo => self.layers.redo_active().into(),
            EditorCommand::ZoomIn => self.view.zoom_in().into(),
            EditorCommand::ZoomOut => self.view.zoom_out().into(),
            EditorCommand::ZoomReset => self.view.reset().into(),
            EditorCommand::SetTool(tool) => {
                let changed = self.settings.tool != tool;
                self.settings.tool = tool;
                changed.into()
            }
            EditorCommand::SetBrushSize(size) => self.set_brush_size(size),
            EditorCommand::BrushPreset(index) => match self.brush_presets.get(index).copied() {
                Some(size) => self.set_brush_size(size),
                None => CommandOutcome::NoChange,
            },
            EditorCommand::Export => CommandOutcome::ExportRequested,
        };
        Ok(outcome)
    }

    fn set_brush_size(&mut self, size: u32) -> CommandOutcome {
        let before = self.settings.brush_size();
        self.settings.set_brush_size(size);
        (self.settings.brush_size() != before).into()
    }

    /// The displayed frame in canvas space, including any shape preview.
    pub fn render_frame(&mut self) -> &RgbaImage {
        let preview = self.tools.preview(&self.settings);
        self.compositor
            .render(&self.layers, self.settings.background, preview.as_ref())
    }

    /// Background and every layer, never the preview.
    pub fn export_image(&self) -> RgbaImage {
        compositor::flatten(&self.layers, self.settings.background)
    }
}
