use crate::canvas::model::{
    Color, Tool, MAX_BRUSH_SIZE, MAX_TEXT_SIZE, MIN_BRUSH_SIZE, MIN_TEXT_SIZE,
};
use crate::canvas::view::{DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM, DEFAULT_ZOOM_STEP};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_PROXY_ENDPOINT: &str = "http://localhost:3000/api/get-prompt";
pub const DEFAULT_CHAT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_PROMPT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

const MAX_CANVAS_SIDE: u32 = 8192;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PromptMode {
    /// `POST` to a relay that holds the API key and answers `{"prompt": "..."}`.
    #[default]
    Proxy,
    /// Call the chat completions API directly with a key from the environment.
    Direct,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PromptSettings {
    #[serde(default)]
    pub mode: PromptMode,
    #[serde(default = "default_proxy_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_chat_endpoint")]
    pub chat_endpoint: String,
    #[serde(default = "default_prompt_model")]
    pub model: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for PromptSettings {
    fn default() -> Self {
        Self {
            mode: PromptMode::default(),
            endpoint: default_proxy_endpoint(),
            chat_endpoint: default_chat_endpoint(),
            model: default_prompt_model(),
            api_key_env: default_api_key_env(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SketchSettings {
    #[serde(default = "default_canvas_width")]
    pub canvas_width: u32,
    #[serde(default = "default_canvas_height")]
    pub canvas_height: u32,
    #[serde(default = "default_tool")]
    pub default_tool: Tool,
    #[serde(default = "default_color")]
    pub default_color: Color,
    #[serde(default = "default_brush_size")]
    pub default_brush_size: u32,
    #[serde(default = "default_background_color")]
    pub background_color: Color,
    #[serde(default = "default_text_size")]
    pub default_text_size: u32,
    #[serde(default = "default_brush_presets")]
    pub brush_presets: Vec<u32>,
    #[serde(default = "default_min_zoom")]
    pub min_zoom: f32,
    #[serde(default = "default_max_zoom")]
    pub max_zoom: f32,
    #[serde(default = "default_zoom_step")]
    pub zoom_step: f32,
    /// Undo depth per layer. `None` keeps every snapshot.
    #[serde(default)]
    pub history_limit: Option<usize>,
    /// Falls back to `exports/` next to the executable.
    #[serde(default)]
    pub export_dir: Option<PathBuf>,
    #[serde(default)]
    pub prompt: PromptSettings,
    #[serde(default)]
    pub debug_logging: bool,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for SketchSettings {
    fn default() -> Self {
        Self {
            canvas_width: default_canvas_width(),
            canvas_height: default_canvas_height(),
            default_tool: default_tool(),
            default_color: default_color(),
            default_brush_size: default_brush_size(),
            background_color: default_background_color(),
            default_text_size: default_text_size(),
            brush_presets: default_brush_presets(),
            min_zoom: default_min_zoom(),
            max_zoom: default_max_zoom(),
            zoom_step: default_zoom_step(),
            history_limit: None,
            export_dir: None,
            prompt: PromptSettings::default(),
            debug_logging: false,
            log_file: None,
        }
    }
}

impl SketchSettings {
    /// Pulls out-of-range values back into range. Returns `true` if anything changed.
    pub fn sanitize(&mut self) -> bool {
        let before = self.clone();

        self.canvas_width = self.canvas_width.clamp(1, MAX_CANVAS_SIDE);
        self.canvas_height = self.canvas_height.clamp(1, MAX_CANVAS_SIDE);
        self.default_brush_size = self.default_brush_size.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE);
        self.default_text_size = self.default_text_size.clamp(MIN_TEXT_SIZE, MAX_TEXT_SIZE);
        for preset in &mut self.brush_presets {
            *preset = (*preset).clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE);
        }
        if self.brush_presets.is_empty() {
            self.brush_presets = default_brush_presets();
        }

        let zoom_ok = self.min_zoom.is_finite()
            && self.max_zoom.is_finite()
            && self.min_zoom > 0.0
            && self.min_zoom <= 1.0
            && self.max_zoom >= 1.0;
        if !zoom_ok {
            self.min_zoom = default_min_zoom();
            self.max_zoom = default_max_zoom();
        }
        if !(self.zoom_step.is_finite() && self.zoom_step > 0.0) {
            self.zoom_step = default_zoom_step();
        }
        if self.history_limit == Some(0) {
            self.history_limit = Some(1);
        }
        if self.prompt.timeout_seconds == 0 {
            self.prompt.timeout_seconds = default_timeout_seconds();
        }

        let changed = *self != before;
        if changed {
            tracing::warn!("sketch settings contained out-of-range values and were adjusted");
        }
        changed
    }
}

fn default_canvas_width() -> u32 {
    1700
}

fn default_canvas_height() -> u32 {
    800
}

fn default_tool() -> Tool {
    Tool::Brush
}

fn default_color() -> Color {
    Color::BLACK
}

fn default_brush_size() -> u32 {
    10
}

fn default_background_color() -> Color {
    Color::WHITE
}

fn default_text_size() -> u32 {
    24
}

fn default_brush_presets() -> Vec<u32> {
    vec![5, 10, 15, 20, 30]
}

fn default_min_zoom() -> f32 {
    DEFAULT_MIN_ZOOM
}

fn default_max_zoom() -> f32 {
    DEFAULT_MAX_ZOOM
}

fn default_zoom_step() -> f32 {
    DEFAULT_ZOOM_STEP
}

fn default_proxy_endpoint() -> String {
    DEFAULT_PROXY_ENDPOINT.to_string()
}

fn default_chat_endpoint() -> String {
    DEFAULT_CHAT_ENDPOINT.to_string()
}

fn default_prompt_model() -> String {
    DEFAULT_PROMPT_MODEL.to_string()
}

fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let settings: SketchSettings = serde_json::from_str("{}").expect("parse");
        assert_eq!(settings, SketchSettings::default());
        assert_eq!(settings.canvas_width, 1700);
        assert_eq!(settings.canvas_height, 800);
        assert_eq!(settings.default_brush_size, 10);
        assert_eq!(settings.default_text_size, 24);
        assert_eq!(settings.default_color, Color::BLACK);
        assert_eq!(settings.background_color, Color::WHITE);
        assert_eq!(settings.brush_presets, vec![5, 10, 15, 20, 30]);
        assert_eq!(settings.prompt.model, "gpt-4o-mini");
        assert_eq!(settings.prompt.timeout_seconds, 30);
    }

    #[test]
    fn partial_prompt_section_keeps_other_defaults() {
        let settings: SketchSettings =
            serde_json::from_str(r#"{"prompt":{"mode":"direct","timeout_seconds":5}}"#)
                .expect("parse");
        assert_eq!(settings.prompt.mode, PromptMode::Direct);
        assert_eq!(settings.prompt.timeout_seconds, 5);
        assert_eq!(settings.prompt.api_key_env, DEFAULT_API_KEY_ENV);
        assert_eq!(settings.prompt.endpoint, DEFAULT_PROXY_ENDPOINT);
    }

    #[test]
    fn tools_serialize_as_snake_case() {
        let mut settings = SketchSettings::default();
        settings.default_tool = Tool::Rectangle;
        let json = serde_json::to_value(&settings).expect("serialize");
        assert_eq!(json["default_tool"], "rectangle");
    }

    #[test]
    fn sanitize_clamps_and_reports() {
        let mut settings = SketchSettings {
            default_brush_size: 0,
            default_text_size: 999,
            brush_presets: vec![],
            min_zoom: -1.0,
            history_limit: Some(0),
            ..SketchSettings::default()
        };
        assert!(settings.sanitize());
        assert_eq!(settings.default_brush_size, MIN_BRUSH_SIZE);
        assert_eq!(settings.default_text_size, MAX_TEXT_SIZE);
        assert_eq!(settings.brush_presets, default_brush_presets());
        assert_eq!(settings.min_zoom, DEFAULT_MIN_ZOOM);
        assert_eq!(settings.history_limit, Some(1));

        assert!(!settings.sanitize());
    }
}
