mod confirmation_modal;

pub use confirmation_modal::{ConfirmationModal, ConfirmationResult};

use crate::canvas::export::{self, DEFAULT_EXPORT_STEM};
use crate::canvas::model::{Color, MAX_BRUSH_SIZE, MAX_TEXT_SIZE, MIN_BRUSH_SIZE, MIN_TEXT_SIZE};
use crate::canvas::shortcuts::{self, Key, KeyEvent, KeyModifiers};
use crate::canvas::{CommandOutcome, Editor, EditorCommand, EditorConfig, Tool, ViewPoint};
use crate::prompt::{self, PromptGame};
use crate::settings::SketchSettings;
use crate::settings_store;
use chrono::Local;
use eframe::egui;
use egui_toast::{Toast, ToastKind, ToastOptions, Toasts};
use std::time::Duration;

const TOAST_SECONDS: f64 = 3.0;
const BANNER_OFFSET: egui::Vec2 = egui::vec2(20.0, 20.0);
const BANNER_SIZE: egui::Vec2 = egui::vec2(360.0, 90.0);

pub struct SketchApp {
    settings: SketchSettings,
    editor: Editor,
    game: Option<PromptGame>,
    texture: Option<egui::TextureHandle>,
    toasts: Toasts,
    clear_modal: ConfirmationModal,
    status: String,
    /// Last view position handed to the editor during a gesture.
    last_pointer: Option<ViewPoint>,
    persist_on_exit: bool,
}

impl SketchApp {
    pub fn new(settings: SketchSettings) -> Self {
        let game = match prompt::build_source(&settings.prompt) {
            Ok(source) => Some(PromptGame::new(source)),
            Err(err) => {
                tracing::error!(error = %err, "prompt game unavailable");
                None
            }
        };
        tracing::info!(
            width = settings.canvas_width,
            height = settings.canvas_height,
            "sketch canvas created"
        );
        Self {
            editor: Editor::new(EditorConfig::from_settings(&settings)),
            game,
            settings,
            texture: None,
            toasts: Toasts::new().anchor(egui::Align2::RIGHT_BOTTOM, [-10.0, -10.0]),
            clear_modal: ConfirmationModal::clear_layer(),
            status: String::new(),
            last_pointer: None,
            persist_on_exit: false,
        }
    }

    /// Write the current tool choices back to the settings file on close.
    pub fn persist_on_exit(mut self, persist: bool) -> Self {
        self.persist_on_exit = persist;
        self
    }

    fn toast(&mut self, kind: ToastKind, text: String) {
        self.toasts.add(Toast {
            text: text.into(),
            kind,
            options: ToastOptions::default().duration_in_seconds(TOAST_SECONDS),
        });
    }

    fn run_command(&mut self, command: EditorCommand) {
        match self.editor.apply(command) {
            Ok(CommandOutcome::ExportRequested) => self.export(),
            Ok(CommandOutcome::Applied | CommandOutcome::NoChange) => {}
            Err(err) => {
                tracing::warn!(error = %err, ?command, "editor command rejected");
                self.status = err.to_string();
            }
        }
    }

    fn export(&mut self) {
        let image = self.editor.export_image();
        let stem = export::timestamped_stem(DEFAULT_EXPORT_STEM, Local::now());
        let result = export::ensure_output_folder(self.settings.export_dir.as_deref())
            .and_then(|dir| export::export_png(&image, &dir, &stem));
        match result {
            Ok(path) => {
                self.status = format!("Saved {}", path.display());
                self.toast(ToastKind::Success, format!("Saved {}", path.display()));
            }
            Err(err) => {
                tracing::error!(error = %format!("{err:#}"), "export failed");
                self.status = "Export failed".into();
                self.toast(ToastKind::Error, format!("Export failed: {err}"));
            }
        }
    }

    /// Loaded settings with the current tool choices folded back in.
    fn settings_to_persist(&self) -> SketchSettings {
        let tools = self.editor.tool_settings();
        SketchSettings {
            default_tool: tools.tool,
            default_color: tools.color,
            background_color: tools.background,
            default_brush_size: tools.brush_size(),
            default_text_size: tools.text_size(),
            ..self.settings.clone()
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        let text_focused = ctx.wants_keyboard_input();
        let events = ctx.input(|i| i.events.clone());
        for event in events {
            let egui::Event::Key {
                key,
                pressed: true,
                modifiers,
                ..
            } = event
            else {
                continue;
            };
            let event = KeyEvent {
                key: map_egui_key(key),
                modifiers: KeyModifiers {
                    ctrl: modifiers.ctrl,
                    command: modifiers.mac_cmd,
                },
            };
            if let Some(command) = shortcuts::map_key_event_to_command(text_focused, event) {
                self.run_command(command);
            }
        }
    }

    fn toolbar(&mut self, ui: &mut egui::Ui) {
        let mut commands = Vec::new();
        ui.horizontal_wrapped(|ui| {
            let current = self.editor.tool_settings().tool;
            let mut tool = current;
            egui::ComboBox::from_id_source("tool")
                .selected_text(tool.label())
                .show_ui(ui, |ui| {
                    for candidate in Tool::ALL {
                        ui.selectable_value(&mut tool, candidate, candidate.label());
                    }
                });
            if tool != current {
                commands.push(EditorCommand::SetTool(tool));
            }

            let settings = self.editor.tool_settings_mut();
            ui.label("Color");
            color_button(ui, &mut settings.color);

            let mut size = settings.brush_size();
            if ui
                .add(egui::Slider::new(&mut size, MIN_BRUSH_SIZE..=MAX_BRUSH_SIZE).text("Brush"))
                .changed()
            {
                commands.push(EditorCommand::SetBrushSize(size));
            }

            ui.add(
                egui::TextEdit::singleline(&mut settings.text)
                    .hint_text("Text")
                    .desired_width(120.0),
            );
            let mut text_size = settings.text_size();
            if ui
                .add(egui::Slider::new(&mut text_size, MIN_TEXT_SIZE..=MAX_TEXT_SIZE).text("Text"))
                .changed()
            {
                settings.set_text_size(text_size);
            }

            ui.label("Background");
            color_button(ui, &mut settings.background);

            ui.separator();
            let layers = self.editor.layers();
            let active = layers.active_index();
            let active_name = layers.layers()[active].name().to_string();
            egui::ComboBox::from_id_source("layer")
                .selected_text(active_name)
                .show_ui(ui, |ui| {
                    for (index, layer) in layers.layers().iter().enumerate() {
                        if ui.selectable_label(index == active, layer.name()).clicked() {
                            commands.push(EditorCommand::SelectLayer(index));
                        }
                    }
                });
            if ui.button("New Layer").clicked() {
                commands.push(EditorCommand::NewLayer);
            }
            if ui.button("Clear").clicked() {
                self.clear_modal.open();
            }
            if ui
                .add_enabled(self.editor.can_undo(), egui::Button::new("Undo"))
                .clicked()
            {
                commands.push(EditorCommand::Undo);
            }
            if ui
                .add_enabled(self.editor.can_redo(), egui::Button::new("Redo"))
                .clicked()
            {
                commands.push(EditorCommand::Redo);
            }
            if ui.button("Save").clicked() {
                commands.push(EditorCommand::Export);
            }

            ui.separator();
            let scale = self.editor.view().scale();
            let (min_zoom, max_zoom) = self.editor.view().limits();
            if ui
                .add_enabled(scale > min_zoom, egui::Button::new("-"))
                .on_hover_text("Zoom out")
                .clicked()
            {
                commands.push(EditorCommand::ZoomOut);
            }
            ui.label(format!("{:.0}%", scale * 100.0));
            if ui
                .add_enabled(scale < max_zoom, egui::Button::new("+"))
                .on_hover_text("Zoom in")
                .clicked()
            {
                commands.push(EditorCommand::ZoomIn);
            }
            if ui.button("1:1").on_hover_text("Reset zoom").clicked() {
                commands.push(EditorCommand::ZoomReset);
            }

            ui.separator();
            self.game_controls(ui);
        });
        for command in commands {
            self.run_command(command);
        }
    }

    fn game_controls(&mut self, ui: &mut egui::Ui) {
        let Some(game) = self.game.as_mut() else {
            let _ = ui.add_enabled(false, egui::Button::new("Start Game"));
            return;
        };
        if ui
            .add_enabled(!game.is_fetching(), egui::Button::new("Start Game"))
            .clicked()
        {
            game.start();
        }
        let running = *game.state() != prompt::GameState::Idle;
        if ui.add_enabled(running, egui::Button::new("Stop Game")).clicked() {
            game.stop();
        }
        let status = game.status();
        if !status.is_empty() {
            ui.label(status);
        }
    }

    fn canvas(&mut self, ui: &mut egui::Ui) {
        let (width, height) = self.editor.layers().dimensions();
        let image = {
            let frame = self.editor.render_frame();
            egui::ColorImage::from_rgba_unmultiplied(
                [frame.width() as usize, frame.height() as usize],
                frame.as_raw(),
            )
        };
        match self.texture.as_mut() {
            Some(texture) => texture.set(image, egui::TextureOptions::NEAREST),
            None => {
                self.texture = Some(ui.ctx().load_texture(
                    "sketch-canvas",
                    image,
                    egui::TextureOptions::NEAREST,
                ));
            }
        }

        egui::ScrollArea::both().show(ui, |ui| {
            let size = egui::vec2(width as f32, height as f32);
            let (rect, response) = ui.allocate_exact_size(size, egui::Sense::click_and_drag());
            let painter = ui.painter_at(rect);

            let background = self.editor.tool_settings().background;
            painter.rect_filled(rect, 0.0, to_color32(background));
            if let Some(texture) = &self.texture {
                let scaled =
                    egui::Rect::from_center_size(rect.center(), size * self.editor.view().scale());
                painter.image(
                    texture.id(),
                    scaled,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE,
                );
            }

            self.pointer_input(ui, rect, &response);
            if let Some(game) = &self.game {
                if let Some(prompt) = game.prompt() {
                    paint_banner(&painter, rect, prompt, game.banner_alpha());
                }
            }
        });
    }

    fn pointer_input(&mut self, ui: &egui::Ui, rect: egui::Rect, response: &egui::Response) {
        let (pressed, released, down, press_pos, latest_pos) = ui.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                i.pointer.primary_down(),
                i.pointer.interact_pos(),
                i.pointer.latest_pos(),
            )
        });
        let to_view = |pos: egui::Pos2| ViewPoint::new(pos.x - rect.min.x, pos.y - rect.min.y);

        let mut started = false;
        if pressed && response.hovered() && !self.editor.is_gesturing() {
            if let Some(pos) = press_pos.filter(|pos| rect.contains(*pos)) {
                let at = to_view(pos);
                self.editor.pointer_down(at);
                self.last_pointer = Some(at);
                started = true;
            }
        }
        if !self.editor.is_gesturing() {
            self.last_pointer = None;
            return;
        }
        let Some(pos) = latest_pos.or(press_pos) else {
            return;
        };
        let at = to_view(pos);
        // Releasing anywhere, even outside the window, ends the gesture.
        if released || !down {
            self.editor.pointer_up(at);
            self.last_pointer = None;
        } else if !started && self.last_pointer != Some(at) {
            self.editor.pointer_move(at);
            self.last_pointer = Some(at);
        }
    }
}

impl eframe::App for SketchApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some(game) = self.game.as_mut() {
            let _ = game.poll();
            game.tick_banner();
            if game.is_fetching() {
                ctx.request_repaint_after(Duration::from_millis(100));
            } else if game.prompt().is_some()
                && game.banner_alpha() < prompt::game::BANNER_ALPHA_MAX
            {
                ctx.request_repaint();
            }
        }

        if !self.clear_modal.is_open() {
            self.handle_shortcuts(ctx);
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| self.toolbar(ui));
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let layers = self.editor.layers();
                ui.label(format!(
                    "{} · layer {}/{}",
                    self.editor.tool_settings().tool.label(),
                    layers.active_index() + 1,
                    layers.len()
                ));
                ui.separator();
                ui.label(format!(
                    "history {:.1} MB",
                    layers.history_bytes() as f64 / (1024.0 * 1024.0)
                ));
                if !self.status.is_empty() {
                    ui.separator();
                    ui.label(&self.status);
                }
            });
        });
        egui::CentralPanel::default().show(ctx, |ui| self.canvas(ui));

        if self.clear_modal.ui(ctx) == ConfirmationResult::Confirmed {
            self.run_command(EditorCommand::ClearActiveLayer);
        }
        if self.editor.is_gesturing() {
            ctx.request_repaint();
        }
        self.toasts.show(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if !self.persist_on_exit {
            return;
        }
        match settings_store::save(&self.settings_to_persist()) {
            Ok(path) => tracing::info!(path = %path.display(), "settings saved"),
            Err(err) => tracing::warn!(error = %format!("{err:#}"), "could not save settings"),
        }
    }
}

fn color_button(ui: &mut egui::Ui, color: &mut Color) {
    let mut rgb = [color.r, color.g, color.b];
    if ui
        .color_edit_button_srgb(&mut rgb)
        .on_hover_text(color.to_hex())
        .changed()
    {
        *color = Color::rgb(rgb[0], rgb[1], rgb[2]);
    }
}

fn to_color32(color: Color) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
}

fn paint_banner(painter: &egui::Painter, canvas: egui::Rect, prompt: &str, alpha: u8) {
    let banner = egui::Rect::from_min_size(canvas.min + BANNER_OFFSET, BANNER_SIZE);
    painter.rect_filled(banner, 12.0, egui::Color32::from_black_alpha(alpha));
    painter.text(
        canvas.min + egui::vec2(34.0, 52.0),
        egui::Align2::LEFT_BOTTOM,
        "Draw this:",
        egui::FontId::proportional(22.0),
        egui::Color32::WHITE,
    );
    painter.text(
        canvas.min + egui::vec2(34.0, 88.0),
        egui::Align2::LEFT_BOTTOM,
        prompt,
        egui::FontId::proportional(28.0),
        egui::Color32::WHITE,
    );
}

fn map_egui_key(key: egui::Key) -> Key {
    use egui::Key as K;
    match key {
        K::Delete => Key::Delete,
        K::Backspace => Key::Backspace,
        K::Equals => Key::Char('='),
        K::Plus => Key::Char('+'),
        K::Minus => Key::Char('-'),
        K::Num0 => Key::Char('0'),
        K::Num1 => Key::Char('1'),
        K::Num2 => Key::Char('2'),
        K::Num3 => Key::Char('3'),
        K::Num4 => Key::Char('4'),
        K::Num5 => Key::Char('5'),
        K::Num6 => Key::Char('6'),
        K::Num7 => Key::Char('7'),
        K::Num8 => Key::Char('8'),
        K::Num9 => Key::Char('9'),
        K::B => Key::Char('b'),
        K::C => Key::Char('c'),
        K::E => Key::Char('e'),
        K::L => Key::Char('l'),
        K::R => Key::Char('r'),
        K::S => Key::Char('s'),
        K::T => Key::Char('t'),
        K::Y => Key::Char('y'),
        K::Z => Key::Char('z'),
        _ => Key::Other,
    }
}
