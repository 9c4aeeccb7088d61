use crate::canvas::editor::EditorCommand;
use crate::canvas::model::Tool;

/// Toolkit-neutral key identity so the mapping can be tested without a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Delete,
    Backspace,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyModifiers {
    pub ctrl: bool,
    /// Cmd on macOS.
    pub command: bool,
}

impl KeyModifiers {
    pub fn primary(self) -> bool {
        self.ctrl || self.command
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: KeyModifiers,
}

/// Keys are ignored entirely while a text field has focus.
pub fn should_consume_key_event(text_focused: bool, _event: KeyEvent) -> bool {
    !text_focused
}

pub fn map_key_event_to_command(text_focused: bool, event: KeyEvent) -> Option<EditorCommand> {
    if !should_consume_key_event(text_focused, event) {
        return None;
    }

    if event.modifiers.primary() {
        let Key::Char(ch) = event.key else {
            return None;
        };
        return match ch.to_ascii_lowercase() {
            's' => Some(EditorCommand::Export),
            'z' => Some(EditorCommand::Undo),
            'y' => Some(EditorCommand::Redo),
            '=' | '+' => Some(EditorCommand::ZoomIn),
            '-' => Some(EditorCommand::ZoomOut),
            '0' => Some(EditorCommand::ZoomReset),
            _ => None,
        };
    }

    match event.key {
        Key::Delete | Key::Backspace => Some(EditorCommand::ClearActiveLayer),
        Key::Char(ch @ '1'..='9') => {
            let index = ch as usize - '1' as usize;
            Some(EditorCommand::BrushPreset(index))
        }
        Key::Char(ch) => tool_for_char(ch).map(EditorCommand::SetTool),
        Key::Other => None,
    }
}

fn tool_for_char(ch: char) -> Option<Tool> {
    match ch.to_ascii_lowercase() {
        'b' => Some(Tool::Brush),
        'e' => Some(Tool::Eraser),
        's' => Some(Tool::Spray),
        'l' => Some(Tool::Line),
        'r' => Some(Tool::Rectangle),
        'c' => Some(Tool::Circle),
        't' => Some(Tool::Text),
        _ => None,
    }
}
