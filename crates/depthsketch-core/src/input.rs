//! Pointer and keyboard events and the commands keys map to.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Pointer event in screen coordinates. Timestamps are in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PointerEvent {
    Down {
        position: Point,
        button: MouseButton,
        #[serde(default)]
        modifiers: Modifiers,
        #[serde(default)]
        time_ms: f64,
    },
    Move {
        position: Point,
        #[serde(default)]
        time_ms: f64,
    },
    Up {
        position: Point,
        button: MouseButton,
    },
    /// Pointer left the drawing surface.
    Leave,
}

/// Keyboard event type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum KeyEvent {
    Pressed {
        key: String,
        #[serde(default)]
        modifiers: Modifiers,
        /// Auto-repeat of a held key.
        #[serde(default)]
        repeat: bool,
    },
    Released {
        key: String,
    },
}

/// Canvas action bound to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    ToggleTranslate,
    ToggleRotate,
    ToggleScale,
    ExitModes,
    DeleteSelection,
    Undo,
    Redo,
}

impl Command {
    /// Map a key press to a command. Letters also match their position on a
    /// Russian layout.
    pub fn from_key(key: &str, modifiers: Modifiers) -> Option<Command> {
        let key = key.to_lowercase();
        if modifiers.command() {
            return match key.as_str() {
                "z" | "я" if modifiers.shift => Some(Command::Redo),
                "z" | "я" => Some(Command::Undo),
                "y" | "н" => Some(Command::Redo),
                _ => None,
            };
        }
        match key.as_str() {
            "t" | "е" => Some(Command::ToggleTranslate),
            "r" | "к" => Some(Command::ToggleRotate),
            "s" | "ы" => Some(Command::ToggleScale),
            "escape" => Some(Command::ExitModes),
            "delete" => Some(Command::DeleteSelection),
            _ => None,
        }
    }

    /// Command of a key event. Releases and auto-repeats map to nothing.
    pub fn from_event(event: &KeyEvent) -> Option<Command> {
        match event {
            KeyEvent::Pressed {
                key,
                modifiers,
                repeat: false,
            } => Self::from_key(key, *modifiers),
            _ => None,
        }
    }
}
