//! Keyboard shortcut registry and documentation.

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub shift: bool,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(key: &'static str, ctrl: bool, shift: bool, description: &'static str) -> Self {
        Self {
            key,
            ctrl,
            shift,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+Z").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key);
        parts.join("+")
    }
}

/// Registry of all keyboard and pointer shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("T", false, false, "Toggle translate mode"),
            Shortcut::new("R", false, false, "Toggle rotate mode"),
            Shortcut::new("S", false, false, "Toggle scale mode"),
            Shortcut::new("Escape", false, false, "Leave transform modes"),
            Shortcut::new("Delete", false, false, "Delete selected objects"),
            Shortcut::new("Z", true, false, "Undo"),
            Shortcut::new("Z", true, true, "Redo"),
            Shortcut::new("Y", true, false, "Redo"),
            Shortcut::new("Right Drag", false, true, "Orbit the camera (3D)"),
            Shortcut::new("Click", true, false, "Add to or remove from the selection"),
        ]
    }

    /// Print all shortcuts to console.
    pub fn print_all() {
        println!("\n=== Keyboard Shortcuts ===");
        for shortcut in Self::all() {
            println!("  {:20} {}", shortcut.format(), shortcut.description);
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depthsketch_core::{Command, Modifiers};

    #[test]
    fn test_format() {
        assert_eq!(Shortcut::new("Z", true, true, "Redo").format(), "Ctrl+Shift+Z");
        assert_eq!(Shortcut::new("Delete", false, false, "").format(), "Delete");
    }

    #[test]
    fn test_keyboard_shortcuts_are_bound() {
        for shortcut in ShortcutRegistry::all() {
            if shortcut.key.contains(' ') || shortcut.key == "Click" {
                continue;
            }
            let modifiers = Modifiers {
                ctrl: shortcut.ctrl,
                shift: shortcut.shift,
                ..Modifiers::NONE
            };
            assert!(
                Command::from_key(shortcut.key, modifiers).is_some(),
                "{} is not bound",
                shortcut.format()
            );
        }
    }
}
