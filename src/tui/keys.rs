use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Key binding configuration
#[derive(Debug, Clone)]
pub struct KeyBinding {
    pub key: KeyCode,
    pub modifiers: KeyModifiers,
    pub label: &'static str,
    pub description: &'static str,
}

impl KeyBinding {
    pub const fn new(
        key: KeyCode,
        modifiers: KeyModifiers,
        label: &'static str,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            modifiers,
            label,
            description,
        }
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        let mut modifiers = event.modifiers;
        // Shift is already reflected in the character itself
        if let KeyCode::Char(_) = self.key {
            modifiers.remove(KeyModifiers::SHIFT);
        }
        self.key == event.code && self.modifiers == modifiers
    }
}

/// Application key mappings
#[derive(Debug, Clone)]
pub struct KeyMap {
    /// Quit from anywhere
    pub force_quit: KeyBinding,

    /// Quit when no overlay is open
    pub quit: KeyBinding,

    /// Show help
    pub help: KeyBinding,

    /// Reload the job list
    pub refresh: KeyBinding,

    /// Toggle the enabled-only filter
    pub filter: KeyBinding,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self {
            force_quit: KeyBinding::new(KeyCode::Char('c'), KeyModifiers::CONTROL, "Ctrl+C", "Quit"),
            quit: KeyBinding::new(KeyCode::Char('q'), KeyModifiers::NONE, "q", "Quit"),
            help: KeyBinding::new(KeyCode::Char('?'), KeyModifiers::NONE, "?", "Show/hide help"),
            refresh: KeyBinding::new(KeyCode::Char('r'), KeyModifiers::NONE, "r", "Reload jobs"),
            filter: KeyBinding::new(KeyCode::Char('f'), KeyModifiers::NONE, "f", "Toggle enabled-only filter"),
        }
    }
}

impl KeyMap {
    /// Bindings shown in the help overlay, including list and dialog keys
    pub fn help_lines(&self) -> Vec<(String, String)> {
        let mut lines: Vec<(String, String)> = [&self.help, &self.refresh, &self.filter, &self.quit, &self.force_quit]
            .iter()
            .map(|binding| (binding.label.to_string(), binding.description.to_string()))
            .collect();

        lines.extend(
            [
                ("↑/↓", "Move focus"),
                ("PgUp/PgDn", "Move focus by 5"),
                ("Home/End", "First / last job"),
                ("Enter", "Open job actions"),
                ("Esc", "Close the active overlay"),
            ]
            .iter()
            .map(|(keys, description)| (keys.to_string(), description.to_string())),
        );
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binding_matches_modifiers() {
        let keys = KeyMap::default();
        assert!(keys.force_quit.matches(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!keys.force_quit.matches(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE)));
        assert!(keys.help.matches(&KeyEvent::new(KeyCode::Char('?'), KeyModifiers::NONE)));
    }

    #[test]
    fn test_help_lines_cover_bindings() {
        let lines = KeyMap::default().help_lines();
        assert!(lines.iter().any(|(keys, _)| keys == "Esc"));
        assert!(lines.iter().any(|(keys, _)| keys == "f"));
    }
}
