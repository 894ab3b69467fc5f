//! Key map for the editable, the balloon widgets and the demo shell.
//!
//! One key may serve several actions (Left moves the caret in the editable
//! and the selection in a focused toolbar). The component that owns focus
//! decides which action it asks about.

use std::fmt;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    CaretLeft,
    CaretRight,
    ExtendLeft,
    ExtendRight,
    ToggleFocus,
    OpenLinkForm,
    ToggleItemsEnabled,
    MoveLeft,
    MoveRight,
    MoveDown,
    Activate,
    Submit,
    Cancel,
    DeleteBack,
}

impl Action {
    pub fn describe(self) -> &'static str {
        match self {
            Action::Quit => "quit",
            Action::CaretLeft | Action::CaretRight => "move caret",
            Action::ExtendLeft | Action::ExtendRight => "extend selection",
            Action::ToggleFocus => "focus or blur the editable",
            Action::OpenLinkForm => "open link form",
            Action::ToggleItemsEnabled => "enable or disable toolbar items",
            Action::MoveLeft => "previous item",
            Action::MoveRight => "next item",
            Action::MoveDown => "open dropdown",
            Action::Activate => "activate",
            Action::Submit => "submit form",
            Action::Cancel => "close",
            Action::DeleteBack => "delete backwards",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyCombo {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

impl KeyCombo {
    pub const fn new(code: KeyCode, mods: KeyModifiers) -> Self {
        Self { code, mods }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub fn matches(&self, key: &KeyEvent) -> bool {
        key.code == self.code && key.modifiers == self.mods
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (flag, name) in [
            (KeyModifiers::CONTROL, "Ctrl+"),
            (KeyModifiers::ALT, "Alt+"),
            (KeyModifiers::SHIFT, "Shift+"),
        ] {
            if self.mods.contains(flag) {
                f.write_str(name)?;
            }
        }
        match self.code {
            KeyCode::Char(' ') => f.write_str("Space"),
            KeyCode::Char(c) => write!(f, "{}", c.to_ascii_uppercase()),
            other => write!(f, "{other:?}"),
        }
    }
}

const CTRL: KeyModifiers = KeyModifiers::CONTROL;
const SHIFT: KeyModifiers = KeyModifiers::SHIFT;

const DEFAULTS: &[(Action, KeyCombo)] = &[
    (Action::Quit, KeyCombo::new(KeyCode::Char('q'), CTRL)),
    (Action::CaretLeft, KeyCombo::plain(KeyCode::Left)),
    (Action::CaretRight, KeyCombo::plain(KeyCode::Right)),
    (Action::ExtendLeft, KeyCombo::new(KeyCode::Left, SHIFT)),
    (Action::ExtendRight, KeyCombo::new(KeyCode::Right, SHIFT)),
    (Action::ToggleFocus, KeyCombo::plain(KeyCode::Tab)),
    (Action::OpenLinkForm, KeyCombo::new(KeyCode::Char('k'), CTRL)),
    (Action::ToggleItemsEnabled, KeyCombo::new(KeyCode::Char('d'), CTRL)),
    (Action::MoveLeft, KeyCombo::plain(KeyCode::Left)),
    (Action::MoveRight, KeyCombo::plain(KeyCode::Right)),
    (Action::MoveDown, KeyCombo::plain(KeyCode::Down)),
    (Action::Activate, KeyCombo::plain(KeyCode::Enter)),
    (Action::Activate, KeyCombo::plain(KeyCode::Char(' '))),
    (Action::Submit, KeyCombo::plain(KeyCode::Enter)),
    (Action::Cancel, KeyCombo::plain(KeyCode::Esc)),
    (Action::DeleteBack, KeyCombo::plain(KeyCode::Backspace)),
];

/// Ordered action → key table. Earlier entries are listed first in help.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    bindings: Vec<(Action, KeyCombo)>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            bindings: DEFAULTS.to_vec(),
        }
    }
}

impl KeyBindings {
    pub fn empty() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    pub fn bind(&mut self, action: Action, combo: KeyCombo) {
        if !self.bindings.contains(&(action, combo)) {
            self.bindings.push((action, combo));
        }
    }

    /// Drop every key bound to `action`.
    pub fn unbind(&mut self, action: Action) {
        self.bindings.retain(|(a, _)| *a != action);
    }

    pub fn matches(&self, action: Action, key: &KeyEvent) -> bool {
        self.bindings
            .iter()
            .any(|(a, combo)| *a == action && combo.matches(key))
    }

    /// Display strings of every key bound to `action`.
    pub fn combos_for(&self, action: Action) -> Vec<String> {
        self.bindings
            .iter()
            .filter(|(a, _)| *a == action)
            .map(|(_, combo)| combo.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, mods: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, mods)
    }

    #[test]
    fn ctrl_q_quits() {
        let kb = KeyBindings::default();
        assert!(kb.matches(Action::Quit, &key(KeyCode::Char('q'), CTRL)));
        assert!(!kb.matches(Action::Quit, &key(KeyCode::Char('q'), KeyModifiers::NONE)));
    }

    #[test]
    fn shift_distinguishes_extend_from_caret_moves() {
        let kb = KeyBindings::default();
        let shifted = key(KeyCode::Left, SHIFT);
        assert!(kb.matches(Action::ExtendLeft, &shifted));
        assert!(!kb.matches(Action::CaretLeft, &shifted));
    }

    #[test]
    fn combos_are_displayed() {
        let kb = KeyBindings::default();
        assert_eq!(kb.combos_for(Action::OpenLinkForm), vec!["Ctrl+K"]);
        assert_eq!(kb.combos_for(Action::Activate), vec!["Enter", "Space"]);
        assert_eq!(kb.combos_for(Action::ExtendRight), vec!["Shift+Right"]);
    }

    #[test]
    fn rebinding_replaces_the_default() {
        let mut kb = KeyBindings::default();
        kb.unbind(Action::OpenLinkForm);
        kb.bind(Action::OpenLinkForm, KeyCombo::new(KeyCode::Char('l'), CTRL));
        kb.bind(Action::OpenLinkForm, KeyCombo::new(KeyCode::Char('l'), CTRL));
        assert_eq!(kb.combos_for(Action::OpenLinkForm), vec!["Ctrl+L"]);
        assert!(KeyBindings::empty().combos_for(Action::Quit).is_empty());
    }
}
