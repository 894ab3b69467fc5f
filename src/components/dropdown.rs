use crossterm::event::{Event, KeyEvent, MouseButton, MouseEventKind};
use ratatui::layout::{Rect, Size};
use ratatui::style::Style;

use crate::components::{Component, ComponentContext};
use crate::focus::FocusTracker;
use crate::keybindings::{Action, KeyBindings};
use crate::layout::rect_contains;
use crate::ui::UiFrame;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DropdownPart {
    Button,
    Panel,
}

/// A button that toggles a panel of items beneath it.
///
/// The panel is visible exactly while the dropdown is open.
#[derive(Debug, Clone)]
pub struct DropdownView {
    label: String,
    items: Vec<String>,
    selected: usize,
    is_open: bool,
    is_enabled: bool,
    with_text: bool,
    focus: FocusTracker<DropdownPart>,
    button_rect: Rect,
}

impl DropdownView {
    pub fn new(label: impl Into<String>, items: Vec<String>) -> Self {
        let mut focus = FocusTracker::new();
        focus.add(DropdownPart::Button);
        focus.add(DropdownPart::Panel);
        Self {
            label: label.into(),
            items,
            selected: 0,
            is_open: false,
            is_enabled: true,
            with_text: false,
            focus,
            button_rect: Rect::default(),
        }
    }

    /// Render the button label instead of an icon-only button.
    pub fn with_text(mut self, with_text: bool) -> Self {
        self.with_text = with_text;
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn selected_item(&self) -> Option<&str> {
        self.items.get(self.selected).map(String::as_str)
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn set_open(&mut self, open: bool) {
        if self.is_open != open {
            tracing::trace!(label = %self.label, open, "dropdown toggled");
        }
        self.is_open = open;
    }

    pub fn is_enabled(&self) -> bool {
        self.is_enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.is_enabled = enabled;
    }

    pub fn has_text(&self) -> bool {
        self.with_text
    }

    pub fn panel_visible(&self) -> bool {
        self.is_open
    }

    pub fn class_list(&self) -> Vec<&'static str> {
        let mut classes = vec!["dropdown"];
        if !self.is_enabled {
            classes.push("disabled");
        }
        if self.with_text {
            classes.push("dropdown-with-text");
        }
        classes
    }

    pub fn focus(&mut self) {
        self.focus.focus(DropdownPart::Button);
    }

    pub fn focused_part(&self) -> Option<DropdownPart> {
        self.focus.focused_element()
    }

    /// The button was pressed.
    pub fn execute(&mut self) {
        if self.is_enabled {
            self.set_open(!self.is_open);
        }
    }

    /// Dropdown keystrokes. Returns true when the key was consumed.
    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        let kb = KeyBindings::default();
        if kb.matches(Action::MoveDown, key) {
            if self.is_enabled && !self.is_open {
                self.set_open(true);
                return true;
            }
            false
        } else if kb.matches(Action::MoveRight, key) {
            // Nested dropdowns are not supported, so swallow the key while open.
            self.is_open
        } else if kb.matches(Action::MoveLeft, key) || kb.matches(Action::Cancel, key) {
            self.close_to_button()
        } else {
            false
        }
    }

    fn close_to_button(&mut self) -> bool {
        if !self.is_open {
            return false;
        }
        self.focus();
        self.set_open(false);
        true
    }

    fn button_text(&self) -> String {
        if self.with_text {
            format!(" {} ▾ ", self.label)
        } else {
            " ▾ ".to_string()
        }
    }
}

impl Component for DropdownView {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let text = self.button_text();
        self.button_rect = Rect {
            x: area.x,
            y: area.y,
            width: (text.chars().count() as u16).min(area.width),
            height: 1,
        };
        frame.set_string(
            area.x,
            area.y,
            &text,
            crate::theme::item_style(self.is_enabled, ctx.focused() && !self.is_open),
        );
        if !self.panel_visible() {
            return;
        }
        for (i, item) in self.items.iter().enumerate() {
            let row = area.y.saturating_add(1 + i as u16);
            if row >= area.y.saturating_add(area.height) {
                break;
            }
            let style = if i == self.selected {
                crate::theme::selection_style()
            } else {
                Style::default().fg(crate::theme::balloon_fg())
            };
            frame.set_string(area.x, row, &format!(" {item} "), style);
        }
    }

    fn handle_event(&mut self, event: &Event, ctx: &ComponentContext) -> bool {
        match event {
            Event::Key(key) if ctx.focused() => {
                if self.handle_key(key) {
                    return true;
                }
                if KeyBindings::default().matches(Action::Activate, key) && self.is_enabled {
                    self.execute();
                    return true;
                }
                false
            }
            Event::Mouse(mouse)
                if matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left))
                    && rect_contains(self.button_rect, mouse.column, mouse.row) =>
            {
                self.focus();
                self.execute();
                true
            }
            _ => false,
        }
    }

    fn preferred_size(&self) -> Size {
        let button = self.button_text().chars().count() as u16;
        let widest = self
            .items
            .iter()
            .map(|item| item.chars().count() as u16 + 2)
            .max()
            .unwrap_or(0);
        let height = if self.is_open {
            1 + self.items.len() as u16
        } else {
            1
        };
        Size::new(button.max(widest), height)
    }
}
