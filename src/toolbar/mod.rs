//! Toolbar items and the balloon toolbar built on top of them.

use crossterm::event::{Event, MouseButton, MouseEventKind};
use ratatui::layout::{Rect, Size};

use crate::components::{Component, ComponentContext};
use crate::keybindings::{Action, KeyBindings};
use crate::layout::rect_contains;
use crate::ui::UiFrame;

pub mod balloon_toolbar;

pub use balloon_toolbar::{
    BalloonToolbar, Decision, ShowEvent, ToolbarEvent, ToolbarFocus, VisibilityState,
    resolve_selection_rect,
};

/// Whether an item takes part in enablement.
///
/// `Opaque` items (separators with behaviour, custom widgets) have no notion
/// of being disabled and always count as actionable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemCapability {
    Enableable(bool),
    Opaque,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolbarItem {
    pub id: String,
    pub label: String,
    pub capability: ItemCapability,
}

impl ToolbarItem {
    pub fn button(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            capability: ItemCapability::Enableable(true),
        }
    }

    pub fn opaque(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            capability: ItemCapability::Opaque,
        }
    }

    pub fn is_actionable(&self) -> bool {
        match self.capability {
            ItemCapability::Enableable(enabled) => enabled,
            ItemCapability::Opaque => true,
        }
    }

    fn cell_width(&self) -> u16 {
        // One column of padding on each side.
        (self.label.chars().count() as u16).saturating_add(2)
    }
}

/// A horizontal row of items rendered inside the balloon.
#[derive(Debug, Clone, Default)]
pub struct ToolbarView {
    items: Vec<ToolbarItem>,
    selected: usize,
    activated: Option<String>,
    item_rects: Vec<Rect>,
}

impl ToolbarView {
    pub fn new(items: Vec<ToolbarItem>) -> Self {
        Self {
            items,
            ..Self::default()
        }
    }

    pub fn items(&self) -> &[ToolbarItem] {
        &self.items
    }

    pub fn item(&self, id: &str) -> Option<&ToolbarItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn push(&mut self, item: ToolbarItem) {
        self.items.push(item);
    }

    /// Returns false when `id` is unknown or the item is opaque.
    pub fn set_enabled(&mut self, id: &str, enabled: bool) -> bool {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => match &mut item.capability {
                ItemCapability::Enableable(flag) => {
                    *flag = enabled;
                    true
                }
                ItemCapability::Opaque => false,
            },
            None => false,
        }
    }

    pub fn set_all_enabled(&mut self, enabled: bool) {
        for item in &mut self.items {
            if let ItemCapability::Enableable(flag) = &mut item.capability {
                *flag = enabled;
            }
        }
    }

    /// At least one item can be acted upon. An empty toolbar has none.
    pub fn has_actionable_items(&self) -> bool {
        self.items.iter().any(ToolbarItem::is_actionable)
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn move_selection(&mut self, delta: isize) {
        if self.items.is_empty() {
            self.selected = 0;
            return;
        }
        if delta.is_negative() {
            self.selected = self.selected.saturating_sub(delta.unsigned_abs());
        } else {
            self.selected = (self.selected + delta as usize).min(self.items.len() - 1);
        }
    }

    /// The id of the last activated item, consumed by the caller.
    pub fn take_activated(&mut self) -> Option<String> {
        self.activated.take()
    }

    fn activate(&mut self, index: usize) -> bool {
        match self.items.get(index) {
            Some(item) if item.is_actionable() => {
                tracing::debug!(item = %item.id, "toolbar item activated");
                self.activated = Some(item.id.clone());
                self.selected = index;
                true
            }
            _ => false,
        }
    }
}

impl Component for ToolbarView {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext) {
        self.item_rects.clear();
        let mut x = area.x;
        let right = area.x.saturating_add(area.width);
        for (i, item) in self.items.iter().enumerate() {
            if x >= right {
                break;
            }
            let width = item.cell_width().min(right - x);
            let style =
                crate::theme::item_style(item.is_actionable(), ctx.focused() && i == self.selected);
            frame.set_string(x, area.y, &format!(" {} ", item.label), style);
            self.item_rects.push(Rect {
                x,
                y: area.y,
                width,
                height: 1,
            });
            x = x.saturating_add(width);
        }
    }

    fn handle_event(&mut self, event: &Event, ctx: &ComponentContext) -> bool {
        match event {
            Event::Key(key) if ctx.focused() => {
                let kb = KeyBindings::default();
                if kb.matches(Action::MoveLeft, key) {
                    self.move_selection(-1);
                    true
                } else if kb.matches(Action::MoveRight, key) {
                    self.move_selection(1);
                    true
                } else if kb.matches(Action::Activate, key) {
                    self.activate(self.selected)
                } else {
                    false
                }
            }
            Event::Mouse(mouse) if matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left)) => {
                let hit = self
                    .item_rects
                    .iter()
                    .position(|rect| rect_contains(*rect, mouse.column, mouse.row));
                match hit {
                    Some(index) => self.activate(index),
                    None => false,
                }
            }
            _ => false,
        }
    }

    fn preferred_size(&self) -> Size {
        let width = self
            .items
            .iter()
            .map(ToolbarItem::cell_width)
            .fold(0u16, u16::saturating_add);
        Size::new(width, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent};
    use ratatui::buffer::Buffer;

    fn toolbar() -> ToolbarView {
        ToolbarView::new(vec![
            ToolbarItem::button("bold", "B"),
            ToolbarItem::button("italic", "I"),
            ToolbarItem::button("link", "Link"),
        ])
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn all_disabled_means_nothing_actionable() {
        let mut t = toolbar();
        assert!(t.has_actionable_items());
        t.set_all_enabled(false);
        assert!(!t.has_actionable_items());
        assert!(t.set_enabled("link", true));
        assert!(t.has_actionable_items());
    }

    #[test]
    fn opaque_item_keeps_toolbar_actionable() {
        let mut t = toolbar();
        t.set_all_enabled(false);
        t.push(ToolbarItem::opaque("custom", "~"));
        assert!(t.has_actionable_items());
        assert!(!t.set_enabled("custom", false));
        assert!(t.has_actionable_items());
    }

    #[test]
    fn empty_toolbar_is_not_actionable() {
        assert!(!ToolbarView::default().has_actionable_items());
    }

    #[test]
    fn keyboard_moves_and_activates_only_when_focused() {
        let mut t = toolbar();
        let focused = ComponentContext::new(true);
        assert!(!t.handle_event(&key(KeyCode::Right), &ComponentContext::default()));
        assert!(t.handle_event(&key(KeyCode::Right), &focused));
        assert!(t.handle_event(&key(KeyCode::Enter), &focused));
        assert_eq!(t.take_activated().as_deref(), Some("italic"));
        assert_eq!(t.take_activated(), None);
    }

    #[test]
    fn disabled_items_cannot_be_activated() {
        let mut t = toolbar();
        t.set_enabled("bold", false);
        assert!(!t.handle_event(&key(KeyCode::Enter), &ComponentContext::new(true)));
        assert_eq!(t.take_activated(), None);
    }

    #[test]
    fn click_activates_the_item_under_the_cursor() {
        let mut t = toolbar();
        let area = Rect {
            x: 0,
            y: 0,
            width: 20,
            height: 1,
        };
        let mut buf = Buffer::empty(area);
        {
            let mut ui = UiFrame::from_parts(area, &mut buf);
            t.render(&mut ui, area, &ComponentContext::default());
        }
        assert_eq!(buf.cell((1, 0)).unwrap().symbol(), "B");
        let click = Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 7,
            row: 0,
            modifiers: KeyModifiers::NONE,
        });
        assert!(t.handle_event(&click, &ComponentContext::default()));
        assert_eq!(t.take_activated().as_deref(), Some("link"));
    }

    #[test]
    fn preferred_size_pads_every_label() {
        assert_eq!(toolbar().preferred_size(), Size::new(3 + 3 + 6, 1));
    }
}
