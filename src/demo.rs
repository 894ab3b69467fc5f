//! Single-line editor driving the balloon toolbar, used by the demo binary.
//!
//! The document is one row of text with a caret and an anchor. Every caret
//! move is a direct selection change; the toolbar and an optional link form
//! share the one balloon.

use std::ops::Range;
use std::time::Instant;

use crossterm::event::{Event, KeyEvent, MouseEvent};
use indoc::indoc;
use ratatui::layout::{Rect, Size};
use ratatui::style::{Modifier, Style};

use crate::balloon::{ContextualBalloon, StackEntry};
use crate::components::{Component, ComponentContext, LabeledInputView};
use crate::config::ToolbarConfig;
use crate::error::BalloonError;
use crate::event_loop::ControlFlow;
use crate::keybindings::{Action, KeyBindings};
use crate::layout::BalloonPositioner;
use crate::selection::{RangeChange, SelectionDirection, SelectionSource, StaticSelection};
use crate::toolbar::{BalloonToolbar, ToolbarEvent, ToolbarFocus, ToolbarItem, ToolbarView};
use crate::ui::UiFrame;

pub const HELP: &str = indoc! {"
    Shift+Left/Right select   Left/Right move caret   Tab focus / blur
    Ctrl+K link form   Esc close form   Ctrl+D toggle items   Ctrl+Q quit
"};

const DOC_ROW: u16 = 8;
const DOC_COLUMN: u16 = 2;
const LINK_FORM_WIDTH: u16 = 32;
const LINK_FORM_CLASS: &str = "link-form";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoView {
    Toolbar,
    LinkForm,
}

#[derive(Debug)]
pub struct DemoEditor {
    text: Vec<char>,
    caret: usize,
    anchor: usize,
    viewport: Rect,
    selection: StaticSelection,
    balloon: ContextualBalloon<DemoView>,
    toolbar: BalloonToolbar<DemoView>,
    link_form: LabeledInputView,
    form_focused: bool,
    bindings: KeyBindings,
    status: String,
}

impl DemoEditor {
    /// Editor over `text` with the editable focused and the caret at the start.
    pub fn new(text: &str, config: ToolbarConfig, viewport: Rect, now: Instant) -> Self {
        let items = ToolbarView::new(vec![
            ToolbarItem::button("bold", "B"),
            ToolbarItem::button("italic", "I"),
            ToolbarItem::button("underline", "U"),
            ToolbarItem::button("link", "Link"),
        ]);
        let mut editor = Self {
            text: text.chars().collect(),
            caret: 0,
            anchor: 0,
            viewport,
            selection: StaticSelection::collapsed_at(Rect::default()),
            balloon: ContextualBalloon::new(BalloonPositioner::new(viewport)),
            toolbar: BalloonToolbar::new(DemoView::Toolbar, items, config),
            link_form: LabeledInputView::new("Link URL"),
            form_focused: false,
            bindings: KeyBindings::default(),
            status: String::new(),
        };
        editor.sync_selection();
        editor.toolbar.focus(ToolbarFocus::Editable, now);
        editor
    }

    pub fn balloon(&self) -> &ContextualBalloon<DemoView> {
        &self.balloon
    }

    pub fn toolbar(&self) -> &BalloonToolbar<DemoView> {
        &self.toolbar
    }

    pub fn link_form(&self) -> &LabeledInputView {
        &self.link_form
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    pub fn selection(&self) -> &StaticSelection {
        &self.selection
    }

    pub fn selection_range(&self) -> Range<usize> {
        self.caret.min(self.anchor)..self.caret.max(self.anchor)
    }

    pub fn selected_text(&self) -> String {
        self.text[self.selection_range()].iter().collect()
    }

    pub fn editable_focused(&self) -> bool {
        self.toolbar.focused_element() == Some(ToolbarFocus::Editable)
    }

    pub fn is_form_open(&self) -> bool {
        self.balloon.has_view(DemoView::LinkForm)
    }

    /// When the host loop should call [`DemoEditor::tick`] next.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.toolbar.next_deadline()
    }

    pub fn handle_event(&mut self, event: &Event, now: Instant) -> Result<ControlFlow, BalloonError> {
        let flow = match event {
            Event::Key(key) => self.handle_key(key, now)?,
            Event::Mouse(mouse) => {
                self.handle_mouse(mouse, now)?;
                ControlFlow::Continue
            }
            Event::Resize(width, height) => {
                self.resize(Rect::new(0, 0, *width, *height))?;
                ControlFlow::Continue
            }
            _ => ControlFlow::Continue,
        };
        self.after_change()?;
        Ok(flow)
    }

    /// Let settled debounce stages act. Returns when to wake up next.
    pub fn tick(&mut self, now: Instant) -> Result<ControlFlow, BalloonError> {
        let events = self.toolbar.tick(now, &self.selection, &mut self.balloon)?;
        for event in events {
            if let ToolbarEvent::VisibilitySettled(decision) = event {
                tracing::trace!(?decision, "demo toolbar decision");
                self.status = format!("toolbar: {decision:?}");
            }
        }
        self.after_change()?;
        Ok(match self.toolbar.next_deadline() {
            Some(at) => ControlFlow::WakeAt(at),
            None => ControlFlow::Continue,
        })
    }

    pub fn resize(&mut self, viewport: Rect) -> Result<(), BalloonError> {
        self.viewport = viewport;
        self.sync_selection();
        self.balloon.set_viewport(viewport)
    }

    fn handle_key(&mut self, key: &KeyEvent, now: Instant) -> Result<ControlFlow, BalloonError> {
        if self.bindings.matches(Action::Quit, key) {
            return Ok(ControlFlow::Quit);
        }
        if self.form_focused {
            if self.bindings.matches(Action::Cancel, key) {
                self.close_link_form(now)?;
            } else if self.bindings.matches(Action::Submit, key) {
                self.submit_link_form(now)?;
            } else {
                let ctx = ComponentContext::new(true).with_balloon(true);
                self.link_form.handle_event(&Event::Key(*key), &ctx);
            }
            return Ok(ControlFlow::Continue);
        }

        if self.bindings.matches(Action::OpenLinkForm, key) {
            self.open_link_form(now)?;
        } else if self.bindings.matches(Action::ToggleItemsEnabled, key) {
            let enable = !self.toolbar.toolbar().has_actionable_items();
            self.toolbar.toolbar_mut().set_all_enabled(enable);
            self.status = format!("toolbar items enabled: {enable}");
        } else if self.bindings.matches(Action::ToggleFocus, key) {
            let focused = !self.editable_focused();
            self.toolbar.handle_focus_change(focused, now);
        } else if self.bindings.matches(Action::ExtendLeft, key) {
            self.move_caret(false, true, now)?;
        } else if self.bindings.matches(Action::ExtendRight, key) {
            self.move_caret(true, true, now)?;
        } else if self.bindings.matches(Action::CaretLeft, key) {
            self.move_caret(false, false, now)?;
        } else if self.bindings.matches(Action::CaretRight, key) {
            self.move_caret(true, false, now)?;
        }
        Ok(ControlFlow::Continue)
    }

    fn handle_mouse(&mut self, mouse: &MouseEvent, now: Instant) -> Result<(), BalloonError> {
        if self.balloon.visible_view() != Some(DemoView::Toolbar) {
            return Ok(());
        }
        let ctx = ComponentContext::default().with_balloon(true);
        let toolbar = self.toolbar.toolbar_mut();
        if !toolbar.handle_event(&Event::Mouse(*mouse), &ctx) {
            return Ok(());
        }
        match toolbar.take_activated().as_deref() {
            Some("link") => self.open_link_form(now),
            Some(item) => {
                self.status = format!("{item} applied to \"{}\"", self.selected_text());
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn move_caret(&mut self, forward: bool, extend: bool, now: Instant) -> Result<(), BalloonError> {
        let range = self.selection_range();
        let caret = if !extend && !range.is_empty() {
            // Plain arrows collapse a selection onto its edge.
            if forward { range.end } else { range.start }
        } else if forward {
            (self.caret + 1).min(self.text.len())
        } else {
            self.caret.saturating_sub(1)
        };
        self.caret = caret;
        if !extend {
            self.anchor = caret;
        }
        self.sync_selection();
        self.toolbar.handle_selection_change(
            RangeChange::direct(),
            &self.selection,
            &mut self.balloon,
            now,
        )
    }

    fn open_link_form(&mut self, now: Instant) -> Result<(), BalloonError> {
        if self.selection.is_collapsed() {
            self.status = "select some text first".to_string();
            return Ok(());
        }
        if self.is_form_open() {
            return Ok(());
        }
        let position = self.toolbar.position_spec(&self.selection);
        self.balloon.add(
            StackEntry::new(DemoView::LinkForm, position).with_class_name(LINK_FORM_CLASS),
        )?;
        self.link_form.set_value("");
        self.link_form.focus();
        self.form_focused = true;
        self.toolbar.blur(ToolbarFocus::Editable, now);
        Ok(())
    }

    fn close_link_form(&mut self, now: Instant) -> Result<(), BalloonError> {
        if self.is_form_open() {
            self.balloon.remove(DemoView::LinkForm)?;
        }
        self.link_form.input_mut().blur();
        self.form_focused = false;
        self.toolbar.focus(ToolbarFocus::Editable, now);
        Ok(())
    }

    fn submit_link_form(&mut self, now: Instant) -> Result<(), BalloonError> {
        let url = self.link_form.value().trim().to_string();
        if !url.is_empty() {
            self.status = format!("linked \"{}\" to {url}", self.selected_text());
        }
        self.close_link_form(now)
    }

    fn doc_origin(&self) -> (u16, u16) {
        let row = DOC_ROW.min(self.viewport.height.saturating_sub(2));
        (
            self.viewport.x.saturating_add(DOC_COLUMN),
            self.viewport.y.saturating_add(row),
        )
    }

    /// Mirror caret and anchor into the shared selection geometry, so lazy
    /// balloon targets see the new rectangle on their next resolve.
    fn sync_selection(&mut self) {
        let range = self.selection_range();
        let (x, y) = self.doc_origin();
        let rect = Rect {
            x: x.saturating_add(range.start as u16),
            y,
            width: range.len() as u16,
            height: 1,
        };
        if let Some(geometry) = self.selection.range(0) {
            geometry.set_rects(vec![rect]);
        }
        self.selection.set_collapsed(range.is_empty());
        self.selection.set_direction(if self.caret < self.anchor {
            SelectionDirection::Backward
        } else {
            SelectionDirection::Forward
        });
    }

    fn after_change(&mut self) -> Result<(), BalloonError> {
        let content = match self.balloon.visible_view() {
            Some(DemoView::Toolbar) => self.toolbar.toolbar().preferred_size(),
            Some(DemoView::LinkForm) => {
                let size = self.link_form.preferred_size();
                Size::new(size.width.max(LINK_FORM_WIDTH), size.height)
            }
            None => return Ok(()),
        };
        self.balloon.set_panel_size(Size::new(
            content.width.saturating_add(2),
            content.height.saturating_add(2),
        ))?;
        self.toolbar.handle_update(&self.selection, &mut self.balloon)
    }

    pub fn render(&mut self, frame: &mut UiFrame<'_>) {
        let area = frame.area();
        frame.set_string(
            area.x,
            area.y,
            "term-balloon",
            Style::default()
                .fg(crate::theme::balloon_fg())
                .add_modifier(Modifier::BOLD),
        );
        for (i, line) in HELP.lines().enumerate() {
            frame.set_string(
                area.x,
                area.y.saturating_add(1 + i as u16),
                line,
                Style::default().fg(crate::theme::label_fg()),
            );
        }

        let (x, y) = self.doc_origin();
        let range = self.selection_range();
        let show_caret = range.is_empty() && self.editable_focused();
        for (i, c) in self.text.iter().enumerate() {
            let style = if range.contains(&i) || (show_caret && i == self.caret) {
                crate::theme::selection_style()
            } else {
                Style::default()
            };
            frame.set_string(x.saturating_add(i as u16), y, &c.to_string(), style);
        }
        if show_caret && self.caret == self.text.len() {
            frame.set_string(
                x.saturating_add(self.caret as u16),
                y,
                " ",
                crate::theme::selection_style(),
            );
        }
        if area.height > 0 {
            frame.set_string(
                area.x,
                area.y + area.height - 1,
                &self.status,
                Style::default().fg(crate::theme::label_fg()),
            );
        }

        let Self {
            balloon,
            toolbar,
            link_form,
            form_focused,
            ..
        } = self;
        let ctx = ComponentContext::default().with_balloon(true);
        balloon.panel().render(frame, |frame, view, inner| match view {
            DemoView::Toolbar => toolbar.toolbar_mut().render(frame, inner, &ctx),
            DemoView::LinkForm => link_form.render(frame, inner, &ctx.with_focus(*form_focused)),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};
    use std::time::Duration;

    fn key(code: KeyCode, mods: KeyModifiers) -> Event {
        Event::Key(KeyEvent::new(code, mods))
    }

    fn editor(now: Instant) -> DemoEditor {
        DemoEditor::new(
            "balloons float",
            ToolbarConfig::default(),
            Rect::new(0, 0, 80, 24),
            now,
        )
    }

    #[test]
    fn shift_arrows_select_and_plain_arrows_collapse() {
        let t0 = Instant::now();
        let mut e = editor(t0);
        for _ in 0..3 {
            e.handle_event(&key(KeyCode::Right, KeyModifiers::SHIFT), t0)
                .unwrap();
        }
        assert_eq!(e.selected_text(), "bal");
        assert!(!e.selection().is_collapsed());
        e.handle_event(&key(KeyCode::Left, KeyModifiers::NONE), t0)
            .unwrap();
        assert_eq!(e.caret(), 0);
        assert!(e.selection().is_collapsed());
    }

    #[test]
    fn selecting_leftwards_is_backward() {
        let t0 = Instant::now();
        let mut e = editor(t0);
        e.handle_event(&key(KeyCode::Right, KeyModifiers::NONE), t0)
            .unwrap();
        e.handle_event(&key(KeyCode::Right, KeyModifiers::NONE), t0)
            .unwrap();
        e.handle_event(&key(KeyCode::Left, KeyModifiers::SHIFT), t0)
            .unwrap();
        assert_eq!(e.selection().direction(), SelectionDirection::Backward);
        assert_eq!(e.selected_text(), "a");
    }

    #[test]
    fn toolbar_appears_after_both_windows_settle() {
        let t0 = Instant::now();
        let mut e = editor(t0);
        e.handle_event(&key(KeyCode::Right, KeyModifiers::SHIFT), t0)
            .unwrap();
        e.tick(t0 + Duration::from_millis(200)).unwrap();
        assert_eq!(e.balloon().visible_view(), None);
        let flow = e.tick(t0 + Duration::from_millis(400)).unwrap();
        assert_eq!(e.balloon().visible_view(), Some(DemoView::Toolbar));
        assert_eq!(flow, ControlFlow::Continue);
        assert_eq!(e.status(), "toolbar: Show");
    }

    #[test]
    fn quit_is_reported() {
        let t0 = Instant::now();
        let mut e = editor(t0);
        let flow = e
            .handle_event(&key(KeyCode::Char('q'), KeyModifiers::CONTROL), t0)
            .unwrap();
        assert_eq!(flow, ControlFlow::Quit);
    }
}
