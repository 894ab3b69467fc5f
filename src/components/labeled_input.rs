//! Labeled text input used by balloon forms (e.g. the link form).

use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};

use crossterm::event::{Event, KeyCode, KeyModifiers};
use ratatui::layout::{Rect, Size};
use ratatui::style::Style;

use crate::components::{Component, ComponentContext};
use crate::keybindings::{Action, KeyBindings};
use crate::ui::UiFrame;

static NEXT_INPUT_ID: AtomicUsize = AtomicUsize::new(1);

fn unique_input_id() -> String {
    format!("input-{}", NEXT_INPUT_ID.fetch_add(1, Ordering::Relaxed))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelView {
    pub text: String,
    /// Id of the input this label describes.
    pub for_id: String,
}

#[derive(Debug, Clone)]
pub struct InputTextView {
    id: String,
    value: String,
    is_enabled: bool,
    is_focused: bool,
    caret: usize,
    /// Selected char range, if any.
    selection: Option<Range<usize>>,
}

impl InputTextView {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: String::new(),
            is_enabled: true,
            is_focused: false,
            caret: 0,
            selection: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.caret = self.value.chars().count();
        self.selection = None;
    }

    pub fn is_enabled(&self) -> bool {
        self.is_enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.is_enabled = enabled;
    }

    pub fn is_focused(&self) -> bool {
        self.is_focused
    }

    pub fn focus(&mut self) {
        self.is_focused = true;
    }

    pub fn blur(&mut self) {
        self.is_focused = false;
    }

    pub fn selection(&self) -> Option<Range<usize>> {
        self.selection.clone()
    }

    /// Select the whole value.
    pub fn select(&mut self) {
        let len = self.value.chars().count();
        self.selection = Some(0..len);
        self.caret = len;
    }

    pub fn selected_text(&self) -> Option<String> {
        let range = self.selection.clone()?;
        Some(
            self.value
                .chars()
                .skip(range.start)
                .take(range.len())
                .collect(),
        )
    }

    pub fn insert_char(&mut self, c: char) {
        self.delete_selection();
        let at = byte_index(&self.value, self.caret);
        self.value.insert(at, c);
        self.caret += 1;
    }

    pub fn delete_back(&mut self) {
        if self.delete_selection() || self.caret == 0 {
            return;
        }
        let at = byte_index(&self.value, self.caret - 1);
        self.value.remove(at);
        self.caret -= 1;
    }

    fn delete_selection(&mut self) -> bool {
        let Some(range) = self.selection.take() else {
            return false;
        };
        let start = byte_index(&self.value, range.start);
        let end = byte_index(&self.value, range.end);
        self.value.replace_range(start..end, "");
        self.caret = range.start;
        !range.is_empty()
    }
}

fn byte_index(value: &str, chars: usize) -> usize {
    value
        .char_indices()
        .nth(chars)
        .map_or(value.len(), |(i, _)| i)
}

impl Component for InputTextView {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, _ctx: &ComponentContext) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let base = Style::default()
            .fg(crate::theme::input_fg())
            .bg(crate::theme::input_bg(self.is_enabled));
        frame.set_string(
            area.x,
            area.y,
            &" ".repeat(area.width as usize),
            base,
        );
        for (i, c) in self.value.chars().enumerate() {
            let Some(x) = area.x.checked_add(i as u16) else {
                break;
            };
            if x >= area.x.saturating_add(area.width) {
                break;
            }
            let selected = self.selection.as_ref().is_some_and(|r| r.contains(&i));
            let style = if selected {
                base.patch(crate::theme::selection_style())
            } else {
                base
            };
            frame.set_string(x, area.y, &c.to_string(), style);
        }
        if self.is_focused && self.selection.is_none() {
            let x = area.x.saturating_add(self.caret as u16);
            if x < area.x.saturating_add(area.width) {
                frame.set_string(x, area.y, "▏", base);
            }
        }
    }

    fn handle_event(&mut self, event: &Event, _ctx: &ComponentContext) -> bool {
        if !self.is_focused || !self.is_enabled {
            return false;
        }
        let Event::Key(key) = event else {
            return false;
        };
        if KeyBindings::default().matches(Action::DeleteBack, key) {
            self.delete_back();
            return true;
        }
        match key.code {
            KeyCode::Char(c)
                if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT =>
            {
                self.insert_char(c);
                true
            }
            _ => false,
        }
    }

    fn preferred_size(&self) -> Size {
        Size::new(self.value.chars().count() as u16 + 1, 1)
    }
}

/// A label stacked above a text input, paired by the input's unique id.
#[derive(Debug, Clone)]
pub struct LabeledInputView {
    label: LabelView,
    input: InputTextView,
    is_enabled: bool,
}

impl LabeledInputView {
    pub fn new(label: impl Into<String>) -> Self {
        let id = unique_input_id();
        Self {
            label: LabelView {
                text: label.into(),
                for_id: id.clone(),
            },
            input: InputTextView::new(id),
            is_enabled: true,
        }
    }

    pub fn label(&self) -> &LabelView {
        &self.label
    }

    pub fn input(&self) -> &InputTextView {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputTextView {
        &mut self.input
    }

    pub fn set_label(&mut self, text: impl Into<String>) {
        self.label.text = text.into();
    }

    pub fn value(&self) -> &str {
        self.input.value()
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.input.set_value(value);
    }

    pub fn is_enabled(&self) -> bool {
        self.is_enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.is_enabled = enabled;
        self.input.set_enabled(enabled);
    }

    pub fn class_list(&self) -> Vec<&'static str> {
        if self.is_enabled {
            vec!["labeled-input"]
        } else {
            vec!["labeled-input", "disabled"]
        }
    }

    pub fn select(&mut self) {
        self.input.select();
    }

    pub fn focus(&mut self) {
        self.input.focus();
    }
}

impl Component for LabeledInputView {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        frame.set_string(
            area.x,
            area.y,
            &self.label.text,
            Style::default().fg(crate::theme::label_fg()),
        );
        if area.height < 2 {
            return;
        }
        let input_area = Rect {
            y: area.y + 1,
            height: 1,
            ..area
        };
        self.input.render(frame, input_area, ctx);
    }

    fn handle_event(&mut self, event: &Event, ctx: &ComponentContext) -> bool {
        self.input.handle_event(event, ctx)
    }

    fn preferred_size(&self) -> Size {
        let label = self.label.text.chars().count() as u16;
        let input = self.input.preferred_size().width;
        Size::new(label.max(input), 2)
    }
}
