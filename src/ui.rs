//! Clipped drawing surface.
//!
//! Balloons use signed coordinates and may hang partially off screen. Every
//! draw call goes through `UiFrame`, which drops whatever falls outside the
//! frame area instead of letting the buffer panic.

use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Position, Rect};
use ratatui::style::Style;
use ratatui::widgets::Widget;

use crate::layout::FloatRect;

pub struct UiFrame<'a> {
    area: Rect,
    buffer: &'a mut Buffer,
}

impl<'a> UiFrame<'a> {
    pub fn new(frame: &'a mut Frame<'_>) -> Self {
        let area = frame.area();
        Self::from_parts(area, frame.buffer_mut())
    }

    /// Draw into a bare buffer, e.g. in tests.
    pub fn from_parts(area: Rect, buffer: &'a mut Buffer) -> Self {
        Self { area, buffer }
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    /// Visible part of a signed rectangle.
    pub fn clip_float(&self, rect: FloatRect) -> Option<Rect> {
        rect.clip(self.area)
    }

    pub fn render_widget<W: Widget>(&mut self, widget: W, area: Rect) {
        let visible = area.intersection(self.area);
        if !visible.is_empty() {
            widget.render(visible, self.buffer);
        }
    }

    /// One symbol at signed coordinates, e.g. a balloon arrow.
    pub fn set_symbol(&mut self, x: i32, y: i32, symbol: &str, style: Style) {
        let (Ok(x), Ok(y)) = (u16::try_from(x), u16::try_from(y)) else {
            return;
        };
        if !self.area.contains(Position::new(x, y)) {
            return;
        }
        if let Some(cell) = self.buffer.cell_mut((x, y)) {
            cell.set_symbol(symbol).set_style(style);
        }
    }

    /// Text starting at `(x, y)`, cut at the right edge of the frame.
    pub fn set_string(&mut self, x: u16, y: u16, text: &str, style: Style) {
        if !self.area.contains(Position::new(x, y)) {
            return;
        }
        let room = usize::from(self.area.right() - x);
        self.buffer.set_stringn(x, y, text, room, style);
    }
}
