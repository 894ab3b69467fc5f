use ratatui::layout::{Rect, Size};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Clear};

use crate::layout::{FloatRect, Side};
use crate::position::{PanelPosition, PositionError, PositionSpec, Positioner};
use crate::ui::UiFrame;

/// Default balloon size in cells, borders included.
pub const DEFAULT_PANEL_SIZE: Size = Size {
    width: 24,
    height: 3,
};

/// The floating surface shared by every contextual feature.
///
/// The panel only knows *which* view it displays (`V` is a view id); the
/// application renders the view itself through the callback passed to
/// [`BalloonPanel::render`]. Mutation is reserved to the crate so the
/// multiplexer stays the single writer of content and position.
#[derive(Debug)]
pub struct BalloonPanel<V: Copy + Eq + std::fmt::Debug> {
    visible: bool,
    content: Option<V>,
    class_name: Option<String>,
    size: Size,
    position: Option<PanelPosition>,
    pinned: Option<PositionSpec>,
    attach_count: usize,
}

impl<V: Copy + Eq + std::fmt::Debug> Default for BalloonPanel<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Copy + Eq + std::fmt::Debug> BalloonPanel<V> {
    pub fn new() -> Self {
        Self {
            visible: false,
            content: None,
            class_name: None,
            size: DEFAULT_PANEL_SIZE,
            position: None,
            pinned: None,
            attach_count: 0,
        }
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn content(&self) -> Option<V> {
        self.content
    }

    pub fn class_name(&self) -> Option<&str> {
        self.class_name.as_deref()
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn position(&self) -> Option<PanelPosition> {
        self.position
    }

    pub fn rect(&self) -> Option<FloatRect> {
        self.position.map(|p| p.rect)
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned.is_some()
    }

    /// How many times the panel has been (re)positioned.
    pub fn attach_count(&self) -> usize {
        self.attach_count
    }

    pub(crate) fn set_content(&mut self, content: Option<V>) {
        self.content = content;
    }

    pub(crate) fn set_class_name(&mut self, class_name: Option<String>) {
        self.class_name = class_name;
    }

    pub(crate) fn set_size(&mut self, size: Size) {
        self.size = Size {
            width: size.width.max(3),
            height: size.height.max(3),
        };
    }

    /// Position the panel once and make it visible. On error the panel is
    /// left exactly as it was.
    pub(crate) fn attach_to(
        &mut self,
        spec: &PositionSpec,
        positioner: &dyn Positioner,
    ) -> Result<(), PositionError> {
        let position = positioner.position(self.size, spec)?;
        tracing::trace!(
            placement = %position.placement.name(),
            x = position.rect.x,
            y = position.rect.y,
            "balloon attached"
        );
        self.position = Some(position);
        self.attach_count += 1;
        self.visible = true;
        Ok(())
    }

    /// Attach and remember the spec so [`BalloonPanel::repin`] can follow
    /// the target when the layout changes.
    pub(crate) fn pin(
        &mut self,
        spec: PositionSpec,
        positioner: &dyn Positioner,
    ) -> Result<(), PositionError> {
        self.attach_to(&spec, positioner)?;
        self.pinned = Some(spec);
        Ok(())
    }

    pub(crate) fn repin(&mut self, positioner: &dyn Positioner) -> Result<(), PositionError> {
        match self.pinned.clone() {
            Some(spec) if self.visible => self.attach_to(&spec, positioner),
            _ => Ok(()),
        }
    }

    pub(crate) fn unpin(&mut self) {
        self.pinned = None;
    }

    pub(crate) fn hide(&mut self) {
        self.visible = false;
        self.unpin();
    }

    /// Draw the balloon chrome and hand the inner area to `render_content`.
    pub fn render<F>(&self, frame: &mut UiFrame<'_>, mut render_content: F)
    where
        F: FnMut(&mut UiFrame<'_>, V, Rect),
    {
        if !self.visible {
            return;
        }
        let (Some(position), Some(content)) = (self.position, self.content) else {
            return;
        };
        let Some(area) = frame.clip_float(position.rect) else {
            return;
        };
        frame.render_widget(Clear, area);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(
                Style::default().fg(crate::theme::balloon_border_for(self.class_name())),
            )
            .style(
                Style::default()
                    .bg(crate::theme::balloon_bg())
                    .fg(crate::theme::balloon_fg()),
            );
        let inner = block.inner(area);
        frame.render_widget(block, area);

        // The arrow sits on the border facing the target.
        let (arrow_y, glyph) = match position.placement.side {
            Side::South => (position.rect.y, "▲"),
            Side::North => (position.rect.bottom() - 1, "▼"),
        };
        let arrow_x = position
            .arrow_x
            .clamp(position.rect.x + 1, (position.rect.right() - 2).max(position.rect.x + 1));
        frame.set_symbol(
            arrow_x,
            arrow_y,
            glyph,
            Style::default().fg(crate::theme::balloon_arrow()),
        );

        if inner.width > 0 && inner.height > 0 {
            render_content(frame, content, inner);
        }
    }
}
