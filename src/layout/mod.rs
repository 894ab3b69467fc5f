pub mod placement;

pub use placement::{Anchor, ArrowSide, BalloonPositioner, Placement, Side};

use ratatui::prelude::Rect;

/// Signed floating rectangle origin with unsigned size.
///
/// Balloon candidates computed for targets near the top or left edge of the
/// viewport may start at negative coordinates, so the origin is signed until
/// the rectangle is clipped for drawing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FloatRect {
    pub x: i32,
    pub y: i32,
    pub width: u16,
    pub height: u16,
}

impl FloatRect {
    pub const fn new(x: i32, y: i32, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    /// Whether the whole rectangle lies inside `bounds`.
    pub fn fits_within(&self, bounds: Rect) -> bool {
        self.x >= bounds.x as i32
            && self.y >= bounds.y as i32
            && self.right() <= bounds.x as i32 + bounds.width as i32
            && self.bottom() <= bounds.y as i32 + bounds.height as i32
    }

    /// Number of cells of this rectangle that overlap `bounds`.
    pub fn visible_area(&self, bounds: Rect) -> u32 {
        let x0 = self.x.max(bounds.x as i32);
        let y0 = self.y.max(bounds.y as i32);
        let x1 = self.right().min(bounds.x as i32 + bounds.width as i32);
        let y1 = self.bottom().min(bounds.y as i32 + bounds.height as i32);
        if x1 <= x0 || y1 <= y0 {
            return 0;
        }
        ((x1 - x0) * (y1 - y0)) as u32
    }

    /// Clip to `bounds`, returning `None` when nothing remains visible.
    pub fn clip(&self, bounds: Rect) -> Option<Rect> {
        let x0 = self.x.max(bounds.x as i32);
        let y0 = self.y.max(bounds.y as i32);
        let x1 = self.right().min(bounds.x as i32 + bounds.width as i32);
        let y1 = self.bottom().min(bounds.y as i32 + bounds.height as i32);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Rect {
            x: x0 as u16,
            y: y0 as u16,
            width: (x1 - x0) as u16,
            height: (y1 - y0) as u16,
        })
    }
}

impl From<Rect> for FloatRect {
    fn from(rect: Rect) -> Self {
        Self {
            x: rect.x as i32,
            y: rect.y as i32,
            width: rect.width,
            height: rect.height,
        }
    }
}

pub fn rect_contains(rect: Rect, column: u16, row: u16) -> bool {
    if rect.width == 0 || rect.height == 0 {
        return false;
    }
    let max_x = rect.x.saturating_add(rect.width);
    let max_y = rect.y.saturating_add(rect.height);
    column >= rect.x && column < max_x && row >= rect.y && row < max_y
}
