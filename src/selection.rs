//! The slice of the document selection the balloon toolbar consumes.
//!
//! Geometry is handed out as shared `RangeGeometry` handles so a target
//! resolver can capture one and re-read fresh client rectangles every time
//! the balloon is attached.

use std::cell::RefCell;
use std::rc::Rc;

use ratatui::layout::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionDirection {
    Forward,
    Backward,
}

/// Payload of a selection `change:range` signal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RangeChange {
    /// True for user-initiated caret moves, false for model-driven changes.
    pub direct_change: bool,
}

impl RangeChange {
    pub const fn direct() -> Self {
        Self {
            direct_change: true,
        }
    }

    pub const fn indirect() -> Self {
        Self {
            direct_change: false,
        }
    }
}

pub trait RangeGeometry {
    /// Client rectangles of the range, one per visual line fragment.
    fn client_rects(&self) -> Vec<Rect>;
}

pub trait SelectionSource {
    fn direction(&self) -> SelectionDirection;

    fn is_collapsed(&self) -> bool;

    fn range_count(&self) -> usize;

    fn range_geometry(&self, index: usize) -> Option<Rc<dyn RangeGeometry>>;
}

/// A range whose rectangles can be replaced in place, e.g. after a reflow.
#[derive(Debug, Default)]
pub struct StaticRange {
    rects: RefCell<Vec<Rect>>,
}

impl StaticRange {
    pub fn new(rects: Vec<Rect>) -> Self {
        Self {
            rects: RefCell::new(rects),
        }
    }

    pub fn set_rects(&self, rects: Vec<Rect>) {
        *self.rects.borrow_mut() = rects;
    }
}

impl RangeGeometry for StaticRange {
    fn client_rects(&self) -> Vec<Rect> {
        self.rects.borrow().clone()
    }
}

/// In-memory selection used by hosts without a document model of their own.
#[derive(Debug, Clone)]
pub struct StaticSelection {
    ranges: Vec<Rc<StaticRange>>,
    direction: SelectionDirection,
    collapsed: bool,
}

impl StaticSelection {
    /// A forward, non-collapsed selection with one entry per range.
    pub fn new(ranges: Vec<Vec<Rect>>) -> Self {
        Self {
            ranges: ranges
                .into_iter()
                .map(|rects| Rc::new(StaticRange::new(rects)))
                .collect(),
            direction: SelectionDirection::Forward,
            collapsed: false,
        }
    }

    /// A caret with no extent.
    pub fn collapsed_at(caret: Rect) -> Self {
        let mut selection = Self::new(vec![vec![caret]]);
        selection.collapsed = true;
        selection
    }

    pub fn backward(mut self) -> Self {
        self.direction = SelectionDirection::Backward;
        self
    }

    pub fn set_direction(&mut self, direction: SelectionDirection) {
        self.direction = direction;
    }

    pub fn set_collapsed(&mut self, collapsed: bool) {
        self.collapsed = collapsed;
    }

    pub fn range(&self, index: usize) -> Option<&Rc<StaticRange>> {
        self.ranges.get(index)
    }
}

impl SelectionSource for StaticSelection {
    fn direction(&self) -> SelectionDirection {
        self.direction
    }

    fn is_collapsed(&self) -> bool {
        self.collapsed || self.ranges.is_empty()
    }

    fn range_count(&self) -> usize {
        self.ranges.len()
    }

    fn range_geometry(&self, index: usize) -> Option<Rc<dyn RangeGeometry>> {
        self.ranges
            .get(index)
            .map(|range| Rc::clone(range) as Rc<dyn RangeGeometry>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(y: u16) -> Rect {
        Rect {
            x: 1,
            y,
            width: 5,
            height: 1,
        }
    }

    #[test]
    fn geometry_handles_see_later_reflows() {
        let selection = StaticSelection::new(vec![vec![rect(1)]]);
        let geometry = selection.range_geometry(0).unwrap();
        selection.range(0).unwrap().set_rects(vec![rect(4)]);
        assert_eq!(geometry.client_rects(), vec![rect(4)]);
    }

    #[test]
    fn collapsed_and_empty_selections_are_collapsed() {
        assert!(StaticSelection::collapsed_at(rect(0)).is_collapsed());
        assert!(StaticSelection::new(Vec::new()).is_collapsed());
        let s = StaticSelection::new(vec![vec![rect(0)]]).backward();
        assert!(!s.is_collapsed());
        assert_eq!(s.direction(), SelectionDirection::Backward);
        assert_eq!(s.range_count(), 1);
    }
}
