use ratatui::layout::{Rect, Size};

use super::FloatRect;
use crate::position::{PanelPosition, PositionError, PositionSpec, Positioner};

/// Columns between the panel corner and an off-center arrow.
pub const ARROW_INSET: u16 = 2;

/// Which side of the target the panel is placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    North,
    South,
}

/// Which point of the target the arrow aims at horizontally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    Center,
    East,
    West,
}

/// Where the arrow sits along the panel edge facing the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrowSide {
    Center,
    East,
    West,
}

/// A named placement strategy for the balloon relative to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Placement {
    pub side: Side,
    pub anchor: Anchor,
    pub arrow: ArrowSide,
}

macro_rules! placements {
    ($($name:ident => ($side:ident, $anchor:ident, $arrow:ident)),* $(,)?) => {
        impl Placement {
            $(
                pub const $name: Placement = Placement::new(Side::$side, Anchor::$anchor, ArrowSide::$arrow);
            )*
        }
    };
}

placements! {
    SOUTH_ARROW_NORTH => (South, Center, Center),
    SOUTH_ARROW_NORTH_EAST => (South, Center, East),
    SOUTH_ARROW_NORTH_WEST => (South, Center, West),
    SOUTH_EAST_ARROW_NORTH => (South, East, Center),
    SOUTH_EAST_ARROW_NORTH_EAST => (South, East, East),
    SOUTH_EAST_ARROW_NORTH_WEST => (South, East, West),
    SOUTH_WEST_ARROW_NORTH => (South, West, Center),
    SOUTH_WEST_ARROW_NORTH_EAST => (South, West, East),
    SOUTH_WEST_ARROW_NORTH_WEST => (South, West, West),
    NORTH_ARROW_SOUTH => (North, Center, Center),
    NORTH_ARROW_SOUTH_EAST => (North, Center, East),
    NORTH_ARROW_SOUTH_WEST => (North, Center, West),
    NORTH_EAST_ARROW_SOUTH => (North, East, Center),
    NORTH_EAST_ARROW_SOUTH_EAST => (North, East, East),
    NORTH_EAST_ARROW_SOUTH_WEST => (North, East, West),
    NORTH_WEST_ARROW_SOUTH => (North, West, Center),
    NORTH_WEST_ARROW_SOUTH_EAST => (North, West, East),
    NORTH_WEST_ARROW_SOUTH_WEST => (North, West, West),
}

impl Placement {
    /// Used when a position spec names no placements of its own.
    pub const DEFAULTS: [Placement; 6] = [
        Placement::SOUTH_ARROW_NORTH,
        Placement::SOUTH_ARROW_NORTH_WEST,
        Placement::SOUTH_ARROW_NORTH_EAST,
        Placement::NORTH_ARROW_SOUTH,
        Placement::NORTH_ARROW_SOUTH_WEST,
        Placement::NORTH_ARROW_SOUTH_EAST,
    ];

    pub const fn new(side: Side, anchor: Anchor, arrow: ArrowSide) -> Self {
        Self {
            side,
            anchor,
            arrow,
        }
    }

    /// Human readable name, e.g. `south_east_arrow_north_west`.
    pub fn name(&self) -> String {
        let (side, pointing) = match self.side {
            Side::North => ("north", "south"),
            Side::South => ("south", "north"),
        };
        let anchor = match self.anchor {
            Anchor::Center => "",
            Anchor::East => "_east",
            Anchor::West => "_west",
        };
        let arrow = match self.arrow {
            ArrowSide::Center => "",
            ArrowSide::East => "_east",
            ArrowSide::West => "_west",
        };
        format!("{side}{anchor}_arrow_{pointing}{arrow}")
    }

    /// Column the arrow points at on the target.
    pub fn anchor_x(&self, target: Rect) -> i32 {
        let left = target.x as i32;
        match self.anchor {
            Anchor::Center => left + target.width as i32 / 2,
            Anchor::East => left + (target.width as i32 - 1).max(0),
            Anchor::West => left,
        }
    }

    /// Candidate panel rectangle for a panel of `size` around `target`.
    pub fn compute(&self, target: Rect, size: Size, gap: u16) -> FloatRect {
        let anchor = self.anchor_x(target);
        let width = size.width as i32;
        let x = match self.arrow {
            ArrowSide::Center => anchor - width / 2,
            ArrowSide::East => anchor - (width - 1 - ARROW_INSET as i32).max(0),
            ArrowSide::West => anchor - (ARROW_INSET as i32).min((width - 1).max(0)),
        };
        let y = match self.side {
            Side::South => target.y as i32 + target.height as i32 + gap as i32,
            Side::North => target.y as i32 - size.height as i32 - gap as i32,
        };
        FloatRect::new(x, y, size.width, size.height)
    }
}

/// First-fit positioner over the terminal viewport.
///
/// Placements are tried in order; the first candidate lying entirely inside
/// the viewport wins. When nothing fits, the candidate showing the most cells
/// wins, earliest first on ties.
#[derive(Debug, Clone)]
pub struct BalloonPositioner {
    viewport: Rect,
    gap: u16,
}

impl BalloonPositioner {
    pub fn new(viewport: Rect) -> Self {
        Self { viewport, gap: 0 }
    }

    pub fn with_gap(mut self, gap: u16) -> Self {
        self.gap = gap;
        self
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }
}

impl Positioner for BalloonPositioner {
    fn position(&self, panel: Size, spec: &PositionSpec) -> Result<PanelPosition, PositionError> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(PositionError::EmptyViewport {
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }
        let target = spec.target.resolve();
        let mut best: Option<(u32, PanelPosition)> = None;
        for placement in spec.placements() {
            let rect = placement.compute(target, panel, self.gap);
            let candidate = PanelPosition {
                rect,
                placement: *placement,
                arrow_x: placement.anchor_x(target),
            };
            if rect.fits_within(self.viewport) {
                tracing::trace!(placement = %placement.name(), "balloon placement fits");
                return Ok(candidate);
            }
            let area = rect.visible_area(self.viewport);
            if best.as_ref().is_none_or(|(best_area, _)| area > *best_area) {
                best = Some((area, candidate));
            }
        }
        match best {
            Some((_, position)) => Ok(position),
            // `placements()` never yields an empty slice.
            None => Err(PositionError::EmptyViewport {
                width: self.viewport.width,
                height: self.viewport.height,
            }),
        }
    }

    fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
    }
}
