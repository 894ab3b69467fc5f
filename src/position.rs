//! Positioning contract between the balloon and whatever places it.
//!
//! A `PositionSpec` names a target (either a fixed rectangle or a resolver
//! evaluated every time the panel is attached) and an ordered list of
//! preferred placements. A `Positioner` turns a spec plus the panel size into
//! an absolute panel rectangle.

use std::fmt;
use std::rc::Rc;

use ratatui::layout::{Rect, Size};
use thiserror::Error;

use crate::layout::{FloatRect, Placement};

pub type TargetResolver = Rc<dyn Fn() -> Rect>;

#[derive(Clone)]
pub enum Target {
    Rect(Rect),
    /// Evaluated lazily so repositioning always sees fresh geometry.
    Resolver(TargetResolver),
}

impl Target {
    pub fn resolve(&self) -> Rect {
        match self {
            Target::Rect(rect) => *rect,
            Target::Resolver(resolve) => resolve(),
        }
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Rect(rect) => f.debug_tuple("Rect").field(rect).finish(),
            Target::Resolver(_) => f.write_str("Resolver(..)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PositionSpec {
    pub target: Target,
    pub positions: Vec<Placement>,
}

impl PositionSpec {
    pub fn at(rect: Rect) -> Self {
        Self {
            target: Target::Rect(rect),
            positions: Vec::new(),
        }
    }

    pub fn resolver(resolve: impl Fn() -> Rect + 'static) -> Self {
        Self {
            target: Target::Resolver(Rc::new(resolve)),
            positions: Vec::new(),
        }
    }

    pub fn with_positions(mut self, positions: impl Into<Vec<Placement>>) -> Self {
        self.positions = positions.into();
        self
    }

    /// Placements in preference order, falling back to `Placement::DEFAULTS`.
    pub fn placements(&self) -> &[Placement] {
        if self.positions.is_empty() {
            &Placement::DEFAULTS
        } else {
            &self.positions
        }
    }
}

/// Where a positioner decided to put the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelPosition {
    pub rect: FloatRect,
    pub placement: Placement,
    /// Column of the target the arrow points at.
    pub arrow_x: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionError {
    #[error("viewport {width}x{height} has no room for a balloon")]
    EmptyViewport { width: u16, height: u16 },
}

pub trait Positioner: fmt::Debug {
    fn position(&self, panel: Size, spec: &PositionSpec) -> Result<PanelPosition, PositionError>;

    fn set_viewport(&mut self, _viewport: Rect) {}
}
