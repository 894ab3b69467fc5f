//! Error taxonomy for the balloon layer.
//!
//! Contract violations (`DuplicateView`, `ViewNotFound`, `StackNotFound`) are
//! raised synchronously and never retried. Positioning failures belong to the
//! positioner and are propagated untouched.

use thiserror::Error;

use crate::position::PositionError;

#[derive(Debug, Error)]
pub enum BalloonError {
    /// The view is already present in one of the balloon stacks.
    #[error("view {view} already exists in the balloon")]
    DuplicateView { view: String },

    /// The view is not present in any balloon stack.
    #[error("view {view} does not exist in the balloon")]
    ViewNotFound { view: String },

    /// The stack does not exist or holds no entries.
    #[error("stack {stack:?} does not exist or is empty")]
    StackNotFound { stack: String },

    #[error("positioning failed: {0}")]
    Position(#[from] PositionError),
}

impl BalloonError {
    pub(crate) fn duplicate_view<V: std::fmt::Debug>(view: V) -> Self {
        Self::DuplicateView {
            view: format!("{view:?}"),
        }
    }

    pub(crate) fn view_not_found<V: std::fmt::Debug>(view: V) -> Self {
        Self::ViewNotFound {
            view: format!("{view:?}"),
        }
    }

    pub(crate) fn stack_not_found(stack: &str) -> Self {
        Self::StackNotFound {
            stack: stack.to_string(),
        }
    }
}
