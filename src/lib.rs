//! Contextual balloon panels for terminal rich-text editors.
//!
//! One floating [`panel::BalloonPanel`] is shared by every contextual
//! feature through the [`balloon::ContextualBalloon`] stack multiplexer. The
//! [`toolbar::BalloonToolbar`] decides, from debounced selection and focus
//! signals, when a toolbar should sit next to the selection.

pub mod balloon;
pub mod component_context;
pub mod components;
pub mod config;
pub mod debounce;
pub mod demo;
pub mod drivers;
pub mod error;
pub mod event_loop;
pub mod focus;
pub mod keybindings;
pub mod layout;
pub mod panel;
pub mod position;
pub mod selection;
pub mod theme;
pub mod toolbar;
pub mod tracing_sub;
pub mod ui;

pub use balloon::{ContextualBalloon, MAIN_STACK, StackEntry};
pub use error::BalloonError;
pub use position::{PositionSpec, Positioner};
