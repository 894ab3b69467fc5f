//! Widgets hosted by the balloon: dropdowns and labeled inputs.
//!
//! The toolbar itself lives in [`crate::toolbar`]; it implements the same
//! [`Component`] trait so the balloon renders every view the same way.

use crossterm::event::Event;
use ratatui::layout::{Rect, Size};

use crate::ui::UiFrame;

pub mod dropdown;
pub mod labeled_input;

pub use dropdown::DropdownView;
pub use labeled_input::{InputTextView, LabelView, LabeledInputView};

pub use crate::component_context::ComponentContext;

pub trait Component {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext);

    /// Returns true when the event was consumed.
    fn handle_event(&mut self, _event: &Event, _ctx: &ComponentContext) -> bool {
        false
    }

    /// Cells wanted inside the balloon border; the host sizes the panel from it.
    fn preferred_size(&self) -> Size {
        Size::new(0, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    struct Spacer;

    impl Component for Spacer {
        fn render(&mut self, _frame: &mut UiFrame<'_>, _area: Rect, _ctx: &ComponentContext) {}
    }

    #[test]
    fn passive_widgets_ignore_input_and_take_one_row() {
        let mut spacer = Spacer;
        let key = Event::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        assert!(!spacer.handle_event(&key, &ComponentContext::new(true)));
        assert_eq!(spacer.preferred_size(), Size::new(0, 1));
    }
}
