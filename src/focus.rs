//! Focus boundary over a set of registered elements.
//!
//! The tracker is "focused" while focus sits on any registered element.
//! Moving focus between two registered elements is not a boundary crossing,
//! so a toolbar grabbing focus from the editable does not hide itself.

use std::collections::BTreeSet;

#[derive(Debug, Clone)]
pub struct FocusTracker<R: Copy + Eq + Ord> {
    elements: BTreeSet<R>,
    focused: Option<R>,
}

impl<R: Copy + Eq + Ord + std::fmt::Debug> Default for FocusTracker<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Copy + Eq + Ord + std::fmt::Debug> FocusTracker<R> {
    pub fn new() -> Self {
        Self {
            elements: BTreeSet::new(),
            focused: None,
        }
    }

    pub fn add(&mut self, element: R) {
        self.elements.insert(element);
    }

    /// Unregister `element`; losing the focused element blurs the tracker.
    pub fn remove(&mut self, element: R) -> Option<bool> {
        self.elements.remove(&element);
        if self.focused == Some(element) {
            return self.set_focused(None);
        }
        None
    }

    pub fn is_focused(&self) -> bool {
        self.focused.is_some()
    }

    pub fn focused_element(&self) -> Option<R> {
        self.focused
    }

    /// Focus moved to `element`. Returns `Some(new_state)` when the boundary
    /// was crossed.
    pub fn focus(&mut self, element: R) -> Option<bool> {
        if self.elements.contains(&element) {
            self.set_focused(Some(element))
        } else {
            self.set_focused(None)
        }
    }

    /// `element` lost focus and nothing registered gained it.
    pub fn blur(&mut self, element: R) -> Option<bool> {
        if self.focused == Some(element) {
            self.set_focused(None)
        } else {
            None
        }
    }

    fn set_focused(&mut self, focused: Option<R>) -> Option<bool> {
        let was = self.focused.is_some();
        self.focused = focused;
        let now = self.focused.is_some();
        if was != now {
            tracing::trace!(focused = now, element = ?focused, "focus boundary crossed");
            Some(now)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    enum El {
        Editable,
        Toolbar,
        Elsewhere,
    }

    fn tracker() -> FocusTracker<El> {
        let mut t = FocusTracker::new();
        t.add(El::Editable);
        t.add(El::Toolbar);
        t
    }

    #[test]
    fn reports_only_boundary_crossings() {
        let mut t = tracker();
        assert!(!t.is_focused());
        assert_eq!(t.focus(El::Editable), Some(true));
        // Moving inside the boundary is silent.
        assert_eq!(t.focus(El::Toolbar), None);
        assert_eq!(t.focused_element(), Some(El::Toolbar));
        assert_eq!(t.focus(El::Elsewhere), Some(false));
        assert_eq!(t.focus(El::Elsewhere), None);
    }

    #[test]
    fn blur_of_unfocused_element_is_ignored() {
        let mut t = tracker();
        t.focus(El::Toolbar);
        assert_eq!(t.blur(El::Editable), None);
        assert_eq!(t.blur(El::Toolbar), Some(false));
    }

    #[test]
    fn removing_focused_element_blurs() {
        let mut t = tracker();
        t.focus(El::Editable);
        assert_eq!(t.remove(El::Editable), Some(false));
        assert_eq!(t.focus(El::Editable), None);
    }
}
