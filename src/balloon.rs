//! Contextual balloon: many logical views multiplexed onto one floating panel.
//!
//! Every feature that wants "its own" balloon adds a [`StackEntry`] to a
//! named stack. Exactly one entry, the top of the active stack, is rendered
//! in the shared [`BalloonPanel`]. Removing the visible entry promotes the
//! next one; emptying every stack hides the panel.
//!
//! Stack activation order:
//! - When nothing is visible, the stack receiving an `add` becomes active.
//! - Adding to a stack that is not active never moves the panel.
//! - When the active stack runs empty, the most recently activated non-empty
//!   stack takes over, then any non-empty stack in creation order.
//! - `show_stack`, `show_next_stack` and `show_prev_stack` activate a stack
//!   explicitly.

use ratatui::layout::{Rect, Size};

use crate::error::BalloonError;
use crate::panel::BalloonPanel;
use crate::position::{PositionSpec, Positioner};

pub const MAIN_STACK: &str = "main";

#[derive(Debug, Clone)]
pub struct StackEntry<V> {
    pub view: V,
    pub position: PositionSpec,
    pub class_name: Option<String>,
    /// Adding this entry clears every other entry first.
    pub single_view_mode: bool,
}

impl<V> StackEntry<V> {
    pub fn new(view: V, position: PositionSpec) -> Self {
        Self {
            view,
            position,
            class_name: None,
            single_view_mode: false,
        }
    }

    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn single_view(mut self) -> Self {
        self.single_view_mode = true;
        self
    }
}

#[derive(Debug)]
struct Stack<V> {
    id: String,
    entries: Vec<StackEntry<V>>,
}

#[derive(Debug)]
pub struct ContextualBalloon<V: Copy + Eq + std::fmt::Debug> {
    panel: BalloonPanel<V>,
    positioner: Box<dyn Positioner>,
    /// Creation order; the main stack always exists at index 0.
    stacks: Vec<Stack<V>>,
    active: String,
    activation_history: Vec<String>,
}

impl<V: Copy + Eq + std::fmt::Debug> ContextualBalloon<V> {
    pub fn new(positioner: impl Positioner + 'static) -> Self {
        Self {
            panel: BalloonPanel::new(),
            positioner: Box::new(positioner),
            stacks: vec![Stack {
                id: MAIN_STACK.to_string(),
                entries: Vec::new(),
            }],
            active: MAIN_STACK.to_string(),
            activation_history: vec![MAIN_STACK.to_string()],
        }
    }

    pub fn panel(&self) -> &BalloonPanel<V> {
        &self.panel
    }

    pub fn active_stack(&self) -> &str {
        &self.active
    }

    pub fn stack_len(&self, stack_id: &str) -> usize {
        self.stack(stack_id).map_or(0, |s| s.entries.len())
    }

    pub fn has_view(&self, view: V) -> bool {
        self.locate(view).is_some()
    }

    /// The view currently rendered in the panel, if any.
    pub fn visible_view(&self) -> Option<V> {
        self.panel.content()
    }

    pub fn visible_entry(&self) -> Option<&StackEntry<V>> {
        let view = self.panel.content()?;
        let (si, ei) = self.locate(view)?;
        Some(&self.stacks[si].entries[ei])
    }

    /// Add `entry` on top of the main stack.
    pub fn add(&mut self, entry: StackEntry<V>) -> Result<(), BalloonError> {
        self.add_to(entry, MAIN_STACK)
    }

    /// Add `entry` on top of `stack_id`, creating the stack when needed.
    ///
    /// On error nothing changes.
    pub fn add_to(&mut self, entry: StackEntry<V>, stack_id: &str) -> Result<(), BalloonError> {
        if self.has_view(entry.view) {
            return Err(BalloonError::duplicate_view(entry.view));
        }
        let activate =
            entry.single_view_mode || self.panel.content().is_none() || stack_id == self.active;
        if activate {
            // Position first so a positioner failure leaves the stacks intact.
            self.panel
                .pin(entry.position.clone(), self.positioner.as_ref())?;
        }
        if entry.single_view_mode {
            for stack in &mut self.stacks {
                stack.entries.clear();
            }
        }
        tracing::debug!(view = ?entry.view, stack = %stack_id, visible = activate, "balloon add");
        let view = entry.view;
        let class_name = entry.class_name.clone();
        self.stack_mut_or_insert(stack_id).entries.push(entry);
        if activate {
            self.mark_active(stack_id);
            self.panel.set_content(Some(view));
            self.panel.set_class_name(class_name);
        }
        Ok(())
    }

    /// Remove `view` from whichever stack holds it.
    ///
    /// Removing an entry that is not visible leaves the panel untouched.
    pub fn remove(&mut self, view: V) -> Result<(), BalloonError> {
        let (si, ei) = self
            .locate(view)
            .ok_or_else(|| BalloonError::view_not_found(view))?;
        let was_visible = self.panel.content() == Some(view);
        self.stacks[si].entries.remove(ei);
        tracing::debug!(view = ?view, stack = %self.stacks[si].id, was_visible, "balloon remove");
        if was_visible {
            self.show_after_removal()?;
        }
        Ok(())
    }

    /// Remove every entry of `stack_id`, or of all stacks when `None`.
    pub fn clear(&mut self, stack_id: Option<&str>) -> Result<(), BalloonError> {
        let touches_visible = match stack_id {
            None => {
                for stack in &mut self.stacks {
                    stack.entries.clear();
                }
                true
            }
            Some(id) => {
                let stack = self
                    .stacks
                    .iter_mut()
                    .find(|s| s.id == id)
                    .ok_or_else(|| BalloonError::stack_not_found(id))?;
                stack.entries.clear();
                id == self.active
            }
        };
        tracing::debug!(stack = ?stack_id, "balloon clear");
        if touches_visible {
            self.show_after_removal()?;
        }
        Ok(())
    }

    /// Re-run the positioner for the visible entry.
    ///
    /// A new `position` replaces the stored one so later implicit
    /// re-attachments reuse it. No-op when nothing is visible.
    pub fn update_position(&mut self, position: Option<PositionSpec>) -> Result<(), BalloonError> {
        let Some(view) = self.panel.content() else {
            return Ok(());
        };
        let Some((si, ei)) = self.locate(view) else {
            return Ok(());
        };
        if let Some(position) = position {
            self.stacks[si].entries[ei].position = position;
        }
        let spec = self.stacks[si].entries[ei].position.clone();
        self.panel.pin(spec, self.positioner.as_ref())?;
        Ok(())
    }

    /// Make `stack_id` the active stack and show its top entry.
    pub fn show_stack(&mut self, stack_id: &str) -> Result<(), BalloonError> {
        if self.stack_len(stack_id) == 0 {
            return Err(BalloonError::stack_not_found(stack_id));
        }
        if stack_id == self.active && self.panel.content().is_some() {
            return Ok(());
        }
        tracing::debug!(from = %self.active, to = %stack_id, "balloon switch stack");
        self.show_top_of(stack_id)
    }

    pub fn show_next_stack(&mut self) -> Result<(), BalloonError> {
        self.rotate_stack(true)
    }

    pub fn show_prev_stack(&mut self) -> Result<(), BalloonError> {
        self.rotate_stack(false)
    }

    /// Resize the panel and follow the visible entry.
    pub fn set_panel_size(&mut self, size: Size) -> Result<(), BalloonError> {
        if self.panel.size() == size {
            return Ok(());
        }
        self.panel.set_size(size);
        self.repin()
    }

    /// Inform the positioner of a new viewport and follow the visible entry.
    pub fn set_viewport(&mut self, viewport: Rect) -> Result<(), BalloonError> {
        self.positioner.set_viewport(viewport);
        self.repin()
    }

    /// Re-evaluate the pinned target (lazy targets see fresh geometry).
    pub fn repin(&mut self) -> Result<(), BalloonError> {
        self.panel.repin(self.positioner.as_ref())?;
        Ok(())
    }

    fn rotate_stack(&mut self, forward: bool) -> Result<(), BalloonError> {
        let candidates: Vec<String> = self
            .stacks
            .iter()
            .filter(|s| !s.entries.is_empty())
            .map(|s| s.id.clone())
            .collect();
        if candidates.is_empty() {
            return Ok(());
        }
        let current = candidates.iter().position(|id| *id == self.active);
        let next = match (current, forward) {
            (Some(i), true) => (i + 1) % candidates.len(),
            (Some(i), false) => (i + candidates.len() - 1) % candidates.len(),
            (None, _) => 0,
        };
        let next = candidates[next].clone();
        self.show_stack(&next)
    }

    fn show_after_removal(&mut self) -> Result<(), BalloonError> {
        if self.stack_len(&self.active) > 0 {
            let active = self.active.clone();
            return self.show_top_of(&active);
        }
        match self.fallback_stack() {
            Some(id) => {
                tracing::debug!(from = %self.active, to = %id, "balloon fall back to stack");
                self.show_top_of(&id)
            }
            None => {
                tracing::debug!("balloon empty, hiding panel");
                self.panel.hide();
                self.panel.set_content(None);
                self.panel.set_class_name(None);
                Ok(())
            }
        }
    }

    /// Swap the panel straight to the top of `stack_id`, never passing
    /// through an empty panel.
    fn show_top_of(&mut self, stack_id: &str) -> Result<(), BalloonError> {
        let Some(top) = self.stack(stack_id).and_then(|s| s.entries.last()) else {
            return Err(BalloonError::stack_not_found(stack_id));
        };
        let view = top.view;
        let class_name = top.class_name.clone();
        let spec = top.position.clone();
        if let Err(err) = self.panel.pin(spec, self.positioner.as_ref()) {
            self.panel.hide();
            self.panel.set_content(None);
            self.panel.set_class_name(None);
            return Err(err.into());
        }
        self.mark_active(stack_id);
        self.panel.set_content(Some(view));
        self.panel.set_class_name(class_name);
        Ok(())
    }

    fn fallback_stack(&self) -> Option<String> {
        self.activation_history
            .iter()
            .rev()
            .find(|id| self.stack_len(id) > 0)
            .cloned()
            .or_else(|| {
                self.stacks
                    .iter()
                    .find(|s| !s.entries.is_empty())
                    .map(|s| s.id.clone())
            })
    }

    fn mark_active(&mut self, stack_id: &str) {
        self.active = stack_id.to_string();
        self.activation_history.retain(|id| id != stack_id);
        self.activation_history.push(stack_id.to_string());
    }

    fn locate(&self, view: V) -> Option<(usize, usize)> {
        self.stacks.iter().enumerate().find_map(|(si, stack)| {
            stack
                .entries
                .iter()
                .position(|e| e.view == view)
                .map(|ei| (si, ei))
        })
    }

    fn stack(&self, stack_id: &str) -> Option<&Stack<V>> {
        self.stacks.iter().find(|s| s.id == stack_id)
    }

    fn stack_mut_or_insert(&mut self, stack_id: &str) -> &mut Stack<V> {
        let index = match self.stacks.iter().position(|s| s.id == stack_id) {
            Some(index) => index,
            None => {
                self.stacks.push(Stack {
                    id: stack_id.to_string(),
                    entries: Vec::new(),
                });
                self.stacks.len() - 1
            }
        };
        &mut self.stacks[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::BalloonPositioner;
    use crate::position::{PanelPosition, PositionError};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    /// Delegates to the real positioner and records every target it saw.
    #[derive(Debug, Clone, Default)]
    struct Recorder {
        calls: Rc<Cell<usize>>,
        targets: Rc<RefCell<Vec<Rect>>>,
    }

    impl Positioner for Recorder {
        fn position(
            &self,
            panel: Size,
            spec: &PositionSpec,
        ) -> Result<PanelPosition, PositionError> {
            self.calls.set(self.calls.get() + 1);
            self.targets.borrow_mut().push(spec.target.resolve());
            BalloonPositioner::new(Rect {
                x: 0,
                y: 0,
                width: 80,
                height: 24,
            })
            .position(panel, spec)
        }
    }

    fn at(x: u16) -> PositionSpec {
        PositionSpec::at(Rect {
            x,
            y: 5,
            width: 4,
            height: 1,
        })
    }

    fn balloon() -> (ContextualBalloon<&'static str>, Recorder) {
        let recorder = Recorder::default();
        (ContextualBalloon::new(recorder.clone()), recorder)
    }

    #[test]
    fn add_shows_the_entry_and_pins_the_panel() {
        let (mut b, rec) = balloon();
        b.add(StackEntry::new("a", at(1))).unwrap();
        assert_eq!(b.visible_view(), Some("a"));
        assert!(b.panel().visible());
        assert!(b.panel().is_pinned());
        assert_eq!(rec.calls.get(), 1);
        assert_eq!(rec.targets.borrow()[0].x, 1);
    }

    #[test]
    fn last_added_entry_is_visible() {
        let (mut b, rec) = balloon();
        b.add(StackEntry::new("a", at(1))).unwrap();
        b.add(StackEntry::new("b", at(2))).unwrap();
        assert_eq!(b.visible_view(), Some("b"));
        assert!(b.has_view("a"));
        assert_eq!(rec.targets.borrow()[1].x, 2);
    }

    #[test]
    fn duplicate_add_fails_and_leaves_state_unchanged() {
        let (mut b, rec) = balloon();
        b.add(StackEntry::new("a", at(1))).unwrap();
        b.add_to(StackEntry::new("b", at(2)), "other").unwrap();
        let calls = rec.calls.get();
        let err = b.add(StackEntry::new("b", at(3))).unwrap_err();
        assert!(matches!(err, BalloonError::DuplicateView { .. }));
        assert_eq!(b.stack_len(MAIN_STACK), 1);
        assert_eq!(b.stack_len("other"), 1);
        assert_eq!(b.visible_view(), Some("a"));
        assert_eq!(rec.calls.get(), calls);
    }

    #[test]
    fn class_name_follows_the_visible_entry() {
        let (mut b, _) = balloon();
        b.add(StackEntry::new("a", at(1)).with_class_name("foo"))
            .unwrap();
        assert_eq!(b.panel().class_name(), Some("foo"));
        b.add(StackEntry::new("b", at(1)).with_class_name("bar"))
            .unwrap();
        assert_eq!(b.panel().class_name(), Some("bar"));
        b.add(StackEntry::new("c", at(1))).unwrap();
        assert_eq!(b.panel().class_name(), None);
        b.remove("c").unwrap();
        assert_eq!(b.panel().class_name(), Some("bar"));
    }

    #[test]
    fn removing_visible_entry_promotes_the_previous_one() {
        let (mut b, rec) = balloon();
        b.add(StackEntry::new("a", at(1))).unwrap();
        b.add(StackEntry::new("b", at(2))).unwrap();
        b.remove("b").unwrap();
        assert_eq!(b.visible_view(), Some("a"));
        assert_eq!(rec.calls.get(), 3);
        assert_eq!(rec.targets.borrow()[2].x, 1);
    }

    #[test]
    fn removing_hidden_entry_does_not_touch_the_panel() {
        let (mut b, rec) = balloon();
        b.add(StackEntry::new("a", at(1))).unwrap();
        b.add(StackEntry::new("b", at(2))).unwrap();
        let calls = rec.calls.get();
        b.remove("a").unwrap();
        assert_eq!(b.visible_view(), Some("b"));
        assert_eq!(rec.calls.get(), calls);
    }

    #[test]
    fn removing_last_entry_hides_the_panel() {
        let (mut b, _) = balloon();
        b.add(StackEntry::new("a", at(1))).unwrap();
        b.remove("a").unwrap();
        assert_eq!(b.visible_view(), None);
        assert!(b.visible_entry().is_none());
        assert!(!b.panel().visible());
        assert!(!b.panel().is_pinned());
    }

    #[test]
    fn remove_unknown_view_fails() {
        let (mut b, _) = balloon();
        b.add(StackEntry::new("a", at(1))).unwrap();
        let err = b.remove("zzz").unwrap_err();
        assert!(matches!(err, BalloonError::ViewNotFound { .. }));
        assert_eq!(b.visible_view(), Some("a"));
    }

    #[test]
    fn clear_hides_everything() {
        let (mut b, _) = balloon();
        b.add(StackEntry::new("a", at(1))).unwrap();
        b.add(StackEntry::new("b", at(1))).unwrap();
        b.add_to(StackEntry::new("c", at(1)), "other").unwrap();
        b.clear(None).unwrap();
        assert_eq!(b.visible_view(), None);
        assert!(!b.panel().visible());
        assert!(!b.has_view("c"));
    }

    #[test]
    fn clear_single_stack_falls_back_to_another() {
        let (mut b, _) = balloon();
        b.add(StackEntry::new("a", at(1))).unwrap();
        b.add_to(StackEntry::new("c", at(1)), "other").unwrap();
        b.clear(Some(MAIN_STACK)).unwrap();
        assert_eq!(b.visible_view(), Some("c"));
        assert_eq!(b.active_stack(), "other");
        assert!(b.clear(Some("missing")).is_err());
    }

    #[test]
    fn single_view_mode_clears_other_entries() {
        let (mut b, _) = balloon();
        b.add(StackEntry::new("a", at(1))).unwrap();
        b.add_to(StackEntry::new("c", at(1)), "other").unwrap();
        b.add(StackEntry::new("solo", at(1)).single_view())
            .unwrap();
        assert_eq!(b.visible_view(), Some("solo"));
        assert!(!b.has_view("a"));
        assert!(!b.has_view("c"));
        assert!(b.panel().visible());
    }

    #[test]
    fn add_to_inactive_stack_does_not_move_the_panel() {
        let (mut b, rec) = balloon();
        b.add(StackEntry::new("a", at(1))).unwrap();
        b.add_to(StackEntry::new("t", at(9)), "table").unwrap();
        assert_eq!(b.visible_view(), Some("a"));
        assert_eq!(b.active_stack(), MAIN_STACK);
        assert_eq!(rec.calls.get(), 1);
    }

    #[test]
    fn add_to_named_stack_when_hidden_activates_it() {
        let (mut b, _) = balloon();
        b.add_to(StackEntry::new("t", at(9)), "table").unwrap();
        assert_eq!(b.active_stack(), "table");
        assert_eq!(b.visible_view(), Some("t"));
        b.add(StackEntry::new("a", at(1))).unwrap();
        assert_eq!(b.visible_view(), Some("t"));
    }

    #[test]
    fn emptied_stack_falls_back_to_most_recently_active() {
        let (mut b, _) = balloon();
        b.add(StackEntry::new("a", at(1))).unwrap();
        b.add_to(StackEntry::new("t", at(2)), "table").unwrap();
        b.add_to(StackEntry::new("i", at(3)), "image").unwrap();
        b.show_stack("image").unwrap();
        b.show_stack("table").unwrap();
        b.remove("t").unwrap();
        assert_eq!(b.active_stack(), "image");
        assert_eq!(b.visible_view(), Some("i"));
        b.remove("i").unwrap();
        assert_eq!(b.active_stack(), MAIN_STACK);
        assert_eq!(b.visible_view(), Some("a"));
    }

    #[test]
    fn show_stack_swaps_without_hiding() {
        let (mut b, _) = balloon();
        b.add(StackEntry::new("a", at(1))).unwrap();
        b.add_to(StackEntry::new("t", at(2)).with_class_name("table"), "table")
            .unwrap();
        b.show_stack("table").unwrap();
        assert!(b.panel().visible());
        assert_eq!(b.visible_view(), Some("t"));
        assert_eq!(b.panel().class_name(), Some("table"));
        let err = b.show_stack("nope").unwrap_err();
        assert!(matches!(err, BalloonError::StackNotFound { .. }));
    }

    #[test]
    fn rotating_stacks_cycles_in_creation_order() {
        let (mut b, _) = balloon();
        b.add(StackEntry::new("a", at(1))).unwrap();
        b.add_to(StackEntry::new("t", at(2)), "table").unwrap();
        b.add_to(StackEntry::new("i", at(3)), "image").unwrap();
        b.show_next_stack().unwrap();
        assert_eq!(b.visible_view(), Some("t"));
        b.show_next_stack().unwrap();
        assert_eq!(b.visible_view(), Some("i"));
        b.show_next_stack().unwrap();
        assert_eq!(b.visible_view(), Some("a"));
        b.show_prev_stack().unwrap();
        assert_eq!(b.visible_view(), Some("i"));
    }

    #[test]
    fn update_position_reuses_stored_or_replaces_it() {
        let (mut b, rec) = balloon();
        b.add(StackEntry::new("a", at(1))).unwrap();
        b.update_position(None).unwrap();
        assert_eq!(rec.targets.borrow().last().unwrap().x, 1);
        b.update_position(Some(at(7))).unwrap();
        assert_eq!(rec.targets.borrow().last().unwrap().x, 7);
        b.update_position(None).unwrap();
        assert_eq!(rec.targets.borrow().last().unwrap().x, 7);
        assert_eq!(rec.calls.get(), 4);
    }

    #[test]
    fn update_position_is_noop_when_hidden() {
        let (mut b, rec) = balloon();
        b.update_position(Some(at(7))).unwrap();
        assert_eq!(rec.calls.get(), 0);
    }

    #[test]
    fn positioner_failure_rolls_back_add() {
        let mut b: ContextualBalloon<u8> =
            ContextualBalloon::new(BalloonPositioner::new(Rect::default()));
        let err = b.add(StackEntry::new(1, at(1))).unwrap_err();
        assert!(matches!(err, BalloonError::Position(_)));
        assert!(!b.has_view(1));
        assert!(!b.panel().visible());
    }

    #[test]
    fn viewport_change_repins_lazy_targets() {
        let (mut b, rec) = balloon();
        let column = Rc::new(Cell::new(3u16));
        let probe = Rc::clone(&column);
        b.add(StackEntry::new(
            "a",
            PositionSpec::resolver(move || Rect {
                x: probe.get(),
                y: 2,
                width: 1,
                height: 1,
            }),
        ))
        .unwrap();
        column.set(11);
        b.set_viewport(Rect {
            x: 0,
            y: 0,
            width: 100,
            height: 30,
        })
        .unwrap();
        assert_eq!(rec.targets.borrow().last().unwrap().x, 11);
    }
}
