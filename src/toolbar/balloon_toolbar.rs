//! Contextual toolbar that follows the selection inside the shared balloon.
//!
//! Two debounce stages drive it. Selection changes restart the *selection*
//! stage; once the selection has been quiet for its window, the *toggle*
//! stage is restarted. Focus boundary crossings restart the toggle stage
//! directly. When the toggle stage settles, exactly one [`Decision`] is
//! evaluated and applied.
//!
//! Nothing here reads a clock: the host passes `now` into every handler and
//! calls [`BalloonToolbar::tick`] when [`BalloonToolbar::next_deadline`] is
//! reached.

use std::fmt;
use std::time::Instant;

use ratatui::layout::Rect;

use super::ToolbarView;
use crate::balloon::{ContextualBalloon, StackEntry};
use crate::config::ToolbarConfig;
use crate::debounce::Debouncer;
use crate::error::BalloonError;
use crate::focus::FocusTracker;
use crate::layout::Placement;
use crate::position::PositionSpec;
use crate::selection::{RangeChange, SelectionDirection, SelectionSource};

/// Panel below and right of a forward selection's end.
pub const FORWARD_PLACEMENTS: [Placement; 6] = [
    Placement::SOUTH_EAST_ARROW_NORTH,
    Placement::SOUTH_EAST_ARROW_NORTH_EAST,
    Placement::SOUTH_EAST_ARROW_NORTH_WEST,
    Placement::NORTH_EAST_ARROW_SOUTH,
    Placement::NORTH_EAST_ARROW_SOUTH_EAST,
    Placement::NORTH_EAST_ARROW_SOUTH_WEST,
];

/// Panel above and left of a backward selection's start.
pub const BACKWARD_PLACEMENTS: [Placement; 6] = [
    Placement::NORTH_WEST_ARROW_SOUTH,
    Placement::NORTH_WEST_ARROW_SOUTH_WEST,
    Placement::NORTH_WEST_ARROW_SOUTH_EAST,
    Placement::SOUTH_WEST_ARROW_NORTH,
    Placement::SOUTH_WEST_ARROW_NORTH_WEST,
    Placement::SOUTH_WEST_ARROW_NORTH_EAST,
];

/// Elements inside the toolbar's focus boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ToolbarFocus {
    Editable,
    Toolbar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Show,
    Hide,
    /// Focus was lost but the balloon shows somebody else's view.
    Keep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarEvent {
    SelectionSettled,
    VisibilitySettled(Decision),
    Shown,
    Hidden,
    /// A `show` listener vetoed the show.
    ShowStopped,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisibilityState {
    pub is_visible: bool,
    pub pending_decision: bool,
}

/// Dispatched to `show` listeners before the toolbar is added to the balloon.
#[derive(Debug, Default)]
pub struct ShowEvent {
    stopped: bool,
}

impl ShowEvent {
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }
}

type ShowListener = Box<dyn FnMut(&mut ShowEvent)>;

pub struct BalloonToolbar<V: Copy + Eq + fmt::Debug> {
    view: V,
    toolbar: ToolbarView,
    config: ToolbarConfig,
    selection_debounce: Debouncer,
    toggle_debounce: Debouncer,
    focus: FocusTracker<ToolbarFocus>,
    /// Subscribed to reposition requests while shown.
    listening: bool,
    reposition_deferred: bool,
    destroyed: bool,
    show_listeners: Vec<ShowListener>,
    events: Vec<ToolbarEvent>,
}

impl<V: Copy + Eq + fmt::Debug> fmt::Debug for BalloonToolbar<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BalloonToolbar")
            .field("view", &self.view)
            .field("config", &self.config)
            .field("focused", &self.focus.is_focused())
            .field("selection_pending", &self.selection_debounce.is_pending())
            .field("toggle_pending", &self.toggle_debounce.is_pending())
            .field("listening", &self.listening)
            .field("destroyed", &self.destroyed)
            .field("show_listeners", &self.show_listeners.len())
            .finish_non_exhaustive()
    }
}

impl<V: Copy + Eq + fmt::Debug> BalloonToolbar<V> {
    /// `view` is the id under which the toolbar is added to the balloon.
    pub fn new(view: V, toolbar: ToolbarView, config: ToolbarConfig) -> Self {
        let mut focus = FocusTracker::new();
        focus.add(ToolbarFocus::Editable);
        focus.add(ToolbarFocus::Toolbar);
        Self {
            view,
            toolbar,
            selection_debounce: Debouncer::new(config.selection_debounce),
            toggle_debounce: Debouncer::new(config.toggle_debounce),
            config,
            focus,
            listening: false,
            reposition_deferred: false,
            destroyed: false,
            show_listeners: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn view(&self) -> V {
        self.view
    }

    pub fn toolbar(&self) -> &ToolbarView {
        &self.toolbar
    }

    pub fn toolbar_mut(&mut self) -> &mut ToolbarView {
        &mut self.toolbar
    }

    pub fn config(&self) -> &ToolbarConfig {
        &self.config
    }

    pub fn is_focused(&self) -> bool {
        self.focus.is_focused()
    }

    pub fn focused_element(&self) -> Option<ToolbarFocus> {
        self.focus.focused_element()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn visibility(&self, balloon: &ContextualBalloon<V>) -> VisibilityState {
        VisibilityState {
            is_visible: balloon.visible_view() == Some(self.view),
            pending_decision: self.toggle_debounce.is_pending(),
        }
    }

    /// Register a listener for the cancellable `show` signal.
    ///
    /// Listeners only hear shows that would otherwise add the toolbar. Calls
    /// refused because the toolbar is already present, the selection is
    /// collapsed or no item is actionable never reach them.
    pub fn on_show(&mut self, listener: impl FnMut(&mut ShowEvent) + 'static) {
        if self.destroyed {
            return;
        }
        self.show_listeners.push(Box::new(listener));
    }

    /// Earliest instant at which [`BalloonToolbar::tick`] has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        if self.destroyed {
            return None;
        }
        match (
            self.selection_debounce.deadline(),
            self.toggle_debounce.deadline(),
        ) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Events emitted since the last call.
    pub fn take_events(&mut self) -> Vec<ToolbarEvent> {
        std::mem::take(&mut self.events)
    }

    /// A `change:range` signal from the selection.
    ///
    /// Direct changes and collapsing selections hide the toolbar right away;
    /// every change restarts the selection stage.
    pub fn handle_selection_change(
        &mut self,
        change: RangeChange,
        selection: &dyn SelectionSource,
        balloon: &mut ContextualBalloon<V>,
        now: Instant,
    ) -> Result<(), BalloonError> {
        if self.destroyed {
            return Ok(());
        }
        if change.direct_change || selection.is_collapsed() {
            self.hide(balloon)?;
        }
        self.selection_debounce.restart(now);
        Ok(())
    }

    /// Focus moved onto `element`.
    pub fn focus(&mut self, element: ToolbarFocus, now: Instant) {
        let crossed = self.focus.focus(element);
        self.focus_crossed(crossed, now);
    }

    /// `element` lost focus to something outside the boundary.
    pub fn blur(&mut self, element: ToolbarFocus, now: Instant) {
        let crossed = self.focus.blur(element);
        self.focus_crossed(crossed, now);
    }

    /// Editable focus reported by a host that tracks focus itself.
    pub fn handle_focus_change(&mut self, focused: bool, now: Instant) {
        if focused {
            self.focus(ToolbarFocus::Editable, now);
        } else if let Some(element) = self.focus.focused_element() {
            self.blur(element, now);
        }
    }

    fn focus_crossed(&mut self, crossed: Option<bool>, now: Instant) {
        if self.destroyed {
            return;
        }
        if let Some(focused) = crossed {
            tracing::debug!(focused, "toolbar focus changed");
            self.toggle_debounce.restart(now);
        }
    }

    /// The balloon asked its views to reposition (layout, scroll, resize).
    ///
    /// While a visibility decision is pending the reposition waits for it, and
    /// is dropped if that decision hides the toolbar.
    pub fn handle_update(
        &mut self,
        selection: &dyn SelectionSource,
        balloon: &mut ContextualBalloon<V>,
    ) -> Result<(), BalloonError> {
        if self.destroyed || !self.listening {
            return Ok(());
        }
        if self.toggle_debounce.is_pending() {
            tracing::trace!("toolbar reposition deferred");
            self.reposition_deferred = true;
            return Ok(());
        }
        self.reposition(selection, balloon)
    }

    /// Fire whatever debounce stage has settled by `now`.
    pub fn tick(
        &mut self,
        now: Instant,
        selection: &dyn SelectionSource,
        balloon: &mut ContextualBalloon<V>,
    ) -> Result<Vec<ToolbarEvent>, BalloonError> {
        if self.destroyed {
            return Ok(Vec::new());
        }
        if let Some(settled_at) = self.selection_debounce.poll(now) {
            tracing::trace!("selection settled");
            self.events.push(ToolbarEvent::SelectionSettled);
            self.toggle_debounce.restart(settled_at);
        }
        if self.toggle_debounce.poll(now).is_some() {
            let decision = self.decide(selection, balloon);
            tracing::debug!(?decision, "toolbar visibility settled");
            self.events.push(ToolbarEvent::VisibilitySettled(decision));
            match decision {
                Decision::Show => {
                    self.show(selection, balloon)?;
                }
                Decision::Hide => {
                    self.hide(balloon)?;
                }
                Decision::Keep => {}
            }
            if std::mem::take(&mut self.reposition_deferred) {
                self.reposition(selection, balloon)?;
            }
        }
        Ok(self.take_events())
    }

    /// Visibility policy evaluated once per settled toggle.
    pub fn decide(
        &self,
        selection: &dyn SelectionSource,
        balloon: &ContextualBalloon<V>,
    ) -> Decision {
        if !self.focus.is_focused() {
            if balloon.visible_view() == Some(self.view) {
                Decision::Hide
            } else {
                Decision::Keep
            }
        } else if selection.is_collapsed() || !self.toolbar.has_actionable_items() {
            Decision::Hide
        } else {
            Decision::Show
        }
    }

    /// Add the toolbar to the balloon next to the selection.
    ///
    /// Returns false when nothing was added: already present, collapsed
    /// selection, nothing actionable, or vetoed by a `show` listener.
    pub fn show(
        &mut self,
        selection: &dyn SelectionSource,
        balloon: &mut ContextualBalloon<V>,
    ) -> Result<bool, BalloonError> {
        if self.destroyed || balloon.has_view(self.view) {
            return Ok(false);
        }
        if selection.is_collapsed() || !self.toolbar.has_actionable_items() {
            tracing::debug!(
                collapsed = selection.is_collapsed(),
                actionable = self.toolbar.has_actionable_items(),
                "toolbar show refused"
            );
            return Ok(false);
        }
        let mut event = ShowEvent::default();
        for listener in &mut self.show_listeners {
            listener(&mut event);
            if event.is_stopped() {
                break;
            }
        }
        if event.is_stopped() {
            tracing::debug!("toolbar show stopped by listener");
            self.events.push(ToolbarEvent::ShowStopped);
            return Ok(false);
        }
        let entry = StackEntry::new(self.view, self.position_spec(selection))
            .with_class_name(self.config.class_name.clone());
        balloon.add(entry)?;
        self.listening = true;
        self.events.push(ToolbarEvent::Shown);
        Ok(true)
    }

    /// Remove the toolbar if it is the view the balloon currently displays.
    pub fn hide(&mut self, balloon: &mut ContextualBalloon<V>) -> Result<bool, BalloonError> {
        if self.destroyed {
            return Ok(false);
        }
        if balloon.visible_view() != Some(self.view) {
            return Ok(false);
        }
        balloon.remove(self.view)?;
        self.listening = false;
        self.reposition_deferred = false;
        self.events.push(ToolbarEvent::Hidden);
        Ok(true)
    }

    /// Cancel both stages and detach every listener. Safe to call twice.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        tracing::debug!(view = ?self.view, "toolbar destroyed");
        self.destroyed = true;
        self.selection_debounce.cancel();
        self.toggle_debounce.cancel();
        self.listening = false;
        self.reposition_deferred = false;
        self.show_listeners.clear();
        self.events.clear();
    }

    /// Lazy target around the selection end the user is looking at.
    ///
    /// Forward selections aim at their last range, backward ones at their
    /// first, each with its own placement preference.
    pub fn position_spec(&self, selection: &dyn SelectionSource) -> PositionSpec {
        let backward = selection.direction() == SelectionDirection::Backward;
        let index = if backward {
            0
        } else {
            selection.range_count().saturating_sub(1)
        };
        let geometry = selection.range_geometry(index);
        let placements = if backward {
            BACKWARD_PLACEMENTS
        } else {
            FORWARD_PLACEMENTS
        };
        PositionSpec::resolver(move || {
            let rects = geometry
                .as_ref()
                .map(|g| g.client_rects())
                .unwrap_or_default();
            resolve_selection_rect(&rects, backward)
        })
        .with_positions(placements)
    }

    fn reposition(
        &mut self,
        selection: &dyn SelectionSource,
        balloon: &mut ContextualBalloon<V>,
    ) -> Result<(), BalloonError> {
        if !self.listening || balloon.visible_view() != Some(self.view) {
            return Ok(());
        }
        tracing::trace!("toolbar reposition");
        balloon.update_position(Some(self.position_spec(selection)))
    }
}

/// Pick the rectangle the toolbar points at from a range's client rects.
///
/// A trailing zero-width rect after a real one is a line-wrap artifact and
/// is skipped for forward selections.
pub fn resolve_selection_rect(rects: &[Rect], backward: bool) -> Rect {
    if backward {
        return rects.first().copied().unwrap_or_default();
    }
    match rects {
        [.., before, last] if last.width == 0 && before.width > 0 => *before,
        [.., last] => *last,
        [] => Rect::default(),
    }
}
