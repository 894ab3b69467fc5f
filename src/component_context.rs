/// State a widget needs from its host while drawing or handling input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComponentContext {
    focused: bool,
    in_balloon: bool,
}

impl ComponentContext {
    pub const fn new(focused: bool) -> Self {
        Self {
            focused,
            in_balloon: false,
        }
    }

    /// The widget owns keyboard input.
    pub const fn focused(&self) -> bool {
        self.focused
    }

    /// The widget is drawn inside the balloon panel rather than inline.
    pub const fn in_balloon(&self) -> bool {
        self.in_balloon
    }

    pub const fn with_focus(self, focused: bool) -> Self {
        Self { focused, ..self }
    }

    pub const fn with_balloon(self, in_balloon: bool) -> Self {
        Self { in_balloon, ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balloon_contexts_start_unfocused() {
        let ctx = ComponentContext::default().with_balloon(true);
        assert_eq!(ctx, ComponentContext::new(false).with_balloon(true));
        assert!(!ctx.focused());
        assert!(ctx.with_focus(true).in_balloon());
    }
}
