use ratatui::style::{Color, Modifier, Style};

// Centralized theme colors for balloons and the widgets they host.

/// Class name that gives a balloon the toolbar look.
pub const TOOLBAR_CONTAINER_CLASS: &str = "balloon-toolbar-container";

// Balloon panel
pub fn balloon_bg() -> Color {
    Color::Black
}
pub fn balloon_fg() -> Color {
    Color::White
}
pub fn balloon_border() -> Color {
    Color::DarkGray
}
pub fn balloon_arrow() -> Color {
    Color::Gray
}

/// Border color for a balloon carrying `class_name`.
pub fn balloon_border_for(class_name: Option<&str>) -> Color {
    match class_name {
        Some(TOOLBAR_CONTAINER_CLASS) => Color::Blue,
        Some(_) => Color::Cyan,
        None => balloon_border(),
    }
}

// Toolbar / buttons
pub fn item_style(enabled: bool, selected: bool) -> Style {
    let base = if enabled {
        Style::default().fg(balloon_fg())
    } else {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::DIM)
    };
    if selected {
        base.add_modifier(Modifier::REVERSED)
    } else {
        base
    }
}

// Form fields
pub fn label_fg() -> Color {
    Color::Gray
}
pub fn input_bg(enabled: bool) -> Color {
    if enabled {
        Color::DarkGray
    } else {
        Color::Black
    }
}
pub fn input_fg() -> Color {
    Color::White
}
pub fn selection_style() -> Style {
    Style::default().add_modifier(Modifier::REVERSED)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toolbar_class_gets_its_own_border() {
        assert_eq!(
            balloon_border_for(Some(TOOLBAR_CONTAINER_CLASS)),
            Color::Blue
        );
        assert_eq!(balloon_border_for(None), balloon_border());
    }

    #[test]
    fn disabled_items_are_dimmed() {
        assert!(item_style(false, false).add_modifier.contains(Modifier::DIM));
        assert!(item_style(true, true).add_modifier.contains(Modifier::REVERSED));
    }
}
