use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Turns raw crossterm key reports into one press per keystroke.
///
/// Terminals with the kitty protocol (and Windows consoles) also report
/// releases and repeats. The editor acts on presses only, and a held arrow
/// key should keep extending the selection, so repeats become presses.
#[derive(Debug, Default)]
pub struct KeyboardNormalizer {
    held: Option<KeyCode>,
}

impl KeyboardNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn normalize(&mut self, evt: Event) -> Option<Event> {
        let Event::Key(key) = evt else {
            return Some(evt);
        };
        match key.kind {
            KeyEventKind::Release => {
                if self.held == Some(key.code) {
                    self.held = None;
                }
                None
            }
            // A held Esc would close the form and then the balloon behind it.
            KeyEventKind::Repeat if key.code == KeyCode::Esc => None,
            KeyEventKind::Press | KeyEventKind::Repeat => {
                if key.code == KeyCode::Esc && self.held == Some(KeyCode::Esc) {
                    return None;
                }
                self.held = Some(key.code);
                Some(Event::Key(press(key)))
            }
        }
    }
}

fn press(mut key: KeyEvent) -> KeyEvent {
    key.kind = KeyEventKind::Press;
    if key.code == KeyCode::BackTab {
        key.code = KeyCode::Tab;
        key.modifiers.insert(KeyModifiers::SHIFT);
    }
    key
}
