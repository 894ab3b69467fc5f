use std::collections::VecDeque;
use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event};
use crossterm::execute;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;

use super::keyboard::KeyboardNormalizer;
use super::{InputDriver, OutputDriver};
use crate::ui::UiFrame;

/// Reads crossterm events, normalized, one at a time.
#[derive(Debug, Default)]
pub struct ConsoleInputDriver {
    normalizer: KeyboardNormalizer,
    ready: VecDeque<Event>,
}

impl ConsoleInputDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pull one raw event and keep it if the normalizer does.
    fn pump(&mut self) -> io::Result<()> {
        if let Some(evt) = self.normalizer.normalize(event::read()?) {
            self.ready.push_back(evt);
        }
        Ok(())
    }
}

impl InputDriver for ConsoleInputDriver {
    fn poll(&mut self, timeout: Duration) -> io::Result<bool> {
        // Events are normalized here so a dropped key release cannot make
        // `read` block after `poll` said input was ready.
        if self.ready.is_empty() && event::poll(timeout)? {
            self.pump()?;
        }
        Ok(!self.ready.is_empty())
    }

    fn read(&mut self) -> io::Result<Event> {
        loop {
            if let Some(evt) = self.ready.pop_front() {
                return Ok(evt);
            }
            self.pump()?;
        }
    }

    fn set_mouse_capture(&mut self, enabled: bool) -> io::Result<()> {
        let mut stdout = io::stdout();
        if enabled {
            execute!(stdout, EnableMouseCapture)
        } else {
            execute!(stdout, DisableMouseCapture)
        }
    }
}

/// Alternate-screen ratatui terminal. Restores the screen on drop.
pub struct ConsoleOutputDriver {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    active: bool,
}

impl ConsoleOutputDriver {
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            terminal: Terminal::new(CrosstermBackend::new(io::stdout()))?,
            active: false,
        })
    }
}

impl OutputDriver for ConsoleOutputDriver {
    fn enter(&mut self) -> io::Result<()> {
        if !self.active {
            terminal::enable_raw_mode()?;
            execute!(self.terminal.backend_mut(), EnterAlternateScreen)?;
            self.terminal.hide_cursor()?;
            self.terminal.clear()?;
            self.active = true;
        }
        Ok(())
    }

    fn exit(&mut self) -> io::Result<()> {
        if self.active {
            self.active = false;
            execute!(
                self.terminal.backend_mut(),
                DisableMouseCapture,
                LeaveAlternateScreen
            )?;
            terminal::disable_raw_mode()?;
            self.terminal.show_cursor()?;
        }
        Ok(())
    }

    fn viewport(&self) -> io::Result<Rect> {
        let (width, height) = terminal::size()?;
        Ok(Rect::new(0, 0, width, height))
    }

    fn draw<F>(&mut self, render: F) -> io::Result<()>
    where
        F: FnOnce(UiFrame<'_>),
    {
        self.terminal
            .draw(|frame| render(UiFrame::new(frame)))
            .map(drop)
    }
}

impl Drop for ConsoleOutputDriver {
    fn drop(&mut self) {
        if let Err(err) = self.exit() {
            tracing::warn!(%err, "failed to restore the terminal");
        }
    }
}
