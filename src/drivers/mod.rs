//! Terminal I/O seams.
//!
//! The demo talks to the terminal only through these traits, so the editor
//! and the event loop can be driven by scripted input in tests.

pub mod console;
pub mod keyboard;

use std::io;
use std::time::Duration;

use crossterm::event::Event;
use ratatui::layout::Rect;

use crate::ui::UiFrame;

pub trait InputDriver {
    /// Wait up to `timeout` for input. True when `read` will not block.
    fn poll(&mut self, timeout: Duration) -> io::Result<bool>;

    fn read(&mut self) -> io::Result<Event>;

    /// Mouse reporting is needed to click toolbar items.
    fn set_mouse_capture(&mut self, _enabled: bool) -> io::Result<()> {
        Ok(())
    }
}

impl<T: InputDriver + ?Sized> InputDriver for &mut T {
    fn poll(&mut self, timeout: Duration) -> io::Result<bool> {
        (**self).poll(timeout)
    }

    fn read(&mut self) -> io::Result<Event> {
        (**self).read()
    }

    fn set_mouse_capture(&mut self, enabled: bool) -> io::Result<()> {
        (**self).set_mouse_capture(enabled)
    }
}

pub trait OutputDriver {
    fn enter(&mut self) -> io::Result<()>;

    fn exit(&mut self) -> io::Result<()>;

    /// Area balloons may be positioned in.
    fn viewport(&self) -> io::Result<Rect>;

    fn draw<F>(&mut self, render: F) -> io::Result<()>
    where
        F: FnOnce(UiFrame<'_>);
}
