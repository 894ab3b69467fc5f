use std::io;
use std::time::{Duration, Instant};

use crossterm::event::Event;

use crate::drivers::InputDriver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlow {
    Continue,
    /// Keep running and call the handler again no later than this instant.
    WakeAt(Instant),
    Quit,
}

/// A centralized event loop that drives the main UI thread.
///
/// The loop owns the input driver and dispatches events to a handler closure.
/// Between events it sleeps in `driver.poll`, bounded by the idle interval and
/// by the earliest wake-up the handler asked for, so debounce deadlines fire
/// on time without busy polling.
pub struct EventLoop<D> {
    driver: D,
    idle_interval: Duration,
}

impl<D: InputDriver> EventLoop<D> {
    pub fn new(driver: D, idle_interval: Duration) -> Self {
        Self {
            driver,
            idle_interval,
        }
    }

    pub fn driver(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Runs the application loop, taking control of the current thread.
    ///
    /// The `handler` is called with:
    /// - `Some(event)` when an input event occurs.
    /// - `None` when the loop wakes without input (idle interval or a
    ///   requested wake-up elapsed).
    pub fn run<F>(&mut self, mut handler: F) -> io::Result<()>
    where
        F: FnMut(&mut D, Option<Event>) -> io::Result<ControlFlow>,
    {
        let mut wake_at = None;
        loop {
            match handler(&mut self.driver, None)? {
                ControlFlow::Quit => break,
                ControlFlow::WakeAt(at) => wake_at = Some(at),
                ControlFlow::Continue => wake_at = None,
            }

            let timeout = poll_timeout(Instant::now(), wake_at, self.idle_interval);
            if self.driver.poll(timeout)? {
                // Drain the queue so bursts (typing, drags) do not fall behind.
                loop {
                    let event = self.driver.read()?;
                    if let ControlFlow::Quit = handler(&mut self.driver, Some(event))? {
                        return Ok(());
                    }
                    if !self.driver.poll(Duration::from_millis(0))? {
                        break;
                    }
                }
            }
        }
        Ok(())
    }
}

/// How long to block waiting for input.
pub fn poll_timeout(now: Instant, wake_at: Option<Instant>, idle: Duration) -> Duration {
    match wake_at {
        Some(at) => at.saturating_duration_since(now).min(idle),
        None => idle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use std::collections::VecDeque;

    #[derive(Default)]
    struct Scripted {
        events: VecDeque<Event>,
        timeouts: Vec<Duration>,
    }

    impl InputDriver for Scripted {
        fn poll(&mut self, timeout: Duration) -> io::Result<bool> {
            self.timeouts.push(timeout);
            Ok(!self.events.is_empty())
        }

        fn read(&mut self) -> io::Result<Event> {
            self.events
                .pop_front()
                .ok_or_else(|| io::Error::other("no scripted event"))
        }
    }

    #[test]
    fn timeout_follows_the_earliest_wake_up() {
        let now = Instant::now();
        let idle = Duration::from_millis(500);
        assert_eq!(poll_timeout(now, None, idle), idle);
        assert_eq!(
            poll_timeout(now, Some(now + Duration::from_millis(120)), idle),
            Duration::from_millis(120)
        );
        assert_eq!(poll_timeout(now, Some(now), idle), Duration::ZERO);
        assert_eq!(
            poll_timeout(now + Duration::from_secs(1), Some(now), idle),
            Duration::ZERO
        );
    }

    #[test]
    fn events_are_drained_then_the_loop_quits() {
        let mut driver = Scripted::default();
        for c in ['a', 'b', 'q'] {
            driver
                .events
                .push_back(Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)));
        }
        let mut seen = Vec::new();
        let mut ticks = 0;
        let mut event_loop = EventLoop::new(driver, Duration::from_millis(50));
        event_loop
            .run(|_, event| match event {
                Some(Event::Key(key)) if key.code == KeyCode::Char('q') => Ok(ControlFlow::Quit),
                Some(Event::Key(key)) => {
                    seen.push(key.code);
                    Ok(ControlFlow::Continue)
                }
                Some(_) => Ok(ControlFlow::Continue),
                None => {
                    ticks += 1;
                    Ok(ControlFlow::Continue)
                }
            })
            .unwrap();
        assert_eq!(seen, vec![KeyCode::Char('a'), KeyCode::Char('b')]);
        assert_eq!(ticks, 1);
    }

    #[test]
    fn idle_ticks_request_wake_ups() {
        let mut event_loop = EventLoop::new(Scripted::default(), Duration::from_secs(1));
        let mut ticks = 0;
        event_loop
            .run(|_, _| {
                ticks += 1;
                if ticks == 3 {
                    Ok(ControlFlow::Quit)
                } else {
                    Ok(ControlFlow::WakeAt(Instant::now()))
                }
            })
            .unwrap();
        let timeouts = &event_loop.driver().timeouts;
        assert_eq!(timeouts.len(), 2);
        assert!(timeouts.iter().all(|t| *t < Duration::from_secs(1)));
    }
}
