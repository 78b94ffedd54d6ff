#![forbid(unsafe_code)]

//! Terminal session lifecycle guard.
//!
//! [`TerminalSession`] enters raw mode, optionally the alternate screen and
//! mouse capture, and restores all of it on drop, on panic (through a hook
//! installed once per process), and on SIGINT/SIGTERM.
//!
//! # Cleanup Order
//!
//! Reverse of enabling: mouse capture, show cursor, alternate screen, raw
//! mode, flush.

use std::io::{self, Write};
use std::sync::OnceLock;
use std::time::Duration;

use tracing::{debug, info};

use crate::event::{Event, from_crossterm};

#[cfg(unix)]
use signal_hook::consts::signal::{SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

/// Source of input events and terminal size.
///
/// The runtime polls this; tests substitute a scripted source.
pub trait EventSource {
    fn size(&self) -> io::Result<(u16, u16)>;

    /// `Ok(true)` when an event is ready within `timeout`.
    fn poll_event(&mut self, timeout: Duration) -> io::Result<bool>;

    /// Next event, or `None` for input the app ignores.
    fn read_event(&mut self) -> io::Result<Option<Event>>;
}

/// Modes to enable at session start.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub alternate_screen: bool,
    pub mouse_capture: bool,
}

/// Owns raw mode and the modes in [`SessionOptions`] until dropped.
#[derive(Debug)]
pub struct TerminalSession {
    alternate_screen_enabled: bool,
    mouse_enabled: bool,
    #[cfg(unix)]
    signal_guard: Option<SignalGuard>,
}

impl TerminalSession {
    /// Enter raw mode and enable the requested modes.
    ///
    /// # Errors
    ///
    /// Returns an error if raw mode or any requested mode cannot be enabled.
    pub fn new(options: SessionOptions) -> io::Result<Self> {
        install_panic_hook();

        crossterm::terminal::enable_raw_mode()?;
        info!("terminal raw mode enabled");

        let mut session = Self {
            alternate_screen_enabled: false,
            mouse_enabled: false,
            #[cfg(unix)]
            signal_guard: Some(SignalGuard::new()?),
        };

        let mut stdout = io::stdout();
        if options.alternate_screen {
            crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;
            session.alternate_screen_enabled = true;
            info!("alternate screen enabled");
        }
        if options.mouse_capture {
            crossterm::execute!(stdout, crossterm::event::EnableMouseCapture)?;
            session.mouse_enabled = true;
            info!("mouse capture enabled");
        }
        crossterm::execute!(stdout, crossterm::cursor::Hide)?;

        Ok(session)
    }

    fn cleanup(&mut self) {
        #[cfg(unix)]
        let _ = self.signal_guard.take();

        let mut stdout = io::stdout();
        if self.mouse_enabled {
            let _ = crossterm::execute!(stdout, crossterm::event::DisableMouseCapture);
            self.mouse_enabled = false;
        }
        let _ = crossterm::execute!(stdout, crossterm::cursor::Show);
        if self.alternate_screen_enabled {
            let _ = crossterm::execute!(stdout, crossterm::terminal::LeaveAlternateScreen);
            self.alternate_screen_enabled = false;
        }
        let _ = crossterm::terminal::disable_raw_mode();
        let _ = stdout.flush();
        info!("terminal restored");
    }
}

impl EventSource for TerminalSession {
    fn size(&self) -> io::Result<(u16, u16)> {
        crossterm::terminal::size()
    }

    fn poll_event(&mut self, timeout: Duration) -> io::Result<bool> {
        crossterm::event::poll(timeout)
    }

    fn read_event(&mut self) -> io::Result<Option<Event>> {
        Ok(from_crossterm(crossterm::event::read()?))
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        self.cleanup();
    }
}

fn install_panic_hook() {
    static HOOK: OnceLock<()> = OnceLock::new();
    HOOK.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            best_effort_cleanup();
            previous(info);
        }));
    });
}

fn best_effort_cleanup() {
    let mut stdout = io::stdout();
    let _ = crossterm::execute!(stdout, crossterm::event::DisableMouseCapture);
    let _ = crossterm::execute!(stdout, crossterm::cursor::Show);
    let _ = crossterm::execute!(stdout, crossterm::terminal::LeaveAlternateScreen);
    let _ = crossterm::terminal::disable_raw_mode();
    let _ = stdout.flush();
}

#[cfg(unix)]
#[derive(Debug)]
struct SignalGuard {
    handle: signal_hook::iterator::Handle,
    thread: Option<std::thread::JoinHandle<()>>,
}

#[cfg(unix)]
impl SignalGuard {
    fn new() -> io::Result<Self> {
        let mut signals = Signals::new([SIGINT, SIGTERM]).map_err(io::Error::other)?;
        let handle = signals.handle();
        let thread = std::thread::spawn(move || {
            if let Some(signal) = signals.forever().next() {
                debug!(signal, "termination signal received, cleaning up");
                best_effort_cleanup();
                std::process::exit(128 + signal);
            }
        });
        Ok(Self {
            handle,
            thread: Some(thread),
        })
    }
}

#[cfg(unix)]
impl Drop for SignalGuard {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Scripted [`EventSource`] for tests: yields queued events, then reports
/// timeouts.
#[derive(Debug, Default)]
pub struct ScriptedEvents {
    size: (u16, u16),
    queue: std::collections::VecDeque<Event>,
}

impl ScriptedEvents {
    #[must_use]
    pub fn new(width: u16, height: u16, events: impl IntoIterator<Item = Event>) -> Self {
        Self {
            size: (width, height),
            queue: events.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl EventSource for ScriptedEvents {
    fn size(&self) -> io::Result<(u16, u16)> {
        Ok(self.size)
    }

    fn poll_event(&mut self, timeout: Duration) -> io::Result<bool> {
        if self.queue.is_empty() {
            // Stand in for a real wait without stalling tests.
            std::thread::sleep(timeout.min(Duration::from_millis(1)));
            return Ok(false);
        }
        Ok(true)
    }

    fn read_event(&mut self) -> io::Result<Option<Event>> {
        let event = self.queue.pop_front();
        if let Some(Event::Resize { width, height }) = event {
            self.size = (width, height);
        }
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_options_default_is_minimal() {
        let opts = SessionOptions::default();
        assert!(!opts.alternate_screen);
        assert!(!opts.mouse_capture);
    }

    #[test]
    fn scripted_events_drain_then_time_out() {
        let mut src = ScriptedEvents::new(80, 24, [Event::from('a'), Event::Resize { width: 100, height: 30 }]);
        assert!(src.poll_event(Duration::ZERO).unwrap());
        assert_eq!(src.read_event().unwrap(), Some(Event::from('a')));
        assert_eq!(src.size().unwrap(), (80, 24));
        src.read_event().unwrap();
        assert_eq!(src.size().unwrap(), (100, 30));
        assert!(!src.poll_event(Duration::from_millis(5)).unwrap());
        assert_eq!(src.remaining(), 0);
    }
}
