#![forbid(unsafe_code)]

//! Elm-style runtime.
//!
//! A [`Model`] owns all application state. Input arrives as [`Event`]s,
//! converted into the model's message type; `update` returns a [`Cmd`]
//! describing side effects, and `view` draws the current state into a fresh
//! [`Buffer`] that the [`Presenter`] diffs against the previous frame.
//!
//! # Event loop
//!
//! ```text
//! poll(timeout) -> drain events -> drain task results -> Tick if due -> render if dirty
//! ```
//!
//! The poll timeout is the model's [`Model::next_tick`] (capped at
//! [`ProgramConfig::idle_poll`]), so a pending debounce or animation wakes the
//! loop exactly when it is due.
//!
//! [`Simulator`] drives the same model without a terminal: tasks run
//! synchronously and clipboard writes are recorded instead of executed.

use std::io::{self, Write};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use marklens_render::Buffer;
use tracing::{debug, debug_span, info};

use crate::clipboard::Clipboard;
use crate::event::Event;
use crate::present::Presenter;
use crate::session::EventSource;

/// Application state and behavior.
pub trait Model {
    type Message: From<Event> + Send + 'static;

    fn init(&mut self) -> Cmd<Self::Message> {
        Cmd::none()
    }

    fn update(&mut self, msg: Self::Message) -> Cmd<Self::Message>;

    fn view(&self, buf: &mut Buffer);

    /// How long until the model wants an [`Event::Tick`]; `None` when idle.
    fn next_tick(&self) -> Option<Duration> {
        None
    }
}

/// Side effects requested by `update`.
#[derive(Default)]
pub enum Cmd<M> {
    #[default]
    None,
    Quit,
    /// Execute several commands in order.
    Batch(Vec<Cmd<M>>),
    /// Feed a message straight back into `update`.
    Msg(M),
    /// Run a blocking closure on a background thread; its result comes back
    /// as a message.
    Task(Box<dyn FnOnce() -> M + Send>),
    /// Put text on the system clipboard.
    Copy(String),
}

impl<M: std::fmt::Debug> std::fmt::Debug for Cmd<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Quit => write!(f, "Quit"),
            Self::Batch(cmds) => f.debug_tuple("Batch").field(cmds).finish(),
            Self::Msg(m) => f.debug_tuple("Msg").field(m).finish(),
            Self::Task(_) => write!(f, "Task"),
            Self::Copy(text) => f.debug_tuple("Copy").field(text).finish(),
        }
    }
}

impl<M> Cmd<M> {
    #[inline]
    pub fn none() -> Self {
        Self::None
    }

    #[inline]
    pub fn quit() -> Self {
        Self::Quit
    }

    #[inline]
    pub fn msg(m: M) -> Self {
        Self::Msg(m)
    }

    pub fn copy(text: impl Into<String>) -> Self {
        Self::Copy(text.into())
    }

    pub fn task<F>(f: F) -> Self
    where
        F: FnOnce() -> M + Send + 'static,
    {
        Self::Task(Box::new(f))
    }

    /// Combine commands, dropping no-ops.
    pub fn batch(cmds: Vec<Self>) -> Self {
        let mut cmds: Vec<Self> = cmds.into_iter().filter(|c| !c.is_none()).collect();
        match cmds.len() {
            0 => Self::None,
            1 => cmds.pop().unwrap_or(Self::None),
            _ => Self::Batch(cmds),
        }
    }

    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Stable name for tracing.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Quit => "Quit",
            Self::Batch(_) => "Batch",
            Self::Msg(_) => "Msg",
            Self::Task(_) => "Task",
            Self::Copy(_) => "Copy",
        }
    }
}

/// Runtime knobs.
#[derive(Debug, Clone)]
pub struct ProgramConfig {
    /// Emit OSC 8 hyperlinks.
    pub hyperlinks: bool,
    /// Longest the loop sleeps without input.
    pub idle_poll: Duration,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            hyperlinks: true,
            idle_poll: Duration::from_millis(250),
        }
    }
}

/// Runs a [`Model`] against a terminal.
pub struct Program<M: Model, E: EventSource, W: Write> {
    model: M,
    events: E,
    presenter: Presenter<W>,
    clipboard: Clipboard,
    config: ProgramConfig,
    prev: Option<Buffer>,
    size: (u16, u16),
    running: bool,
    dirty: bool,
    task_tx: mpsc::Sender<M::Message>,
    task_rx: mpsc::Receiver<M::Message>,
    frames: u64,
}

impl<M: Model, E: EventSource, W: Write> Program<M, E, W> {
    /// # Errors
    ///
    /// Returns an error if the terminal size cannot be read.
    pub fn new(
        model: M,
        events: E,
        writer: W,
        clipboard: Clipboard,
        config: ProgramConfig,
    ) -> io::Result<Self> {
        let size = events.size()?;
        let (task_tx, task_rx) = mpsc::channel();
        Ok(Self {
            model,
            events,
            presenter: Presenter::new(writer, config.hyperlinks),
            clipboard,
            config,
            prev: None,
            size,
            running: true,
            dirty: true,
            task_tx,
            task_rx,
            frames: 0,
        })
    }

    /// Run until the model quits.
    ///
    /// # Errors
    ///
    /// Returns the first I/O error from the event source or the writer.
    pub fn run(&mut self) -> io::Result<()> {
        info!(width = self.size.0, height = self.size.1, "program started");
        let cmd = self.model.init();
        self.execute(cmd)?;

        while self.running {
            if self.dirty {
                self.render()?;
            }
            let timeout = self
                .model
                .next_tick()
                .map_or(self.config.idle_poll, |d| d.min(self.config.idle_poll));

            if self.events.poll_event(timeout)? {
                loop {
                    if let Some(event) = self.events.read_event()? {
                        self.handle_event(event)?;
                    }
                    if !self.running || !self.events.poll_event(Duration::ZERO)? {
                        break;
                    }
                }
            }

            while self.running {
                let Ok(msg) = self.task_rx.try_recv() else {
                    break;
                };
                self.dispatch(msg)?;
            }

            if self.running && self.model.next_tick().is_some_and(|d| d.is_zero()) {
                self.dispatch(Event::Tick.into())?;
            }
        }
        info!(frames = self.frames, "program finished");
        Ok(())
    }

    fn handle_event(&mut self, event: Event) -> io::Result<()> {
        if let Event::Resize { width, height } = event {
            debug!(width, height, "resize");
            self.size = (width, height);
            self.prev = None;
            self.presenter.reset();
        }
        self.dispatch(event.into())
    }

    fn dispatch(&mut self, msg: M::Message) -> io::Result<()> {
        let cmd = self.model.update(msg);
        self.dirty = true;
        self.execute(cmd)
    }

    fn execute(&mut self, cmd: Cmd<M::Message>) -> io::Result<()> {
        match cmd {
            Cmd::None => {}
            Cmd::Quit => self.running = false,
            Cmd::Batch(cmds) => {
                for cmd in cmds {
                    self.execute(cmd)?;
                    if !self.running {
                        break;
                    }
                }
            }
            Cmd::Msg(msg) => self.dispatch(msg)?,
            Cmd::Task(task) => {
                let tx = self.task_tx.clone();
                thread::spawn(move || {
                    // The receiver is gone only after the program exits.
                    let _ = tx.send(task());
                });
            }
            Cmd::Copy(text) => {
                // OSC 52 goes out inline to stay ordered with frames; tools
                // run detached and log their own outcome.
                if let Err(err) = self.clipboard.set(&text, self.presenter.writer_mut()) {
                    debug!(error = %err, "clipboard write failed");
                }
            }
        }
        Ok(())
    }

    fn render(&mut self) -> io::Result<()> {
        let (width, height) = self.size;
        let _span = debug_span!("frame", width, height).entered();
        let mut buf = Buffer::new(width, height);
        self.model.view(&mut buf);
        self.presenter.present(self.prev.as_ref(), &buf)?;
        self.prev = Some(buf);
        self.dirty = false;
        self.frames += 1;
        Ok(())
    }

    #[must_use]
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Tear down and hand back the model and writer.
    ///
    /// # Errors
    ///
    /// Returns an error if buffered output cannot be flushed.
    pub fn into_parts(self) -> io::Result<(M, W)> {
        Ok((self.model, self.presenter.into_inner()?))
    }
}

/// Record of a command executed by the [`Simulator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CmdRecord {
    None,
    Quit,
    Msg,
    Batch(usize),
    /// Background task, run synchronously.
    Task,
    Copy(String),
}

/// Deterministic, terminal-free driver for a [`Model`].
pub struct Simulator<M: Model> {
    model: M,
    frames: Vec<Buffer>,
    command_log: Vec<CmdRecord>,
    running: bool,
}

impl<M: Model> Simulator<M> {
    /// The model is not initialized until [`init`](Self::init) is called.
    pub fn new(model: M) -> Self {
        Self {
            model,
            frames: Vec::new(),
            command_log: Vec::new(),
            running: true,
        }
    }

    pub fn init(&mut self) {
        let cmd = self.model.init();
        self.execute(cmd);
    }

    pub fn inject_events(&mut self, events: &[Event]) {
        for event in events {
            if !self.running {
                break;
            }
            let cmd = self.model.update(M::Message::from(event.clone()));
            self.execute(cmd);
        }
    }

    pub fn inject_event(&mut self, event: Event) {
        self.inject_events(&[event]);
    }

    pub fn send(&mut self, msg: M::Message) {
        if !self.running {
            return;
        }
        let cmd = self.model.update(msg);
        self.execute(cmd);
    }

    /// Deliver a tick if the model has one due.
    ///
    /// Returns `true` when a tick was delivered.
    pub fn tick_if_due(&mut self) -> bool {
        if self.running && self.model.next_tick().is_some_and(|d| d.is_zero()) {
            self.inject_event(Event::Tick);
            return true;
        }
        false
    }

    /// Render the current state at the given size.
    pub fn capture_frame(&mut self, width: u16, height: u16) -> &Buffer {
        let mut buf = Buffer::new(width, height);
        self.model.view(&mut buf);
        self.frames.push(buf);
        &self.frames[self.frames.len() - 1]
    }

    #[must_use]
    pub fn frames(&self) -> &[Buffer] {
        &self.frames
    }

    #[must_use]
    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[must_use]
    pub fn command_log(&self) -> &[CmdRecord] {
        &self.command_log
    }

    /// Texts passed to `Cmd::Copy`, oldest first.
    #[must_use]
    pub fn clipboard(&self) -> Vec<&str> {
        self.command_log
            .iter()
            .filter_map(|r| match r {
                CmdRecord::Copy(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn execute(&mut self, cmd: Cmd<M::Message>) {
        match cmd {
            Cmd::None => self.command_log.push(CmdRecord::None),
            Cmd::Quit => {
                self.running = false;
                self.command_log.push(CmdRecord::Quit);
            }
            Cmd::Batch(cmds) => {
                self.command_log.push(CmdRecord::Batch(cmds.len()));
                for cmd in cmds {
                    self.execute(cmd);
                    if !self.running {
                        break;
                    }
                }
            }
            Cmd::Msg(msg) => {
                self.command_log.push(CmdRecord::Msg);
                let cmd = self.model.update(msg);
                self.execute(cmd);
            }
            Cmd::Task(task) => {
                self.command_log.push(CmdRecord::Task);
                let msg = task();
                let cmd = self.model.update(msg);
                self.execute(cmd);
            }
            Cmd::Copy(text) => self.command_log.push(CmdRecord::Copy(text)),
        }
    }
}
