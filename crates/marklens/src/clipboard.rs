#![forbid(unsafe_code)]

//! Clipboard writes.
//!
//! The primary route is an OSC 52 sequence written to the terminal, which
//! also works over SSH. When that route fails, the first copy tool found on
//! `PATH` takes the text on stdin, on a background thread so a slow tool
//! never stalls input handling. `MARKLENS_CLIPBOARD_BACKEND` pins the
//! route: `osc52`, `macos`, `windows`, `wayland`, `x11` or `none`.
//!
//! Callers log failures and acknowledge the copy anyway.

use std::env;
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};

use base64::{Engine as _, engine::general_purpose::STANDARD};
use tracing::{debug, info, warn};

/// Environment variable that pins the clipboard route.
pub const ENV_CLIPBOARD_BACKEND: &str = "MARKLENS_CLIPBOARD_BACKEND";

/// Largest base64 payload most terminals accept in one OSC 52 sequence.
pub const OSC52_PAYLOAD_LIMIT: usize = 74_994;

/// A command-line program that reads clipboard text from stdin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyTool {
    Pbcopy,
    Clip,
    WlCopy,
    Xclip,
    Xsel,
}

impl CopyTool {
    /// Detection order.
    const CANDIDATES: [Self; 5] = [Self::Pbcopy, Self::Clip, Self::WlCopy, Self::Xclip, Self::Xsel];

    #[must_use]
    pub const fn program(self) -> &'static str {
        match self {
            Self::Pbcopy => "pbcopy",
            Self::Clip => "clip",
            Self::WlCopy => "wl-copy",
            Self::Xclip => "xclip",
            Self::Xsel => "xsel",
        }
    }

    const fn args(self) -> &'static [&'static str] {
        match self {
            Self::Xclip => &["-selection", "clipboard"],
            Self::Xsel => &["--clipboard", "--input"],
            Self::Pbcopy | Self::Clip | Self::WlCopy => &[],
        }
    }

    // Platform or display server the tool needs.
    fn usable_here(self) -> bool {
        match self {
            Self::Pbcopy => cfg!(target_os = "macos"),
            Self::Clip => cfg!(target_os = "windows"),
            Self::WlCopy => env::var_os("WAYLAND_DISPLAY").is_some(),
            Self::Xclip | Self::Xsel => env::var_os("DISPLAY").is_some(),
        }
    }

    fn copy(self, text: &str) -> Result<(), CopyError> {
        let program = self.program();
        let mut child = Command::new(program)
            .args(self.args())
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| CopyError::Io(format!("{program}: {e}")))?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .map_err(|e| CopyError::Io(format!("{program}: {e}")))?;
        }
        let status = child
            .wait()
            .map_err(|e| CopyError::Io(format!("{program}: {e}")))?;
        if status.success() {
            Ok(())
        } else {
            Err(CopyError::ToolFailed {
                program,
                code: status.code(),
            })
        }
    }
}

/// Where a copy goes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// OSC 52 through the terminal.
    Terminal,
    /// A copy tool, with no terminal attempt.
    Tool(CopyTool),
    /// Copies are refused.
    Off,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyError {
    Disabled,
    TooLarge { encoded: usize, limit: usize },
    Io(String),
    ToolFailed { program: &'static str, code: Option<i32> },
}

impl fmt::Display for CopyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => write!(f, "clipboard disabled"),
            Self::TooLarge { encoded, limit } => {
                write!(f, "OSC 52 payload of {encoded} bytes exceeds {limit}")
            }
            Self::Io(msg) => write!(f, "clipboard I/O error: {msg}"),
            Self::ToolFailed { program, code: Some(code) } => {
                write!(f, "{program} exited with status {code}")
            }
            Self::ToolFailed { program, code: None } => write!(f, "{program} was killed"),
        }
    }
}

impl std::error::Error for CopyError {}

/// Clipboard writer: a route plus an optional tool to retry with.
#[derive(Debug, Clone)]
pub struct Clipboard {
    route: Route,
    fallback: Option<CopyTool>,
    payload_limit: usize,
}

impl Clipboard {
    /// OSC 52 only.
    #[must_use]
    pub const fn osc52() -> Self {
        Self::with_route(Route::Terminal, None)
    }

    /// Refuses every copy.
    #[must_use]
    pub const fn off() -> Self {
        Self::with_route(Route::Off, None)
    }

    const fn with_route(route: Route, fallback: Option<CopyTool>) -> Self {
        Self {
            route,
            fallback,
            payload_limit: OSC52_PAYLOAD_LIMIT,
        }
    }

    /// Route from the environment, falling back to the first usable tool.
    #[must_use]
    pub fn detect() -> Self {
        let pinned = env::var(ENV_CLIPBOARD_BACKEND).ok();
        let tool = CopyTool::CANDIDATES
            .into_iter()
            .find(|t| t.usable_here() && on_path(t.program()));
        let clipboard = Self::resolve(pinned.as_deref(), tool);
        info!(route = ?clipboard.route, fallback = ?clipboard.fallback, "clipboard ready");
        clipboard
    }

    /// Combine a pinned route name with the detected `tool`.
    ///
    /// Unknown names are ignored with a warning.
    #[must_use]
    pub fn resolve(pinned: Option<&str>, tool: Option<CopyTool>) -> Self {
        let Some(name) = pinned.map(str::to_ascii_lowercase) else {
            return Self::with_route(Route::Terminal, tool);
        };
        match name.as_str() {
            "osc52" => Self::osc52(),
            "none" => Self::off(),
            "macos" => Self::with_route(Route::Tool(CopyTool::Pbcopy), None),
            "windows" => Self::with_route(Route::Tool(CopyTool::Clip), None),
            "wayland" => Self::with_route(Route::Tool(CopyTool::WlCopy), None),
            // xsel stays as the retry when xclip is missing.
            "x11" => Self::with_route(Route::Tool(CopyTool::Xclip), Some(CopyTool::Xsel)),
            other => {
                warn!(value = other, "unknown {ENV_CLIPBOARD_BACKEND}; using OSC 52");
                Self::with_route(Route::Terminal, tool)
            }
        }
    }

    #[must_use]
    pub const fn with_payload_limit(mut self, limit: usize) -> Self {
        self.payload_limit = limit;
        self
    }

    #[must_use]
    pub const fn route(&self) -> Route {
        self.route
    }

    #[must_use]
    pub const fn fallback(&self) -> Option<CopyTool> {
        self.fallback
    }

    /// Copy `text`. The OSC 52 sequence, if any, is written to `out`.
    ///
    /// Copy tools run on a background thread that logs its own outcome, so
    /// this never waits on a child process.
    ///
    /// # Errors
    ///
    /// Returns the OSC 52 error when there is no tool to hand off to, or
    /// [`CopyError::Disabled`].
    pub fn set(&self, text: &str, out: &mut impl Write) -> Result<Delivery, CopyError> {
        let tools: Vec<CopyTool> = match self.route {
            Route::Off => return Err(CopyError::Disabled),
            Route::Terminal => match self.write_osc52(text, out) {
                Ok(()) => {
                    debug!(bytes = text.len(), "copied via OSC 52");
                    return Ok(Delivery::Terminal);
                }
                Err(err) => {
                    let Some(tool) = self.fallback else {
                        return Err(err);
                    };
                    debug!(error = %err, tool = tool.program(), "OSC 52 failed; handing off to tool");
                    vec![tool]
                }
            },
            Route::Tool(tool) => std::iter::once(tool).chain(self.fallback).collect(),
        };
        let text = text.to_owned();
        Ok(Delivery::Background(in_background(move || {
            copy_with_first_working(&tools, &text)
        })))
    }

    fn write_osc52(&self, text: &str, out: &mut impl Write) -> Result<(), CopyError> {
        let encoded = STANDARD.encode(text);
        if encoded.len() > self.payload_limit {
            return Err(CopyError::TooLarge {
                encoded: encoded.len(),
                limit: self.payload_limit,
            });
        }
        write!(out, "\x1b]52;c;{encoded}\x07")
            .and_then(|()| out.flush())
            .map_err(|e| CopyError::Io(e.to_string()))
    }
}

/// How an accepted copy is being delivered.
#[derive(Debug)]
pub enum Delivery {
    /// The OSC 52 sequence has been written.
    Terminal,
    /// A copy tool is running; join only in tests.
    Background(JoinHandle<Result<(), CopyError>>),
}

fn in_background<F>(job: F) -> JoinHandle<Result<(), CopyError>>
where
    F: FnOnce() -> Result<(), CopyError> + Send + 'static,
{
    thread::spawn(job)
}

// Tries each tool in turn; `tools` is never empty.
fn copy_with_first_working(tools: &[CopyTool], text: &str) -> Result<(), CopyError> {
    let mut last = Err(CopyError::Disabled);
    for &tool in tools {
        last = tool.copy(text);
        match &last {
            Ok(()) => {
                debug!(tool = tool.program(), bytes = text.len(), "copied via tool");
                break;
            }
            Err(err) => debug!(tool = tool.program(), error = %err, "copy tool failed"),
        }
    }
    last
}

fn on_path(program: &str) -> bool {
    if program.contains(std::path::MAIN_SEPARATOR) {
        return Path::new(program).is_file();
    }
    env::var_os("PATH").is_some_and(|paths| {
        env::split_paths(&paths).any(|dir| {
            dir.join(program).is_file()
                || (cfg!(windows) && dir.join(format!("{program}.exe")).is_file())
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn osc52_wraps_base64() {
        let mut out = Vec::new();
        let delivery = Clipboard::osc52().set("https://example.com", &mut out).unwrap();
        assert!(matches!(delivery, Delivery::Terminal));
        let expected = format!("\x1b]52;c;{}\x07", STANDARD.encode("https://example.com"));
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }

    #[test]
    fn payload_over_limit_writes_nothing() {
        let mut out = Vec::new();
        let err = Clipboard::osc52()
            .with_payload_limit(8)
            .set("https://example.com", &mut out)
            .unwrap_err();
        assert!(matches!(err, CopyError::TooLarge { limit: 8, .. }));
        assert!(out.is_empty());
    }

    #[test]
    fn off_refuses() {
        let mut out = Vec::new();
        assert!(matches!(
            Clipboard::off().set("x", &mut out),
            Err(CopyError::Disabled)
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn tool_route_returns_without_waiting() {
        let mut out = Vec::new();
        let delivery = Clipboard::resolve(Some("x11"), None).set("x", &mut out).unwrap();
        assert!(matches!(delivery, Delivery::Background(_)));
        assert!(out.is_empty());
    }

    #[test]
    fn osc52_failure_hands_off_to_fallback() {
        let mut out = Vec::new();
        let delivery = Clipboard::resolve(None, Some(CopyTool::Xclip))
            .with_payload_limit(4)
            .set("https://example.com", &mut out)
            .unwrap();
        assert!(matches!(delivery, Delivery::Background(_)));
        assert!(out.is_empty());
    }

    #[test]
    fn slow_copy_job_does_not_block_the_caller() {
        let (release, gate) = std::sync::mpsc::channel::<()>();
        let handle = in_background(move || {
            let _ = gate.recv();
            Ok(())
        });
        // The job is still parked on the gate, yet we are already here.
        assert!(!handle.is_finished());
        release.send(()).unwrap();
        assert_eq!(handle.join().unwrap(), Ok(()));
    }

    #[test]
    fn pinned_routes() {
        let xclip = Some(CopyTool::Xclip);
        let default = Clipboard::resolve(None, xclip);
        assert_eq!(default.route(), Route::Terminal);
        assert_eq!(default.fallback(), xclip);

        assert_eq!(Clipboard::resolve(Some("none"), xclip).route(), Route::Off);
        assert_eq!(
            Clipboard::resolve(Some("Wayland"), None).route(),
            Route::Tool(CopyTool::WlCopy)
        );
        assert_eq!(Clipboard::resolve(Some("osc52"), xclip).fallback(), None);
        assert_eq!(
            Clipboard::resolve(Some("x11"), None).fallback(),
            Some(CopyTool::Xsel)
        );
        assert_eq!(Clipboard::resolve(Some("bogus"), xclip).fallback(), xclip);
    }

    #[test]
    fn tool_arguments() {
        assert_eq!(CopyTool::Xclip.args(), ["-selection", "clipboard"]);
        assert!(CopyTool::Pbcopy.args().is_empty());
        assert_eq!(CopyTool::WlCopy.program(), "wl-copy");
    }

    #[test]
    fn error_messages() {
        assert_eq!(CopyError::Disabled.to_string(), "clipboard disabled");
        assert_eq!(
            CopyError::ToolFailed {
                program: "xclip",
                code: Some(1)
            }
            .to_string(),
            "xclip exited with status 1"
        );
        assert!(
            CopyError::TooLarge {
                encoded: 9,
                limit: 8
            }
            .to_string()
            .contains("exceeds 8")
        );
    }

    #[test]
    fn absolute_paths_are_checked_directly() {
        assert!(!on_path("/definitely/not/a/copy/tool"));
    }
}
