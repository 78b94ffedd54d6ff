#![forbid(unsafe_code)]

//! marklens: terminal bookmark browser.
//!
//! # Role in marklens
//! The binary crate wires the core, layout, and render crates to a real
//! terminal: an Elm-style [`runtime`] drives the [`app`] model, the
//! [`session`] owns raw mode and input, and the [`present`] module turns
//! frames into escape sequences.
//!
//! # Key Components
//!
//! - [`app::App`] - the model: keys, mouse, search debounce, graph animation
//! - [`runtime::Program`] / [`runtime::Simulator`] - live and headless drivers
//! - [`clipboard::Clipboard`] - OSC 52 with external tool fallback
//! - [`cli::Opts`] - flags and `MARKLENS_*` environment overrides

pub mod app;
pub mod cli;
pub mod clipboard;
pub mod event;
pub mod logging;
pub mod present;
pub mod runtime;
pub mod session;
