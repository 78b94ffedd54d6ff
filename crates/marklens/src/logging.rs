#![forbid(unsafe_code)]

//! Log setup.
//!
//! The terminal belongs to the UI, so logs only go to a file. Without a log
//! file no subscriber is installed and every `tracing` macro is a no-op.

use std::env;
use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Environment variable holding the filter directives.
pub const ENV_LOG: &str = "MARKLENS_LOG";

const DEFAULT_DIRECTIVES: &str = "info";

/// Filter from `directives`, falling back to `info` when absent or invalid.
#[must_use]
pub fn filter_from(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Install the global subscriber writing to `log_file`.
///
/// Returns `Ok(false)` when there is no log file or a subscriber is already
/// installed.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened for appending.
pub fn init(log_file: Option<&Path>) -> io::Result<bool> {
    let Some(path) = log_file else {
        return Ok(false);
    };
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let filter = filter_from(env::var(ENV_LOG).ok().as_deref());
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .is_ok();
    Ok(installed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_directives_fall_back() {
        assert_eq!(filter_from(None).to_string(), "info");
        assert_eq!(filter_from(Some("marklens=loudest")).to_string(), "info");
        assert_eq!(filter_from(Some("debug")).to_string(), "debug");
    }

    #[test]
    fn no_file_installs_nothing() {
        assert!(!init(None).unwrap());
    }

    #[test]
    fn events_reach_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("marklens.log");
        if init(Some(&path)).unwrap() {
            tracing::info!("log file check");
            let text = std::fs::read_to_string(&path).unwrap();
            assert!(text.contains("log file check"));
            assert!(!text.contains('\x1b'));
        }
        assert!(path.exists());
    }
}
