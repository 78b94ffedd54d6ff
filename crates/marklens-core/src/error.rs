#![forbid(unsafe_code)]

//! Error taxonomy.
//!
//! | Error | Effect |
//! |-------|--------|
//! | [`LoadError`] | Fatal for the view: one message replaces everything |
//! | [`RenderError`] | Aggregate view falls back to the bar grid |
//!
//! A category selection that matches nothing is not an error; it yields an
//! empty list.

use std::fmt;
use std::io;

/// Failure to obtain a usable dataset.
#[derive(Debug)]
pub enum LoadError {
    /// The source could not be read.
    Io(io::Error),
    /// The payload is not valid JSON for the dataset shape.
    Parse {
        line: usize,
        column: usize,
        message: String,
    },
    /// Well-formed JSON that violates a dataset invariant.
    Invalid(String),
}

impl LoadError {
    /// Short message suitable for the single on-screen error line.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Io(err) if err.kind() == io::ErrorKind::NotFound => {
                "Failed to load bookmarks: data file not found".to_string()
            }
            _ => format!("Failed to load bookmarks: {self}"),
        }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "read failed: {err}"),
            Self::Parse {
                line,
                column,
                message,
            } => write!(f, "malformed data at line {line}, column {column}: {message}"),
            Self::Invalid(msg) => write!(f, "inconsistent data: {msg}"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for LoadError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for LoadError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            return Self::Io(io::Error::other(err.to_string()));
        }
        Self::Parse {
            line: err.line(),
            column: err.column(),
            message: err.to_string(),
        }
    }
}

/// Failure of an aggregate renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The layout engine capability is switched off.
    DependencyMissing,
    /// There is nothing to lay out.
    NoData,
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DependencyMissing => write!(f, "layout engine unavailable"),
            Self::NoData => write!(f, "no categories to lay out"),
        }
    }
}

impl std::error::Error for RenderError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_has_friendly_message() {
        let err = LoadError::Io(io::Error::new(io::ErrorKind::NotFound, "nope"));
        assert_eq!(
            err.user_message(),
            "Failed to load bookmarks: data file not found"
        );
    }

    #[test]
    fn parse_error_carries_position() {
        let json_err = serde_json::from_str::<serde_json::Value>("{\n  oops").unwrap_err();
        let err = LoadError::from(json_err);
        match err {
            LoadError::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn io_error_has_source() {
        use std::error::Error as _;
        let err = LoadError::from(io::Error::other("boom"));
        assert!(err.source().is_some());
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn render_error_display() {
        assert_eq!(
            RenderError::DependencyMissing.to_string(),
            "layout engine unavailable"
        );
        assert_eq!(RenderError::NoData.to_string(), "no categories to lay out");
    }
}
