//! Error types for arxiv-digest.
//!
//! Library crates use [`DigestError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all arxiv-digest operations.
#[derive(Debug, thiserror::Error)]
pub enum DigestError {
    /// Missing or invalid configuration (keyword source, webhook URL, config file).
    #[error("config error: {message}")]
    Config { message: String },

    /// The listing feed was unreachable, returned an error status, or had no entries.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// Malformed feed document, entry, or timestamp.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// The notification endpoint answered with a non-2xx status.
    #[error("delivery error: HTTP {status}: {body}")]
    Delivery { status: u16, body: String },

    /// Transport-level failure outside the feed fetch.
    #[error("network error: {0}")]
    Network(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DigestError>;

impl DigestError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a fetch error from any displayable message.
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Render an error and every `source()` beneath it, joined with `": "`.
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    std::iter::successors(Some(err), |e| e.source())
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(": ")
}
