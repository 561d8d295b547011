//! Error types for the braille display manager.
//!
//! Translation failures and out-of-range pans never surface through these
//! types to the display pipeline; they are recovered or reported as outcomes.
//! What remains are configuration problems and commands sent to a manager
//! that has already stopped.

use std::path::PathBuf;

use thiserror::Error;

/// Failure reported by a [`crate::translate::Translator`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TranslationError {
    /// No braille table is loaded.
    #[error("no braille table loaded")]
    NoTable,

    /// The table could not translate the given text.
    #[error("table {table} failed to translate: {reason}")]
    Failed { table: String, reason: String },
}

/// Problems loading or validating a [`crate::config::DisplayConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Errors returned by the [`crate::manager::DisplayManager`] handle.
#[derive(Debug, Error)]
pub enum DisplayError {
    /// The display worker has stopped and no longer accepts commands.
    #[error("display manager is not running")]
    NotRunning,
}
