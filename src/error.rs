//! Error types for logger setup, configuration and record emission.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::validation::ValidationError;

/// Errors raised while establishing a logging sink.
///
/// These indicate a broken deployment environment (unwritable directory,
/// missing permissions). The caller decides whether to retry, fall back to a
/// stream sink, or terminate.
#[derive(Debug, Error)]
pub enum SetupError {
    /// The previous log directory could not be removed.
    #[error("failed to remove log directory {path}: {source}")]
    RemoveDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The log directory could not be created.
    #[error("failed to create log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The log file could not be opened.
    #[error("failed to open log file {path}: {source}")]
    OpenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A global `tracing` subscriber was already installed.
    #[error("a global tracing subscriber is already installed")]
    TracingInstalled,
}

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// An environment variable held a value that does not fit its field.
    #[error("invalid value {value:?} for {var}")]
    Env { var: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Error reported by [`Handler::handle`](crate::handler::Handler::handle).
///
/// The [`Logger`](crate::Logger) convenience methods never surface it.
#[derive(Debug, Error)]
pub enum HandleError {
    #[error("failed to write log record: {0}")]
    Io(#[from] std::io::Error),
}
