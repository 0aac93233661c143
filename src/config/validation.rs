//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic, including the closed
//!   `writer` and `type` enums)
//! - Check the level name against the known set
//! - Refuse file sinks whose directory cannot safely be recreated
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: Config → Result<(), Vec<ValidationError>>
//! - Runs on loaded configs only; programmatic configs with an unknown level
//!   are coerced to info by the logger

use std::path::{Component, Path};

use thiserror::Error;

use crate::config::schema::{Config, Writer};
use crate::level::Level;

/// A semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unknown level {0:?} (expected one of info, debug, error, warn)")]
    UnknownLevel(String),

    /// The file sink directory is removed recursively on startup, so it must
    /// name a real directory.
    #[error("out_path {0:?} cannot be used as a log directory")]
    UnsafeOutPath(String),
}

/// Check a loaded configuration.
pub fn validate_config(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if !Level::is_known_name(&config.level) {
        errors.push(ValidationError::UnknownLevel(config.level.clone()));
    }

    if config.writer == Writer::File && !config.out_path.is_empty() && !is_safe_dir(&config.out_path) {
        errors.push(ValidationError::UnsafeOutPath(config.out_path.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// A path is safe when it ends in a normal directory name.
fn is_safe_dir(path: &str) -> bool {
    matches!(Path::new(path).components().last(), Some(Component::Normal(_)))
}
