//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML/JSON) + LOGGER_* environment
//!     → loader.rs (parse, deserialize, env overlay)
//!     → validation.rs (semantic checks)
//!     → Config (validated, immutable)
//!     → Logger::new
//! ```
//!
//! # Design Decisions
//! - Config is immutable once handed to a logger
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{apply_env, load_config, load_config_with_env};
pub use schema::{Config, HandlerKind, ReplaceAttr, Writer};
pub use validation::{validate_config, ValidationError};
