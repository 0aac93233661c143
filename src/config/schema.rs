//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.
//! Fields missing from a file take the defaults listed on [`Config`].

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::attr::Attr;

/// Rewrites one non-group attribute before it is written.
///
/// Receives the names of the groups the attribute is nested in (empty for
/// top-level and built-in attributes). Returning `None` drops the attribute.
pub type ReplaceAttr = Arc<dyn Fn(&[String], Attr) -> Option<Attr> + Send + Sync>;

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Writer {
    #[default]
    Stderr,
    Stdout,
    /// `<out_path>/all.log`, recreated on every start.
    File,
}

/// Which handler formats the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HandlerKind {
    /// Human-readable, colored, multi-line.
    Dev,
    /// Same handler as `Dev`.
    Pretty,
    /// Drops every record.
    Discard,
    /// JSON or plain text, depending on `is_json`.
    #[default]
    Default,
}

/// Logger configuration.
///
/// Immutable once handed to [`Logger::new`](crate::Logger::new).
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Minimum level name: debug, info, warn or error.
    pub level: String,

    /// Include the call site of each logging statement.
    pub add_source: bool,

    /// JSON output for the default handler; plain text otherwise.
    pub is_json: bool,

    /// Output target.
    pub writer: Writer,

    /// Log directory when `writer` is `file`. Empty means `logs`.
    pub out_path: String,

    /// Install the logger as the process-wide default on construction.
    pub set_default: bool,

    /// Handler variant.
    #[serde(rename = "type")]
    pub kind: HandlerKind,

    /// Optional attribute rewrite hook. Not loadable from files.
    #[serde(skip)]
    pub replace_attr: Option<ReplaceAttr>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            add_source: true,
            is_json: true,
            writer: Writer::Stderr,
            out_path: String::new(),
            set_default: true,
            kind: HandlerKind::Default,
            replace_attr: None,
        }
    }
}

impl Config {
    /// Configuration of the lazily built process-wide default logger:
    /// info level, plain text on stderr, no source.
    pub fn fallback() -> Self {
        Self {
            add_source: false,
            is_json: false,
            ..Self::default()
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("level", &self.level)
            .field("add_source", &self.add_source)
            .field("is_json", &self.is_json)
            .field("writer", &self.writer)
            .field("out_path", &self.out_path)
            .field("set_default", &self.set_default)
            .field("kind", &self.kind)
            .field("replace_attr", &self.replace_attr.as_ref().map(|_| ".."))
            .finish()
    }
}

impl PartialEq for Config {
    /// Rewrite hooks compare by identity.
    fn eq(&self, other: &Self) -> bool {
        let same_hook = match (&self.replace_attr, &other.replace_attr) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        };
        same_hook
            && self.level == other.level
            && self.add_source == other.add_source
            && self.is_json == other.is_json
            && self.writer == other.writer
            && self.out_path == other.out_path
            && self.set_default == other.set_default
            && self.kind == other.kind
    }
}
