//! Severity levels.
//!
//! Levels are plain integers on a fixed-point scale so that custom levels can
//! sit between the named ones:
//!
//! ```text
//! DEBUG = -4    INFO = 0    WARN = 4    ERROR = 8
//! ```

use std::fmt;

/// Importance of a log record. Higher is more severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Level(pub i32);

impl Level {
    pub const DEBUG: Level = Level(-4);
    pub const INFO: Level = Level(0);
    pub const WARN: Level = Level(4);
    pub const ERROR: Level = Level(8);

    /// Map a symbolic level name to its numeric level.
    ///
    /// Unrecognized names fall back to [`Level::INFO`]; no error is signaled.
    pub fn from_name(name: &str) -> Level {
        match name {
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }

    /// Whether `name` is one of the four recognized level names.
    pub fn is_known_name(name: &str) -> bool {
        matches!(name, "debug" | "info" | "warn" | "error")
    }
}

impl Default for Level {
    fn default() -> Self {
        Level::INFO
    }
}

impl fmt::Display for Level {
    /// Named levels print bare; anything in between prints as an offset from
    /// the nearest named level below it, e.g. `INFO+2` or `DEBUG-1`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, base) = match self.0 {
            l if l < Level::INFO.0 => ("DEBUG", Level::DEBUG.0),
            l if l < Level::WARN.0 => ("INFO", Level::INFO.0),
            l if l < Level::ERROR.0 => ("WARN", Level::WARN.0),
            _ => ("ERROR", Level::ERROR.0),
        };
        match self.0 - base {
            0 => f.write_str(name),
            delta => write!(f, "{name}{delta:+}"),
        }
    }
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => Level(Level::DEBUG.0 - 4),
            tracing::Level::DEBUG => Level::DEBUG,
            tracing::Level::INFO => Level::INFO,
            tracing::Level::WARN => Level::WARN,
            tracing::Level::ERROR => Level::ERROR,
        }
    }
}
