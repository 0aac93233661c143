//! Log records.

use std::panic::Location;

use chrono::{DateTime, Utc};

use crate::attr::Attr;
use crate::level::Level;

/// Call site of a logging statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub file: String,
    pub line: u32,
}

impl Source {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl From<&Location<'_>> for Source {
    fn from(loc: &Location<'_>) -> Self {
        Self::new(loc.file(), loc.line())
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// One logging event, built per call and handed to a handler.
#[derive(Debug, Clone)]
pub struct Record {
    pub time: DateTime<Utc>,
    pub level: Level,
    pub message: String,
    pub attrs: Vec<Attr>,
    pub source: Option<Source>,
    /// Call site of a `fatal` call. Written at the top level, next to the
    /// built-ins, regardless of open groups.
    pub fatal_source: Option<Source>,
}

impl Record {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            time: Utc::now(),
            level,
            message: message.into(),
            attrs: Vec::new(),
            source: None,
            fatal_source: None,
        }
    }

    pub fn with_attrs(mut self, attrs: impl IntoIterator<Item = Attr>) -> Self {
        self.attrs.extend(attrs);
        self
    }

    pub fn with_source(mut self, source: Source) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_fatal_source(mut self, source: Source) -> Self {
        self.fatal_source = Some(source);
        self
    }
}
