//! Pluggable record handlers.
//!
//! # Data Flow
//! ```text
//! Logger::log
//!     → Handler::enabled (level gate; skip argument work when false)
//!     → Record (time, level, msg, attrs, source)
//!     → Handler::handle
//!         → encoder (text.rs / json.rs / pretty.rs)
//!         → Output::write_record (one locked write per record)
//! ```
//!
//! # Design Decisions
//! - Handlers are immutable; `with_attrs` and `with_group` return new values
//! - Text and JSON share one encoder core (`common.rs`) that pre-formats
//!   bound attributes once, at `with_attrs` time
//! - The variant set is closed at the configuration level
//!   ([`HandlerKind`](crate::config::HandlerKind)) but open at the trait level,
//!   so callers can plug in their own handler via
//!   [`Logger::from_handler`](crate::Logger::from_handler)

mod common;
pub mod discard;
pub mod json;
pub mod pretty;
pub mod text;

use std::fmt;
use std::sync::Arc;

use crate::attr::Attr;
use crate::config::ReplaceAttr;
use crate::context::Context;
use crate::error::HandleError;
use crate::level::Level;
use crate::record::Record;

pub use discard::DiscardHandler;
pub use json::JsonHandler;
pub use pretty::{PrettyHandler, PrettyOptions};
pub use text::TextHandler;

/// A sink that formats and emits log records.
pub trait Handler: Send + Sync + fmt::Debug {
    /// Whether a record at `level` would be emitted.
    fn enabled(&self, ctx: &Context, level: Level) -> bool;

    /// Emit one record. Each call writes one complete unit to the sink.
    fn handle(&self, ctx: &Context, record: &Record) -> Result<(), HandleError>;

    /// A handler that adds `attrs` to every future record.
    fn with_attrs(self: Arc<Self>, attrs: Vec<Attr>) -> Arc<dyn Handler>;

    /// A handler that nests every subsequently added attribute under `name`.
    fn with_group(self: Arc<Self>, name: &str) -> Arc<dyn Handler>;
}

/// Options shared by the formatting handlers.
#[derive(Clone, Default)]
pub struct HandlerOptions {
    /// Print the call site of each record.
    pub add_source: bool,
    /// Minimum level emitted.
    pub level: Level,
    pub replace_attr: Option<ReplaceAttr>,
}

impl fmt::Debug for HandlerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerOptions")
            .field("add_source", &self.add_source)
            .field("level", &self.level)
            .field("replace_attr", &self.replace_attr.is_some())
            .finish()
    }
}

impl HandlerOptions {
    pub(crate) fn replace(&self, groups: &[String], attr: Attr) -> Option<Attr> {
        match &self.replace_attr {
            Some(rep) if !attr.value.is_group() => rep(groups, attr),
            _ => Some(attr),
        }
    }
}

/// Built-in attribute keys.
pub const TIME_KEY: &str = "time";
pub const LEVEL_KEY: &str = "level";
pub const SOURCE_KEY: &str = "source";
pub const MESSAGE_KEY: &str = "msg";

/// Call site of a `fatal` call, always at the top level.
pub const FATAL_SOURCE_KEY: &str = "fatal_source";
