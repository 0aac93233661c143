//! Structured logging facade.
//!
//! A [`Logger`] is built from a [`Config`] that picks a minimum level, an
//! output (stderr, stdout, or a freshly created `all.log` file) and a handler
//! (text, JSON, pretty, or discard). Loggers travel through call chains inside
//! a [`Context`], and a process-wide default serves code that has none.
//!
//! ```text
//! Config ──▶ Logger::new ──▶ Output (stream | <out_path>/all.log)
//!                 │
//!                 ▼
//!          Arc<dyn Handler> ◀── with / with_group (new handler each time)
//!                 │
//! Context ──▶ l(ctx) ──▶ info / warn / ... ──▶ Record ──▶ handle
//! ```

pub mod attr;
pub mod bridge;
pub mod config;
pub mod context;
pub mod default;
pub mod error;
pub mod handler;
pub mod level;
pub mod logger;
pub mod output;
pub mod record;

pub use attr::{args_to_attrs, Arg, Attr, Value, BAD_KEY};
pub use bridge::{install_tracing_bridge, TracingBridge};
pub use config::{Config, HandlerKind, ReplaceAttr, Writer};
pub use context::{context_with_logger, current, l, scope, Context};
pub use default::{default, reset_default, set_default};
pub use error::{ConfigError, HandleError, SetupError};
pub use handler::{Handler, FATAL_SOURCE_KEY};
pub use level::Level;
pub use logger::Logger;
pub use record::{Record, Source};
