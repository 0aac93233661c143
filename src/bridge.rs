//! Forwarding of `tracing` events into the logger.
//!
//! # Data Flow
//! ```text
//! tracing::info!(..)
//!     → EnvFilter (RUST_LOG, everything when unset)
//!     → TracingBridge::on_event
//!         → logger of the current task context, or the default
//!         → Handler::handle
//! ```
//!
//! Events emitted by this crate itself are never forwarded, so a handler
//! that logs through `tracing` cannot loop back into itself.

use std::fmt;

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context as LayerContext, Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::attr::Attr;
use crate::context::{current, l};
use crate::error::SetupError;
use crate::level::Level;
use crate::record::{Record, Source};

const OWN_TARGET: &str = env!("CARGO_CRATE_NAME");

/// A `tracing_subscriber` layer that re-emits events as log records.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingBridge;

impl TracingBridge {
    pub fn new() -> Self {
        Self
    }
}

impl<S: Subscriber> Layer<S> for TracingBridge {
    fn on_event(&self, event: &Event<'_>, _ctx: LayerContext<'_, S>) {
        let meta = event.metadata();
        if is_own_target(meta.target()) {
            return;
        }

        let ctx = current();
        let logger = l(&ctx);
        let level = Level::from(*meta.level());
        if !logger.enabled(&ctx, level) {
            return;
        }

        let mut fields = FieldVisitor::default();
        event.record(&mut fields);

        let mut record = Record::new(level, fields.message.unwrap_or_default()).with_attrs(fields.attrs);
        if let (Some(file), Some(line)) = (meta.file(), meta.line()) {
            record = record.with_source(Source::new(file, line));
        }
        let _ = logger.handler().handle(&ctx, &record);
    }
}

fn is_own_target(target: &str) -> bool {
    match target.strip_prefix(OWN_TARGET) {
        Some(rest) => rest.is_empty() || rest.starts_with("::"),
        None => false,
    }
}

/// Collects event fields; the `message` field becomes the record message.
#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    attrs: Vec<Attr>,
}

impl FieldVisitor {
    fn push(&mut self, field: &Field, attr: Attr) {
        if field.name() == "message" {
            self.message = Some(attr.value.to_string());
        } else {
            self.attrs.push(attr);
        }
    }
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.push(field, Attr::string(field.name(), value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.push(field, Attr::int(field.name(), value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.push(field, Attr::uint(field.name(), value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.push(field, Attr::float(field.name(), value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.push(field, Attr::bool(field.name(), value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.push(field, Attr::string(field.name(), value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.push(field, Attr::string(field.name(), format!("{value:?}")));
    }
}

/// Install a global `tracing` subscriber that forwards events into the
/// logger attached to the current context (or the default).
///
/// `RUST_LOG` narrows which events reach the bridge. Fails if a global
/// subscriber is already set.
pub fn install_tracing_bridge() -> Result<(), SetupError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trace"));
    tracing_subscriber::registry()
        .with(filter)
        .with(TracingBridge::new())
        .try_init()
        .map_err(|_| SetupError::TracingInstalled)
}
