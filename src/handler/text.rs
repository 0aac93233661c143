//! Plain `key=value` output, one line per record.
//!
//! ```text
//! time=2025-01-02T03:04:05.678Z level=INFO msg="request done" req.id=7 status=200
//! ```

use std::sync::Arc;

use crate::attr::Attr;
use crate::context::Context;
use crate::error::HandleError;
use crate::handler::common::CommonHandler;
use crate::handler::{Handler, HandlerOptions};
use crate::level::Level;
use crate::output::Output;
use crate::record::Record;

#[derive(Debug, Clone)]
pub struct TextHandler {
    inner: CommonHandler,
}

impl TextHandler {
    pub fn new(out: Output, opts: HandlerOptions) -> Self {
        Self {
            inner: CommonHandler::new(out, opts, false),
        }
    }
}

impl Handler for TextHandler {
    fn enabled(&self, _ctx: &Context, level: Level) -> bool {
        level >= self.inner.opts.level
    }

    fn handle(&self, _ctx: &Context, record: &Record) -> Result<(), HandleError> {
        self.inner.handle(record)
    }

    fn with_attrs(self: Arc<Self>, attrs: Vec<Attr>) -> Arc<dyn Handler> {
        Arc::new(Self {
            inner: self.inner.with_attrs(&attrs),
        })
    }

    fn with_group(self: Arc<Self>, name: &str) -> Arc<dyn Handler> {
        if name.is_empty() {
            return self;
        }
        Arc::new(Self {
            inner: self.inner.with_group(name),
        })
    }
}
