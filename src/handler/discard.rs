//! A handler that ignores every call. Useful for tests and for silencing
//! components.

use std::sync::Arc;

use crate::attr::Attr;
use crate::context::Context;
use crate::error::HandleError;
use crate::handler::Handler;
use crate::level::Level;
use crate::record::Record;

#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardHandler;

impl DiscardHandler {
    pub fn new() -> Self {
        Self
    }
}

impl Handler for DiscardHandler {
    fn enabled(&self, _ctx: &Context, _level: Level) -> bool {
        false
    }

    fn handle(&self, _ctx: &Context, _record: &Record) -> Result<(), HandleError> {
        Ok(())
    }

    fn with_attrs(self: Arc<Self>, _attrs: Vec<Attr>) -> Arc<dyn Handler> {
        self
    }

    fn with_group(self: Arc<Self>, _name: &str) -> Arc<dyn Handler> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_enabled() {
        let h = DiscardHandler::new();
        let ctx = Context::background();
        for level in [Level::DEBUG, Level::INFO, Level::WARN, Level::ERROR, Level(100)] {
            assert!(!h.enabled(&ctx, level));
        }
        assert!(h.handle(&ctx, &Record::new(Level::ERROR, "x")).is_ok());
    }

    #[test]
    fn test_derivations_return_same_instance() {
        let h: Arc<dyn Handler> = Arc::new(DiscardHandler::new());
        let with = h.clone().with_attrs(vec![Attr::int("a", 1)]);
        let grouped = h.clone().with_group("g");

        assert!(Arc::ptr_eq(&h, &with));
        assert!(Arc::ptr_eq(&h, &grouped));
    }
}
