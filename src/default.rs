//! The process-wide default logger.
//!
//! Until a logger is installed, [`default`] hands out a text logger on
//! stderr at info level. Installation is last-writer-wins.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::Config;
use crate::handler::{HandlerOptions, TextHandler};
use crate::level::Level;
use crate::logger::Logger;
use crate::output::Output;

static DEFAULT: Mutex<Option<Logger>> = Mutex::new(None);

fn slot() -> MutexGuard<'static, Option<Logger>> {
    DEFAULT.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The currently installed default logger.
pub fn default() -> Logger {
    slot().get_or_insert_with(fallback_logger).clone()
}

/// Install `logger` as the process default.
pub fn set_default(logger: &Logger) {
    *slot() = Some(logger.clone());
}

/// Drop the installed default. The next [`default`] call rebuilds the
/// stderr fallback.
pub fn reset_default() {
    *slot() = None;
}

// Built without emitting tracing events: the bridge may be the caller.
fn fallback_logger() -> Logger {
    let config = Config::fallback();
    let opts = HandlerOptions {
        add_source: config.add_source,
        level: Level::INFO,
        replace_attr: None,
    };
    Logger::from_handler(Arc::new(TextHandler::new(Output::stderr(), opts)), config)
}
