//! The logger façade.
//!
//! # Responsibilities
//! - Build the handler selected by the configuration
//! - Expose per-level logging methods that all route through one entry point
//! - Derive loggers with bound attributes or groups
//! - Log-then-exit for unrecoverable conditions
//!
//! # Design Decisions
//! - `with` and `with_group` return a new logger; the receiver is unchanged
//! - The call site is captured with `#[track_caller]`; handlers print it only
//!   when `add_source` is set
//! - Emission errors are swallowed: logging never fails the caller

use std::fmt;
use std::panic::Location;
use std::sync::Arc;

use crate::attr::{args_to_attrs, Arg, Attr};
use crate::config::{Config, HandlerKind, Writer};
use crate::context::Context;
use crate::default::set_default;
use crate::error::SetupError;
use crate::handler::{
    DiscardHandler, Handler, HandlerOptions, JsonHandler, PrettyHandler, PrettyOptions, TextHandler,
};
use crate::level::Level;
use crate::output::open_output;
use crate::record::{Record, Source};

/// Exit status used by `fatal` and `fatal_context`.
pub const FATAL_EXIT_CODE: i32 = 1;

/// A handler together with the configuration it was built from.
///
/// Cloning is cheap and clones share the handler chain.
#[derive(Clone)]
pub struct Logger {
    handler: Arc<dyn Handler>,
    config: Arc<Config>,
}

impl Logger {
    /// Build a logger from `config`, installing it as the process default
    /// when `config.set_default` is set.
    pub fn new(config: Config) -> Result<Logger, SetupError> {
        let handler = setup_handler(&config)?;

        tracing::debug!(
            kind = ?config.kind,
            writer = ?config.writer,
            level = %config.level,
            "Logger configured"
        );

        let logger = Logger {
            handler,
            config: Arc::new(config),
        };
        if logger.config.set_default {
            set_default(&logger);
        }
        Ok(logger)
    }

    /// Wrap a caller-supplied handler. Never installs a default.
    pub fn from_handler(handler: Arc<dyn Handler>, config: Config) -> Logger {
        Logger {
            handler,
            config: Arc::new(config),
        }
    }

    pub fn handler(&self) -> Arc<dyn Handler> {
        self.handler.clone()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Whether `a` and `b` are the same logger instance.
    pub fn ptr_eq(a: &Logger, b: &Logger) -> bool {
        Arc::ptr_eq(&a.handler, &b.handler) && Arc::ptr_eq(&a.config, &b.config)
    }

    /// A logger that includes `args` on every record.
    pub fn with(&self, args: &[Arg]) -> Logger {
        if args.is_empty() {
            return self.clone();
        }
        Logger {
            handler: self.handler.clone().with_attrs(args_to_attrs(args)),
            config: self.config.clone(),
        }
    }

    /// A logger that nests all subsequently added attributes under `name`.
    pub fn with_group(&self, name: &str) -> Logger {
        if name.is_empty() {
            return self.clone();
        }
        Logger {
            handler: self.handler.clone().with_group(name),
            config: self.config.clone(),
        }
    }

    pub fn enabled(&self, ctx: &Context, level: Level) -> bool {
        self.handler.enabled(ctx, level)
    }

    /// Log `msg` at `level`. `args` are read pairwise, see [`Arg`].
    #[track_caller]
    pub fn log(&self, ctx: &Context, level: Level, msg: &str, args: &[Arg]) {
        if !self.enabled(ctx, level) {
            return;
        }
        let source = Source::from(Location::caller());
        self.emit(ctx, level, msg, args_to_attrs(args), Some(source));
    }

    /// Like [`Logger::log`] with pre-built attributes.
    #[track_caller]
    pub fn log_attrs(&self, ctx: &Context, level: Level, msg: &str, attrs: &[Attr]) {
        if !self.enabled(ctx, level) {
            return;
        }
        let source = Source::from(Location::caller());
        self.emit(ctx, level, msg, attrs.to_vec(), Some(source));
    }

    #[track_caller]
    pub fn debug(&self, msg: &str, args: &[Arg]) {
        self.log(&Context::background(), Level::DEBUG, msg, args);
    }

    #[track_caller]
    pub fn debug_context(&self, ctx: &Context, msg: &str, args: &[Arg]) {
        self.log(ctx, Level::DEBUG, msg, args);
    }

    #[track_caller]
    pub fn info(&self, msg: &str, args: &[Arg]) {
        self.log(&Context::background(), Level::INFO, msg, args);
    }

    #[track_caller]
    pub fn info_context(&self, ctx: &Context, msg: &str, args: &[Arg]) {
        self.log(ctx, Level::INFO, msg, args);
    }

    #[track_caller]
    pub fn warn(&self, msg: &str, args: &[Arg]) {
        self.log(&Context::background(), Level::WARN, msg, args);
    }

    #[track_caller]
    pub fn warn_context(&self, ctx: &Context, msg: &str, args: &[Arg]) {
        self.log(ctx, Level::WARN, msg, args);
    }

    #[track_caller]
    pub fn error(&self, msg: &str, args: &[Arg]) {
        self.log(&Context::background(), Level::ERROR, msg, args);
    }

    #[track_caller]
    pub fn error_context(&self, ctx: &Context, msg: &str, args: &[Arg]) {
        self.log(ctx, Level::ERROR, msg, args);
    }

    /// Log at error level with a `fatal_source` attribute, then exit the
    /// process with status 1.
    #[track_caller]
    pub fn fatal(&self, msg: &str, args: &[Arg]) -> ! {
        self.fatal_context(&Context::background(), msg, args)
    }

    /// Like [`Logger::fatal`], with a context.
    #[track_caller]
    pub fn fatal_context(&self, ctx: &Context, msg: &str, args: &[Arg]) -> ! {
        let caller = Source::from(Location::caller());
        if self.enabled(ctx, Level::ERROR) {
            // The regular source would only repeat fatal_source.
            let record = Record::new(Level::ERROR, msg)
                .with_attrs(args_to_attrs(args))
                .with_fatal_source(caller);
            let _ = self.handler.handle(ctx, &record);
        }
        std::process::exit(FATAL_EXIT_CODE)
    }

    fn emit(&self, ctx: &Context, level: Level, msg: &str, attrs: Vec<Attr>, source: Option<Source>) {
        let mut record = Record::new(level, msg).with_attrs(attrs);
        record.source = source;
        let _ = self.handler.handle(ctx, &record);
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("handler", &self.handler)
            .field("config", &self.config)
            .finish()
    }
}

impl PartialEq for Logger {
    /// Same handler chain and equal configuration.
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.handler, &other.handler) && self.config == other.config
    }
}

/// Level for a configured level name. Unknown names become info.
fn level_for(name: &str) -> Level {
    if !name.is_empty() && !Level::is_known_name(name) {
        tracing::warn!(level = %name, "Unknown log level, using info");
    }
    Level::from_name(name)
}

fn handler_options(level: Level, config: &Config) -> HandlerOptions {
    HandlerOptions {
        add_source: config.add_source,
        level,
        replace_attr: config.replace_attr.clone(),
    }
}

/// Resolve output and build the handler selected by `config.kind`.
///
/// Output is resolved for every kind, so a discarding file logger still
/// starts with a fresh, empty log file.
fn setup_handler(config: &Config) -> Result<Arc<dyn Handler>, SetupError> {
    let level = level_for(&config.level);
    let opts = handler_options(level, config);
    let out = open_output(config)?;

    let handler: Arc<dyn Handler> = match config.kind {
        HandlerKind::Dev | HandlerKind::Pretty => {
            let pretty = PrettyOptions {
                color: config.writer != Writer::File,
                ..PrettyOptions::default()
            };
            Arc::new(PrettyHandler::new(out, opts, pretty))
        }
        HandlerKind::Discard => Arc::new(DiscardHandler::new()),
        HandlerKind::Default if config.is_json => Arc::new(JsonHandler::new(out, opts)),
        HandlerKind::Default => Arc::new(TextHandler::new(out, opts)),
    };
    Ok(handler)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{Output, SharedBuffer};

    fn json_logger(level: Level, add_source: bool) -> (Logger, SharedBuffer) {
        let (out, buf) = Output::buffer();
        let opts = HandlerOptions {
            add_source,
            level,
            replace_attr: None,
        };
        let config = Config {
            set_default: false,
            ..Config::default()
        };
        (Logger::from_handler(Arc::new(JsonHandler::new(out, opts)), config), buf)
    }

    fn lines(buf: &SharedBuffer) -> Vec<serde_json::Value> {
        buf.contents()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_level_methods_route_through_log() {
        let (log, buf) = json_logger(Level::DEBUG, false);
        log.debug("d", &[]);
        log.info("i", &[]);
        log.warn("w", &[]);
        log.error("e", &[]);

        let levels: Vec<String> = lines(&buf)
            .iter()
            .map(|v| v["level"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(levels, ["DEBUG", "INFO", "WARN", "ERROR"]);
    }

    #[test]
    fn test_records_below_minimum_are_dropped() {
        let (log, buf) = json_logger(Level::WARN, false);
        let ctx = Context::background();
        log.debug_context(&ctx, "d", &[]);
        log.info_context(&ctx, "i", &[]);
        log.warn_context(&ctx, "w", &[]);

        let out = lines(&buf);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0]["msg"], "w");
        assert!(!log.enabled(&ctx, Level::INFO));
        assert!(log.enabled(&ctx, Level::ERROR));
    }

    #[test]
    fn test_with_leaves_parent_unchanged() {
        let (log, buf) = json_logger(Level::INFO, false);
        let child = log.with(&["request_id".into(), "abc".into()]);

        child.info("from child", &[]);
        child.info("again", &["n".into(), 2.into()]);
        log.info("from parent", &[]);

        let out = lines(&buf);
        assert_eq!(out[0]["request_id"], "abc");
        assert_eq!(out[1]["request_id"], "abc");
        assert_eq!(out[1]["n"], 2);
        assert!(out[2].get("request_id").is_none());
        assert!(Logger::ptr_eq(&log, &log.with(&[])));
        assert_eq!(child.config(), log.config());
    }

    #[test]
    fn test_with_group() {
        let (log, buf) = json_logger(Level::INFO, false);
        log.with_group("http")
            .with(&[Attr::string("method", "GET").into()])
            .info("req", &["status".into(), 200.into()]);

        let out = lines(&buf);
        assert_eq!(out[0]["http"], serde_json::json!({"method": "GET", "status": 200}));
        assert!(Logger::ptr_eq(&log, &log.with_group("")));
    }

    #[test]
    fn test_source_is_the_calling_line() {
        let (log, buf) = json_logger(Level::INFO, true);
        let line = line!() + 1;
        log.info("here", &[]);

        let out = lines(&buf);
        assert_eq!(out[0]["source"]["line"], line);
        assert!(out[0]["source"]["file"].as_str().unwrap().ends_with("logger.rs"));
    }

    #[test]
    fn test_log_attrs() {
        let (log, buf) = json_logger(Level::INFO, false);
        log.log_attrs(
            &Context::background(),
            Level::WARN,
            "attrs",
            &[Attr::bool("cached", true)],
        );
        assert_eq!(lines(&buf)[0]["cached"], true);
    }

    #[test]
    fn test_config_selects_handler() {
        let discard = Logger::new(Config {
            kind: HandlerKind::Discard,
            set_default: false,
            ..Config::default()
        })
        .unwrap();
        assert!(!discard.enabled(&Context::background(), Level::ERROR));

        let text = Logger::new(Config {
            level: "no-such-level".into(),
            is_json: false,
            set_default: false,
            ..Config::default()
        })
        .unwrap();
        let ctx = Context::background();
        assert!(text.enabled(&ctx, Level::INFO));
        assert!(!text.enabled(&ctx, Level::DEBUG));
    }
}
