//! One JSON object per line.
//!
//! ```text
//! {"time":"2025-01-02T03:04:05.678Z","level":"INFO","msg":"done","req":{"id":7}}
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
pub struct JsonHandler {
    inner: CommonHandler,
}

impl JsonHandler {
    pub fn new(out: Output, opts: HandlerOptions) -> Self {
        Self {
            inner: CommonHandler::new(out, opts, true),
        }
    }
}

impl Handler for JsonHandler {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{SOURCE_KEY, TIME_KEY};
    use crate::output::SharedBuffer;
    use crate::record::Source;
    use serde_json::{json, Value as Json};
    use std::time::Duration;

    fn handler(opts: HandlerOptions) -> (Arc<dyn Handler>, SharedBuffer) {
        let (out, buf) = Output::buffer();
        (Arc::new(JsonHandler::new(out, opts)), buf)
    }

    fn emit(h: &Arc<dyn Handler>, record: Record) {
        h.handle(&Context::background(), &record).unwrap();
    }

    fn parse_lines(buf: &SharedBuffer) -> Vec<Json> {
        buf.contents()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_builtins_and_value_encoding() {
        let (h, buf) = handler(HandlerOptions {
            add_source: true,
            ..HandlerOptions::default()
        });
        emit(
            &h,
            Record::new(Level::WARN, "slow")
                .with_attrs([
                    Attr::duration("elapsed", Duration::from_millis(1500)),
                    Attr::float("ratio", 0.5),
                    Attr::any("tags", vec!["a", "b"]),
                    Attr::string("quote", "say \"hi\""),
                ])
                .with_source(Source::new("src/lib.rs", 9)),
        );

        let v = &parse_lines(&buf)[0];
        assert!(v["time"].as_str().unwrap().ends_with('Z'));
        assert_eq!(v["level"], "WARN");
        assert_eq!(v["msg"], "slow");
        assert_eq!(v["source"], json!({"file": "src/lib.rs", "line": 9}));
        assert_eq!(v["elapsed"], 1_500_000_000u64);
        assert_eq!(v["ratio"], 0.5);
        assert_eq!(v["tags"], json!(["a", "b"]));
        assert_eq!(v["quote"], "say \"hi\"");
    }

    #[test]
    fn test_insertion_order() {
        let (h, buf) = handler(HandlerOptions::default());
        let h = h.with_attrs(vec![Attr::int("z", 1)]);
        emit(
            &h,
            Record::new(Level::INFO, "m").with_attrs([Attr::int("b", 2), Attr::int("a", 3)]),
        );

        let line = buf.contents();
        let keys = ["\"time\"", "\"level\"", "\"msg\"", "\"z\"", "\"b\"", "\"a\""];
        let positions: Vec<usize> = keys.iter().map(|k| line.find(k).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_nested_groups() {
        let (h, buf) = handler(HandlerOptions::default());
        let h = h
            .with_group("req")
            .with_attrs(vec![Attr::int("id", 7)])
            .with_group("resp");

        emit(
            &h,
            Record::new(Level::INFO, "done").with_attrs([Attr::int("status", 200)]),
        );
        emit(&h, Record::new(Level::INFO, "bare"));

        let lines = parse_lines(&buf);
        assert_eq!(lines[0]["req"], json!({"id": 7, "resp": {"status": 200}}));
        assert_eq!(lines[1]["req"], json!({"id": 7}));
    }

    #[test]
    fn test_group_without_attrs_is_omitted() {
        let (h, buf) = handler(HandlerOptions::default());
        let h = h.with_group("empty");
        emit(&h, Record::new(Level::INFO, "m"));
        emit(
            &h,
            Record::new(Level::INFO, "m").with_attrs([Attr::group("g", vec![])]),
        );

        for v in parse_lines(&buf) {
            assert!(v.get("empty").is_none());
            assert!(v.get("g").is_none());
        }
    }

    #[test]
    fn test_inline_group_with_empty_key() {
        let (h, buf) = handler(HandlerOptions::default());
        emit(
            &h,
            Record::new(Level::INFO, "m")
                .with_attrs([Attr::group("", vec![Attr::int("a", 1), Attr::int("b", 2)])]),
        );

        let v = &parse_lines(&buf)[0];
        assert_eq!(v["a"], 1);
        assert_eq!(v["b"], 2);
    }

    #[test]
    fn test_replace_attr_can_remove_everything_in_group() {
        let (h, buf) = handler(HandlerOptions {
            replace_attr: Some(Arc::new(|groups: &[String], a: Attr| {
                if groups.first().map(String::as_str) == Some("secret") {
                    None
                } else {
                    Some(a)
                }
            })),
            ..HandlerOptions::default()
        });
        let h = h.with_group("secret");
        emit(
            &h,
            Record::new(Level::INFO, "m").with_attrs([Attr::string("token", "abc")]),
        );

        let v = &parse_lines(&buf)[0];
        assert_eq!(v["msg"], "m");
        assert!(v.get("secret").is_none());
    }

    #[test]
    fn test_replace_attr_drops_source_and_time() {
        let (h, buf) = handler(HandlerOptions {
            add_source: true,
            replace_attr: Some(Arc::new(|groups: &[String], a: Attr| {
                let builtin = groups.is_empty() && (a.key == SOURCE_KEY || a.key == TIME_KEY);
                (!builtin).then_some(a)
            })),
            ..HandlerOptions::default()
        });
        emit(
            &h,
            Record::new(Level::INFO, "m").with_source(Source::new("a.rs", 1)),
        );

        assert_eq!(buf.contents(), "{\"level\":\"INFO\",\"msg\":\"m\"}\n");
    }

    #[test]
    fn test_replace_attr_sees_whole_source() {
        let (h, buf) = handler(HandlerOptions {
            add_source: true,
            replace_attr: Some(Arc::new(|_: &[String], a: Attr| {
                if a.key == SOURCE_KEY {
                    Some(Attr::string(SOURCE_KEY, "hidden"))
                } else {
                    Some(a)
                }
            })),
            ..HandlerOptions::default()
        });
        emit(
            &h,
            Record::new(Level::INFO, "m").with_source(Source::new("a.rs", 1)),
        );

        assert_eq!(parse_lines(&buf)[0]["source"], "hidden");
    }

    #[test]
    fn test_fatal_source_stays_outside_groups() {
        let (h, buf) = handler(HandlerOptions::default());
        let h = h.with_group("req").with_attrs(vec![Attr::int("id", 7)]);
        emit(
            &h,
            Record::new(Level::ERROR, "boom")
                .with_attrs([Attr::int("code", 3)])
                .with_fatal_source(Source::new("src/main.rs", 9)),
        );

        let v = &parse_lines(&buf)[0];
        assert_eq!(v["fatal_source"], "src/main.rs:9");
        assert_eq!(v["req"], json!({"id": 7, "code": 3}));
    }

    #[test]
    fn test_concurrent_records_stay_whole() {
        let (h, buf) = handler(HandlerOptions::default());
        std::thread::scope(|s| {
            for t in 0..8 {
                let h = h.clone();
                s.spawn(move || {
                    for i in 0..50 {
                        emit(
                            &h,
                            Record::new(Level::INFO, "tick")
                                .with_attrs([Attr::int("t", t), Attr::int("i", i)]),
                        );
                    }
                });
            }
        });

        let lines = parse_lines(&buf);
        assert_eq!(lines.len(), 400);
        assert!(lines.iter().all(|v| v["msg"] == "tick"));
    }
}
