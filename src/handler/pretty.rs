//! Human-readable, multi-line output for development.
//!
//! ```text
//! [03:04:05.678] INFO  request done
//!   @ src/server.rs:88
//!   req:
//!     id: 7
//!   tags: [7]
//!     0: a
//!     ...
//!     4: e
//!     ... (2 more)
//!
//! ```
//!
//! # Design Decisions
//! - Keys are sorted at every nesting level
//! - Groups and collection values print as indented blocks
//! - Long arrays are cut after `max_slice_print_size` elements
//! - A blank line separates records

use std::fmt::Write as _;
use std::sync::Arc;

use colored::Colorize;

use crate::attr::{Attr, Value};
use crate::context::Context;
use crate::error::HandleError;
use crate::handler::{
    Handler, HandlerOptions, FATAL_SOURCE_KEY, LEVEL_KEY, MESSAGE_KEY, SOURCE_KEY, TIME_KEY,
};
use crate::level::Level;
use crate::output::Output;
use crate::record::Record;

const INDENT: &str = "  ";

/// Layout options for [`PrettyHandler`].
#[derive(Debug, Clone)]
pub struct PrettyOptions {
    /// Elements of an array printed before the rest are summarized.
    pub max_slice_print_size: usize,
    pub sort_keys: bool,
    /// Emit an empty line after each record.
    pub newline_after_log: bool,
    /// ANSI colors for level, keys and message.
    pub color: bool,
}

impl Default for PrettyOptions {
    fn default() -> Self {
        Self {
            max_slice_print_size: 5,
            sort_keys: true,
            newline_after_log: true,
            color: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PrettyHandler {
    opts: HandlerOptions,
    pretty: PrettyOptions,
    /// Bound attributes, already nested under the groups active when bound.
    bound: Vec<Attr>,
    groups: Vec<String>,
    out: Output,
}

impl PrettyHandler {
    pub fn new(out: Output, opts: HandlerOptions, pretty: PrettyOptions) -> Self {
        Self {
            opts,
            pretty,
            bound: Vec::new(),
            groups: Vec::new(),
            out,
        }
    }

    fn render(&self, record: &Record) -> String {
        let mut attrs = self.bound.clone();
        if let Some(src) = &record.fatal_source {
            attrs.push(Attr::string(FATAL_SOURCE_KEY, src.to_string()));
        }
        if !record.attrs.is_empty() {
            attrs.extend(nest(&self.groups, record.attrs.clone()));
        }
        let mut attrs = merge_groups(self.resolve(&mut Vec::new(), attrs));
        if self.pretty.sort_keys {
            sort_keys(&mut attrs);
        }

        let mut header = Vec::with_capacity(3);
        if let Some(time) = self.builtin(TIME_KEY, Value::Time(record.time)) {
            let time = match time {
                Value::Time(t) => t.format("%H:%M:%S%.3f").to_string(),
                other => other.to_string(),
            };
            header.push(format!("[{}]", self.paint(&time, Paint::Dim)));
        }
        if let Some(level) = self.builtin(LEVEL_KEY, Value::String(record.level.to_string())) {
            let label = format!("{:<5}", level.to_string());
            header.push(self.paint(&label, Paint::Level(record.level)));
        }
        if let Some(msg) = self.builtin(MESSAGE_KEY, Value::String(record.message.clone())) {
            header.push(self.paint(&msg.to_string(), Paint::Bold));
        }

        let mut buf = String::with_capacity(256);
        let _ = writeln!(buf, "{}", header.join(" "));

        if self.opts.add_source {
            let src = record
                .source
                .as_ref()
                .and_then(|src| self.builtin(SOURCE_KEY, Value::String(src.to_string())));
            if let Some(src) = src {
                let _ = writeln!(buf, "{INDENT}@ {}", self.paint(&src.to_string(), Paint::Dim));
            }
        }

        for attr in &attrs {
            self.render_attr(&mut buf, 1, attr);
        }

        if self.pretty.newline_after_log {
            buf.push('\n');
        }
        buf
    }

    /// A built-in after `replace_attr`, or `None` when it was dropped.
    fn builtin(&self, key: &str, value: Value) -> Option<Value> {
        self.opts
            .replace(&[], Attr::new(key, value))
            .filter(|a| !a.is_empty())
            .map(|a| a.value)
    }

    /// Apply `replace_attr` and drop empty groups.
    fn resolve(&self, path: &mut Vec<String>, attrs: Vec<Attr>) -> Vec<Attr> {
        let mut resolved = Vec::with_capacity(attrs.len());
        for attr in attrs {
            let Some(attr) = self.opts.replace(path, attr) else {
                continue;
            };
            if attr.is_empty() {
                continue;
            }
            match attr.value {
                Value::Group(children) => {
                    path.push(attr.key.clone());
                    let children = self.resolve(path, children);
                    path.pop();
                    if children.is_empty() {
                        continue;
                    }
                    if attr.key.is_empty() {
                        resolved.extend(children);
                    } else {
                        resolved.push(Attr::group(attr.key, children));
                    }
                }
                _ => resolved.push(attr),
            }
        }
        resolved
    }

    fn render_attr(&self, buf: &mut String, depth: usize, attr: &Attr) {
        let indent = INDENT.repeat(depth);
        let key = self.paint(&attr.key, Paint::Key);
        match &attr.value {
            Value::Group(children) => {
                let _ = writeln!(buf, "{indent}{key}:");
                for child in children {
                    self.render_attr(buf, depth + 1, child);
                }
            }
            Value::Any(json) => {
                let _ = write!(buf, "{indent}{key}: ");
                self.render_json(buf, depth, json);
            }
            Value::String(s) if s.is_empty() => {
                let _ = writeln!(buf, "{indent}{key}: \"\"");
            }
            value => {
                let _ = writeln!(buf, "{indent}{key}: {value}");
            }
        }
    }

    /// Write a JSON value whose key has already been written on the current line.
    fn render_json(&self, buf: &mut String, depth: usize, json: &serde_json::Value) {
        let indent = INDENT.repeat(depth + 1);
        match json {
            serde_json::Value::Array(items) => {
                let _ = writeln!(buf, "[{}]", items.len());
                let shown = items.len().min(self.pretty.max_slice_print_size);
                for (i, item) in items.iter().take(shown).enumerate() {
                    let _ = write!(buf, "{indent}{i}: ");
                    self.render_json(buf, depth + 1, item);
                }
                if items.len() > shown {
                    let _ = writeln!(buf, "{indent}... ({} more)", items.len() - shown);
                }
            }
            serde_json::Value::Object(map) => {
                let _ = writeln!(buf, "{{{}}}", map.len());
                let mut entries: Vec<_> = map.iter().collect();
                if self.pretty.sort_keys {
                    entries.sort_by(|a, b| a.0.cmp(b.0));
                }
                for (k, v) in entries {
                    let _ = write!(buf, "{indent}{}: ", self.paint(k, Paint::Key));
                    self.render_json(buf, depth + 1, v);
                }
            }
            serde_json::Value::String(s) => {
                let _ = writeln!(buf, "{s}");
            }
            other => {
                let _ = writeln!(buf, "{other}");
            }
        }
    }

    fn paint(&self, s: &str, paint: Paint) -> String {
        if !self.pretty.color {
            return s.to_string();
        }
        match paint {
            Paint::Dim => s.dimmed().to_string(),
            Paint::Bold => s.bold().to_string(),
            Paint::Key => s.cyan().to_string(),
            Paint::Level(level) if level < Level::INFO => s.blue().to_string(),
            Paint::Level(level) if level < Level::WARN => s.green().to_string(),
            Paint::Level(level) if level < Level::ERROR => s.yellow().to_string(),
            Paint::Level(_) => s.red().bold().to_string(),
        }
    }
}

#[derive(Clone, Copy)]
enum Paint {
    Dim,
    Bold,
    Key,
    Level(Level),
}

impl Handler for PrettyHandler {
    fn enabled(&self, _ctx: &Context, level: Level) -> bool {
        level >= self.opts.level
    }

    fn handle(&self, _ctx: &Context, record: &Record) -> Result<(), HandleError> {
        let buf = self.render(record);
        self.out.write_record(buf.as_bytes())?;
        Ok(())
    }

    fn with_attrs(self: Arc<Self>, attrs: Vec<Attr>) -> Arc<dyn Handler> {
        if attrs.is_empty() {
            return self;
        }
        let mut h2 = (*self).clone();
        h2.bound.extend(nest(&self.groups, attrs));
        Arc::new(h2)
    }

    fn with_group(self: Arc<Self>, name: &str) -> Arc<dyn Handler> {
        if name.is_empty() {
            return self;
        }
        let mut h2 = (*self).clone();
        h2.groups.push(name.to_string());
        Arc::new(h2)
    }
}

/// Wrap `attrs` in one group per entry of `groups`, outermost first.
fn nest(groups: &[String], attrs: Vec<Attr>) -> Vec<Attr> {
    groups
        .iter()
        .rev()
        .fold(attrs, |inner, name| vec![Attr::group(name.clone(), inner)])
}

/// Fold groups that share a key into the first occurrence.
fn merge_groups(attrs: Vec<Attr>) -> Vec<Attr> {
    let mut merged: Vec<Attr> = Vec::with_capacity(attrs.len());
    for attr in attrs {
        let pos = merged
            .iter()
            .position(|a| a.key == attr.key && a.value.is_group());
        match (pos, attr.value) {
            (Some(i), Value::Group(children)) => {
                if let Value::Group(into) = &mut merged[i].value {
                    into.extend(children);
                }
            }
            (_, value) => merged.push(Attr { key: attr.key, value }),
        }
    }
    for attr in &mut merged {
        if let Value::Group(children) = &mut attr.value {
            *children = merge_groups(std::mem::take(children));
        }
    }
    merged
}

fn sort_keys(attrs: &mut [Attr]) {
    attrs.sort_by(|a, b| a.key.cmp(&b.key));
    for attr in attrs {
        if let Value::Group(children) = &mut attr.value {
            sort_keys(children);
        }
    }
}
