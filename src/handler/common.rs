//! Encoder core shared by the text and JSON handlers.
//!
//! Bound attributes are encoded once, when they are bound, and copied into
//! every record. Groups opened by `with_group` are written lazily: a group is
//! only opened when an attribute actually lands in it, so a group with no
//! attributes never shows up in the output.

use crate::attr::{Attr, Value};
use crate::error::HandleError;
use crate::handler::{
    HandlerOptions, FATAL_SOURCE_KEY, LEVEL_KEY, MESSAGE_KEY, SOURCE_KEY, TIME_KEY,
};
use crate::output::Output;
use crate::record::Record;

#[derive(Debug, Clone)]
pub(crate) struct CommonHandler {
    pub(crate) opts: HandlerOptions,
    json: bool,
    /// Encoded bound attributes, including the headers of groups opened
    /// before them.
    preformatted: String,
    /// Dotted key prefix of the opened groups (text only).
    group_prefix: String,
    /// Every group from `with_group`, outermost first.
    groups: Vec<String>,
    /// How many of `groups` are already opened inside `preformatted`.
    n_open_groups: usize,
    out: Output,
}

impl CommonHandler {
    pub(crate) fn new(out: Output, opts: HandlerOptions, json: bool) -> Self {
        Self {
            opts,
            json,
            preformatted: String::new(),
            group_prefix: String::new(),
            groups: Vec::new(),
            n_open_groups: 0,
            out,
        }
    }

    pub(crate) fn with_attrs(&self, attrs: &[Attr]) -> Self {
        let all_empty_groups = attrs
            .iter()
            .all(|a| matches!(&a.value, Value::Group(g) if g.is_empty()));
        if all_empty_groups {
            return self.clone();
        }

        let mut h2 = self.clone();
        let mut buf = std::mem::take(&mut h2.preformatted);
        let sep = if buf.is_empty() { "" } else { self.attr_sep() };

        let mut state = State {
            opts: &self.opts,
            json: self.json,
            buf: &mut buf,
            sep,
            prefix: self.group_prefix.clone(),
            groups: self.groups[..self.n_open_groups].to_vec(),
        };

        let pos = state.buf.len();
        state.open_groups(&self.groups[self.n_open_groups..]);
        if state.append_attrs(attrs) {
            h2.group_prefix = state.prefix;
            h2.n_open_groups = h2.groups.len();
        } else {
            buf.truncate(pos);
        }

        h2.preformatted = buf;
        h2
    }

    pub(crate) fn with_group(&self, name: &str) -> Self {
        let mut h2 = self.clone();
        h2.groups.push(name.to_string());
        h2
    }

    pub(crate) fn handle(&self, record: &Record) -> Result<(), HandleError> {
        let mut buf = String::with_capacity(256);
        let mut state = State {
            opts: &self.opts,
            json: self.json,
            buf: &mut buf,
            sep: "",
            prefix: String::new(),
            groups: Vec::new(),
        };

        if self.json {
            state.buf.push('{');
        }

        // Built-ins live at the top level, outside any group.
        state.append_attr(Attr::new(TIME_KEY, Value::Time(record.time)));
        state.append_attr(Attr::string(LEVEL_KEY, record.level.to_string()));
        if self.opts.add_source {
            if let Some(src) = &record.source {
                // Not a group, so `replace_attr` sees `source` as one attribute.
                let value = if self.json {
                    Value::Any(serde_json::json!({ "file": &src.file, "line": src.line }))
                } else {
                    Value::String(src.to_string())
                };
                state.append_attr(Attr::new(SOURCE_KEY, value));
            }
        }
        state.append_attr(Attr::string(MESSAGE_KEY, record.message.clone()));
        if let Some(src) = &record.fatal_source {
            state.append_attr(Attr::string(FATAL_SOURCE_KEY, src.to_string()));
        }

        if !self.preformatted.is_empty() {
            state.buf.push_str(state.sep);
            state.buf.push_str(&self.preformatted);
            state.sep = self.attr_sep();
            if self.json && self.preformatted.ends_with('{') {
                state.sep = "";
            }
        }

        let mut n_open_groups = self.n_open_groups;
        if !record.attrs.is_empty() {
            state.prefix = self.group_prefix.clone();
            state.groups = self.groups[..self.n_open_groups].to_vec();

            let pos = state.buf.len();
            let sep = state.sep;
            state.open_groups(&self.groups[self.n_open_groups..]);
            n_open_groups = self.groups.len();

            if !state.append_attrs(&record.attrs) {
                state.buf.truncate(pos);
                state.sep = sep;
                n_open_groups = self.n_open_groups;
            }
        }

        if self.json {
            for _ in 0..n_open_groups {
                state.buf.push('}');
            }
            state.buf.push('}');
        }
        state.buf.push('\n');

        self.out.write_record(buf.as_bytes())?;
        Ok(())
    }

    fn attr_sep(&self) -> &'static str {
        if self.json {
            ","
        } else {
            " "
        }
    }
}

/// Per-encoding scratch state.
struct State<'a> {
    opts: &'a HandlerOptions,
    json: bool,
    buf: &'a mut String,
    sep: &'static str,
    /// Dotted prefix for text keys.
    prefix: String,
    /// Group path handed to `replace_attr`.
    groups: Vec<String>,
}

impl State<'_> {
    fn attr_sep(&self) -> &'static str {
        if self.json {
            ","
        } else {
            " "
        }
    }

    fn open_groups(&mut self, names: &[String]) {
        for name in names {
            self.open_group(name);
        }
    }

    fn open_group(&mut self, name: &str) {
        if self.json {
            self.append_key(name);
            self.buf.push('{');
            self.sep = "";
        } else {
            self.prefix.push_str(name);
            self.prefix.push('.');
        }
        self.groups.push(name.to_string());
    }

    fn close_group(&mut self, name: &str) {
        if self.json {
            self.buf.push('}');
        } else {
            let len = self.prefix.len() - name.len() - 1;
            self.prefix.truncate(len);
        }
        self.sep = self.attr_sep();
        self.groups.pop();
    }

    /// Returns whether anything was written.
    fn append_attrs(&mut self, attrs: &[Attr]) -> bool {
        let mut nonempty = false;
        for a in attrs {
            if self.append_attr(a.clone()) {
                nonempty = true;
            }
        }
        nonempty
    }

    /// Returns whether anything was written.
    fn append_attr(&mut self, attr: Attr) -> bool {
        let Some(attr) = self.opts.replace(&self.groups, attr) else {
            return false;
        };
        if attr.is_empty() {
            return false;
        }

        match &attr.value {
            Value::Group(attrs) => {
                if attrs.is_empty() {
                    return false;
                }
                let pos = self.buf.len();
                let sep = self.sep;
                // A group with an empty key is inlined.
                let named = !attr.key.is_empty();
                if named {
                    self.open_group(&attr.key);
                }
                let wrote = self.append_attrs(attrs);
                if named {
                    self.close_group(&attr.key);
                }
                if !wrote {
                    self.buf.truncate(pos);
                    self.sep = sep;
                }
                wrote
            }
            value => {
                self.append_key(&attr.key);
                self.append_value(value);
                true
            }
        }
    }

    fn append_key(&mut self, key: &str) {
        self.buf.push_str(self.sep);
        if self.prefix.is_empty() {
            self.append_string(key);
        } else {
            let full = format!("{}{}", self.prefix, key);
            self.append_string(&full);
        }
        self.buf.push(if self.json { ':' } else { '=' });
        self.sep = self.attr_sep();
    }

    fn append_string(&mut self, s: &str) {
        if self.json {
            self.buf.push_str(&json_string(s));
        } else if needs_quoting(s) {
            self.buf.push_str(&format!("{s:?}"));
        } else {
            self.buf.push_str(s);
        }
    }

    fn append_value(&mut self, value: &Value) {
        match value {
            Value::String(s) => self.append_string(s),
            Value::Int(v) => self.buf.push_str(&v.to_string()),
            Value::Uint(v) => self.buf.push_str(&v.to_string()),
            Value::Bool(v) => self.buf.push_str(&v.to_string()),
            Value::Float(v) => {
                if self.json && !v.is_finite() {
                    self.append_string(&v.to_string());
                } else {
                    self.buf.push_str(&v.to_string());
                }
            }
            Value::Duration(d) => {
                if self.json {
                    self.buf.push_str(&d.as_nanos().to_string());
                } else {
                    self.buf.push_str(&format!("{d:?}"));
                }
            }
            Value::Time(_) => {
                let s = value.to_string();
                if self.json {
                    self.append_string(&s);
                } else {
                    self.buf.push_str(&s);
                }
            }
            Value::Any(v) => {
                if self.json {
                    self.buf.push_str(&v.to_string());
                } else if let Some(s) = v.as_str() {
                    self.append_string(s);
                } else {
                    self.append_string(&v.to_string());
                }
            }
            Value::Group(_) => self.append_string(&value.to_string()),
        }
    }
}

fn json_string(s: &str) -> String {
    serde_json::Value::from(s).to_string()
}

/// Text values are quoted when they are empty or contain characters that
/// would make the `key=value` line ambiguous.
fn needs_quoting(s: &str) -> bool {
    s.is_empty()
        || s
            .chars()
            .any(|c| c == '=' || c == '"' || c.is_whitespace() || c.is_control())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_quoting() {
        assert!(needs_quoting(""));
        assert!(needs_quoting("a b"));
        assert!(needs_quoting("a=b"));
        assert!(needs_quoting("say \"hi\""));
        assert!(needs_quoting("tab\there"));
        assert!(!needs_quoting("plain-value_1.2"));
        assert!(!needs_quoting("ünïcode"));
    }

    #[test]
    fn test_json_string_escapes() {
        assert_eq!(json_string("a\"b\n"), r#""a\"b\n""#);
    }
}
