//! Attributes: key/value pairs attached to records and bound to loggers.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};

/// Key used for arguments that could not be paired with a string key.
pub const BAD_KEY: &str = "!BADKEY";

/// The value half of an [`Attr`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    Duration(Duration),
    Time(DateTime<Utc>),
    /// Arbitrary structured data; arrays and objects render as collections.
    Any(serde_json::Value),
    /// Nested attributes rendered under the owning attribute's key.
    Group(Vec<Attr>),
}

impl Value {
    pub fn is_group(&self) -> bool {
        matches!(self, Value::Group(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::Int(v) => write!(f, "{v}"),
            Value::Uint(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Duration(d) => write!(f, "{d:?}"),
            Value::Time(t) => f.write_str(&t.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)),
            Value::Any(v) => write!(f, "{v}"),
            Value::Group(attrs) => {
                f.write_str("[")?;
                for (i, a) in attrs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}={}", a.key, a.value)?;
                }
                f.write_str("]")
            }
        }
    }
}

macro_rules! impl_value_from {
    ($($ty:ty => $variant:ident as $cast:ty),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v as $cast)
                }
            }
        )*
    };
}

impl_value_from! {
    i8 => Int as i64,
    i16 => Int as i64,
    i32 => Int as i64,
    i64 => Int as i64,
    isize => Int as i64,
    u8 => Uint as u64,
    u16 => Uint as u64,
    u32 => Uint as u64,
    u64 => Uint as u64,
    usize => Uint as u64,
    f32 => Float as f64,
    f64 => Float as f64,
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Duration> for Value {
    fn from(v: Duration) -> Self {
        Value::Duration(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Time(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Any(v)
    }
}

/// A key/value pair.
///
/// An attribute with an empty key and an empty group value is treated as
/// absent by the handlers.
#[derive(Debug, Clone, PartialEq)]
pub struct Attr {
    pub key: String,
    pub value: Value,
}

impl Attr {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(key, Value::String(value.into()))
    }

    pub fn int(key: impl Into<String>, value: i64) -> Self {
        Self::new(key, Value::Int(value))
    }

    pub fn uint(key: impl Into<String>, value: u64) -> Self {
        Self::new(key, Value::Uint(value))
    }

    pub fn float(key: impl Into<String>, value: f64) -> Self {
        Self::new(key, Value::Float(value))
    }

    pub fn bool(key: impl Into<String>, value: bool) -> Self {
        Self::new(key, Value::Bool(value))
    }

    pub fn duration(key: impl Into<String>, value: Duration) -> Self {
        Self::new(key, Value::Duration(value))
    }

    /// Time attribute rendered as its human-readable string form.
    pub fn time(key: impl Into<String>, value: DateTime<Utc>) -> Self {
        Self::string(key, value.to_string())
    }

    /// Any serializable value. Serialization failures are recorded as `null`.
    pub fn any(key: impl Into<String>, value: impl serde::Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or(serde_json::Value::Null);
        Self::new(key, Value::Any(value))
    }

    pub fn group(key: impl Into<String>, attrs: Vec<Attr>) -> Self {
        Self::new(key, Value::Group(attrs))
    }

    /// The conventional `error` attribute.
    pub fn error(err: &dyn std::error::Error) -> Self {
        Self::string("error", err.to_string())
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.key.is_empty() && matches!(&self.value, Value::Group(g) if g.is_empty())
    }
}

/// One element of a variadic argument list.
///
/// Arguments are read pairwise: a [`Arg::Key`] followed by a value forms one
/// attribute, a pre-built [`Arg::Attr`] stands alone.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Key(String),
    Value(Value),
    Attr(Attr),
}

impl From<&str> for Arg {
    fn from(v: &str) -> Self {
        Arg::Key(v.to_string())
    }
}

impl From<String> for Arg {
    fn from(v: String) -> Self {
        Arg::Key(v)
    }
}

impl From<Attr> for Arg {
    fn from(a: Attr) -> Self {
        Arg::Attr(a)
    }
}

impl From<Value> for Arg {
    fn from(v: Value) -> Self {
        Arg::Value(v)
    }
}

macro_rules! impl_arg_from_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Arg {
                fn from(v: $ty) -> Self {
                    Arg::Value(v.into())
                }
            }
        )*
    };
}

impl_arg_from_value!(
    i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, bool,
    Duration, DateTime<Utc>, serde_json::Value,
);

/// Interpret an argument list pairwise into attributes.
///
/// A key followed by a non-attribute argument forms a pair; a string in
/// value position is taken as the value. A dangling key or a value without a
/// key is kept under [`BAD_KEY`].
pub fn args_to_attrs(args: &[Arg]) -> Vec<Attr> {
    let mut attrs = Vec::with_capacity(args.len());
    let mut iter = args.iter().peekable();

    while let Some(arg) = iter.next() {
        match arg {
            Arg::Attr(a) => attrs.push(a.clone()),
            Arg::Key(key) => match iter.peek() {
                Some(Arg::Value(v)) => {
                    attrs.push(Attr::new(key.clone(), v.clone()));
                    iter.next();
                }
                Some(Arg::Key(v)) => {
                    attrs.push(Attr::string(key.clone(), v.clone()));
                    iter.next();
                }
                Some(Arg::Attr(_)) | None => {
                    attrs.push(Attr::string(BAD_KEY, key.clone()));
                }
            },
            Arg::Value(v) => attrs.push(Attr::new(BAD_KEY, v.clone())),
        }
    }

    attrs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairs_and_prebuilt_attrs() {
        let args: Vec<Arg> = vec![
            "user".into(),
            "ada".into(),
            Attr::int("n", 3).into(),
            "ok".into(),
            true.into(),
        ];

        let attrs = args_to_attrs(&args);
        assert_eq!(
            attrs,
            vec![
                Attr::string("user", "ada"),
                Attr::int("n", 3),
                Attr::bool("ok", true),
            ]
        );
    }

    #[test]
    fn test_dangling_key_and_orphan_value() {
        let attrs = args_to_attrs(&[42.into(), "tail".into()]);
        assert_eq!(
            attrs,
            vec![Attr::int(BAD_KEY, 42), Attr::string(BAD_KEY, "tail")]
        );
    }

    #[test]
    fn test_key_before_attr_is_bad_key() {
        let attrs = args_to_attrs(&["k".into(), Attr::bool("b", false).into()]);
        assert_eq!(attrs[0], Attr::string(BAD_KEY, "k"));
        assert_eq!(attrs[1], Attr::bool("b", false));
    }

    #[test]
    fn test_numeric_widening() {
        assert_eq!(Value::from(7u32), Value::Uint(7));
        assert_eq!(Value::from(-7i32), Value::Int(-7));
        assert_eq!(Value::from(1.5f32), Value::Float(1.5));
    }

    #[test]
    fn test_empty_attr() {
        assert!(Attr::group("", vec![]).is_empty());
        assert!(!Attr::group("g", vec![]).is_empty());
        assert!(!Attr::string("", "").is_empty());
    }
}
