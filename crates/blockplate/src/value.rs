//! Bound values.
//!
//! Everything a block can hold in its variables is a [`Value`]: scalars,
//! records (flattened to dotted names when bound), record sets (which drive
//! row repetition), zero-argument callables evaluated lazily at substitution
//! time, and [`Renderable`] views that produce their own markup.
//!
//! # Formatting
//!
//! | Variant | Output |
//! |---------|--------|
//! | `Null` | empty string |
//! | `Bool` | `true` / `false` |
//! | `Int`, `Float` | `Display` of the number |
//! | `String` | the string |
//! | `Record`, `RecordSet` | compact JSON |
//! | `Callable`, `Renderable` | empty; resolve them first with [`Value::resolve`] |

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::error::Result;

/// One row of named values, in insertion order.
pub type Record = IndexMap<String, Value>;

/// A presentation object that renders itself to markup.
///
/// Views bound as values are rendered when their placeholder is substituted;
/// the returned string is used in place of the placeholder.
///
/// ```rust
/// use blockplate::{Renderable, Result};
///
/// struct Badge(u32);
///
/// impl Renderable for Badge {
///     fn render(&self) -> Result<String> {
///         Ok(format!("<span class=\"badge\">{}</span>", self.0))
///     }
/// }
/// ```
pub trait Renderable {
    /// Produces the view's output.
    fn render(&self) -> Result<String>;
}

/// A value bound to a block variable.
#[derive(Clone, Default)]
pub enum Value {
    /// Absent value; renders as an empty string.
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Nested named values. Flattened to `name.sub` when bound.
    Record(Record),
    /// Ordered rows, used to repeat a block once per record.
    RecordSet(Vec<Record>),
    /// Evaluated with no arguments each time its placeholder is substituted.
    Callable(Rc<dyn Fn() -> Value>),
    /// Rendered each time its placeholder is substituted.
    Renderable(Rc<dyn Renderable>),
}

impl Value {
    /// Wraps a closure as a lazily evaluated value.
    pub fn callable<F>(f: F) -> Self
    where
        F: Fn() -> Value + 'static,
    {
        Value::Callable(Rc::new(f))
    }

    /// Wraps a view as a renderable value.
    pub fn renderable<R>(view: R) -> Self
    where
        R: Renderable + 'static,
    {
        Value::Renderable(Rc::new(view))
    }

    /// Evaluates callables and renders views until a plain value remains.
    pub fn resolve(&self) -> Result<Value> {
        match self {
            Value::Callable(f) => f().resolve(),
            Value::Renderable(view) => Ok(Value::String(view.render()?)),
            other => Ok(other.clone()),
        }
    }

    /// Returns true for `Record` values.
    pub fn is_record(&self) -> bool {
        matches!(self, Value::Record(_))
    }

    /// Returns the string slice of a `String` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Loose integer view: integers, integral floats, booleans and numeric strings.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            Value::Bool(b) => Some(i64::from(*b)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Loose float view: numbers, booleans and numeric strings.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Converts to JSON. Callables and views become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;

        match self {
            Value::Null | Value::Callable(_) | Value::Renderable(_) => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(n) => Json::from(*n),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Value::String(s) => Json::String(s.clone()),
            Value::Record(record) => Json::Object(record_to_json(record)),
            Value::RecordSet(rows) => Json::Array(
                rows.iter()
                    .map(|r| Json::Object(record_to_json(r)))
                    .collect(),
            ),
        }
    }
}

fn record_to_json(record: &Record) -> serde_json::Map<String, serde_json::Value> {
    record
        .iter()
        .map(|(k, v)| (k.clone(), v.to_json()))
        .collect()
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null | Value::Callable(_) | Value::Renderable(_) => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => f.write_str(s),
            Value::Record(_) | Value::RecordSet(_) => write!(f, "{}", self.to_json()),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Value::Int(n) => f.debug_tuple("Int").field(n).finish(),
            Value::Float(x) => f.debug_tuple("Float").field(x).finish(),
            Value::String(s) => f.debug_tuple("String").field(s).finish(),
            Value::Record(r) => f.debug_tuple("Record").field(r).finish(),
            Value::RecordSet(rows) => f.debug_tuple("RecordSet").field(rows).finish(),
            Value::Callable(_) => f.write_str("Callable(..)"),
            Value::Renderable(_) => f.write_str("Renderable(..)"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => a == b,
            (Value::RecordSet(a), Value::RecordSet(b)) => a == b,
            (Value::Callable(a), Value::Callable(b)) => Rc::ptr_eq(a, b),
            (Value::Renderable(a), Value::Renderable(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(n: $t) -> Self {
                    Value::Int(i64::from(n))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        i64::try_from(n)
            .map(Value::Int)
            .unwrap_or(Value::Float(n as f64))
    }
}

impl From<f32> for Value {
    fn from(x: f32) -> Self {
        Value::Float(f64::from(x))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Record(record)
    }
}

impl From<Vec<Record>> for Value {
    fn from(rows: Vec<Record>) -> Self {
        Value::RecordSet(rows)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Value::Null)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => Value::String(s),
            Json::Array(items) => {
                if items.iter().all(|item| item.is_object()) && !items.is_empty() {
                    Value::RecordSet(
                        items
                            .into_iter()
                            .filter_map(|item| match Value::from(item) {
                                Value::Record(r) => Some(r),
                                _ => None,
                            })
                            .collect(),
                    )
                } else {
                    // Lists of scalars become records keyed by index
                    Value::Record(
                        items
                            .into_iter()
                            .enumerate()
                            .map(|(i, item)| (i.to_string(), Value::from(item)))
                            .collect(),
                    )
                }
            }
            Json::Object(map) => {
                Value::Record(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

/// Builds a [`Record`] from `name => value` pairs.
///
/// ```rust
/// use blockplate::record;
///
/// let row = record! { "Name" => "Ada", "Age" => 36 };
/// assert_eq!(row["Name"].to_string(), "Ada");
/// ```
#[macro_export]
macro_rules! record {
    ($($key:expr => $value:expr),* $(,)?) => {{
        let mut record = $crate::Record::new();
        $(
            record.insert(::std::string::String::from($key), $crate::Value::from($value));
        )*
        record
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_scalars() {
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Int(42).to_string(), "42");
        assert_eq!(Value::Float(1.5).to_string(), "1.5");
        assert_eq!(Value::from("x").to_string(), "x");
    }

    #[test]
    fn test_display_record_as_json() {
        let value = Value::Record(record! { "a" => 1 });
        assert_eq!(value.to_string(), r#"{"a":1}"#);
    }

    #[test]
    fn test_loose_numbers() {
        assert_eq!(Value::from("3").as_i64(), Some(3));
        assert_eq!(Value::from(" 2.5 ").as_f64(), Some(2.5));
        assert_eq!(Value::Float(4.0).as_i64(), Some(4));
        assert_eq!(Value::Float(4.5).as_i64(), None);
        assert_eq!(Value::from("abc").as_i64(), None);
        assert_eq!(Value::Null.as_f64(), None);
    }

    #[test]
    fn test_resolve_callable() {
        let value = Value::callable(|| Value::from("computed"));
        assert_eq!(value.resolve().unwrap(), Value::from("computed"));
    }

    #[test]
    fn test_resolve_callable_returning_view() {
        struct View;
        impl Renderable for View {
            fn render(&self) -> Result<String> {
                Ok("<view>".to_string())
            }
        }

        let value = Value::callable(|| Value::renderable(View));
        assert_eq!(value.resolve().unwrap(), Value::from("<view>"));
    }

    #[test]
    fn test_resolve_view_error_propagates() {
        struct Broken;
        impl Renderable for Broken {
            fn render(&self) -> Result<String> {
                Err(crate::Error::Render("boom".to_string()))
            }
        }

        assert!(Value::renderable(Broken).resolve().is_err());
    }

    #[test]
    fn test_from_json() {
        let value = Value::from(json!({"name": "Ada", "tags": ["a", "b"]}));
        let Value::Record(record) = value else {
            panic!("expected record");
        };
        assert_eq!(record["name"], Value::from("Ada"));
        let Value::Record(tags) = &record["tags"] else {
            panic!("expected indexed record");
        };
        assert_eq!(tags["1"], Value::from("b"));
    }

    #[test]
    fn test_from_json_array_of_objects_is_record_set() {
        let value = Value::from(json!([{"a": 1}, {"a": 2}]));
        assert!(matches!(value, Value::RecordSet(ref rows) if rows.len() == 2));
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some(7)), Value::Int(7));
    }

    #[test]
    fn test_record_macro_preserves_order() {
        let row = record! { "z" => 1, "a" => 2 };
        let keys: Vec<&str> = row.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "a"]);
    }
}
