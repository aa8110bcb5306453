//! Data binding.
//!
//! Incoming data is turned into a [`Binding`] before the tree is touched, so
//! a malformed payload never leaves a block half-updated.
//!
//! - A JSON object (or a struct serializing to one) is a set of named
//!   entries. Nested objects and lists are flattened into dotted names:
//!   `{"user": {"name": "Ada"}}` binds `user.name`, `{"tags": ["a"]}` binds
//!   `tags.0`.
//! - A JSON array is a list of positional entries. Every entry must be a
//!   record; each becomes one row of the block's record set, flattened the
//!   same way.
//! - Anything else is rejected with `InvalidDataShape`.

use crate::error::{Error, Result};
use crate::tree::Variables;
use crate::value::{Record, Value};

/// Data ready to be merged into a block's variables.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Binding {
    /// Named values, already flattened.
    Named(Record),
    /// Positional rows, each already flattened.
    Rows(Vec<Record>),
}

impl Binding {
    /// Classifies serialized data as named entries or positional rows.
    pub(crate) fn from_json(data: serde_json::Value) -> Result<Self> {
        use serde_json::Value as Json;

        match data {
            Json::Object(map) => {
                let mut record = Record::new();
                for (name, value) in map {
                    flatten_into(&name, Value::from(value), &mut record);
                }
                Ok(Binding::Named(record))
            }
            Json::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, item)| match item {
                    Json::Object(_) => Ok(flatten_row(Value::from(item))),
                    other => Err(Error::InvalidDataShape(format!(
                        "positional entry {} is not a record (found {})",
                        i,
                        json_kind(&other)
                    ))),
                })
                .collect::<Result<Vec<_>>>()
                .map(Binding::Rows),
            other => Err(Error::InvalidDataShape(format!(
                "expected a record or a list of records, found {}",
                json_kind(&other)
            ))),
        }
    }

    /// A single named value, flattened if it is a record or record set.
    pub(crate) fn named(name: &str, value: Value) -> Self {
        let mut record = Record::new();
        flatten_into(name, value, &mut record);
        Binding::Named(record)
    }

    /// Positional rows given directly as records.
    pub(crate) fn rows(rows: Vec<Record>) -> Self {
        Binding::Rows(
            rows.into_iter()
                .map(|row| flatten_row(Value::Record(row)))
                .collect(),
        )
    }

    fn into_variables(self) -> Variables {
        match self {
            Binding::Named(record) => Variables::Record(record),
            Binding::Rows(rows) => Variables::RecordSet(rows),
        }
    }
}

impl Variables {
    /// Merges a binding, keeping the record / record set shape uniform.
    ///
    /// Named values overwrite same-named values; rows are appended. The
    /// shape check happens before anything is written.
    pub(crate) fn apply(&mut self, binding: Binding) -> Result<()> {
        if self.is_empty() {
            *self = binding.into_variables();
            return Ok(());
        }

        match (self, binding) {
            (Variables::Record(record), Binding::Named(values)) => {
                for (name, value) in values {
                    record.insert(name, value);
                }
                Ok(())
            }
            (Variables::RecordSet(rows), Binding::Rows(new_rows)) => {
                rows.extend(new_rows);
                Ok(())
            }
            (Variables::Record(_), Binding::Rows(_)) => Err(Error::InvalidDataShape(
                "block already holds named values; rows cannot be added".to_string(),
            )),
            (Variables::RecordSet(_), Binding::Named(_)) => Err(Error::InvalidDataShape(
                "block already holds a record set; named values cannot be added".to_string(),
            )),
        }
    }

    /// Removes one named value (from every row for record sets), or all values.
    pub(crate) fn remove(&mut self, name: Option<&str>) {
        match (self, name) {
            (vars, None) => *vars = Variables::default(),
            (Variables::Record(record), Some(name)) => {
                record.shift_remove(name);
            }
            (Variables::RecordSet(rows), Some(name)) => {
                for row in rows.iter_mut() {
                    row.shift_remove(name);
                }
            }
        }
    }
}

fn flatten_row(value: Value) -> Record {
    let mut row = Record::new();
    if let Value::Record(fields) = value {
        for (name, field) in fields {
            flatten_into(&name, field, &mut row);
        }
    }
    row
}

/// Stores `value` under `prefix`, descending into records and record sets.
///
/// Intermediate keys only survive as path segments: an empty nested record
/// stores nothing.
fn flatten_into(prefix: &str, value: Value, acc: &mut Record) {
    match value {
        Value::Record(fields) => {
            for (key, field) in fields {
                flatten_into(&format!("{}.{}", prefix, key), field, acc);
            }
        }
        Value::RecordSet(rows) => {
            for (i, row) in rows.into_iter().enumerate() {
                flatten_into(&format!("{}.{}", prefix, i), Value::Record(row), acc);
            }
        }
        other => {
            acc.insert(prefix.to_string(), other);
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    use serde_json::Value as Json;

    match value {
        Json::Null => "null",
        Json::Bool(_) => "a boolean",
        Json::Number(_) => "a number",
        Json::String(_) => "a string",
        Json::Array(_) => "a list",
        Json::Object(_) => "a record",
    }
}
