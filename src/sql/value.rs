//! Bindable values
//!
//! Every value a filter can carry, as a closed set. Scalars take one
//! placeholder; lists take one placeholder per element.

use chrono::{DateTime, Local};

/// A value bound to a `?` placeholder of a predicate
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    TextList(Vec<String>),
    Int(i64),
    IntList(Vec<i64>),
    Bool(bool),
    Time(DateTime<Local>),
}

impl Value {
    /// Whether this value expands to a parenthesized placeholder list
    pub fn is_list(&self) -> bool {
        matches!(self, Value::TextList(_) | Value::IntList(_))
    }

    /// Number of `$n` placeholders the value occupies once rendered
    pub fn placeholder_count(&self) -> usize {
        match self {
            Value::TextList(items) => items.len(),
            Value::IntList(items) => items.len(),
            _ => 1,
        }
    }

    /// Flatten into scalar values in placeholder order
    pub fn scalars(&self) -> Vec<Value> {
        match self {
            Value::TextList(items) => items.iter().cloned().map(Value::Text).collect(),
            Value::IntList(items) => items.iter().copied().map(Value::Int).collect(),
            other => vec![other.clone()],
        }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<DateTime<Local>> for Value {
    fn from(v: DateTime<Local>) -> Self {
        Value::Time(v)
    }
}

impl From<Vec<String>> for Value {
    fn from(v: Vec<String>) -> Self {
        Value::TextList(v)
    }
}

impl From<Vec<&str>> for Value {
    fn from(v: Vec<&str>) -> Self {
        Value::TextList(v.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<i64>> for Value {
    fn from(v: Vec<i64>) -> Self {
        Value::IntList(v)
    }
}
