//! Raw engine values
//!
//! The CQL execution engine is a black box to this workspace: its
//! per-statement and per-clause results arrive as JSON. [`RawValue`] is the
//! closed set of shapes those results can take once decoded.
//!
//! Decoding rules for JSON objects:
//! - `"type": "Interval"`, or a `lowClosed`/`highClosed` key, is an interval
//! - `"type": "Code"`, or a `system` key, is a code
//! - anything else is a tuple (event records, quantities, wrappers)

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// A value produced by the execution engine for a statement or clause.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum RawValue {
    /// Null / undefined
    #[default]
    Null,
    /// Boolean value
    Boolean(bool),
    /// Numeric value (integer or decimal)
    Number(Number),
    /// String value
    String(String),
    /// Ordered list
    List(Vec<RawValue>),
    /// Interval between two points
    Interval(RawInterval),
    /// Code from a code system
    Code(RawCode),
    /// Any other structured value
    Tuple(IndexMap<String, RawValue>),
}

/// Interval result
#[derive(Debug, Clone, PartialEq)]
pub struct RawInterval {
    pub low: Box<RawValue>,
    pub high: Box<RawValue>,
    pub low_closed: bool,
    pub high_closed: bool,
}

/// Code result
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawCode {
    pub code: Option<String>,
    pub system: Option<String>,
    pub version: Option<String>,
    pub display: Option<String>,
}

impl RawValue {
    /// Create a tuple value from field pairs
    pub fn tuple<K: Into<String>>(fields: impl IntoIterator<Item = (K, RawValue)>) -> Self {
        Self::Tuple(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Create a list value
    pub fn list(items: impl IntoIterator<Item = RawValue>) -> Self {
        Self::List(items.into_iter().collect())
    }

    /// Check if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Try to get as Boolean
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get as String
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as List
    pub fn as_list(&self) -> Option<&[RawValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Try to get as Tuple
    pub fn as_tuple(&self) -> Option<&IndexMap<String, RawValue>> {
        match self {
            Self::Tuple(fields) => Some(fields),
            _ => None,
        }
    }

    /// Get a tuple field
    pub fn field(&self, name: &str) -> Option<&RawValue> {
        self.as_tuple().and_then(|fields| fields.get(name))
    }

    /// Strip a `{value: ...}` wrapper, returning the wrapped value or `self`.
    pub fn unwrap_value(&self) -> &RawValue {
        self.field("value").unwrap_or(self)
    }

    /// Pass/fail evaluation of a statement or clause result.
    ///
    /// Lists pass when they hold anything other than a single null; intervals
    /// always pass; codes fail without a code value; null fails.
    pub fn passes(&self) -> bool {
        match self {
            Self::Boolean(b) => *b,
            Self::List(items) => match items.as_slice() {
                [] => false,
                [only] => !only.is_null(),
                _ => true,
            },
            Self::Interval(_) => true,
            Self::Code(code) => code.code.is_some(),
            Self::Null => false,
            Self::Number(_) | Self::String(_) | Self::Tuple(_) => true,
        }
    }

    fn from_object(mut map: Map<String, Value>) -> Self {
        let tag = map.get("type").and_then(Value::as_str).map(str::to_owned);
        let is_interval = tag.as_deref() == Some("Interval")
            || map.contains_key("lowClosed")
            || map.contains_key("highClosed");
        let is_code = tag.as_deref() == Some("Code") || map.contains_key("system");

        if is_interval {
            let low_closed = map.get("lowClosed").and_then(Value::as_bool).unwrap_or(true);
            let high_closed = map.get("highClosed").and_then(Value::as_bool).unwrap_or(true);
            return Self::Interval(RawInterval {
                low: Box::new(map.remove("low").map(Self::from).unwrap_or_default()),
                high: Box::new(map.remove("high").map(Self::from).unwrap_or_default()),
                low_closed,
                high_closed,
            });
        }

        if is_code {
            return Self::Code(RawCode {
                code: take_string(&mut map, "code"),
                system: take_string(&mut map, "system"),
                version: take_string(&mut map, "version"),
                display: take_string(&mut map, "display"),
            });
        }

        Self::Tuple(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
    }
}

fn take_string(map: &mut Map<String, Value>, key: &str) -> Option<String> {
    match map.remove(key)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Boolean(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => Self::from_object(map),
        }
    }
}

impl From<RawValue> for Value {
    fn from(value: RawValue) -> Self {
        match value {
            RawValue::Null => Value::Null,
            RawValue::Boolean(b) => Value::Bool(b),
            RawValue::Number(n) => Value::Number(n),
            RawValue::String(s) => Value::String(s),
            RawValue::List(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            RawValue::Interval(interval) => {
                let mut map = Map::new();
                map.insert("type".to_string(), Value::from("Interval"));
                map.insert("low".to_string(), Value::from(*interval.low));
                map.insert("high".to_string(), Value::from(*interval.high));
                map.insert("lowClosed".to_string(), Value::Bool(interval.low_closed));
                map.insert("highClosed".to_string(), Value::Bool(interval.high_closed));
                Value::Object(map)
            }
            RawValue::Code(code) => {
                let mut map = Map::new();
                map.insert("type".to_string(), Value::from("Code"));
                let fields = [
                    ("code", code.code),
                    ("system", code.system),
                    ("version", code.version),
                    ("display", code.display),
                ];
                for (key, value) in fields {
                    if let Some(value) = value {
                        map.insert(key.to_string(), Value::String(value));
                    }
                }
                Value::Object(map)
            }
            RawValue::Tuple(fields) => Value::Object(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        Self::Number(Number::from(value))
    }
}

impl From<i32> for RawValue {
    fn from(value: i32) -> Self {
        Self::Number(Number::from(value))
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}
