//! Bidirectional value transforms between storage and runtime/input form.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};

use crate::model::Value;
use crate::{Error, Result};
use super::PropertyKey;

/// Declared type of a property, driving the built-in coercion converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// No declared type; values pass through unchanged.
    Any,
    Bool,
    Int,
    Float,
    String,
    Date,
    DateTime,
    List,
    Map,
}

impl ValueType {
    pub fn type_name(self) -> &'static str {
        match self {
            ValueType::Any => "ANY",
            ValueType::Bool => "BOOLEAN",
            ValueType::Int => "INTEGER",
            ValueType::Float => "FLOAT",
            ValueType::String => "STRING",
            ValueType::Date => "DATE",
            ValueType::DateTime => "DATETIME",
            ValueType::List => "LIST",
            ValueType::Map => "MAP",
        }
    }

    pub fn matches(self, value: &Value) -> bool {
        match self {
            ValueType::Any => true,
            ValueType::Bool => matches!(value, Value::Bool(_)),
            ValueType::Int => matches!(value, Value::Int(_)),
            ValueType::Float => matches!(value, Value::Float(_)),
            ValueType::String => matches!(value, Value::String(_)),
            ValueType::Date => matches!(value, Value::Date(_)),
            ValueType::DateTime => matches!(value, Value::DateTime(_)),
            ValueType::List => matches!(value, Value::List(_)),
            ValueType::Map => matches!(value, Value::Map(_)),
        }
    }
}

/// Bidirectional transform between the storage representation and the
/// runtime/input representation of a value.
pub trait PropertyConverter: Send + Sync {
    /// Runtime/input form → storage form. Fails with a conversion error
    /// when the value cannot be encoded.
    fn to_storage(&self, key: &dyn PropertyKey, value: Value) -> Result<Value>;

    /// Storage form → runtime form.
    fn from_storage(&self, key: &dyn PropertyKey, value: Value) -> Result<Value>;
}

/// The built-in converter: coerces loosely-typed input (strings from the
/// wire, whole floats for integer keys) into the declared storage type, and
/// passes already-typed values through.
pub struct CoercionConverter {
    value_type: ValueType,
}

impl CoercionConverter {
    pub fn new(value_type: ValueType) -> Self {
        Self { value_type }
    }

    fn coerce(&self, key: &dyn PropertyKey, value: Value) -> Result<Value> {
        if self.value_type.matches(&value) || value.is_null() {
            return Ok(value);
        }

        let coerced = match (self.value_type, &value) {
            (ValueType::Bool, Value::String(s)) => bool::from_str(s).ok().map(Value::Bool),
            (ValueType::Int, Value::String(s)) => i64::from_str(s.trim()).ok().map(Value::Int),
            (ValueType::Int, Value::Float(_)) => value.as_int().map(Value::Int),
            (ValueType::Float, Value::String(s)) => f64::from_str(s.trim()).ok().map(Value::Float),
            (ValueType::Float, Value::Int(i)) => Some(Value::Float(*i as f64)),
            (ValueType::String, Value::Int(i)) => Some(Value::String(i.to_string())),
            (ValueType::String, Value::Float(v)) => Some(Value::String(v.to_string())),
            (ValueType::String, Value::Bool(b)) => Some(Value::String(b.to_string())),
            (ValueType::Date, Value::String(s)) => {
                NaiveDate::from_str(s).ok().map(Value::Date)
            }
            (ValueType::DateTime, Value::String(s)) => {
                DateTime::parse_from_rfc3339(s).ok().map(|dt| Value::DateTime(dt.with_timezone(&Utc)))
            }
            _ => None,
        };

        coerced.ok_or_else(|| Error::Conversion {
            key: key.json_name().to_owned(),
            expected: self.value_type.type_name().to_owned(),
            got: value.type_name().to_owned(),
        })
    }
}

impl PropertyConverter for CoercionConverter {
    fn to_storage(&self, key: &dyn PropertyKey, value: Value) -> Result<Value> {
        self.coerce(key, value)
    }

    /// Stored values are already in the declared type; still coerced so that
    /// legacy data written under a different type surfaces uniformly.
    fn from_storage(&self, key: &dyn PropertyKey, value: Value) -> Result<Value> {
        self.coerce(key, value)
    }
}
