//! Row and Value types for fakedb
//!
//! This module defines how data values are represented in memory and how
//! bound parameters are coerced into declared column types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::catalog::DataType;

/// A value in the database
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// NULL value
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value, stored as 64-bit for every integer column width
    Int(i64),
    /// Float value (64-bit)
    Float(f64),
    /// String value
    String(String),
    /// Binary data
    Bytes(Vec<u8>),
    /// UTC timestamp
    Datetime(DateTime<Utc>),
}

impl Value {
    /// Check if this value is NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get the type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int64",
            Value::Float(_) => "float64",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Datetime(_) => "datetime",
        }
    }

    /// Zero value stored for a column not mentioned by an INSERT
    pub fn zero(data_type: DataType) -> Value {
        match data_type {
            DataType::Bool => Value::Bool(false),
            DataType::Int16 | DataType::Int32 | DataType::Int64 => Value::Int(0),
            DataType::Float64 => Value::Float(0.0),
            DataType::String => Value::String(String::new()),
            DataType::Datetime => Value::Datetime(DateTime::<Utc>::default()),
        }
    }

    /// Convert a bound value into the representation stored for `data_type`.
    ///
    /// Returns `None` when the conversion is not allowed. NULL is handled by
    /// the caller, which knows whether the column is nullable.
    pub fn coerce_to(&self, data_type: DataType) -> Option<Value> {
        match data_type {
            DataType::Int16 | DataType::Int32 | DataType::Int64 => {
                let (min, max) = data_type.integer_range()?;
                let n = match self {
                    Value::Int(n) => *n,
                    Value::Float(f) if f.fract() == 0.0 && f.is_finite() => {
                        if *f < i64::MIN as f64 || *f >= i64::MAX as f64 {
                            return None;
                        }
                        *f as i64
                    }
                    Value::String(s) => s.trim().parse::<i64>().ok()?,
                    _ => return None,
                };
                (min..=max).contains(&n).then_some(Value::Int(n))
            }
            DataType::Float64 => match self {
                Value::Int(n) => Some(Value::Float(*n as f64)),
                Value::Float(f) => Some(Value::Float(*f)),
                Value::String(s) => s.trim().parse::<f64>().ok().map(Value::Float),
                _ => None,
            },
            DataType::String => match self {
                Value::Null => None,
                Value::Bytes(b) => String::from_utf8(b.clone()).ok().map(Value::String),
                other => Some(Value::String(other.to_string())),
            },
            DataType::Bool => match self {
                Value::Bool(b) => Some(Value::Bool(*b)),
                Value::Int(0) => Some(Value::Bool(false)),
                Value::Int(1) => Some(Value::Bool(true)),
                Value::String(s) => parse_bool(s).map(Value::Bool),
                _ => None,
            },
            DataType::Datetime => match self {
                Value::Datetime(t) => Some(Value::Datetime(*t)),
                Value::String(s) => parse_datetime(s).map(Value::Datetime),
                _ => None,
            },
        }
    }

    /// Check whether this value is a valid stored value for `data_type`
    pub fn conforms_to(&self, data_type: DataType, nullable: bool) -> bool {
        match (self, data_type) {
            (Value::Null, _) => nullable,
            (Value::Bool(_), DataType::Bool) => true,
            (Value::Int(n), t) if t.is_integer() => match t.integer_range() {
                Some((min, max)) => (min..=max).contains(n),
                None => false,
            },
            (Value::Float(_), DataType::Float64) => true,
            (Value::String(_), DataType::String) => true,
            (Value::Datetime(_), DataType::Datetime) => true,
            _ => false,
        }
    }

    /// Read a free-form literal typed by a person (shell arguments).
    ///
    /// Recognizes `NULL`, booleans, integers and floats; anything else is a string.
    pub fn parse_literal(text: &str) -> Value {
        if text.eq_ignore_ascii_case("null") {
            return Value::Null;
        }
        if let Ok(n) = text.parse::<i64>() {
            return Value::Int(n);
        }
        if let Ok(f) = text.parse::<f64>() {
            return Value::Float(f);
        }
        match text {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::String(text.to_string()),
        }
    }
}

/// Boolean spellings accepted in strings
pub(crate) fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// RFC 3339 timestamps, normalized to UTC
pub(crate) fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s.trim())
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::Bytes(b) => write!(f, "{}", String::from_utf8_lossy(b)),
            Value::Datetime(t) => write!(f, "{}", t.to_rfc3339()),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Datetime(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

/// Build a parameter list from heterogeneous values.
///
/// ```
/// let params = fakedb::params![1, "foo"];
/// assert_eq!(params.len(), 2);
/// ```
#[macro_export]
macro_rules! params {
    () => {
        ::std::vec::Vec::<$crate::Value>::new()
    };
    ($($value:expr),+ $(,)?) => {
        vec![$($crate::Value::from($value)),+]
    };
}

/// A row in a table, one value per column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    /// Values in this row
    values: Vec<Value>,
}

impl Row {
    /// Create a new row from values
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Get a value by index
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Get all values
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Number of values in this row
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the row holds no values
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Replace the value at `index`
    pub fn set(&mut self, index: usize, value: Value) {
        if let Some(slot) = self.values.get_mut(index) {
            *slot = value;
        }
    }

    /// Build a new row holding only the given column positions, in order
    pub fn project(&self, indices: &[usize]) -> Row {
        let values = indices
            .iter()
            .map(|&i| self.values.get(i).cloned().unwrap_or(Value::Null))
            .collect();
        Row::new(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_coercion() {
        let seven = Value::Int(7);
        assert_eq!(seven.coerce_to(DataType::Int64), Some(seven.clone()));
        assert_eq!(
            Value::from("42").coerce_to(DataType::Int32),
            Some(Value::Int(42))
        );
        assert_eq!(Value::from("forty").coerce_to(DataType::Int64), None);
        assert_eq!(Value::Int(40_000).coerce_to(DataType::Int16), None);
        let three = Value::Float(3.0).coerce_to(DataType::Int64);
        assert_eq!(three, Some(Value::Int(3)));
        assert_eq!(Value::Float(3.5).coerce_to(DataType::Int64), None);
        assert_eq!(Value::Bool(true).coerce_to(DataType::Int64), None);
    }

    #[test]
    fn test_string_and_bool_coercion() {
        let one = Value::Int(1).coerce_to(DataType::String);
        assert_eq!(one, Some(Value::from("1")));
        let yes = Value::Bool(true).coerce_to(DataType::String);
        assert_eq!(yes, Some(Value::from("true")));
        assert_eq!(Value::Null.coerce_to(DataType::String), None);
        assert_eq!(
            Value::Bytes(b"abc".to_vec()).coerce_to(DataType::String),
            Some(Value::from("abc"))
        );
        assert_eq!(Value::Bytes(vec![0xff]).coerce_to(DataType::String), None);

        let t = Value::from("T").coerce_to(DataType::Bool);
        assert_eq!(t, Some(Value::Bool(true)));
        let zero = Value::Int(0).coerce_to(DataType::Bool);
        assert_eq!(zero, Some(Value::Bool(false)));
        assert_eq!(Value::Int(2).coerce_to(DataType::Bool), None);
        assert_eq!(Value::from("yes").coerce_to(DataType::Bool), None);
    }

    #[test]
    fn test_datetime_coercion() {
        let parsed = Value::from("2024-03-01T12:00:00+02:00")
            .coerce_to(DataType::Datetime)
            .unwrap();
        match parsed {
            Value::Datetime(t) => assert_eq!(t.to_rfc3339(), "2024-03-01T10:00:00+00:00"),
            other => panic!("expected datetime, got {:?}", other),
        }
        assert_eq!(Value::from("yesterday").coerce_to(DataType::Datetime), None);
    }

    #[test]
    fn test_conforms_to() {
        assert!(Value::Null.conforms_to(DataType::String, true));
        assert!(!Value::Null.conforms_to(DataType::String, false));
        assert!(Value::Int(5).conforms_to(DataType::Int16, false));
        assert!(!Value::Int(i64::MAX).conforms_to(DataType::Int32, false));
        assert!(!Value::from("x").conforms_to(DataType::Int64, false));
    }

    #[test]
    fn test_parse_literal() {
        assert_eq!(Value::parse_literal("12"), Value::Int(12));
        assert_eq!(Value::parse_literal("1.5"), Value::Float(1.5));
        assert_eq!(Value::parse_literal("NULL"), Value::Null);
        assert_eq!(Value::parse_literal("true"), Value::Bool(true));
        assert_eq!(Value::parse_literal("foo"), Value::from("foo"));
    }

    #[test]
    fn test_row_projection() {
        let row = Row::new(vec![Value::Int(1), Value::from("foo"), Value::Bool(true)]);
        let projected = row.project(&[2, 0]);
        assert_eq!(projected.values(), &[Value::Bool(true), Value::Int(1)]);
        assert_eq!(row.len(), 3);
    }

    #[test]
    fn test_params_macro() {
        let params = crate::params![1, "foo", None::<i64>];
        let expected = vec![Value::Int(1), Value::from("foo"), Value::Null];
        assert_eq!(params, expected);
        assert!(crate::params![].is_empty());
    }
}
