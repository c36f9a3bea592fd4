//! Data types for fakedb
//!
//! This module defines the closed set of column types the DSL can declare.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Column data types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// Boolean type
    Bool,
    /// Integer (16-bit)
    Int16,
    /// Integer (32-bit)
    Int32,
    /// Integer (64-bit)
    Int64,
    /// Double-precision floating point
    Float64,
    /// UTF-8 string
    String,
    /// UTC timestamp
    Datetime,
}

impl DataType {
    /// Parse a DSL type name, returning the type and whether it is nullable.
    ///
    /// Nullable types carry a `null` prefix, e.g. `nullint64`.
    pub fn parse(name: &str) -> Option<(DataType, bool)> {
        let (base, nullable) = match name.strip_prefix("null") {
            Some(rest) => (rest, true),
            None => (name, false),
        };

        let data_type = match base {
            "bool" => DataType::Bool,
            "int16" => DataType::Int16,
            "int32" => DataType::Int32,
            "int64" => DataType::Int64,
            "float64" => DataType::Float64,
            "string" => DataType::String,
            "datetime" => DataType::Datetime,
            _ => return None,
        };

        Some((data_type, nullable))
    }

    /// Check if this type is an integer type
    pub fn is_integer(&self) -> bool {
        matches!(self, DataType::Int16 | DataType::Int32 | DataType::Int64)
    }

    /// Inclusive range accepted by an integer type
    pub fn integer_range(&self) -> Option<(i64, i64)> {
        match self {
            DataType::Int16 => Some((i16::MIN as i64, i16::MAX as i64)),
            DataType::Int32 => Some((i32::MIN as i64, i32::MAX as i64)),
            DataType::Int64 => Some((i64::MIN, i64::MAX)),
            _ => None,
        }
    }

    /// DSL spelling of this type
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Bool => "bool",
            DataType::Int16 => "int16",
            DataType::Int32 => "int32",
            DataType::Int64 => "int64",
            DataType::Float64 => "float64",
            DataType::String => "string",
            DataType::Datetime => "datetime",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
