//! Result cursors
//!
//! A [`Cursor`] walks a snapshot of rows taken when its SELECT ran and decodes
//! the current row into caller-provided destinations.
//!
//! ```text
//! Created --next()--> Positioned --next()--> ... --next()==false--> Exhausted
//!    \___________________\___________________________\____close()__> Closed
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::catalog::{Column, DataType};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::storage::tuple::{parse_bool, parse_datetime};
use crate::storage::{Row, Value};

/// Metadata for one projected column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDesc {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
}

impl From<Column> for ColumnDesc {
    fn from(col: Column) -> Self {
        Self {
            name: col.name,
            data_type: col.data_type,
            nullable: col.nullable,
        }
    }
}

/// Cursor lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    Created,
    Positioned,
    Exhausted,
    Closed,
}

/// Iterator over the rows of one query
#[derive(Debug)]
pub struct Cursor {
    ctx: Context,
    columns: Vec<ColumnDesc>,
    rows: std::vec::IntoIter<Row>,
    current: Option<Row>,
    state: CursorState,
    err: Option<Error>,
}

impl Cursor {
    pub(crate) fn new(ctx: Context, columns: Vec<Column>, rows: Vec<Row>) -> Self {
        Self {
            ctx,
            columns: columns.into_iter().map(ColumnDesc::from).collect(),
            rows: rows.into_iter(),
            current: None,
            state: CursorState::Created,
            err: None,
        }
    }

    /// Projected columns, in projection order
    pub fn columns(&self) -> &[ColumnDesc] {
        &self.columns
    }

    /// Projected column names
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn state(&self) -> CursorState {
        self.state
    }

    /// Advance to the next row.
    ///
    /// Returns `false` once the rows run out; that is terminal. A cancelled or
    /// expired context also ends iteration: the cursor closes itself and the
    /// reason is available from [`Cursor::err`].
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> bool {
        if matches!(self.state, CursorState::Exhausted | CursorState::Closed) {
            return false;
        }

        if let Err(e) = self.ctx.check() {
            self.err = Some(e);
            self.close();
            return false;
        }

        match self.rows.next() {
            Some(row) => {
                self.current = Some(row);
                self.state = CursorState::Positioned;
                true
            }
            None => {
                self.current = None;
                self.state = CursorState::Exhausted;
                false
            }
        }
    }

    /// Error that ended iteration early, if any
    pub fn err(&self) -> Option<&Error> {
        self.err.as_ref()
    }

    /// Raw values of the current row
    pub fn row(&self) -> Option<&Row> {
        self.current.as_ref()
    }

    /// Decode the current row into `dest`, one destination per column.
    ///
    /// Destinations are filled left to right; on a conversion failure the
    /// ones before the failing column have already been written.
    pub fn scan(&self, dest: &mut [&mut dyn Destination]) -> Result<()> {
        let row = self.current_row()?;

        if dest.len() != self.columns.len() {
            return Err(Error::ScanCountMismatch {
                expected: self.columns.len(),
                got: dest.len(),
            });
        }

        for ((target, value), col) in dest.iter_mut().zip(row.values()).zip(&self.columns) {
            if !target.assign(value) {
                return Err(Error::ScanTypeMismatch {
                    column: col.name.clone(),
                    expected: target.type_name().to_string(),
                    found: value.type_name().to_string(),
                });
            }
        }

        Ok(())
    }

    /// Decode a single column of the current row
    pub fn get<T: FromValue>(&self, index: usize) -> Result<T> {
        let row = self.current_row()?;
        let col = self.columns.get(index).ok_or(Error::ColumnOutOfRange {
            index,
            columns: self.columns.len(),
        })?;
        let value = row.get(index).unwrap_or(&Value::Null);

        T::from_value(value).ok_or_else(|| Error::ScanTypeMismatch {
            column: col.name.clone(),
            expected: T::TYPE_NAME.to_string(),
            found: value.type_name().to_string(),
        })
    }

    /// Release the snapshot. Safe to call any number of times.
    pub fn close(&mut self) {
        self.state = CursorState::Closed;
        self.current = None;
        self.rows = Vec::new().into_iter();
    }

    fn current_row(&self) -> Result<&Row> {
        match self.state {
            CursorState::Closed => return Err(Error::CursorClosed),
            CursorState::Created | CursorState::Exhausted => return Err(Error::NoCurrentRow),
            CursorState::Positioned => {}
        }
        self.ctx.check()?;
        self.current.as_ref().ok_or(Error::NoCurrentRow)
    }
}

// ========== Decoding ==========

/// A Rust type a stored value can be decoded into
pub trait FromValue: Sized {
    /// Name used in scan error messages
    const TYPE_NAME: &'static str;

    /// Convert, or `None` if the value cannot be represented
    fn from_value(value: &Value) -> Option<Self>;
}

/// A scan target. Implemented for every [`FromValue`] type.
pub trait Destination {
    /// Overwrite `self` with the decoded value; `false` leaves it untouched
    fn assign(&mut self, value: &Value) -> bool;

    fn type_name(&self) -> &'static str;
}

impl<T: FromValue> Destination for T {
    fn assign(&mut self, value: &Value) -> bool {
        match T::from_value(value) {
            Some(decoded) => {
                *self = decoded;
                true
            }
            None => false,
        }
    }

    fn type_name(&self) -> &'static str {
        T::TYPE_NAME
    }
}

macro_rules! integer_from_value {
    ($($t:ty),*) => {
        $(
            impl FromValue for $t {
                const TYPE_NAME: &'static str = stringify!($t);

                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::Int(n) => <$t>::try_from(*n).ok(),
                        Value::String(s) => s.trim().parse().ok(),
                        Value::Bytes(b) => std::str::from_utf8(b).ok()?.trim().parse().ok(),
                        _ => None,
                    }
                }
            }
        )*
    };
}

integer_from_value!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl FromValue for f64 {
    const TYPE_NAME: &'static str = "f64";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl FromValue for f32 {
    const TYPE_NAME: &'static str = "f32";

    fn from_value(value: &Value) -> Option<Self> {
        f64::from_value(value).map(|f| f as f32)
    }
}

impl FromValue for bool {
    const TYPE_NAME: &'static str = "bool";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            Value::Int(0) => Some(false),
            Value::Int(1) => Some(true),
            Value::String(s) => parse_bool(s),
            _ => None,
        }
    }
}

impl FromValue for String {
    const TYPE_NAME: &'static str = "String";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bytes(b) => String::from_utf8(b.clone()).ok(),
            other => Some(other.to_string()),
        }
    }
}

impl FromValue for Vec<u8> {
    const TYPE_NAME: &'static str = "Vec<u8>";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bytes(b) => Some(b.clone()),
            Value::String(s) => Some(s.as_bytes().to_vec()),
            _ => None,
        }
    }
}

impl FromValue for DateTime<Utc> {
    const TYPE_NAME: &'static str = "DateTime<Utc>";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Datetime(t) => Some(*t),
            Value::String(s) => parse_datetime(s),
            _ => None,
        }
    }
}

impl FromValue for Value {
    const TYPE_NAME: &'static str = "Value";

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl<T: FromValue> FromValue for Option<T> {
    const TYPE_NAME: &'static str = T::TYPE_NAME;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}
