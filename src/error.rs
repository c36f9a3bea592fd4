//! Error types for fakedb
//!
//! This module defines all error types returned by the driver.

use thiserror::Error;

/// The main error type for fakedb
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // ========== Parse Errors ==========
    #[error("Syntax error in '{segment}': {reason}")]
    Syntax { segment: String, reason: String },

    // ========== Catalog Errors ==========
    #[error("Catalog error: table '{0}' not found")]
    TableNotFound(String),

    #[error("Catalog error: table '{0}' already exists")]
    TableAlreadyExists(String),

    #[error("Catalog error: column '{0}' not found in table '{1}'")]
    ColumnNotFound(String, String),

    #[error("Catalog error: schema mismatch - {0}")]
    SchemaMismatch(String),

    // ========== Binding Errors ==========
    #[error("Bind error: statement expects {expected} parameter(s), got {got}")]
    ParameterCountMismatch { expected: usize, got: usize },

    #[error("Type error: cannot convert {found} to {expected} for column '{column}'")]
    TypeMismatch {
        column: String,
        expected: String,
        found: String,
    },

    #[error("Type error: null value not allowed for column '{0}'")]
    NullNotAllowed(String),

    #[error("Execution error: {op} statements must be run with {expected}")]
    WrongStatementKind { op: String, expected: String },

    // ========== Cursor Errors ==========
    #[error("Scan error: expected {expected} destination(s), got {got}")]
    ScanCountMismatch { expected: usize, got: usize },

    #[error("Scan error: cannot scan {found} from column '{column}' into {expected}")]
    ScanTypeMismatch {
        column: String,
        expected: String,
        found: String,
    },

    #[error("Scan error: column index {index} out of range for {columns} column(s)")]
    ColumnOutOfRange { index: usize, columns: usize },

    #[error("Scan error: no current row")]
    NoCurrentRow,

    #[error("Scan error: cursor is closed")]
    CursorClosed,

    // ========== Cancellation ==========
    #[error("Context error: operation cancelled")]
    Cancelled,

    #[error("Context error: deadline exceeded")]
    DeadlineExceeded,

    // ========== Driver Errors ==========
    #[error("Driver error: unknown driver '{0}'")]
    UnknownDriver(String),

    #[error("Driver error: driver '{0}' is already registered")]
    DriverAlreadyRegistered(String),

    #[error("Driver error: invalid database identifier '{0}'")]
    InvalidIdentifier(String),

    #[error("Driver error: connection is closed")]
    ConnectionClosed,

    #[error("Driver error: statement is closed")]
    StatementClosed,
}

impl Error {
    pub(crate) fn syntax(segment: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Syntax {
            segment: segment.into(),
            reason: reason.into(),
        }
    }

    /// True for errors raised by a cancelled or expired context
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Error::Cancelled | Error::DeadlineExceeded)
    }
}

/// Result type alias for fakedb operations
pub type Result<T> = std::result::Result<T, Error>;
