//! Prepared statements

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::config::DriverConfig;
use crate::context::Context;
use crate::dsl::{OpKind, ParsedOperation};
use crate::error::{Error, Result};
use crate::executor::{Cursor, ExecResult, Executor};
use crate::storage::Value;

/// A statement parsed once and bound to the connection that prepared it
#[derive(Debug)]
pub struct Statement {
    text: String,
    op: ParsedOperation,
    executor: Executor,
    config: Arc<DriverConfig>,
    conn_closed: Arc<AtomicBool>,
    closed: bool,
}

impl Statement {
    pub(crate) fn new(
        text: &str,
        op: ParsedOperation,
        executor: Executor,
        config: Arc<DriverConfig>,
        conn_closed: Arc<AtomicBool>,
    ) -> Self {
        Self {
            text: text.to_string(),
            op,
            executor,
            config,
            conn_closed,
            closed: false,
        }
    }

    /// Statement text as prepared
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn kind(&self) -> OpKind {
        self.op.kind()
    }

    /// Number of parameters the statement expects
    pub fn num_input(&self) -> usize {
        self.op.placeholder_count()
    }

    /// Run the statement for an affected-row count
    pub fn execute(&self, ctx: &Context, params: &[Value]) -> Result<ExecResult> {
        self.ensure_open()?;
        self.executor
            .execute(&self.config.scope(ctx), &self.op, params)
    }

    /// Run the statement for rows
    pub fn query(&self, ctx: &Context, params: &[Value]) -> Result<Cursor> {
        self.ensure_open()?;
        self.executor
            .query(&self.config.scope(ctx), &self.op, params)
    }

    /// Release the statement. Idempotent.
    pub fn close(&mut self) {
        self.closed = true;
    }

    fn ensure_open(&self) -> Result<()> {
        if self.conn_closed.load(Ordering::Acquire) {
            return Err(Error::ConnectionClosed);
        }
        if self.closed {
            return Err(Error::StatementClosed);
        }
        Ok(())
    }
}
