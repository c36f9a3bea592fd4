//! Driver module
//!
//! This module holds the extension points a connectivity layer calls into
//! ([`Driver`], [`Conn`]), the process-wide driver registry, and the in-memory
//! implementation ([`FakeDriver`]).
//!
//! The registry lives for the whole process. Drivers are added with
//! [`register`] and never removed; a second registration under the same name
//! is a configuration error.

pub mod config;
pub mod fake;
pub mod statement;

pub use config::{DriverConfig, DEFAULT_DRIVER_NAME};
pub use fake::{FakeConn, FakeDriver};
pub use statement::Statement;

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::{const_rwlock, RwLock};
use tracing::{debug, warn};

use crate::context::Context;
use crate::error::{Error, Result};
use crate::executor::{Cursor, ExecResult};
use crate::storage::Value;

/// Opens connections to a database named by an identifier
pub trait Driver: Send + Sync {
    fn open(&self, ctx: &Context, identifier: &str) -> Result<Box<dyn Conn>>;
}

/// One open connection
pub trait Conn: Send {
    /// Parse a statement once for repeated execution
    fn prepare(&self, ctx: &Context, statement: &str) -> Result<Statement>;

    /// Run a statement that returns an affected-row count
    fn execute(&self, ctx: &Context, statement: &str, params: &[Value]) -> Result<ExecResult>;

    /// Run a statement that returns rows
    fn query(&self, ctx: &Context, statement: &str, params: &[Value]) -> Result<Cursor>;

    /// Release the connection. Idempotent.
    fn close(&mut self) -> Result<()>;

    fn is_closed(&self) -> bool;
}

static REGISTRY: RwLock<BTreeMap<String, Arc<dyn Driver>>> = const_rwlock(BTreeMap::new());

/// Register a driver under `name`
pub fn register(name: &str, driver: Arc<dyn Driver>) -> Result<()> {
    let mut drivers = REGISTRY.write();
    if drivers.contains_key(name) {
        warn!(driver = name, "Duplicate driver registration rejected");
        return Err(Error::DriverAlreadyRegistered(name.to_string()));
    }
    drivers.insert(name.to_string(), driver);
    debug!(driver = name, "Driver registered");
    Ok(())
}

/// Names of all registered drivers, sorted
pub fn drivers() -> Vec<String> {
    REGISTRY.read().keys().cloned().collect()
}

/// Open a connection through the driver registered as `driver_name`
pub fn open(driver_name: &str, ctx: &Context, identifier: &str) -> Result<Box<dyn Conn>> {
    let driver = REGISTRY
        .read()
        .get(driver_name)
        .cloned()
        .ok_or_else(|| Error::UnknownDriver(driver_name.to_string()))?;
    driver.open(ctx, identifier)
}
