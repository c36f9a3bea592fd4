//! In-memory driver
//!
//! A [`FakeDriver`] maps database names to catalogs. The name is the part of
//! the open identifier before the first `;`. A catalog is created the first
//! time its name is opened and lives until [`FakeDriver::forget`] or
//! [`FakeDriver::reset`] drops it; closing connections never does.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use super::config::DriverConfig;
use super::statement::Statement;
use super::{Conn, Driver};
use crate::catalog::Catalog;
use crate::context::Context;
use crate::dsl;
use crate::error::{Error, Result};
use crate::executor::{Cursor, ExecResult, Executor};
use crate::storage::Value;

/// Driver serving in-memory databases
#[derive(Debug, Default)]
pub struct FakeDriver {
    config: Arc<DriverConfig>,
    /// Catalogs by database name
    databases: Mutex<HashMap<String, Arc<Catalog>>>,
    /// Connections opened over the driver's lifetime
    open_count: AtomicUsize,
}

impl FakeDriver {
    /// Create a new driver
    pub fn new(config: DriverConfig) -> Self {
        Self {
            config: Arc::new(config),
            databases: Mutex::new(HashMap::new()),
            open_count: AtomicUsize::new(0),
        }
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Open a connection, creating the database on first use
    pub fn open_conn(&self, ctx: &Context, identifier: &str) -> Result<FakeConn> {
        self.config.scope(ctx).check()?;
        let name = database_name(identifier)?;

        let catalog = {
            let mut databases = self.databases.lock();
            databases
                .entry(name.to_string())
                .or_insert_with(|| {
                    info!(database = name, "Database created");
                    Arc::new(Catalog::new())
                })
                .clone()
        };

        self.open_count.fetch_add(1, Ordering::Relaxed);
        debug!(database = name, "Connection opened");

        Ok(FakeConn {
            database: name.to_string(),
            executor: Executor::new(catalog),
            config: self.config.clone(),
            closed: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Catalog backing a database, if it has been opened
    pub fn catalog(&self, identifier: &str) -> Option<Arc<Catalog>> {
        let name = database_name(identifier).ok()?;
        self.databases.lock().get(name).cloned()
    }

    /// Names of all live databases, sorted
    pub fn database_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.databases.lock().keys().cloned().collect();
        names.sort();
        names
    }

    /// Drop one database. Open connections keep their catalog; the next open
    /// under this name starts empty. Returns whether it existed.
    pub fn forget(&self, identifier: &str) -> bool {
        let Ok(name) = database_name(identifier) else {
            return false;
        };
        let removed = self.databases.lock().remove(name).is_some();
        if removed {
            info!(database = name, "Database dropped");
        }
        removed
    }

    /// Drop every database
    pub fn reset(&self) {
        let mut databases = self.databases.lock();
        info!(databases = databases.len(), "Driver reset");
        databases.clear();
    }

    /// Connections opened so far
    pub fn open_count(&self) -> usize {
        self.open_count.load(Ordering::Relaxed)
    }
}

impl Driver for FakeDriver {
    fn open(&self, ctx: &Context, identifier: &str) -> Result<Box<dyn Conn>> {
        Ok(Box::new(self.open_conn(ctx, identifier)?))
    }
}

/// Database name selected by an open identifier
fn database_name(identifier: &str) -> Result<&str> {
    let name = identifier.split(';').next().unwrap_or_default().trim();
    if name.is_empty() {
        return Err(Error::InvalidIdentifier(identifier.to_string()));
    }
    Ok(name)
}

/// Connection to one in-memory database
#[derive(Debug)]
pub struct FakeConn {
    database: String,
    executor: Executor,
    config: Arc<DriverConfig>,
    closed: Arc<AtomicBool>,
}

impl FakeConn {
    /// Name of the database this connection uses
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Catalog shared with every connection to the same database
    pub fn catalog(&self) -> &Arc<Catalog> {
        self.executor.catalog()
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::ConnectionClosed);
        }
        Ok(())
    }
}

impl Conn for FakeConn {
    fn prepare(&self, ctx: &Context, statement: &str) -> Result<Statement> {
        self.ensure_open()?;
        self.config.scope(ctx).check()?;
        let op = dsl::parse(statement)?;

        Ok(Statement::new(
            statement,
            op,
            self.executor.clone(),
            self.config.clone(),
            self.closed.clone(),
        ))
    }

    fn execute(&self, ctx: &Context, statement: &str, params: &[Value]) -> Result<ExecResult> {
        self.prepare(ctx, statement)?.execute(ctx, params)
    }

    fn query(&self, ctx: &Context, statement: &str, params: &[Value]) -> Result<Cursor> {
        self.prepare(ctx, statement)?.query(ctx, params)
    }

    fn close(&mut self) -> Result<()> {
        if !self.closed.swap(true, Ordering::AcqRel) {
            debug!(database = %self.database, "Connection closed");
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::OpKind;
    use crate::params;
    use std::time::Duration;

    #[test]
    fn test_same_identifier_shares_catalog() {
        let driver = FakeDriver::default();
        let ctx = Context::background();

        let a = driver.open_conn(&ctx, "shared").unwrap();
        let b = driver.open_conn(&ctx, "shared;opts").unwrap();
        let other = driver.open_conn(&ctx, "other").unwrap();

        a.execute(&ctx, "CREATE|t|id=int64", &[]).unwrap();
        a.execute(&ctx, "INSERT|t|id=?", &params![1]).unwrap();

        let mut cursor = b.query(&ctx, "SELECT|t|id|", &[]).unwrap();
        assert!(cursor.next());
        assert_eq!(cursor.get::<i64>(0).unwrap(), 1);

        let err = other.query(&ctx, "SELECT|t|id|", &[]).unwrap_err();
        assert_eq!(err, Error::TableNotFound("t".to_string()));

        assert!(Arc::ptr_eq(a.catalog(), b.catalog()));
        assert_eq!(driver.open_count(), 3);
        assert_eq!(driver.database_names(), vec!["other", "shared"]);
    }

    #[test]
    fn test_close_keeps_catalog() {
        let driver = FakeDriver::default();
        let ctx = Context::background();

        let mut conn = driver.open_conn(&ctx, "keep").unwrap();
        conn.execute(&ctx, "CREATE|t|id=int64", &[]).unwrap();
        let stmt = conn.prepare(&ctx, "INSERT|t|id=?").unwrap();
        conn.close().unwrap();
        conn.close().unwrap();

        assert_eq!(
            conn.execute(&ctx, "INSERT|t|id=1", &[]).unwrap_err(),
            Error::ConnectionClosed
        );
        assert_eq!(
            stmt.execute(&ctx, &params![1]).unwrap_err(),
            Error::ConnectionClosed
        );

        let reopened = driver.open_conn(&ctx, "keep").unwrap();
        assert!(reopened.catalog().table_exists("t"));
    }

    #[test]
    fn test_forget_and_reset() {
        let driver = FakeDriver::default();
        let ctx = Context::background();

        let conn = driver.open_conn(&ctx, "gone").unwrap();
        conn.execute(&ctx, "CREATE|t|id=int64", &[]).unwrap();

        assert!(driver.forget("gone"));
        assert!(!driver.forget("gone"));
        assert!(driver.catalog("gone").is_none());

        let fresh = driver.open_conn(&ctx, "gone").unwrap();
        assert!(!fresh.catalog().table_exists("t"));

        driver.reset();
        assert!(driver.database_names().is_empty());
    }

    #[test]
    fn test_invalid_identifier() {
        let driver = FakeDriver::default();
        let err = driver.open_conn(&Context::background(), " ;x").unwrap_err();
        assert!(matches!(err, Error::InvalidIdentifier(_)));
        assert_eq!(driver.open_count(), 0);
    }

    #[test]
    fn test_prepared_statement_reuse() {
        let driver = FakeDriver::default();
        let ctx = Context::background();
        let conn = driver.open_conn(&ctx, "prep").unwrap();
        conn.execute(&ctx, "CREATE|t|id=int64,name=string", &[])
            .unwrap();

        let mut stmt = conn.prepare(&ctx, " INSERT|t|id=?,name=?").unwrap();
        assert_eq!(stmt.text(), " INSERT|t|id=?,name=?");
        assert_eq!(stmt.kind(), OpKind::Insert);
        assert_eq!(stmt.num_input(), 2);
        stmt.execute(&ctx, &params![1, "a"]).unwrap();
        stmt.execute(&ctx, &params![2, "b"]).unwrap();
        stmt.close();
        stmt.close();
        let err = stmt.execute(&ctx, &params![3, "c"]).unwrap_err();
        assert_eq!(err, Error::StatementClosed);
        assert_eq!(stmt.query(&ctx, &[]).unwrap_err(), Error::StatementClosed);

        assert_eq!(conn.catalog().row_count("t").unwrap(), 2);

        let err = conn.prepare(&ctx, "INSERT|t").unwrap_err();
        assert!(matches!(err, Error::Syntax { .. }));
    }

    #[test]
    fn test_cancelled_open_and_default_timeout() {
        let ctx = Context::background();
        ctx.cancel();
        let driver = FakeDriver::default();
        assert_eq!(driver.open_conn(&ctx, "x").unwrap_err(), Error::Cancelled);

        let driver = FakeDriver::new(DriverConfig::new().default_timeout(Duration::ZERO));
        let err = driver.open_conn(&Context::background(), "x").unwrap_err();
        assert_eq!(err, Error::DeadlineExceeded);
    }
}
