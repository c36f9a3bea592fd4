//! fakedb - An in-memory fake database driver
//!
//! This library simulates a relational backend for unit tests:
//! - Statement parsing (pipe-delimited DSL)
//! - Catalog of typed tables and rows
//! - Statement execution and result cursors
//! - Driver registry, connections and prepared statements
//!
//! ```
//! use fakedb::{params, Conn, Context};
//!
//! let driver = fakedb::register_default().unwrap();
//! let ctx = Context::background();
//! let conn = driver.open_conn(&ctx, "doc-example").unwrap();
//!
//! conn.execute(&ctx, "CREATE|users|id=int64,name=string", &[]).unwrap();
//! conn.execute(&ctx, "INSERT|users|id=?,name=?", &params![1, "foo"]).unwrap();
//!
//! let mut rows = conn.query(&ctx, "SELECT|users|id,name|", &[]).unwrap();
//! while rows.next() {
//!     let mut id = 0i32;
//!     let mut name = String::new();
//!     rows.scan(&mut [&mut id, &mut name]).unwrap();
//!     assert_eq!((id, name.as_str()), (1, "foo"));
//! }
//! ```

pub mod catalog;
pub mod context;
pub mod driver;
pub mod dsl;
pub mod error;
pub mod executor;
pub mod storage;

use std::sync::Arc;

use parking_lot::{const_mutex, Mutex};

pub use context::Context;
pub use driver::{Conn, Driver, DriverConfig, FakeConn, FakeDriver, Statement};
pub use error::{Error, Result};
pub use executor::{ColumnDesc, Cursor, ExecResult};
pub use storage::{Row, Value};

static DEFAULT_DRIVER: Mutex<Option<Arc<FakeDriver>>> = const_mutex(None);

/// Register the process-wide [`FakeDriver`] under
/// [`driver::DEFAULT_DRIVER_NAME`] and return it.
///
/// The first call registers; later calls return the same driver. Its
/// databases live until [`FakeDriver::reset`].
pub fn register_default() -> Result<Arc<FakeDriver>> {
    let mut slot = DEFAULT_DRIVER.lock();
    if let Some(driver) = slot.as_ref() {
        return Ok(driver.clone());
    }

    let driver = Arc::new(FakeDriver::new(DriverConfig::default()));
    driver::register(&driver.config().name, driver.clone())?;
    *slot = Some(driver.clone());
    Ok(driver)
}
