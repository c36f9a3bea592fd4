use std::sync::Arc;
use std::thread;

use chrono::{TimeZone, Utc};
use fakedb::driver::{self, DEFAULT_DRIVER_NAME};
use fakedb::{params, Conn, Context, Error, FakeDriver, Value};

#[test]
fn test_users_scenario_through_registry() {
    fakedb::register_default().unwrap();
    let ctx = Context::background();
    let conn = driver::open(DEFAULT_DRIVER_NAME, &ctx, "scenario-users").unwrap();

    conn.execute(&ctx, "CREATE|users|id=int64,name=string", &[])
        .unwrap();
    let result = conn
        .execute(&ctx, "INSERT|users|id=?,name=?", &params![1, "foo"])
        .unwrap();
    assert_eq!(result.affected_rows, 1);
    conn.execute(&ctx, "INSERT|users|id=?,name=?", &params![2, "bar"])
        .unwrap();

    let mut rows = conn.query(&ctx, "SELECT|users|id,name|", &[]).unwrap();
    let mut seen = Vec::new();
    while rows.next() {
        let mut id = 0i32;
        let mut name = String::new();
        rows.scan(&mut [&mut id, &mut name]).unwrap();
        seen.push((id, name));
    }
    assert!(rows.err().is_none());
    assert_eq!(seen, vec![(1, "foo".to_string()), (2, "bar".to_string())]);
}

#[test]
fn test_register_default_is_shared() {
    let a = fakedb::register_default().unwrap();
    let b = fakedb::register_default().unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert!(driver::drivers().contains(&DEFAULT_DRIVER_NAME.to_string()));
}

#[test]
fn test_many_inserts_keep_order() {
    let driver = FakeDriver::default();
    let ctx = Context::background();
    let conn = driver.open_conn(&ctx, "order").unwrap();
    conn.execute(&ctx, "CREATE|t|n=int32", &[]).unwrap();

    let insert = conn.prepare(&ctx, "INSERT|t|n=?").unwrap();
    for n in 0..100 {
        insert.execute(&ctx, &params![n]).unwrap();
    }

    let mut rows = conn.query(&ctx, "SELECT|t|n|", &[]).unwrap();
    let mut expected = 0i64;
    while rows.next() {
        assert_eq!(rows.get::<i64>(0).unwrap(), expected);
        expected += 1;
    }
    assert_eq!(expected, 100);
}

#[test]
fn test_typed_round_trip() {
    let driver = FakeDriver::default();
    let ctx = Context::background();
    let conn = driver.open_conn(&ctx, "typed").unwrap();
    conn.execute(
        &ctx,
        "CREATE|events|id=int16,ok=bool,at=datetime,score=float64,note=nullstring",
        &[],
    )
    .unwrap();

    let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
    conn.execute(
        &ctx,
        "INSERT|events|id=?,ok=?,at=?,score=?,note=?",
        &params![7i16, true, at, 2.5, Value::Null],
    )
    .unwrap();
    conn.execute(&ctx, "INSERT|events|id=?,ok=?", &params![8i16, "false"])
        .unwrap();

    let mut rows = conn
        .query(&ctx, "SELECT|events|id,ok,at,score,note|", &[])
        .unwrap();

    assert!(rows.next());
    let mut id = 0i16;
    let mut ok = false;
    let mut when = Utc::now();
    let mut score = 0.0f64;
    let mut note: Option<String> = Some("placeholder".to_string());
    rows.scan(&mut [&mut id, &mut ok, &mut when, &mut score, &mut note])
        .unwrap();
    assert_eq!((id, ok, when, score, note), (7, true, at, 2.5, None));

    assert!(rows.next());
    assert_eq!(rows.get::<i16>(0).unwrap(), 8);
    assert!(!rows.get::<bool>(1).unwrap());
    assert_eq!(rows.get::<f64>(3).unwrap(), 0.0);
    assert_eq!(rows.get::<Option<String>>(4).unwrap(), None);

    assert!(!rows.next());
}

#[test]
fn test_arity_failure_inserts_nothing() {
    let driver = FakeDriver::default();
    let ctx = Context::background();
    let conn = driver.open_conn(&ctx, "arity").unwrap();
    conn.execute(&ctx, "CREATE|t|a=int64,b=string", &[])
        .unwrap();

    let err = conn
        .execute(&ctx, "INSERT|t|a=?,b=?", &params![1])
        .unwrap_err();
    assert_eq!(
        err,
        Error::ParameterCountMismatch {
            expected: 2,
            got: 1
        }
    );

    let err = conn
        .execute(&ctx, "INSERT|t|a=?,b=?", &params!["not a number", "x"])
        .unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { .. }));

    assert_eq!(conn.catalog().row_count("t").unwrap(), 0);
}

#[test]
fn test_cursor_close_is_idempotent() {
    let driver = FakeDriver::default();
    let ctx = Context::background();
    let conn = driver.open_conn(&ctx, "close").unwrap();
    conn.execute(&ctx, "CREATE|t|id=int64", &[]).unwrap();
    conn.execute(&ctx, "INSERT|t|id=?", &params![1]).unwrap();

    let mut rows = conn.query(&ctx, "SELECT|t|id|", &[]).unwrap();
    rows.close();
    rows.close();
    assert!(!rows.next());
    let mut id = 0i64;
    assert_eq!(rows.scan(&mut [&mut id]).unwrap_err(), Error::CursorClosed);

    let mut rows = conn.query(&ctx, "SELECT|t|id|", &[]).unwrap();
    assert!(rows.next());
    assert!(!rows.next());
    rows.close();
    rows.close();
    assert!(rows.err().is_none());

    let mut rows = conn.query(&ctx, "SELECT|t|id|", &[]).unwrap();
    let mut seen = Vec::new();
    while rows.next() {
        seen.push(rows.get::<i64>(0).unwrap());
    }
    assert_eq!(seen, vec![1]);
    assert_eq!(conn.catalog().row_count("t").unwrap(), 1);
}

#[test]
fn test_select_filter_matches_every_row() {
    let driver = FakeDriver::default();
    let ctx = Context::background();
    let conn = driver.open_conn(&ctx, "filter").unwrap();
    conn.execute(&ctx, "CREATE|t|id=int64", &[]).unwrap();
    for id in 1..=3 {
        conn.execute(&ctx, "INSERT|t|id=?", &params![id]).unwrap();
    }

    let mut rows = conn.query(&ctx, "SELECT|t|id|id=?", &params![2]).unwrap();
    let mut seen = Vec::new();
    while rows.next() {
        seen.push(rows.get::<i64>(0).unwrap());
    }
    assert_eq!(seen, vec![1, 2, 3]);

    let err = conn.query(&ctx, "SELECT|t|id|id=?", &[]).unwrap_err();
    assert!(matches!(err, Error::ParameterCountMismatch { .. }));
}

#[test]
fn test_get_far_out_of_range_column() {
    let driver = FakeDriver::default();
    let ctx = Context::background();
    let conn = driver.open_conn(&ctx, "range").unwrap();
    conn.execute(&ctx, "CREATE|t|id=int64", &[]).unwrap();
    conn.execute(&ctx, "INSERT|t|id=?", &params![1]).unwrap();

    let mut rows = conn.query(&ctx, "SELECT|t|id|", &[]).unwrap();
    assert!(rows.next());
    let err = rows.get::<i64>(usize::MAX).unwrap_err();
    assert!(matches!(err, Error::ColumnOutOfRange { .. }));
    assert_eq!(rows.get::<i64>(0).unwrap(), 1);
}

#[test]
fn test_select_unknown_table() {
    let driver = FakeDriver::default();
    let ctx = Context::background();
    let conn = driver.open_conn(&ctx, "missing").unwrap();

    let err = conn.query(&ctx, "SELECT|nope|id|", &[]).unwrap_err();
    assert_eq!(err, Error::TableNotFound("nope".to_string()));
}

#[test]
fn test_connections_share_catalog_across_threads() {
    let driver = Arc::new(FakeDriver::default());
    let ctx = Context::background();
    driver
        .open_conn(&ctx, "threads")
        .unwrap()
        .execute(&ctx, "CREATE|t|worker=int64,n=int64", &[])
        .unwrap();

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let driver = driver.clone();
            thread::spawn(move || {
                let ctx = Context::background();
                let conn = driver.open_conn(&ctx, "threads").unwrap();
                for n in 0..25 {
                    conn.execute(&ctx, "INSERT|t|worker=?,n=?", &params![worker, n])
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let conn = driver.open_conn(&ctx, "threads").unwrap();
    assert_eq!(conn.catalog().row_count("t").unwrap(), 100);
    assert_eq!(driver.open_count(), 6);
}

#[test]
fn test_cancelled_context_stops_work() {
    let driver = FakeDriver::default();
    let ctx = Context::background();
    let conn = driver.open_conn(&ctx, "cancel").unwrap();
    conn.execute(&ctx, "CREATE|t|id=int64", &[]).unwrap();
    conn.execute(&ctx, "INSERT|t|id=?", &params![1]).unwrap();

    let query_ctx = Context::background();
    let mut rows = conn.query(&query_ctx, "SELECT|t|id|", &[]).unwrap();
    query_ctx.cancel();
    assert!(!rows.next());
    assert_eq!(rows.err(), Some(&Error::Cancelled));

    let err = conn
        .execute(&query_ctx, "INSERT|t|id=?", &params![2])
        .unwrap_err();
    assert!(err.is_cancellation());
    assert_eq!(conn.catalog().row_count("t").unwrap(), 1);
}

#[test]
fn test_create_then_select_is_empty() {
    let driver = FakeDriver::default();
    let ctx = Context::background();
    let conn = driver.open_conn(&ctx, "empty").unwrap();
    conn.execute(&ctx, "CREATE|t|id=int64,name=string", &[])
        .unwrap();

    let mut rows = conn.query(&ctx, "SELECT|t|name,id|", &[]).unwrap();
    assert_eq!(rows.column_names(), vec!["name", "id"]);
    assert!(!rows.next());
    assert!(rows.err().is_none());
    rows.close();
}
