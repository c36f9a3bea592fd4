//! fakedb - interactive shell over one in-memory database

use std::env;

use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing_subscriber::EnvFilter;

use fakedb::catalog::Catalog;
use fakedb::{Conn, Context, Cursor, FakeConn, FakeDriver, Value};

/// Output format for query results
#[derive(Debug, Clone, Copy, PartialEq)]
enum OutputFormat {
    Table,
    Json,
}

/// Print welcome banner
fn print_banner(database: &str) {
    println!("fakedb shell - in-memory database '{}'", database);
    println!("Type '.help' for help, '.quit' to exit");
}

/// Print help message
fn print_help() {
    println!(
        r#"
Commands:
  .help              Show this help message
  .quit              Exit the shell
  .tables            List all tables
  .schema [table]    Show table schema
  .mode table|json   Set output format

Statements (arguments follow, separated by spaces):
  CREATE|users|id=int64,name=string
  INSERT|users|id=?,name=? 1 foo
  SELECT|users|id,name|
  UPDATE|users|name=?| bar
  DELETE|users|
  WIPE

Types: bool int16 int32 int64 float64 string datetime (prefix 'null' for nullable)
"#
    );
}

/// Format query results as a table
fn format_table(columns: &[&str], rows: &[Vec<Value>]) -> String {
    let mut widths: Vec<usize> = columns.iter().map(|c| c.len()).collect();
    for row in rows {
        for (i, value) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(value.to_string().len());
            }
        }
    }

    let separator: String = widths
        .iter()
        .map(|w| "-".repeat(*w + 2))
        .collect::<Vec<_>>()
        .join("+");
    let separator = format!("+{}+\n", separator);

    let mut output = String::new();
    output.push_str(&separator);
    let header: String = columns
        .iter()
        .zip(&widths)
        .map(|(c, w)| format!(" {:^width$} ", c, width = *w))
        .collect::<Vec<_>>()
        .join("|");
    output.push_str(&format!("|{}|\n", header));
    output.push_str(&separator);

    for row in rows {
        let row_str: String = row
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!(" {:>width$} ", v.to_string(), width = *w))
            .collect::<Vec<_>>()
            .join("|");
        output.push_str(&format!("|{}|\n", row_str));
    }

    if !rows.is_empty() {
        output.push_str(&separator);
    }

    output.push_str(&format!("{} row(s) returned\n", rows.len()));
    output
}

/// Drain a cursor and render it
fn render(mut cursor: Cursor, format: OutputFormat) -> Result<String> {
    let mut rows = Vec::new();
    while cursor.next() {
        if let Some(row) = cursor.row() {
            rows.push(row.values().to_vec());
        }
    }
    if let Some(err) = cursor.err() {
        return Err(err.clone().into());
    }

    let output = match format {
        OutputFormat::Json => {
            serde_json::json!({ "columns": cursor.columns(), "rows": rows }).to_string() + "\n"
        }
        OutputFormat::Table => format_table(&cursor.column_names(), &rows),
    };
    cursor.close();
    Ok(output)
}

/// Run one statement line: the statement text, then its arguments
fn execute_line(conn: &FakeConn, line: &str, format: OutputFormat) -> Result<String> {
    let ctx = Context::background();
    let mut parts = line.split_whitespace();
    let text = parts.next().unwrap_or_default();
    let params: Vec<Value> = parts.map(Value::parse_literal).collect();

    let stmt = conn.prepare(&ctx, text)?;
    if stmt.kind().returns_rows() {
        render(stmt.query(&ctx, &params)?, format)
    } else {
        let result = stmt.execute(&ctx, &params)?;
        Ok(match format {
            OutputFormat::Json => serde_json::to_string(&result)? + "\n",
            OutputFormat::Table => format!("{} row(s) affected\n", result.affected_rows),
        })
    }
}

/// Print the schema of one table, or of all tables
fn print_schema(catalog: &Catalog, table: Option<&str>) {
    let tables = match table {
        Some(name) => vec![name.to_string()],
        None => catalog.list_tables(),
    };
    for name in tables {
        match catalog.get_table_info(&name) {
            Ok(info) => println!("{}", info),
            Err(e) => eprintln!("Error: {}", e),
        }
    }
}

/// Handle special dot commands. Returns false to quit.
fn handle_special_command(cmd: &str, conn: &FakeConn, format: &mut OutputFormat) -> bool {
    let parts: Vec<&str> = cmd.split_whitespace().collect();

    match parts.first().copied() {
        Some(".help") => print_help(),
        Some(".quit") | Some(".exit") => return false,
        Some(".tables") => {
            let tables = conn.catalog().list_tables();
            if tables.is_empty() {
                println!("No tables found.");
            } else {
                println!("Tables:");
                for table in tables {
                    println!("  {}", table);
                }
            }
        }
        Some(".schema") => print_schema(conn.catalog(), parts.get(1).copied()),
        Some(".mode") => match parts.get(1).copied() {
            Some("json") => *format = OutputFormat::Json,
            Some("table") => *format = OutputFormat::Table,
            _ => eprintln!("Usage: .mode table|json"),
        },
        Some(cmd) => {
            eprintln!("Unknown command: {}", cmd);
            eprintln!("Type '.help' for available commands.");
        }
        None => {}
    }
    true
}

/// Main REPL loop
fn run_repl(database: &str) -> Result<()> {
    let driver = FakeDriver::default();
    let mut conn = driver.open_conn(&Context::background(), database)?;
    let mut rl = DefaultEditor::new()?;
    let mut format = OutputFormat::Table;

    print_banner(database);

    loop {
        match rl.readline("fakedb> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                if trimmed.starts_with('.') {
                    if !handle_special_command(trimmed, &conn, &mut format) {
                        break;
                    }
                    continue;
                }

                match execute_line(&conn, trimmed, format) {
                    Ok(output) => print!("{}", output),
                    Err(e) => eprintln!("Error: {}", e),
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        }
    }

    conn.close()?;
    println!("Goodbye!");
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let database = env::args().nth(1).unwrap_or_else(|| "shell".to_string());
    run_repl(&database)
}
