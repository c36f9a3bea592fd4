//! DSL Parser
//!
//! This module turns pipe-delimited statement text into a [`ParsedOperation`].
//! Parsing is pure: it never consults a catalog.
//!
//! Grammar:
//!
//! ```text
//! CREATE|table|col=type,col=type,...
//! INSERT|table|col=?,col=literal,...
//! SELECT|table|col,col,...[|filter]
//! UPDATE|table|col=?,col=literal,...[|filter]
//! DELETE|table[|filter]
//! WIPE
//! ```

use std::collections::HashSet;

use nom::{
    bytes::complete::{take_while, take_while1},
    character::complete::char,
    combinator::all_consuming,
    sequence::separated_pair,
    IResult,
};

use super::ast::*;
use crate::catalog::DataType;
use crate::error::{Error, Result};

/// Parse one statement
pub fn parse(text: &str) -> Result<ParsedOperation> {
    let text = text.trim();
    let segments: Vec<&str> = text.split('|').collect();

    match segments[0] {
        "CREATE" => parse_create(text, &segments),
        "INSERT" => parse_insert(text, &segments),
        "SELECT" => parse_select(text, &segments),
        "UPDATE" => parse_update(text, &segments),
        "DELETE" => parse_delete(text, &segments),
        "WIPE" => {
            expect_segments(text, &segments, 1, 1)?;
            Ok(ParsedOperation::Wipe)
        }
        "" => Err(Error::syntax(text, "empty statement")),
        verb => Err(Error::syntax(
            verb,
            "unknown operation, expected CREATE, INSERT, SELECT, UPDATE, DELETE or WIPE",
        )),
    }
}

// ========== Statements ==========

fn parse_create(text: &str, segments: &[&str]) -> Result<ParsedOperation> {
    expect_segments(text, segments, 3, 3)?;
    let table = table_name(text, segments[1])?;

    let list = segments[2];
    if list.is_empty() {
        return Err(Error::syntax(text, "empty column list"));
    }

    let mut seen = HashSet::new();
    let mut columns = Vec::new();
    for item in list.split(',') {
        let (name, type_name) = complete(item, column_def, "expected column=type")?;
        let (data_type, nullable) = DataType::parse(type_name)
            .ok_or_else(|| Error::syntax(item, format!("unknown type '{}'", type_name)))?;
        if !seen.insert(name) {
            return Err(Error::syntax(item, format!("duplicate column '{}'", name)));
        }
        columns.push(ColumnDef {
            name: name.to_string(),
            data_type,
            nullable,
        });
    }

    Ok(ParsedOperation::Create { table, columns })
}

fn parse_insert(text: &str, segments: &[&str]) -> Result<ParsedOperation> {
    expect_segments(text, segments, 3, 3)?;
    let table = table_name(text, segments[1])?;
    let assignments = parse_assignments(text, segments[2])?;

    Ok(ParsedOperation::Insert { table, assignments })
}

fn parse_select(text: &str, segments: &[&str]) -> Result<ParsedOperation> {
    expect_segments(text, segments, 3, 4)?;
    let table = table_name(text, segments[1])?;

    let list = segments[2];
    if list.is_empty() {
        return Err(Error::syntax(text, "empty column list"));
    }

    let mut seen = HashSet::new();
    let mut columns = Vec::new();
    for item in list.split(',') {
        let name = complete(item, identifier, "invalid column name")?;
        if !seen.insert(name) {
            return Err(Error::syntax(item, format!("duplicate column '{}'", name)));
        }
        columns.push(name.to_string());
    }

    Ok(ParsedOperation::Select {
        table,
        columns,
        filter: parse_filter(segments.get(3).copied()),
    })
}

fn parse_update(text: &str, segments: &[&str]) -> Result<ParsedOperation> {
    expect_segments(text, segments, 3, 4)?;
    let table = table_name(text, segments[1])?;
    let assignments = parse_assignments(text, segments[2])?;

    Ok(ParsedOperation::Update {
        table,
        assignments,
        filter: parse_filter(segments.get(3).copied()),
    })
}

fn parse_delete(text: &str, segments: &[&str]) -> Result<ParsedOperation> {
    expect_segments(text, segments, 2, 3)?;
    let table = table_name(text, segments[1])?;

    Ok(ParsedOperation::Delete {
        table,
        filter: parse_filter(segments.get(2).copied()),
    })
}

// ========== Segments ==========

fn expect_segments(text: &str, segments: &[&str], min: usize, max: usize) -> Result<()> {
    let n = segments.len();
    if n < min || n > max {
        let expected = if min == max {
            format!("{}", min)
        } else {
            format!("{} to {}", min, max)
        };
        let reason = format!("expected {} segment(s), found {}", expected, n);
        return Err(Error::syntax(text, reason));
    }
    Ok(())
}

fn table_name(text: &str, segment: &str) -> Result<String> {
    if segment.is_empty() {
        return Err(Error::syntax(text, "empty table name"));
    }
    complete(segment, identifier, "invalid table name").map(str::to_string)
}

fn parse_assignments(text: &str, list: &str) -> Result<Vec<Assignment>> {
    if list.is_empty() {
        return Err(Error::syntax(text, "empty column list"));
    }

    let mut seen = HashSet::new();
    let mut next_placeholder = 0;
    let mut assignments = Vec::new();
    for item in list.split(',') {
        let (column, raw) = complete(item, assignment, "expected column=value")?;
        if !seen.insert(column) {
            let reason = format!("duplicate column '{}'", column);
            return Err(Error::syntax(item, reason));
        }

        let value = if raw == "?" {
            next_placeholder += 1;
            ValueSource::Placeholder(next_placeholder - 1)
        } else {
            ValueSource::Literal(raw.to_string())
        };
        assignments.push(Assignment {
            column: column.to_string(),
            value,
        });
    }

    Ok(assignments)
}

fn parse_filter(segment: Option<&str>) -> Filter {
    match segment {
        Some(text) => Filter {
            text: text.to_string(),
            placeholders: text.matches('?').count(),
        },
        None => Filter::default(),
    }
}

// ========== Lexical pieces ==========

fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_')(input)
}

fn column_def(input: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(identifier, char('='), identifier)(input)
}

fn assignment(input: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(identifier, char('='), take_while(|c: char| c != ','))(input)
}

/// Run a nom parser over a whole segment, mapping failure to a syntax error
fn complete<'a, O>(
    segment: &'a str,
    parser: fn(&'a str) -> IResult<&'a str, O>,
    reason: &str,
) -> Result<O> {
    all_consuming(parser)(segment)
        .map(|(_, out)| out)
        .map_err(|_| Error::syntax(segment, reason))
}
