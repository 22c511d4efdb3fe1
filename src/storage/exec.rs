//! Generic statement executor
//!
//! Every lookup in the tool funnels through [`execute_read`] and every
//! mutation outside the lending transactions through [`execute_write`];
//! the transactional writes attach the statement text to their failures
//! the same way. The caller picks the path based on known statement
//! intent; there is no probe-and-fall-back between the two. Reads come back as a [`QueryTable`] of display strings - the
//! single type-erasure boundary in the system, deliberate because the
//! console only ever displays or re-feeds text.

use rusqlite::types::ValueRef;
use rusqlite::{Connection, Params};
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

/// Statement failure carrying the literal SQL text for diagnostics. The
/// statement is never retried; the surrounding workflow decides whether to
/// abort or continue.
#[derive(Debug, Error)]
#[error("statement failed: {sql}")]
pub struct ExecError {
    /// The SQL that failed to prepare or run.
    pub sql: String,
    #[source]
    pub source: rusqlite::Error,
}

impl ExecError {
    pub(crate) fn new(sql: &str, source: rusqlite::Error) -> Self {
        warn!(%sql, error = %source, "statement failed");
        Self {
            sql: sql.to_string(),
            source,
        }
    }
}

/// A fully materialized result set. Materializing up front is what lets the
/// table renderer make its two passes (width scan, then emit) over rows that
/// rusqlite would otherwise hand out forward-only.
#[derive(Debug, Clone, Default, Serialize)]
pub struct QueryTable {
    /// Column names in result order.
    pub columns: Vec<String>,
    /// Rows of display strings, one inner vec per row.
    pub rows: Vec<Vec<String>>,
}

impl QueryTable {
    /// True when the query matched nothing.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row-major flattening of every cell, for callers that re-parse values.
    pub fn flatten(&self) -> Vec<String> {
        self.rows.iter().flatten().cloned().collect()
    }

    /// Cell values of one column, by name.
    pub fn column(&self, name: &str) -> Vec<&str> {
        match self.columns.iter().position(|c| c == name) {
            Some(idx) => self.rows.iter().map(|r| r[idx].as_str()).collect(),
            None => Vec::new(),
        }
    }

    /// JSON view: an array of column-keyed objects.
    pub fn to_json(&self) -> serde_json::Value {
        let objects: Vec<serde_json::Value> = self
            .rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .zip(row)
                    .map(|(col, cell)| (col.clone(), serde_json::Value::String(cell.clone())))
                    .collect::<serde_json::Map<_, _>>()
                    .into()
            })
            .collect();
        serde_json::Value::Array(objects)
    }
}

/// Coerce one cell to its display string. NULL becomes the empty string so
/// width computation and re-parsing stay uniform.
fn display_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(r) => r.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
        ValueRef::Blob(b) => format!("<{} bytes>", b.len()),
    }
}

/// Runs a read-style statement and materializes the whole result set.
pub fn execute_read<P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<QueryTable, ExecError> {
    let mut stmt = conn.prepare(sql).map_err(|e| ExecError::new(sql, e))?;
    let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();

    let mut rows = stmt.query(params).map_err(|e| ExecError::new(sql, e))?;
    let mut table = QueryTable {
        columns,
        rows: Vec::new(),
    };

    loop {
        let row = match rows.next() {
            Ok(Some(row)) => row,
            Ok(None) => break,
            Err(e) => return Err(ExecError::new(sql, e)),
        };
        let mut cells = Vec::with_capacity(table.columns.len());
        for i in 0..table.columns.len() {
            let value = row.get_ref(i).map_err(|e| ExecError::new(sql, e))?;
            cells.push(display_value(value));
        }
        table.rows.push(cells);
    }

    Ok(table)
}

/// Runs a write-style statement and returns the affected-row count.
pub fn execute_write<P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<usize, ExecError> {
    conn.execute(sql, params).map_err(|e| ExecError::new(sql, e))
}
