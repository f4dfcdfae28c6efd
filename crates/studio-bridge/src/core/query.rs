use rusqlite::{types::ValueRef, Batch, Connection, Row};

use crate::core::types::DriverResult;
use crate::error::{AppError, AppResult};

/// Runs exactly one statement. Text holding several statements, or none
/// (blank or comment-only), is rejected before anything executes.
///
/// Read-only statements report `rows_affected = 0`. Writes, including
/// `RETURNING` forms, report the change count and, when they changed rows,
/// the rowid of the last insert.
pub fn run_statement(conn: &Connection, sql: &str) -> AppResult<DriverResult> {
    let mut batch = Batch::new(conn, sql);
    let Some(mut stmt) = batch.next()? else {
        return Err(AppError::Sql("no SQL statement provided".into()));
    };
    // Only blanks and comments may follow; a parse error there still means
    // more SQL was sent.
    if !matches!(batch.next(), Ok(None)) {
        return Err(AppError::Sql("multiple statements provided".into()));
    }

    let (columns, column_types): (Vec<String>, Vec<Option<String>>) = stmt
        .columns()
        .iter()
        .map(|c| (c.name().to_string(), c.decl_type().map(str::to_string)))
        .unzip();
    let readonly = stmt.readonly();

    if columns.is_empty() {
        let changes = stmt.execute([])? as u64;
        let last_insert_rowid = (changes > 0).then(|| conn.last_insert_rowid());
        return Ok(DriverResult {
            columns,
            column_types,
            rows: Vec::new(),
            rows_affected: changes,
            last_insert_rowid,
        });
    }

    let width = columns.len();
    let mut rows = Vec::new();
    {
        let mut r = stmt.query([])?;
        while let Some(row) = r.next()? {
            rows.push(row_to_json_values(row, width)?);
        }
    }

    let (rows_affected, last_insert_rowid) = if readonly {
        (0, None)
    } else {
        let changes = conn.changes() as u64;
        (changes, (changes > 0).then(|| conn.last_insert_rowid()))
    };

    Ok(DriverResult {
        columns,
        column_types,
        rows,
        rows_affected,
        last_insert_rowid,
    })
}

/// Runs `statements` in order inside one transaction. The first failure rolls
/// everything back.
pub fn run_batch(conn: &mut Connection, statements: &[String]) -> AppResult<Vec<DriverResult>> {
    let tx = conn.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
    let mut out = Vec::with_capacity(statements.len());
    for sql in statements {
        out.push(run_statement(&tx, sql)?);
    }
    tx.commit()?;
    Ok(out)
}

fn row_to_json_values(row: &Row<'_>, width: usize) -> AppResult<Vec<serde_json::Value>> {
    let mut out = Vec::with_capacity(width);
    for i in 0..width {
        let v = match row.get_ref(i)? {
            ValueRef::Null => serde_json::Value::Null,
            ValueRef::Integer(x) => serde_json::Value::from(x),
            ValueRef::Real(x) => serde_json::Value::from(x),
            ValueRef::Text(t) => serde_json::Value::from(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => serde_json::Value::from(b.to_vec()),
        };
        out.push(v);
    }
    Ok(out)
}
