//! Driver result → render-ready table.

use std::collections::HashSet;

use crate::core::types::{ColumnHeader, ColumnType, DbRow, DriverResult, NormalizedResult, QueryStat};

/// Renamed variants tried before giving up on a colliding column name.
pub const MAX_RENAME_ATTEMPTS: usize = 20;

pub fn normalize(raw: &DriverResult) -> NormalizedResult {
    let headers = build_headers(&raw.columns, &raw.column_types);

    let rows = raw
        .rows
        .iter()
        .map(|values| {
            let mut row = DbRow::with_capacity(headers.len());
            for (i, h) in headers.iter().enumerate() {
                let v = values.get(i).cloned().unwrap_or(serde_json::Value::Null);
                row.insert(h.name.clone(), v);
            }
            row
        })
        .collect();

    NormalizedResult {
        headers,
        rows,
        stat: QueryStat {
            rows_affected: raw.rows_affected,
            // Not instrumented here.
            rows_read: None,
            rows_written: None,
            query_duration_ms: Some(0.0),
        },
        last_insert_rowid: raw.last_insert_rowid,
    }
}

pub fn build_headers(columns: &[String], column_types: &[Option<String>]) -> Vec<ColumnHeader> {
    let mut taken: HashSet<String> = HashSet::with_capacity(columns.len());

    columns
        .iter()
        .enumerate()
        .map(|(i, col)| {
            let original_type = column_types.get(i).cloned().flatten();
            let name = unique_name(col, &taken);
            taken.insert(name.clone());
            ColumnHeader {
                name,
                display_name: col.clone(),
                column_type: classify_type(original_type.as_deref()),
                original_type,
            }
        })
        .collect()
}

/// Picks `col`, else the first free `__{col}_{k}`. After
/// [`MAX_RENAME_ATTEMPTS`] misses the last candidate is used even if taken.
fn unique_name(col: &str, taken: &HashSet<String>) -> String {
    let mut candidate = col.to_string();
    for k in 0..MAX_RENAME_ATTEMPTS {
        if !taken.contains(&candidate) {
            break;
        }
        candidate = format!("__{col}_{k}");
    }
    candidate
}

pub fn classify_type(decl_type: Option<&str>) -> ColumnType {
    let Some(t) = decl_type else {
        return ColumnType::Blob;
    };
    let t = t.to_ascii_uppercase();
    let has = |needles: &[&str]| needles.iter().any(|n| t.contains(n));

    if has(&["CHAR", "TEXT", "CLOB", "STRING"]) {
        ColumnType::Text
    } else if has(&["INT"]) {
        ColumnType::Integer
    } else if has(&["BLOB"]) {
        ColumnType::Blob
    } else if has(&["REAL", "DOUBLE", "FLOAT"]) {
        ColumnType::Real
    } else {
        // Unknown declared types render as text; only a missing type is BLOB.
        ColumnType::Text
    }
}
