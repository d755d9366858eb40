//! Filtered change record reads.

#![allow(clippy::result_large_err)]

use crate::errors::{corrupt_row, from_rusqlite, Result};
use chrono::{TimeZone, Utc};
use colltrack_core::collaborators::ChangeFilter;
use colltrack_core::diff::model::ChangeType;
use colltrack_core::model::ChangeRecord;
use rusqlite::types::Value as SqlValue;
use rusqlite::Connection;

/// Raw row before domain conversion.
struct ChangeRow {
    collection_id: String,
    old_snapshot_id: Option<String>,
    new_snapshot_id: String,
    change_type: String,
    path: String,
    modification: Option<String>,
    created_at: i64,
}

impl ChangeRow {
    fn into_record(self) -> Result<ChangeRecord> {
        let change_type: ChangeType = self
            .change_type
            .parse()
            .map_err(|_| corrupt_row("changes", format!("unknown change_type '{}'", self.change_type)))?;
        let created_at = Utc
            .timestamp_millis_opt(self.created_at)
            .single()
            .ok_or_else(|| corrupt_row("changes", format!("invalid created_at {}", self.created_at)))?;
        Ok(ChangeRecord {
            collection_id: self.collection_id,
            old_snapshot_id: self.old_snapshot_id,
            new_snapshot_id: self.new_snapshot_id,
            change_type,
            path: self.path,
            modification: self.modification,
            created_at,
        })
    }
}

/// WHERE clause and positional parameters for a filter.
fn where_clause(filter: &ChangeFilter) -> (String, Vec<SqlValue>) {
    let mut clauses: Vec<String> = Vec::new();
    let mut params: Vec<SqlValue> = Vec::new();

    if let Some(c) = &filter.collection_id {
        params.push(SqlValue::Text(c.clone()));
        clauses.push(format!("collection_id = ?{}", params.len()));
    }
    if let Some(s) = &filter.snapshot_id {
        params.push(SqlValue::Text(s.clone()));
        let n = params.len();
        clauses.push(format!("(old_snapshot_id = ?{n} OR new_snapshot_id = ?{n})"));
    }
    if !filter.change_types.is_empty() {
        let mut slots = Vec::new();
        for ct in &filter.change_types {
            params.push(SqlValue::Text(ct.as_str().to_string()));
            slots.push(format!("?{}", params.len()));
        }
        clauses.push(format!("change_type IN ({})", slots.join(", ")));
    }
    if let Some(p) = &filter.path_contains {
        params.push(SqlValue::Text(p.clone()));
        clauses.push(format!("instr(path, ?{}) > 0", params.len()));
    }
    if let Some(since) = filter.since {
        params.push(SqlValue::Integer(since.timestamp_millis()));
        clauses.push(format!("created_at >= ?{}", params.len()));
    }
    if let Some(until) = filter.until {
        params.push(SqlValue::Integer(until.timestamp_millis()));
        clauses.push(format!("created_at < ?{}", params.len()));
    }

    if clauses.is_empty() {
        (String::new(), params)
    } else {
        (format!(" WHERE {}", clauses.join(" AND ")), params)
    }
}

/// Matching records ordered by `(created_at, id)` and the total number of
/// matches before `limit`/`offset` are applied.
pub fn query_changes(conn: &Connection, filter: &ChangeFilter) -> Result<(Vec<ChangeRecord>, usize)> {
    let (where_sql, params) = where_clause(filter);

    let total: i64 = conn
        .query_row(
            &format!("SELECT COUNT(*) FROM changes{where_sql}"),
            rusqlite::params_from_iter(params.iter()),
            |row| row.get(0),
        )
        .map_err(from_rusqlite)?;

    // LIMIT -1 is SQLite for "no limit"
    let limit: i64 = if filter.limit == 0 { -1 } else { filter.limit as i64 };
    let sql = format!(
        "SELECT collection_id, old_snapshot_id, new_snapshot_id, change_type, path,
                modification, created_at
         FROM changes{where_sql}
         ORDER BY created_at, id
         LIMIT {limit} OFFSET {}",
        filter.offset
    );

    let mut stmt = conn.prepare(&sql).map_err(from_rusqlite)?;
    let rows = stmt
        .query_map(rusqlite::params_from_iter(params.iter()), |row| {
            Ok(ChangeRow {
                collection_id: row.get(0)?,
                old_snapshot_id: row.get(1)?,
                new_snapshot_id: row.get(2)?,
                change_type: row.get(3)?,
                path: row.get(4)?,
                modification: row.get(5)?,
                created_at: row.get(6)?,
            })
        })
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;

    let records = rows
        .into_iter()
        .map(ChangeRow::into_record)
        .collect::<Result<Vec<_>>>()?;

    Ok((records, total as usize))
}
