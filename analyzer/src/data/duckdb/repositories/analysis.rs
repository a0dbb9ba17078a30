//! Access-log ingestion and per-template aggregation
//!
//! The template column is computed before insert so both engines group on the
//! exact same key. DuckDB only does the set work: counts, sums, extrema and
//! continuous quantiles.

use std::collections::BTreeMap;

use duckdb::{Connection, params};
use rustc_hash::FxHashMap;

use crate::core::constants::{DUCKDB_TABLE_ACCESS_LOGS, PERCENTILE_P95, PERCENTILE_P99};
use crate::data::error::DataError;
use crate::data::types::{GroupSummary, LogRecord, mean_within};
use crate::domain::normalize::normalize;

const BACKEND: &str = "duckdb";

/// Raw aggregate row, before status counts are attached
#[derive(Debug)]
struct GroupRow {
    template: String,
    total_requests: i64,
    total_time: f64,
    min_time: f64,
    max_time: f64,
    p95_time: f64,
    p99_time: f64,
    original_patterns: Option<String>,
}

// ============================================================================
// Writes
// ============================================================================

/// Append `records` to the access log table in input order.
///
/// Returns the number of rows written.
pub fn insert_records(conn: &Connection, records: &[LogRecord]) -> Result<usize, DataError> {
    let mut appender = conn.appender(DUCKDB_TABLE_ACCESS_LOGS)?;
    for (seq, record) in records.iter().enumerate() {
        let template = normalize(&record.request);
        appender.append_row(params![
            seq as i64,
            record.request.as_str(),
            template.as_str(),
            record.status,
            record.request_time,
        ])?;
    }
    appender.flush()?;
    drop(appender);
    Ok(records.len())
}

// ============================================================================
// Reads
// ============================================================================

fn group_rows(conn: &Connection) -> Result<Vec<GroupRow>, DataError> {
    let sql = format!(
        r#"
        WITH first_seen AS (
            SELECT template, request, MIN(seq) AS first_seq
            FROM access_logs
            WHERE request <> template
            GROUP BY template, request
        ),
        pattern_lists AS (
            SELECT template,
                   to_json(list(request ORDER BY first_seq))::VARCHAR AS original_patterns
            FROM first_seen
            GROUP BY template
        )
        SELECT
            a.template,
            COUNT(*) AS total_requests,
            SUM(a.request_time) AS total_time,
            MIN(a.request_time) AS min_time,
            MAX(a.request_time) AS max_time,
            quantile_cont(a.request_time, {p95}) AS p95_time,
            quantile_cont(a.request_time, {p99}) AS p99_time,
            p.original_patterns
        FROM access_logs a
        LEFT JOIN pattern_lists p ON p.template = a.template
        GROUP BY a.template, p.original_patterns
        ORDER BY a.template
        "#,
        p95 = PERCENTILE_P95,
        p99 = PERCENTILE_P99,
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], |row| {
        Ok(GroupRow {
            template: row.get(0)?,
            total_requests: row.get(1)?,
            total_time: row.get::<_, f64>(2)?,
            min_time: row.get::<_, f64>(3)?,
            max_time: row.get::<_, f64>(4)?,
            p95_time: row.get::<_, f64>(5)?,
            p99_time: row.get::<_, f64>(6)?,
            original_patterns: row.get(7)?,
        })
    })?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}

fn status_counts(conn: &Connection) -> Result<FxHashMap<String, BTreeMap<i64, u64>>, DataError> {
    let sql = r#"
        SELECT template, status, COUNT(*) AS count
        FROM access_logs
        GROUP BY template, status
        ORDER BY template, status
    "#;

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, i64>(1)?,
            row.get::<_, i64>(2)?,
        ))
    })?;

    let mut counts: FxHashMap<String, BTreeMap<i64, u64>> = FxHashMap::default();
    for row in rows {
        let (template, status, count) = row?;
        counts
            .entry(template)
            .or_default()
            .insert(status, count.max(0) as u64);
    }
    Ok(counts)
}

fn parse_patterns(template: &str, raw: Option<&str>) -> Result<Vec<String>, DataError> {
    match raw {
        None => Ok(Vec::new()),
        Some(json) => serde_json::from_str(json).map_err(|e| {
            DataError::invalid_data(
                BACKEND,
                format!("original patterns for {}: {}", template, e),
            )
        }),
    }
}

/// Per-template statistics, ordered by template
pub fn summarize(conn: &Connection) -> Result<Vec<GroupSummary>, DataError> {
    let rows = group_rows(conn)?;
    let mut statuses = status_counts(conn)?;

    let mut summaries = Vec::with_capacity(rows.len());
    for row in rows {
        let total_requests = row.total_requests.max(0) as u64;
        let (min_time, max_time) = (row.min_time, row.max_time);
        let p95_time = row.p95_time.clamp(min_time, max_time);
        let p99_time = row.p99_time.clamp(p95_time, max_time);

        summaries.push(GroupSummary {
            original_patterns: parse_patterns(&row.template, row.original_patterns.as_deref())?,
            status_counts: statuses.remove(&row.template).unwrap_or_default(),
            request: row.template,
            total_requests,
            total_time: row.total_time,
            min_time,
            max_time,
            avg_time: mean_within(row.total_time, total_requests, min_time, max_time),
            p95_time,
            p99_time,
        });
    }
    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::duckdb::schema::SCHEMA;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        conn
    }

    #[test]
    fn test_insert_records_counts_rows() {
        let conn = setup();
        let written = insert_records(
            &conn,
            &[
                LogRecord::new("/a/1", 200, 0.1),
                LogRecord::new("/a/2", 404, 0.2),
            ],
        )
        .unwrap();
        assert_eq!(written, 2);

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM access_logs", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_template_column_is_normalized() {
        let conn = setup();
        insert_records(&conn, &[LogRecord::new("/orders/42?page=3", 200, 0.1)]).unwrap();
        let template: String = conn
            .query_row("SELECT template FROM access_logs", [], |row| row.get(0))
            .unwrap();
        assert_eq!(template, "/orders/:id?page=:param");
    }

    #[test]
    fn test_summarize_two_records() {
        let conn = setup();
        insert_records(
            &conn,
            &[LogRecord::new("/a", 200, 0.1), LogRecord::new("/a", 404, 0.2)],
        )
        .unwrap();

        let groups = summarize(&conn).unwrap();
        assert_eq!(groups.len(), 1);
        let g = &groups[0];
        assert_eq!(g.request, "/a");
        assert_eq!(g.total_requests, 2);
        assert!((g.avg_time - 0.15).abs() < 1e-9);
        assert!((g.p95_time - 0.195).abs() < 1e-9);
        assert_eq!(g.status_counts.get(&200), Some(&1));
        assert_eq!(g.status_counts.get(&404), Some(&1));
        assert!(g.original_patterns.is_empty());
    }

    #[test]
    fn test_summarize_patterns_in_first_seen_order() {
        let conn = setup();
        let records: Vec<LogRecord> = ["/u/3", "/u/1", "/u/3", "/u/2"]
            .iter()
            .map(|raw| LogRecord::new(*raw, 200, 0.01))
            .collect();
        insert_records(&conn, &records).unwrap();

        let groups = summarize(&conn).unwrap();
        assert_eq!(groups[0].request, "/u/:id");
        assert_eq!(groups[0].original_patterns, vec!["/u/3", "/u/1", "/u/2"]);
    }

    #[test]
    fn test_summarize_empty_table() {
        let conn = setup();
        assert!(summarize(&conn).unwrap().is_empty());
    }
}
