//! DuckDB analytics engine
//!
//! Alternative to the in-memory engine for large inputs. Records are bulk
//! appended into an in-memory database and aggregated in SQL. Each load
//! rebuilds the table, so only the latest run is resident.

pub mod repositories;
pub mod schema;

pub use repositories::analysis as analysis_repository;

use duckdb::Connection;
use parking_lot::Mutex;

use crate::data::error::DataError;
use crate::data::types::{GroupSummary, LogRecord};

const BACKEND: &str = "duckdb";

/// DuckDB analytics service
///
/// Uses a single connection protected by a mutex. `None` once closed.
pub struct DuckdbService {
    conn: Mutex<Option<Connection>>,
    loaded: Mutex<bool>,
}

impl Drop for DuckdbService {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.get_mut().take()
            && let Err((_, e)) = conn.close()
        {
            tracing::warn!("DuckDB connection close failed during drop: {}", e);
        }
    }
}

impl DuckdbService {
    /// Open an in-memory database with extension autoloading disabled
    pub fn init() -> Result<Self, DataError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(
            "SET autoinstall_known_extensions = false;
             SET autoload_known_extensions = false;
             SET extension_directory = '';
             LOAD json;",
        )?;

        tracing::debug!("DuckdbService initialized");
        Ok(Self {
            conn: Mutex::new(Some(conn)),
            loaded: Mutex::new(false),
        })
    }

    pub fn is_open(&self) -> bool {
        self.conn.lock().is_some()
    }

    /// Drop the previous run's table
    pub fn release(&self) -> Result<(), DataError> {
        let guard = self.conn.lock();
        if let Some(conn) = guard.as_ref() {
            conn.execute_batch(schema::DROP_SCHEMA)?;
            *self.loaded.lock() = false;
            tracing::debug!("Released DuckDB access log table");
        }
        Ok(())
    }

    /// Recreate the table and append `records`
    pub fn load(&self, records: &[LogRecord]) -> Result<(), DataError> {
        let guard = self.conn.lock();
        let conn = guard
            .as_ref()
            .ok_or_else(|| DataError::backend_unavailable(BACKEND, "connection closed"))?;

        *self.loaded.lock() = false;
        let written = in_transaction(conn, |conn| {
            conn.execute_batch(schema::DROP_SCHEMA)?;
            conn.execute_batch(schema::SCHEMA)?;
            analysis_repository::insert_records(conn, records)
        })?;
        *self.loaded.lock() = true;

        tracing::debug!(records = written, "Appended records to DuckDB");
        Ok(())
    }

    /// Per-group statistics of the resident dataset, ordered by template
    pub fn summarize(&self) -> Result<Vec<GroupSummary>, DataError> {
        let guard = self.conn.lock();
        let conn = guard
            .as_ref()
            .ok_or_else(|| DataError::backend_unavailable(BACKEND, "connection closed"))?;
        if !*self.loaded.lock() {
            return Err(DataError::NotLoaded { backend: BACKEND });
        }
        analysis_repository::summarize(conn)
    }

    /// Close the connection; later loads fail with `BackendUnavailable`
    pub fn close(&self) -> Result<(), DataError> {
        if let Some(conn) = self.conn.lock().take() {
            conn.close().map_err(|(_, e)| DataError::Duckdb(e))?;
            tracing::debug!("DuckDB connection closed");
        }
        Ok(())
    }
}

/// Execute a function within a transaction, rolling back on error.
fn in_transaction<F, T>(conn: &Connection, f: F) -> Result<T, DataError>
where
    F: FnOnce(&Connection) -> Result<T, DataError>,
{
    conn.execute_batch("BEGIN TRANSACTION")?;
    match f(conn) {
        Ok(val) => {
            conn.execute_batch("COMMIT")?;
            Ok(val)
        }
        Err(e) => {
            if let Err(rollback_err) = conn.execute_batch("ROLLBACK") {
                tracing::warn!("ROLLBACK failed after transaction error: {}", rollback_err);
            }
            Err(e)
        }
    }
}
