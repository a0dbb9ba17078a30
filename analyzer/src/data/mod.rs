//! Data layer
//!
//! Analytics engines that turn loaded records into per-template statistics:
//! - `memory` - Hash-map grouping with exact percentiles (default)
//! - `duckdb` - Embedded SQL engine, behind the `duckdb` feature
//! - `types` - Records, summaries and report rows shared by every engine
//! - `error` - Unified error type for all engines
//!
//! Both engines group on the template produced by
//! [`crate::domain::normalize::normalize`], so their results agree.

#[cfg(feature = "duckdb")]
pub mod duckdb;
pub mod error;
pub mod memory;
pub mod types;

#[cfg(feature = "duckdb")]
pub use duckdb::DuckdbService;
pub use error::DataError;
pub use memory::MemoryService;

use crate::core::config::AnalyticsBackend;
use crate::data::types::{GroupSummary, LogRecord};

/// Analytics engine enum
///
/// Wraps the backend-specific service and gives the pipeline a single
/// interface regardless of which engine is configured.
pub enum AnalyticsService {
    /// In-memory grouping (default)
    Memory(MemoryService),
    /// Embedded DuckDB
    #[cfg(feature = "duckdb")]
    Duckdb(DuckdbService),
}

impl AnalyticsService {
    /// Initialize the engine selected by configuration
    pub fn init(backend: AnalyticsBackend) -> Result<Self, DataError> {
        match backend {
            AnalyticsBackend::Memory => Ok(Self::Memory(MemoryService::new())),
            #[cfg(feature = "duckdb")]
            AnalyticsBackend::Duckdb => Ok(Self::Duckdb(DuckdbService::init()?)),
            #[cfg(not(feature = "duckdb"))]
            AnalyticsBackend::Duckdb => Err(DataError::Config(
                "DuckDB engine requested but this build lacks the `duckdb` feature".to_string(),
            )),
        }
    }

    /// Get the backend type
    pub fn backend(&self) -> AnalyticsBackend {
        match self {
            Self::Memory(_) => AnalyticsBackend::Memory,
            #[cfg(feature = "duckdb")]
            Self::Duckdb(_) => AnalyticsBackend::Duckdb,
        }
    }

    /// Whether the engine can accept a load
    pub fn is_ready(&self) -> bool {
        match self {
            Self::Memory(s) => s.is_open(),
            #[cfg(feature = "duckdb")]
            Self::Duckdb(s) => s.is_open(),
        }
    }

    /// Drop whatever the previous run left resident
    pub fn release(&self) -> Result<(), DataError> {
        match self {
            Self::Memory(s) => {
                s.release();
                Ok(())
            }
            #[cfg(feature = "duckdb")]
            Self::Duckdb(s) => s.release(),
        }
    }

    /// Replace the resident dataset with `records`
    pub fn load(&self, records: &[LogRecord]) -> Result<(), DataError> {
        match self {
            Self::Memory(s) => s.load(records),
            #[cfg(feature = "duckdb")]
            Self::Duckdb(s) => s.load(records),
        }
    }

    /// Per-template statistics, ordered by template
    pub fn summarize(&self) -> Result<Vec<GroupSummary>, DataError> {
        match self {
            Self::Memory(s) => s.summarize(),
            #[cfg(feature = "duckdb")]
            Self::Duckdb(s) => s.summarize(),
        }
    }

    /// Shut the engine down; later loads report it unavailable
    pub fn close(&self) -> Result<(), DataError> {
        match self {
            Self::Memory(s) => {
                s.close();
                Ok(())
            }
            #[cfg(feature = "duckdb")]
            Self::Duckdb(s) => s.close(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_memory_backend() {
        let service = AnalyticsService::init(AnalyticsBackend::Memory).unwrap();
        assert_eq!(service.backend(), AnalyticsBackend::Memory);
        assert!(service.is_ready());
    }

    #[test]
    fn test_close_marks_not_ready() {
        let service = AnalyticsService::init(AnalyticsBackend::Memory).unwrap();
        service.close().unwrap();
        assert!(!service.is_ready());
    }

    #[cfg(not(feature = "duckdb"))]
    #[test]
    fn test_duckdb_without_feature_is_config_error() {
        let result = AnalyticsService::init(AnalyticsBackend::Duckdb);
        assert!(matches!(result, Err(DataError::Config(_))));
    }

    #[cfg(feature = "duckdb")]
    #[test]
    fn test_engines_agree() {
        let records = vec![
            LogRecord::new("/api/user/1/profile?token=abcd", 200, 0.12),
            LogRecord::new("/api/user/2/profile?token=zz", 500, 0.40),
            LogRecord::new("/health", 200, 0.01),
            LogRecord::new("/api/user/1/profile?token=abcd", 302, 0.07),
        ];

        let memory = AnalyticsService::init(AnalyticsBackend::Memory).unwrap();
        let duck = AnalyticsService::init(AnalyticsBackend::Duckdb).unwrap();
        memory.load(&records).unwrap();
        duck.load(&records).unwrap();

        let a = memory.summarize().unwrap();
        let b = duck.summarize().unwrap();
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.request, y.request);
            assert_eq!(x.total_requests, y.total_requests);
            assert_eq!(x.status_counts, y.status_counts);
            assert_eq!(x.original_patterns, y.original_patterns);
            assert!((x.p95_time - y.p95_time).abs() < 1e-9);
            assert!((x.avg_time - y.avg_time).abs() < 1e-9);
        }
    }
}
