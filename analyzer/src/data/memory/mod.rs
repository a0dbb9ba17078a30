//! In-memory analytics engine
//!
//! Groups records with a [`GroupAccumulator`] held behind a single mutex.
//! One dataset is resident at a time; `release` drops it before the next
//! load allocates.

pub mod accumulator;
pub mod percentile;

pub use accumulator::{GroupAccumulator, NormalizedGroup};

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::data::error::DataError;
use crate::data::types::{GroupSummary, LogRecord};

const BACKEND: &str = "memory";

/// In-memory analytics service
pub struct MemoryService {
    tables: Mutex<Option<GroupAccumulator>>,
    open: AtomicBool,
}

impl Default for MemoryService {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryService {
    pub fn new() -> Self {
        tracing::debug!("MemoryService initialized");
        Self {
            tables: Mutex::new(None),
            open: AtomicBool::new(true),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    fn ensure_open(&self) -> Result<(), DataError> {
        if self.is_open() {
            Ok(())
        } else {
            Err(DataError::backend_unavailable(BACKEND, "engine closed"))
        }
    }

    /// Drop the resident dataset, if any
    pub fn release(&self) {
        if let Some(previous) = self.tables.lock().take() {
            tracing::debug!(
                groups = previous.len(),
                records = previous.record_count(),
                "Released in-memory groups"
            );
        }
    }

    /// Group `records`, replacing any resident dataset
    pub fn load(&self, records: &[LogRecord]) -> Result<(), DataError> {
        self.ensure_open()?;
        self.release();

        let mut accumulator = GroupAccumulator::new();
        accumulator.ingest_all(records);
        tracing::debug!(
            records = accumulator.record_count(),
            groups = accumulator.len(),
            "Grouped records in memory"
        );

        *self.tables.lock() = Some(accumulator);
        Ok(())
    }

    /// Per-group statistics of the resident dataset, ordered by template
    pub fn summarize(&self) -> Result<Vec<GroupSummary>, DataError> {
        self.ensure_open()?;
        let guard = self.tables.lock();
        let accumulator = guard
            .as_ref()
            .ok_or(DataError::NotLoaded { backend: BACKEND })?;
        Ok(accumulator.summarize())
    }

    /// Close the engine; later loads fail with `BackendUnavailable`
    pub fn close(&self) {
        self.open.store(false, Ordering::Release);
        self.release();
        tracing::debug!("MemoryService closed");
    }
}
