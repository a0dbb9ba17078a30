//! Pipeline controller
//!
//! A [`Session`] owns one analytics engine and runs loads against it:
//! validate input → normalize and group every record → compute statistics →
//! assemble outputs → publish, or fail with every prior result cleared.
//!
//! ```text
//! Idle → Loading → Computing → Ready
//!          └──────────┴──────→ Error
//! Ready / Error ── next load or reset ──→ Idle
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use parking_lot::{Mutex, RwLock};
use serde::Serialize;

use super::assemble::{ResultAssembler, RunMetadata};
use super::demo;
use super::error::PipelineError;
use super::ingest::{extract_records, parse_input};
use super::schema::infer_schema;
use crate::core::config::InvalidRecordPolicy;
use crate::core::constants::{DEFAULT_PERFORMANCE_LIMIT, DEFAULT_STATUS_CHART_LIMIT};
use crate::data::AnalyticsService;
use crate::data::types::AnalysisReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineState {
    Idle,
    Loading,
    Computing,
    Ready,
    Error,
}

impl PipelineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Computing => "computing",
            Self::Ready => "ready",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-session analysis settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisOptions {
    pub on_invalid_record: InvalidRecordPolicy,
    pub performance_limit: usize,
    pub status_chart_limit: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            on_invalid_record: InvalidRecordPolicy::default(),
            performance_limit: DEFAULT_PERFORMANCE_LIMIT,
            status_chart_limit: DEFAULT_STATUS_CHART_LIMIT,
        }
    }
}

/// Clears the in-flight flag when a load returns, however it returns
struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// One analytics engine plus the results of its latest run
pub struct Session {
    engine: AnalyticsService,
    options: AnalysisOptions,
    state: Mutex<PipelineState>,
    report: RwLock<Option<Arc<AnalysisReport>>>,
    running: AtomicBool,
}

impl Session {
    pub fn new(engine: AnalyticsService, options: AnalysisOptions) -> Self {
        Self {
            engine,
            options,
            state: Mutex::new(PipelineState::Idle),
            report: RwLock::new(None),
            running: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> PipelineState {
        *self.state.lock()
    }

    /// Last published report, if the latest run succeeded
    pub fn report(&self) -> Option<Arc<AnalysisReport>> {
        self.report.read().clone()
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    pub fn engine(&self) -> &AnalyticsService {
        &self.engine
    }

    fn transition(&self, to: PipelineState) {
        let mut state = self.state.lock();
        if *state != to {
            tracing::debug!(
                from = state.as_str(),
                to = to.as_str(),
                "Pipeline state transition"
            );
            *state = to;
        }
    }

    /// Drop published results and engine buffers, back to `Idle`
    fn clear(&self) -> Result<(), PipelineError> {
        self.report.write().take();
        self.transition(PipelineState::Idle);
        self.engine.release()?;
        Ok(())
    }

    /// Discard the current results and return to `Idle`
    pub fn reset(&self) -> Result<(), PipelineError> {
        let _guard = self.begin()?;
        self.clear()
    }

    fn begin(&self) -> Result<RunGuard<'_>, PipelineError> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| PipelineError::RunInProgress)?;
        Ok(RunGuard(&self.running))
    }

    /// Analyze `text`, replacing whatever the previous run published.
    ///
    /// An unavailable engine aborts before anything is touched. Any other
    /// failure leaves the session in `Error` with no results.
    pub fn load(&self, text: &str) -> Result<Arc<AnalysisReport>, PipelineError> {
        let _guard = self.begin()?;

        if !self.engine.is_ready() {
            return Err(PipelineError::EngineUnavailable(format!(
                "{} engine is closed",
                self.engine.backend()
            )));
        }

        let started = Instant::now();
        let outcome = self.clear().and_then(|()| self.run(text));

        match outcome {
            Ok(report) => {
                *self.report.write() = Some(Arc::clone(&report));
                self.transition(PipelineState::Ready);
                tracing::info!(
                    engine = %report.engine,
                    records = report.total_records,
                    skipped = report.skipped_records,
                    groups = report.group_count,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Analysis complete"
                );
                Ok(report)
            }
            Err(e) => {
                self.report.write().take();
                if let Err(release_err) = self.engine.release() {
                    tracing::warn!(error = %release_err, "Failed to release engine after error");
                }
                self.transition(PipelineState::Error);
                tracing::warn!(kind = e.kind(), error = %e, "Analysis failed");
                Err(e)
            }
        }
    }

    /// Analyze the bundled demo dataset
    pub fn load_demo(&self) -> Result<Arc<AnalysisReport>, PipelineError> {
        let text = demo::dataset().ok_or_else(|| {
            PipelineError::InputFormat("bundled demo dataset is missing".to_string())
        })?;
        self.load(&text)
    }

    fn run(&self, text: &str) -> Result<Arc<AnalysisReport>, PipelineError> {
        self.transition(PipelineState::Loading);

        let objects = parse_input(text)?;
        let schema = infer_schema(&objects);
        let extracted = extract_records(objects, self.options.on_invalid_record)?;
        tracing::debug!(
            records = extracted.records.len(),
            skipped = extracted.skipped,
            fields = schema.len(),
            "Input validated"
        );
        self.engine.load(&extracted.records)?;

        self.transition(PipelineState::Computing);
        let groups = self.engine.summarize()?;

        let assembler =
            ResultAssembler::new(self.options.performance_limit, self.options.status_chart_limit);
        let report = assembler.assemble(
            &groups,
            schema,
            RunMetadata {
                engine: self.engine.backend().to_string(),
                total_records: extracted.records.len() as u64,
                skipped_records: extracted.skipped,
            },
        );
        Ok(Arc::new(report))
    }

    /// Shut the engine down; later loads fail with `EngineUnavailable`
    pub fn close(&self) -> Result<(), PipelineError> {
        self.engine.close()?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
