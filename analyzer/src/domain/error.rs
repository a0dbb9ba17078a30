//! Pipeline errors

use thiserror::Error;

use crate::data::DataError;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// Input is not a well-formed collection of objects
    #[error("Invalid input format: {0}")]
    InputFormat(String),

    /// Engine not ready; nothing was touched
    #[error("Analytics engine unavailable: {0}")]
    EngineUnavailable(String),

    /// A record lacks `request`, `status` or `request_time`, or holds the
    /// wrong type
    #[error("Record {index}: field `{field}` {reason}")]
    FieldMissing {
        index: usize,
        field: &'static str,
        reason: String,
    },

    /// Another load is already running on this session
    #[error("A load is already in progress")]
    RunInProgress,

    #[error(transparent)]
    Engine(DataError),
}

impl From<DataError> for PipelineError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::BackendUnavailable { backend, reason } => {
                Self::EngineUnavailable(format!("{}: {}", backend, reason))
            }
            other => Self::Engine(other),
        }
    }
}

impl PipelineError {
    pub fn field_missing(index: usize, field: &'static str, reason: impl Into<String>) -> Self {
        Self::FieldMissing {
            index,
            field,
            reason: reason.into(),
        }
    }

    /// Stable name of the error kind, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InputFormat(_) => "input_format",
            Self::EngineUnavailable(_) => "engine_unavailable",
            Self::FieldMissing { .. } => "field_missing",
            Self::RunInProgress => "run_in_progress",
            Self::Engine(_) => "engine",
        }
    }
}
