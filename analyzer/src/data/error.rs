//! Unified error type for the analytics engines

use thiserror::Error;

/// Error raised by an analytics engine
#[derive(Error, Debug)]
pub enum DataError {
    /// DuckDB database error
    #[cfg(feature = "duckdb")]
    #[error("DuckDB error: {0}")]
    Duckdb(#[from] duckdb::Error),

    /// Engine closed or never initialized
    #[error("Backend {backend} is not available: {reason}")]
    BackendUnavailable {
        backend: &'static str,
        reason: String,
    },

    /// Summaries requested before any records were loaded
    #[error("Backend {backend} has no dataset loaded")]
    NotLoaded { backend: &'static str },

    /// Engine returned data that does not fit the row types
    #[error("Invalid data from {backend}: {reason}")]
    InvalidData {
        backend: &'static str,
        reason: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DataError {
    /// Create a backend unavailable error
    pub fn backend_unavailable(backend: &'static str, reason: impl Into<String>) -> Self {
        Self::BackendUnavailable {
            backend,
            reason: reason.into(),
        }
    }

    /// Create an invalid data error
    pub fn invalid_data(backend: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidData {
            backend,
            reason: reason.into(),
        }
    }

    /// Get the backend name that generated this error
    pub fn backend(&self) -> &'static str {
        match self {
            #[cfg(feature = "duckdb")]
            Self::Duckdb(_) => "duckdb",
            Self::BackendUnavailable { backend, .. }
            | Self::NotLoaded { backend }
            | Self::InvalidData { backend, .. } => backend,
            Self::Config(_) => "unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_unavailable_message() {
        let err = DataError::backend_unavailable("memory", "engine closed");
        assert_eq!(
            err.to_string(),
            "Backend memory is not available: engine closed"
        );
        assert_eq!(err.backend(), "memory");
    }

    #[test]
    fn test_not_loaded_backend() {
        let err = DataError::NotLoaded { backend: "duckdb" };
        assert_eq!(err.backend(), "duckdb");
        assert!(err.to_string().contains("no dataset loaded"));
    }
}
