//! Input record type

use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

/// One access-log record after field validation.
///
/// The three analysed fields are typed; everything else the loader produced
/// is carried in `extra` untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    pub request: String,
    pub status: i64,
    /// Seconds
    pub request_time: f64,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl LogRecord {
    pub fn new(request: impl Into<String>, status: i64, request_time: f64) -> Self {
        Self {
            request: request.into(),
            status,
            request_time,
            extra: Map::new(),
        }
    }
}
