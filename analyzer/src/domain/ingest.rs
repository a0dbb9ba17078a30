//! Input parsing and record validation
//!
//! Turns raw text into JSON objects, then objects into typed [`LogRecord`]s.
//! Accepted encodings: a JSON array of objects, a single object, or one
//! object per line (NDJSON).

use serde_json::{Deserializer, Map, Value as JsonValue};

use super::error::PipelineError;
use crate::core::config::InvalidRecordPolicy;
use crate::data::types::LogRecord;

pub const FIELD_REQUEST: &str = "request";
pub const FIELD_STATUS: &str = "status";
pub const FIELD_REQUEST_TIME: &str = "request_time";

pub type JsonObject = Map<String, JsonValue>;

/// Records that passed validation
#[derive(Debug, Default)]
pub struct ExtractedRecords {
    pub records: Vec<LogRecord>,
    /// Invalid records dropped under [`InvalidRecordPolicy::Skip`]
    pub skipped: u64,
}

fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Parse `text` into a collection of JSON objects.
///
/// Anything that is not an object or an array of objects is rejected with
/// [`PipelineError::InputFormat`]. An empty array is a valid, empty dataset.
pub fn parse_input(text: &str) -> Result<Vec<JsonObject>, PipelineError> {
    let trimmed = text.trim_start_matches('\u{feff}').trim();
    match trimmed.chars().next() {
        None => Err(PipelineError::InputFormat("input is empty".to_string())),
        Some('[') => parse_array(trimmed),
        Some('{') => parse_objects(trimmed),
        Some(_) => {
            let found = serde_json::from_str::<JsonValue>(trimmed)
                .map(|v| json_type_name(&v))
                .unwrap_or("malformed JSON");
            Err(PipelineError::InputFormat(format!(
                "expected an array of objects or an object, found {}",
                found
            )))
        }
    }
}

fn parse_array(text: &str) -> Result<Vec<JsonObject>, PipelineError> {
    let value: JsonValue =
        serde_json::from_str(text).map_err(|e| PipelineError::InputFormat(e.to_string()))?;
    let JsonValue::Array(items) = value else {
        return Err(PipelineError::InputFormat("expected a JSON array".to_string()));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            JsonValue::Object(obj) => Ok(obj),
            other => Err(PipelineError::InputFormat(format!(
                "element {} is {}, expected an object",
                i,
                json_type_name(&other)
            ))),
        })
        .collect()
}

/// One object, or a whitespace-separated stream of objects
fn parse_objects(text: &str) -> Result<Vec<JsonObject>, PipelineError> {
    let mut objects = Vec::new();
    for (i, item) in Deserializer::from_str(text)
        .into_iter::<JsonValue>()
        .enumerate()
    {
        match item.map_err(|e| PipelineError::InputFormat(e.to_string()))? {
            JsonValue::Object(obj) => objects.push(obj),
            other => {
                return Err(PipelineError::InputFormat(format!(
                    "value {} is {}, expected an object",
                    i,
                    json_type_name(&other)
                )));
            }
        }
    }
    Ok(objects)
}

// ============================================================================
// Validation
// ============================================================================

/// Convert one object into a typed record, moving unknown fields to `extra`.
///
/// `index` is the object's position in the input, used in error messages.
pub fn record_from_object(index: usize, mut obj: JsonObject) -> Result<LogRecord, PipelineError> {
    let request = match obj.shift_remove(FIELD_REQUEST) {
        Some(JsonValue::String(s)) => s,
        None | Some(JsonValue::Null) => {
            return Err(PipelineError::field_missing(index, FIELD_REQUEST, "is missing"));
        }
        Some(other) => {
            return Err(PipelineError::field_missing(
                index,
                FIELD_REQUEST,
                format!("must be a string, got {}", json_type_name(&other)),
            ));
        }
    };

    let status = match obj.shift_remove(FIELD_STATUS) {
        Some(JsonValue::Number(n)) => n.as_i64().ok_or_else(|| {
            PipelineError::field_missing(
                index,
                FIELD_STATUS,
                format!("must be an integer, got {}", n),
            )
        })?,
        None | Some(JsonValue::Null) => {
            return Err(PipelineError::field_missing(index, FIELD_STATUS, "is missing"));
        }
        Some(other) => {
            return Err(PipelineError::field_missing(
                index,
                FIELD_STATUS,
                format!("must be an integer, got {}", json_type_name(&other)),
            ));
        }
    };

    let request_time = match obj.shift_remove(FIELD_REQUEST_TIME) {
        Some(JsonValue::Number(n)) => n.as_f64().ok_or_else(|| {
            PipelineError::field_missing(index, FIELD_REQUEST_TIME, "is not a finite number")
        })?,
        None | Some(JsonValue::Null) => {
            return Err(PipelineError::field_missing(
                index,
                FIELD_REQUEST_TIME,
                "is missing",
            ));
        }
        Some(other) => {
            return Err(PipelineError::field_missing(
                index,
                FIELD_REQUEST_TIME,
                format!("must be a number, got {}", json_type_name(&other)),
            ));
        }
    };

    Ok(LogRecord {
        request,
        status,
        request_time,
        extra: obj,
    })
}

/// Validate every object under `policy`
pub fn extract_records(
    objects: Vec<JsonObject>,
    policy: InvalidRecordPolicy,
) -> Result<ExtractedRecords, PipelineError> {
    let mut extracted = ExtractedRecords {
        records: Vec::with_capacity(objects.len()),
        skipped: 0,
    };

    for (index, obj) in objects.into_iter().enumerate() {
        match record_from_object(index, obj) {
            Ok(record) => extracted.records.push(record),
            Err(e) if policy == InvalidRecordPolicy::Skip => {
                tracing::warn!(index, error = %e, "Skipping invalid record");
                extracted.skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }

    Ok(extracted)
}
