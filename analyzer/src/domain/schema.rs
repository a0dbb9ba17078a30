//! Schema inference over raw input objects
//!
//! Every observed field gets the least common supertype of its values.
//! `NULL` is the identity, `BIGINT` widens to `DOUBLE`, mixed scalars widen
//! to `VARCHAR`, and anything mixed with an array or object becomes `JSON`.

use rustc_hash::FxHashMap;
use serde_json::Value as JsonValue;

use super::ingest::JsonObject;
use crate::data::types::{InferredType, SchemaField};

/// Type of a single JSON value
pub fn type_of(value: &JsonValue) -> InferredType {
    match value {
        JsonValue::Null => InferredType::Null,
        JsonValue::Bool(_) => InferredType::Boolean,
        // u64 above i64::MAX does not fit BIGINT
        JsonValue::Number(n) if n.is_i64() => InferredType::BigInt,
        JsonValue::Number(_) => InferredType::Double,
        JsonValue::String(_) => InferredType::Varchar,
        JsonValue::Array(_) | JsonValue::Object(_) => InferredType::Json,
    }
}

/// Least common supertype of two inferred types
pub fn supertype(a: InferredType, b: InferredType) -> InferredType {
    use InferredType::*;
    match (a, b) {
        _ if a == b => a,
        (Null, other) | (other, Null) => other,
        (BigInt, Double) | (Double, BigInt) => Double,
        (Json, _) | (_, Json) => Json,
        _ => Varchar,
    }
}

struct FieldStats {
    name: String,
    inferred_type: InferredType,
    present: usize,
    saw_null: bool,
}

/// Infer one [`SchemaField`] per field name, in first-seen order.
///
/// A field is nullable when any object lacks it or holds `null` for it.
pub fn infer_schema(objects: &[JsonObject]) -> Vec<SchemaField> {
    let mut fields: Vec<FieldStats> = Vec::new();
    let mut index: FxHashMap<&str, usize> = FxHashMap::default();

    for obj in objects {
        for (name, value) in obj {
            let ty = type_of(value);
            let slot = *index.entry(name.as_str()).or_insert_with(|| {
                fields.push(FieldStats {
                    name: name.clone(),
                    inferred_type: InferredType::Null,
                    present: 0,
                    saw_null: false,
                });
                fields.len() - 1
            });
            let field = &mut fields[slot];
            field.inferred_type = supertype(field.inferred_type, ty);
            field.present += 1;
            field.saw_null |= ty == InferredType::Null;
        }
    }

    fields
        .into_iter()
        .map(|f| SchemaField {
            nullable: f.saw_null || f.present < objects.len(),
            name: f.name,
            inferred_type: f.inferred_type,
        })
        .collect()
}
