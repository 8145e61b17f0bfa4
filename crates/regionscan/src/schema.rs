//! JSON Schemas for the engine's public documents.
//!
//! schemars emits draft 2020-12. Consumers of extraction results are often
//! validators that only speak draft-07, so schemas are downgraded:
//! - `$defs` becomes `definitions` and `$ref`s are rewritten
//! - `anyOf: [X, {"type": "null"}]` collapses to `X`
//! - `$schema` points at draft-07

use schemars::{schema_for, JsonSchema};
use serde_json::{Map, Value};

use regionscan_core::{ExtractionOptions, ExtractionResult};

use crate::external::SeedSpec;

const DRAFT_07: &str = "http://json-schema.org/draft-07/schema#";

/// Draft-07 schema for [`ExtractionResult`].
pub fn result_schema() -> Value {
    draft07_schema::<ExtractionResult>()
}

/// Draft-07 schema for [`ExtractionOptions`].
pub fn options_schema() -> Value {
    draft07_schema::<ExtractionOptions>()
}

/// Draft-07 schema for a seed file (an array of [`SeedSpec`]).
pub fn seed_file_schema() -> Value {
    draft07_schema::<Vec<SeedSpec>>()
}

/// Generate and downgrade the schema for `T`.
pub fn draft07_schema<T: JsonSchema>() -> Value {
    downgrade(schema_for!(T).to_value())
}

/// Rewrite a draft 2020-12 schema into draft-07 form.
pub fn downgrade(mut schema: Value) -> Value {
    if let Some(root) = schema.as_object_mut() {
        if let Some(defs) = root.remove("$defs") {
            root.insert("definitions".to_string(), defs);
        }
        root.insert("$schema".to_string(), Value::String(DRAFT_07.to_string()));
    }
    rewrite(&mut schema);
    schema
}

fn rewrite(value: &mut Value) {
    match value {
        Value::Object(obj) => {
            collapse_nullable(obj);
            if let Some(Value::String(reference)) = obj.get_mut("$ref") {
                if let Some(name) = reference.strip_prefix("#/$defs/") {
                    *reference = format!("#/definitions/{name}");
                }
            }
            obj.values_mut().for_each(rewrite);
        }
        Value::Array(items) => items.iter_mut().for_each(rewrite),
        _ => {}
    }
}

/// Replace `anyOf: [X, {"type": "null"}]` (either order) with `X`.
fn collapse_nullable(obj: &mut Map<String, Value>) {
    let Some(Value::Array(any_of)) = obj.get("anyOf") else {
        return;
    };
    if any_of.len() != 2 {
        return;
    }
    let kept = match (is_bare_null(&any_of[0]), is_bare_null(&any_of[1])) {
        (false, true) => any_of[0].clone(),
        (true, false) => any_of[1].clone(),
        _ => return,
    };
    let Value::Object(kept) = kept else {
        return;
    };

    obj.remove("anyOf");
    for (key, value) in kept {
        obj.entry(key).or_insert(value);
    }
}

fn is_bare_null(schema: &Value) -> bool {
    schema
        .as_object()
        .is_some_and(|o| o.len() == 1 && o.get("type").and_then(Value::as_str) == Some("null"))
}
