use serde_json::{Map, Value};

/// Fields the receiver's templates reference most often; they are
/// emitted first in the flattened object.
pub const PRIORITY_FIELDS: &[&str] = &[
    "feedbackRating",
    "feedbackComments",
    "firstName",
    "lastName",
    "email",
    "phone",
    "customerName",
    "surveyDate",
    "orderNumber",
    "reservationId",
];

/// Flatten an arbitrary nested payload into a single-level object with
/// string values only. The downstream receiver cannot handle non-string
/// values, so numbers, bools and nulls are stringified. Nested object
/// keys join with `_`; arrays of scalars join with `, `, arrays of
/// objects recurse with an index suffix.
pub fn flatten_payload(payload: &Value) -> Value {
    let mut flat: Map<String, Value> = Map::new();
    walk("", payload, &mut flat);

    let mut out: Map<String, Value> = Map::new();
    for field in PRIORITY_FIELDS {
        if let Some(v) = flat.remove(*field) {
            out.insert((*field).to_string(), v);
        }
    }
    for (k, v) in flat {
        out.insert(k, v);
    }
    Value::Object(out)
}

fn walk(prefix: &str, value: &Value, out: &mut Map<String, Value>) {
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                let joined = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}_{}", prefix, key)
                };
                walk(&joined, val, out);
            }
        }
        Value::Array(items) => {
            if items.iter().all(|i| !i.is_object() && !i.is_array()) {
                let joined = items
                    .iter()
                    .map(scalar_to_string)
                    .collect::<Vec<String>>()
                    .join(", ");
                out.insert(prefix.to_string(), Value::String(joined));
            } else {
                for (idx, item) in items.iter().enumerate() {
                    walk(&format!("{}_{}", prefix, idx), item, out);
                }
            }
        }
        scalar => {
            if !prefix.is_empty() {
                out.insert(prefix.to_string(), Value::String(scalar_to_string(scalar)));
            }
        }
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
