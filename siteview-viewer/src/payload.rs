//! Locating and cleaning the scene description inside a model document
//!
//! The remote document may wrap the scene payload in an arbitrary envelope, so the
//! payload is found by shape rather than by path.

use crate::config::LabelsConfig;
use serde_json::{Map, Value};

/// Serialization-only discriminator fields injected by the document's API layer
pub const INJECTED_FIELDS: &[&str] = &["__typename"];

/// Whether a value has the shape of an embedded scene description
pub fn is_scene_payload(value: &Value) -> bool {
    let Some(object) = value.as_object() else {
        return false;
    };
    let Some(metadata) = object.get("metadata").and_then(Value::as_object) else {
        return false;
    };

    let type_matches = metadata.get("type").and_then(Value::as_str) == Some("Object");
    // A zero version or an empty generator does not count as present.
    let version_matches = metadata
        .get("version")
        .and_then(Value::as_f64)
        .is_some_and(|version| version != 0.0);
    let generator_matches = metadata
        .get("generator")
        .and_then(Value::as_str)
        .is_some_and(|generator| !generator.is_empty());
    let tables_match = object.get("geometries").is_some_and(Value::is_array)
        && object.get("materials").is_some_and(Value::is_array);

    type_matches && version_matches && generator_matches && tables_match
}

/// Depth-first search for the first embedded scene description
pub fn find_scene_payload(document: &Value) -> Option<&Value> {
    if is_scene_payload(document) {
        return Some(document);
    }
    match document {
        Value::Object(map) => map.values().find_map(find_scene_payload),
        Value::Array(items) => items.iter().find_map(find_scene_payload),
        _ => None,
    }
}

/// Drop nulls everywhere: filtered out of arrays, omitted from objects
pub fn remove_null_values(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .filter(|item| !item.is_null())
                .map(remove_null_values)
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, item)| !item.is_null())
                .map(|(key, item)| (key, remove_null_values(item)))
                .collect::<Map<String, Value>>(),
        ),
        other => other,
    }
}

/// Strip the injected serialization-only fields at every depth
pub fn remove_injected_fields(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|key, _| !INJECTED_FIELDS.contains(&key.as_str()));
            map.values_mut().for_each(remove_injected_fields);
        }
        Value::Array(items) => items.iter_mut().for_each(remove_injected_fields),
        _ => {}
    }
}

/// Replace the known root name with its display label
pub fn rename_root(payload: &mut Value, labels: &LabelsConfig) {
    let Some(object) = payload.get_mut("object") else {
        return;
    };
    if object.get("name").and_then(Value::as_str) == Some(labels.root_name.as_str()) {
        object["name"] = Value::String(labels.root_label.clone());
    }
}

/// Turn underscores in node names into spaces, down the `children` tree
pub fn replace_underscores(object: &mut Value) {
    if let Some(Value::String(name)) = object.get_mut("name") {
        if name.contains('_') {
            *name = name.replace('_', " ");
        }
    }
    if let Some(Value::Array(children)) = object.get_mut("children") {
        children.iter_mut().for_each(replace_underscores);
    }
}

/// Apply the display-name rewrites and strip everything the parser must not see
pub fn sanitize(mut payload: Value, labels: &LabelsConfig) -> Value {
    rename_root(&mut payload, labels);
    if let Some(object) = payload.get_mut("object") {
        replace_underscores(object);
    }
    let mut cleaned = remove_null_values(payload);
    remove_injected_fields(&mut cleaned);
    cleaned
}
