//! Builders for the operation objects sent to the `/api` endpoint.

use serde_json::{json, Value};

pub fn query_server_information() -> Value {
    json!({ "action": "query_server_information" })
}

pub fn query(expression: impl Into<String>) -> Value {
    json!({ "action": "query", "expression": expression.into() })
}

pub fn create(entity_type: &str, mut entity_data: Value) -> Value {
    if let Some(map) = entity_data.as_object_mut() {
        map.insert("__entity_type__".into(), Value::String(entity_type.into()));
    }
    json!({
        "action": "create",
        "entity_type": entity_type,
        "entity_data": entity_data,
    })
}

pub fn update(entity_type: &str, id: &str, entity_data: Value) -> Value {
    json!({
        "action": "update",
        "entity_type": entity_type,
        "entity_key": [id],
        "entity_data": entity_data,
    })
}
