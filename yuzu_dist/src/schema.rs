//! Post-resolution patch for block schemas.
//!
//! Non-page object schemas are patched with `_ref` and `_modifiers` so that
//! any block can be referenced and styled from page data. This is separate
//! from the resolver's auto schema properties: here `_modifiers` is always an
//! array of strings and existing definitions are overwritten.

use serde_json::Map;
use serde_json::Value;
use serde_json::json;

/// Property naming the block a piece of data refers to.
pub const REF_PROPERTY: &str = "_ref";
/// Property carrying a block's modifier classes.
pub const MODIFIERS_PROPERTY: &str = "_modifiers";

/// Whether a resolved schema receives the reserved properties: it must
/// belong to a non-page block, have `"type": "object"` and already have a
/// `properties` mapping.
pub fn qualifies(schema: &Value, is_page: bool) -> bool {
	!is_page
		&& schema.get("type").and_then(Value::as_str) == Some("object")
		&& schema.get("properties").is_some_and(Value::is_object)
}

/// Set `properties._ref` and `properties._modifiers`, replacing any existing
/// definitions. Schemas without a `properties` mapping are left alone.
pub fn augment(schema: &mut Value) {
	let Some(properties) = schema.get_mut("properties").and_then(Value::as_object_mut) else {
		return;
	};

	inject_reserved(properties);
}

/// Apply [`augment`] when [`qualifies`] holds. Returns whether the schema was
/// patched.
pub fn augment_if_qualified(schema: &mut Value, is_page: bool) -> bool {
	if !qualifies(schema, is_page) {
		return false;
	}

	augment(schema);
	true
}

fn inject_reserved(properties: &mut Map<String, Value>) {
	properties.insert(REF_PROPERTY.to_string(), json!({ "type": "string" }));
	properties.insert(
		MODIFIERS_PROPERTY.to_string(),
		json!({ "type": "array", "items": { "type": "string" } }),
	);
}
