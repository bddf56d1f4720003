//! Rewrites producer-submitted schema JSON into canonical JSON, before it is
//! handed to [`crate::schema::Schema::build`].
//!
//! The walk is deliberately narrow: it only descends into `"type"` and, for
//! records, `"fields"`. It does not recurse into `"items"`, `"values"`,
//! `"symbols"`, or union branch arrays in search of further `"name"`/`"type"`
//! members to rewrite — those are reached (if at all) only when something
//! else on the path happens to route through `"type"`/`"fields"` again. This
//! mirrors how the one normalization pass here has always behaved; widening
//! it is future work, not a bug to paper over.

use serde_json::Value;

use crate::error::SchemaError;

/// Normalize raw schema JSON into canonical JSON text.
///
/// Returns [`SchemaError`] if `json_text` is not valid JSON, contains
/// trailing data after the JSON value, or violates one of the narrow
/// structural rules this pass enforces (a `"name"` that isn't a non-empty
/// string, or a `"record"` without an array `"fields"`).
pub fn sanitize(json_text: &str) -> Result<String, SchemaError> {
	let mut stream = serde_json::Deserializer::from_str(json_text).into_iter::<Value>();
	let mut value = match stream.next() {
		Some(Ok(value)) => value,
		Some(Err(e)) => return Err(SchemaError::serde_json(json_text, e)),
		None => return Err(SchemaError::new("empty input")),
	};

	let trailing_offset = stream.byte_offset();
	if json_text[trailing_offset..].trim().len() > 0 {
		return Err(SchemaError::at_offset("trailing data after schema JSON", trailing_offset));
	}

	walk(&mut value)?;

	serde_json::to_string(&value).map_err(SchemaError::display)
}

fn walk(value: &mut Value) -> Result<(), SchemaError> {
	match value {
		Value::Object(object) => {
			if let Some(name) = object.get_mut("name") {
				let rewritten = match name.as_str() {
					Some(s) if !s.is_empty() => s.rsplit('.').next().unwrap().to_owned(),
					_ => return Err(SchemaError::new("\"name\" must be a non-empty string")),
				};
				*name = Value::String(rewritten);
			}

			if let Some(type_) = object.get_mut("type") {
				walk(type_)?;

				let is_record = matches!(type_.as_str(), Some("record"));
				if is_record {
					let fields = object
						.get_mut("fields")
						.ok_or_else(|| SchemaError::new("\"record\" is missing \"fields\""))?;
					let fields = fields
						.as_array_mut()
						.ok_or_else(|| SchemaError::new("\"fields\" must be an array"))?;
					for field in fields {
						walk(field)?;
					}
				}
			}

			Ok(())
		}
		Value::Array(elements) => {
			for element in elements {
				walk(element)?;
			}
			Ok(())
		}
		Value::String(_) | Value::Number(_) | Value::Bool(_) | Value::Null => Ok(()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn strips_namespaced_inline_name() {
		let out = sanitize(r#"{"type":"record","name":"com.acme.Widget","fields":[]}"#).unwrap();
		let value: Value = serde_json::from_str(&out).unwrap();
		assert_eq!(value["name"], "Widget");
	}

	#[test]
	fn record_without_fields_is_invalid() {
		let err = sanitize(r#"{"type":"record","name":"Widget"}"#).unwrap_err();
		assert!(err.offset().is_none());
	}

	#[test]
	fn record_with_non_array_fields_is_invalid() {
		sanitize(r#"{"type":"record","name":"Widget","fields":{}}"#).unwrap_err();
	}

	#[test]
	fn empty_name_is_invalid() {
		sanitize(r#"{"type":"record","name":"","fields":[]}"#).unwrap_err();
	}

	#[test]
	fn non_string_name_is_invalid() {
		sanitize(r#"{"type":"record","name":1,"fields":[]}"#).unwrap_err();
	}

	#[test]
	fn trailing_garbage_after_valid_schema_is_invalid() {
		let err = sanitize(r#""long"   garbage"#).unwrap_err();
		assert!(err.offset().is_some());
	}

	#[test]
	fn malformed_json_reports_byte_offset() {
		let err = sanitize(r#"{"type": }"#).unwrap_err();
		assert!(err.offset().is_some());
	}

	#[test]
	fn does_not_descend_into_items_or_symbols_looking_for_names() {
		// A namespaced name nested only under "items" is left untouched: the
		// walk never follows "items" at all.
		let out = sanitize(
			r#"{"type":"array","items":{"type":"record","name":"ns.Inner","fields":[]}}"#,
		)
		.unwrap();
		let value: Value = serde_json::from_str(&out).unwrap();
		assert_eq!(value["items"]["name"], "ns.Inner");
	}

	#[test]
	fn sanitize_is_idempotent() {
		let once = sanitize(r#"{"type":"record","name":"a.b.Widget","fields":[]}"#).unwrap();
		let twice = sanitize(&once).unwrap();
		assert_eq!(once, twice);
	}

	#[test]
	fn plain_primitive_schema_round_trips() {
		let out = sanitize(r#""long""#).unwrap();
		assert_eq!(out, "\"long\"");
	}

	#[test]
	fn union_passes_through_untouched() {
		let out = sanitize(r#"["null","string"]"#).unwrap();
		let value: Value = serde_json::from_str(&out).unwrap();
		assert_eq!(value, serde_json::json!(["null", "string"]));
	}
}
