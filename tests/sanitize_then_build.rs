use pretty_assertions::assert_eq;

use avro_schema_core::{compatible, sanitize, schema::Schema};

#[test]
fn sanitized_namespaced_name_builds_and_matches_local_name() {
	let canonical = sanitize(
		r#"{"type":"record","name":"com.acme.Widget","fields":[{"name":"id","type":"long"}]}"#,
	)
	.unwrap();
	assert!(canonical.contains(r#""name":"Widget""#));

	let built: Schema = canonical.parse().unwrap();
	assert!(matches!(built.root(), avro_schema_core::schema::SchemaNode::Record(_)));
}

#[test]
fn record_missing_fields_is_rejected_before_reaching_the_builder() {
	let err = sanitize(r#"{"type":"record","name":"R"}"#).unwrap_err();
	assert!(err.to_string().to_lowercase().contains("fields"));
}

#[test]
fn trailing_garbage_after_a_valid_schema_reports_an_offset() {
	let err = sanitize(r#""long", "oops""#).unwrap_err();
	assert!(err.offset().is_some());
}

#[test]
fn sanitize_then_build_round_trip_for_a_realistic_schema() -> anyhow::Result<()> {
	let reader_json = sanitize(
		r#"{
			"type": "record",
			"name": "some.namespace.Event",
			"fields": [
				{ "name": "id", "type": "long" },
				{ "name": "payload", "type": ["string", "null"], "default": "" },
				{
					"name": "tags",
					"type": { "type": "array", "items": "string" }
				}
			]
		}"#,
	)?;
	let writer_json = sanitize(
		r#"{
			"type": "record",
			"name": "Event",
			"fields": [
				{ "name": "id", "type": "int" },
				{ "name": "tags", "type": { "type": "array", "items": "string" } }
			]
		}"#,
	)?;

	let reader: Schema = reader_json.parse()?;
	let writer: Schema = writer_json.parse()?;
	assert_eq!(compatible(&reader, &writer), true);
	Ok(())
}

#[test]
fn sanitize_is_idempotent_on_its_own_output() {
	let json = r#"{"type":"record","name":"a.b.Widget","fields":[{"name":"x","type":"int"}]}"#;
	let once = sanitize(json).unwrap();
	let twice = sanitize(&once).unwrap();
	assert_eq!(once, twice);
}
