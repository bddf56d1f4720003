use pretty_assertions::assert_eq;

use avro_schema_core::schema::{Schema, SchemaNode};

#[test]
fn named_references_resolve_to_the_same_node() {
	let schema: Schema = r#"{
		"type": "record",
		"name": "Outer",
		"fields": [
			{
				"name": "inner",
				"type": { "type": "record", "name": "Inner", "fields": [{"name": "n", "type": "int"}] }
			},
			{ "name": "another_inner", "type": "Inner" }
		]
	}"#
	.parse()
	.unwrap();

	let SchemaNode::Record(outer) = schema.root() else { panic!("expected a record") };
	let first_field_key = outer.fields[0].type_;
	let second_field_key = outer.fields[1].type_;
	assert_eq!(first_field_key.idx(), second_field_key.idx());
}

#[test]
fn forward_reference_to_a_later_sibling_resolves() {
	let schema: Schema = r#"{
		"type": "record",
		"name": "A",
		"fields": [
			{ "name": "b", "type": "B" },
			{ "name": "also_b", "type": { "type": "record", "name": "B", "fields": [{"name": "x", "type": "int"}] } }
		]
	}"#
	.parse()
	.unwrap();

	let SchemaNode::Record(a) = schema.root() else { panic!("expected a record") };
	assert_eq!(a.fields[0].type_.idx(), a.fields[1].type_.idx());
}

#[test]
fn unknown_reference_is_rejected() {
	let err = r#"{"type":"record","name":"A","fields":[{"name":"a","type":"DoesNotExist"}]}"#
		.parse::<Schema>()
		.unwrap_err();
	assert!(err.to_string().contains("unknown reference"));
}

#[test]
fn duplicate_field_names_are_rejected() {
	r#"{"type":"record","name":"R","fields":[{"name":"a","type":"int"},{"name":"a","type":"long"}]}"#
		.parse::<Schema>()
		.unwrap_err();
}

#[test]
fn duplicate_enum_symbols_are_rejected() {
	r#"{"type":"enum","name":"E","symbols":["X","X"]}"#.parse::<Schema>().unwrap_err();
}

#[test]
fn duplicate_named_type_definitions_are_rejected() {
	r#"{
		"type": "record",
		"name": "A",
		"fields": [
			{ "name": "one", "type": { "type": "record", "name": "Dup", "fields": [] } },
			{ "name": "two", "type": { "type": "record", "name": "Dup", "fields": [] } }
		]
	}"#
	.parse::<Schema>()
	.unwrap_err();
}

#[test]
fn nested_unions_are_rejected() {
	r#"["null", ["string", "int"]]"#.parse::<Schema>().unwrap_err();
}

#[test]
fn union_with_two_unnamed_branches_of_the_same_kind_is_rejected() {
	r#"["string", "string"]"#.parse::<Schema>().unwrap_err();
}

#[test]
fn union_with_two_distinctly_named_records_is_accepted() {
	r#"[
		{"type":"record","name":"A","fields":[]},
		{"type":"record","name":"B","fields":[]}
	]"#
	.parse::<Schema>()
	.unwrap();
}

#[test]
fn namespace_is_inherited_by_nested_named_types() {
	let schema: Schema = r#"{
		"type": "record",
		"name": "Outer",
		"namespace": "com.acme",
		"fields": [
			{ "name": "inner", "type": { "type": "record", "name": "Inner", "fields": [] } }
		]
	}"#
	.parse()
	.unwrap();
	let SchemaNode::Record(outer) = schema.root() else { panic!("expected a record") };
	let SchemaNode::Record(inner) = &schema.nodes()[outer.fields[0].type_.idx()] else {
		panic!("expected a record")
	};
	assert_eq!(inner.name.fully_qualified_name(), "com.acme.Inner");
}

#[test]
fn unnecessarily_nested_type_is_unwrapped() {
	let schema: Schema = r#"{"type": {"type": "string"}}"#.parse().unwrap();
	assert!(matches!(schema.root(), SchemaNode::String));
}

#[test]
fn unnecessarily_nested_type_with_local_properties_is_rejected() {
	r#"{"type": {"type": "string"}, "default": "x"}"#.parse::<Schema>().unwrap_err();
}

#[test]
fn bare_complex_type_string_is_rejected() {
	r#""record""#.parse::<Schema>().unwrap_err();
}

#[test]
fn default_value_shape_mismatch_is_rejected() {
	r#"{"type":"record","name":"R","fields":[{"name":"a","type":"int","default":"not an int"}]}"#
		.parse::<Schema>()
		.unwrap_err();
}

#[test]
fn enum_default_must_be_a_declared_symbol() {
	r#"{"type":"enum","name":"E","symbols":["X","Y"],"default":"Z"}"#.parse::<Schema>().unwrap_err();
}
