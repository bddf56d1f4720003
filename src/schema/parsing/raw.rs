//! Intermediate representation that mirrors the JSON grammar of an Avro
//! schema fairly literally, before it gets turned into the arena-indexed
//! [`super::super::Schema`].

use serde::de::*;

pub(super) enum SchemaNode {
	Type(Type),
	Ref(String),
	Object(Box<SchemaNodeObject>),
	Union(Vec<SchemaNode>),
}

#[derive(serde_derive::Deserialize, Clone, Copy, Debug)]
#[serde(rename_all = "kebab-case")]
pub(super) enum Type {
	// Primitive types
	Null,
	Boolean,
	Int,
	Long,
	Float,
	Double,
	Bytes,
	String,
	// Complex types
	Array,
	Map,
	Record,
	Enum,
	Fixed,
}

#[derive(serde_derive::Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SchemaNodeObject {
	#[serde(rename = "type")]
	pub(super) type_: SchemaNode,
	/// For named types (record/enum/fixed)
	pub(super) name: Option<String>,
	/// For named types (record/enum/fixed)
	pub(super) namespace: Option<String>,
	/// For record type
	pub(super) fields: Option<Vec<Field>>,
	/// For enum type
	pub(super) symbols: Option<Vec<String>>,
	/// For enum type: the default symbol, which may legitimately be
	/// present as JSON `null` (see `Field::default`'s docs for why that's
	/// not the same as "no default" at the JSON level, but is treated the
	/// same for compatibility purposes).
	pub(super) default: Option<serde_json::Value>,
	/// For array type
	pub(super) items: Option<SchemaNode>,
	/// For map type
	pub(super) values: Option<SchemaNode>,
	/// For fixed type
	pub(super) size: Option<usize>,
}

#[derive(serde_derive::Deserialize)]
pub(super) struct Field {
	pub(super) name: String,
	#[serde(rename = "type")]
	pub(super) type_: SchemaNode,
	pub(super) default: Option<serde_json::Value>,
}

impl<'de> Deserialize<'de> for SchemaNode {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		struct SchemaNodeVisitor;
		impl<'de> Visitor<'de> for SchemaNodeVisitor {
			type Value = SchemaNode;

			fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
				write!(
					formatter,
					"a string (primitive type or named reference), an object with a `type` field, \
						or an array (union)"
				)
			}

			fn visit_map<A>(self, map: A) -> Result<Self::Value, A::Error>
			where
				A: MapAccess<'de>,
			{
				Ok(SchemaNode::Object(Deserialize::deserialize(
					serde::de::value::MapAccessDeserializer::new(map),
				)?))
			}

			fn visit_seq<A>(self, seq: A) -> Result<Self::Value, A::Error>
			where
				A: SeqAccess<'de>,
			{
				Ok(SchemaNode::Union(Deserialize::deserialize(
					serde::de::value::SeqAccessDeserializer::new(seq),
				)?))
			}

			fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
			where
				E: Error,
			{
				Ok(match Type::deserialize(value::StrDeserializer::<FailedDeserialization>::new(v)) {
					Ok(type_) => SchemaNode::Type(type_),
					Err(FailedDeserialization) => SchemaNode::Ref(v.to_owned()),
				})
			}

			fn visit_string<E>(self, v: String) -> Result<Self::Value, E>
			where
				E: Error,
			{
				self.visit_str(&v)
			}
		}
		deserializer.deserialize_any(SchemaNodeVisitor)
	}
}

#[derive(thiserror::Error, Debug)]
#[error("failed to deserialize")]
struct FailedDeserialization;
impl Error for FailedDeserialization {
	fn custom<T: std::fmt::Display>(_msg: T) -> Self {
		FailedDeserialization
	}
}
