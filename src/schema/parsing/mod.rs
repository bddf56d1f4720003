mod raw;

use hashbrown::HashMap;

use super::{Array, Enum, Field, Fixed, Map, Name, Record, Schema, SchemaKey, SchemaNode, Union};
use crate::error::SchemaError;

const LATE_NAME_LOOKUP_REMAP_BIT: usize = 1usize << (usize::BITS - 1);

struct Builder {
	nodes: Vec<SchemaNode>,
	names: HashMap<NameKey, usize>,
	unresolved_names: Vec<NameKey>,
}

pub(super) fn build(s: &str) -> Result<Schema, SchemaError> {
	let mut builder = Builder { nodes: Vec::new(), names: HashMap::new(), unresolved_names: Vec::new() };

	let raw_schema: raw::SchemaNode =
		serde_json::from_str(s).map_err(|e| SchemaError::serde_json(s, e))?;

	builder.register_node(&raw_schema, None)?;
	builder.remap_forward_references()?;
	builder.validate_unions()?;
	builder.validate_defaults()?;

	Ok(Schema { nodes: builder.nodes })
}

impl Builder {
	fn register_node(
		&mut self,
		raw_schema: &raw::SchemaNode,
		enclosing_namespace: Option<&str>,
	) -> Result<SchemaKey, SchemaError> {
		Ok(match *raw_schema {
			raw::SchemaNode::Type(type_) => {
				let idx = self.nodes.len();
				self.nodes.push(match type_ {
					raw::Type::Null => SchemaNode::Null,
					raw::Type::Boolean => SchemaNode::Boolean,
					raw::Type::Int => SchemaNode::Int,
					raw::Type::Long => SchemaNode::Long,
					raw::Type::Float => SchemaNode::Float,
					raw::Type::Double => SchemaNode::Double,
					raw::Type::Bytes => SchemaNode::Bytes,
					raw::Type::String => SchemaNode::String,
					complex @ (raw::Type::Array
					| raw::Type::Map
					| raw::Type::Record
					| raw::Type::Enum
					| raw::Type::Fixed) => {
						return Err(SchemaError::msg(format_args!(
							"expected a primitive type name, but got {complex:?} which is a \
								complex type and must be expressed as an object",
						)))
					}
				});
				SchemaKey::from_idx(idx)
			}
			raw::SchemaNode::Union(ref branches) => {
				let idx = self.nodes.len();
				self.nodes.push(SchemaNode::Null); // reserve our spot
				let variants = branches
					.iter()
					.map(|branch| {
						if matches!(branch, raw::SchemaNode::Union(_)) {
							return Err(SchemaError::new("a union may not directly contain another union"));
						}
						self.register_node(branch, enclosing_namespace)
					})
					.collect::<Result<_, _>>()?;
				self.nodes[idx] = SchemaNode::Union(Union { variants });
				SchemaKey::from_idx(idx)
			}
			raw::SchemaNode::Ref(ref reference) => {
				let name_key = NameKey::parse(reference, enclosing_namespace);
				match self.names.get(&name_key) {
					Some(&idx) => SchemaKey::from_idx(idx),
					None => {
						let placeholder_idx = self.unresolved_names.len();
						self.unresolved_names.push(name_key);
						SchemaKey::from_idx(placeholder_idx | LATE_NAME_LOOKUP_REMAP_BIT)
					}
				}
			}
			raw::SchemaNode::Object(ref object) => {
				let idx = self.nodes.len();

				let name_key = match object.name {
					Some(ref name) => {
						let name_key = NameKey::for_definition(name, object.namespace.as_deref(), enclosing_namespace);
						if self.names.insert(name_key.clone(), idx).is_some() {
							return Err(SchemaError::msg(format_args!(
								"the schema contains duplicate definitions for {name_key}",
							)));
						}
						Some(name_key)
					}
					None => None,
				};
				let namespace_for_children =
					name_key.as_ref().map(|k| k.namespace.as_deref()).unwrap_or(None).or(enclosing_namespace);

				macro_rules! required {
					($type_: expr, $name: ident) => {
						match &object.$name {
							Some(v) => v,
							None => {
								return Err(SchemaError::msg(format_args!(
									"missing field `{}` on type {:?}",
									stringify!($name),
									$type_
								)))
							}
						}
					};
				}
				let require_name = |type_: raw::Type| -> Result<Name, SchemaError> {
					match name_key {
						Some(ref k) => Ok(k.qualified_name()),
						None => Err(SchemaError::msg(format_args!("missing `name` for type {type_:?}"))),
					}
				};

				self.nodes.push(SchemaNode::Null); // reserve our spot, in case of a self-reference
				let node = match object.type_ {
					raw::SchemaNode::Type(t @ raw::Type::Array) => SchemaNode::Array(Array {
						items: self.register_node(required!(t, items), namespace_for_children)?,
					}),
					raw::SchemaNode::Type(t @ raw::Type::Map) => SchemaNode::Map(Map {
						values: self.register_node(required!(t, values), namespace_for_children)?,
					}),
					raw::SchemaNode::Type(t @ raw::Type::Enum) => {
						let symbols: Vec<String> =
							required!(t, symbols).iter().map(|s| s.to_owned()).collect();
						let mut seen = hashbrown::HashSet::with_capacity(symbols.len());
						for symbol in &symbols {
							if !seen.insert(symbol.as_str()) {
								return Err(SchemaError::msg(format_args!(
									"duplicate enum symbol {symbol:?}",
								)));
							}
						}
						SchemaNode::Enum(Enum {
							name: require_name(t)?,
							symbols,
							default: object.default.clone(),
						})
					}
					raw::SchemaNode::Type(t @ raw::Type::Fixed) => SchemaNode::Fixed(Fixed {
						name: require_name(t)?,
						size: *required!(t, size),
					}),
					raw::SchemaNode::Type(t @ raw::Type::Record) => {
						let name = require_name(t)?;
						let mut seen = hashbrown::HashSet::with_capacity(required!(t, fields).len());
						let mut fields = Vec::with_capacity(required!(t, fields).len());
						for field in required!(t, fields) {
							if !seen.insert(field.name.as_str()) {
								return Err(SchemaError::msg(format_args!(
									"duplicate field name {:?} in record {}",
									field.name, name.fully_qualified_name(),
								)));
							}
							fields.push(Field {
								name: field.name.clone(),
								type_: self.register_node(&field.type_, namespace_for_children)?,
								default: field.default.clone(),
							});
						}
						SchemaNode::Record(Record { name, fields })
					}
					ref inner @ (raw::SchemaNode::Type(
						raw::Type::Null
						| raw::Type::Boolean
						| raw::Type::Int
						| raw::Type::Long
						| raw::Type::Float
						| raw::Type::Double
						| raw::Type::Bytes
						| raw::Type::String,
					)
					| raw::SchemaNode::Ref(_)
					| raw::SchemaNode::Object(_)
					| raw::SchemaNode::Union(_)) => {
						// `{"type": {"type": "string"}}` is a valid (if unusual) way to
						// write a schema: an object whose only meaningful key is `type`.
						match object.as_ref() {
							&raw::SchemaNodeObject {
								type_: _,
								name: _,
								namespace: _,
								fields: None,
								symbols: None,
								default: None,
								items: None,
								values: None,
								size: None,
							} => {
								self.nodes.pop();
								return self.register_node(inner, namespace_for_children);
							}
							_ => {
								return Err(SchemaError::new(
									"got an unnecessarily-nested type, but local object properties \
										are set and would be ignored",
								))
							}
						}
					}
				};
				self.nodes[idx] = node;
				SchemaKey::from_idx(idx)
			}
		})
	}

	/// Forward references (`{"type": "SomeRecordDeclaredLater"}`) are
	/// registered as a placeholder index tagged with
	/// [`LATE_NAME_LOOKUP_REMAP_BIT`] the first time they're seen; once the
	/// whole document has been walked, every name has necessarily been seen,
	/// so we can resolve them all in one pass.
	fn remap_forward_references(&mut self) -> Result<(), SchemaError> {
		if self.unresolved_names.is_empty() {
			return Ok(());
		}
		let resolved: Vec<SchemaKey> = std::mem::take(&mut self.unresolved_names)
			.into_iter()
			.map(|name| {
				self.names
					.get(&name)
					.map(|&idx| SchemaKey::from_idx(idx))
					.ok_or_else(|| SchemaError::msg(format_args!("the schema contains an unknown reference: {name}")))
			})
			.collect::<Result<_, _>>()?;
		let fix_key = |key: &mut SchemaKey| {
			if key.idx() & LATE_NAME_LOOKUP_REMAP_BIT != 0 {
				*key = resolved[key.idx() ^ LATE_NAME_LOOKUP_REMAP_BIT];
			}
		};
		for node in &mut self.nodes {
			match node {
				SchemaNode::Array(a) => fix_key(&mut a.items),
				SchemaNode::Map(m) => fix_key(&mut m.values),
				SchemaNode::Union(u) => u.variants.iter_mut().for_each(fix_key),
				SchemaNode::Record(r) => r.fields.iter_mut().for_each(|f| fix_key(&mut f.type_)),
				SchemaNode::Null
				| SchemaNode::Boolean
				| SchemaNode::Int
				| SchemaNode::Long
				| SchemaNode::Float
				| SchemaNode::Double
				| SchemaNode::Bytes
				| SchemaNode::String
				| SchemaNode::Enum(_)
				| SchemaNode::Fixed(_) => {}
			}
		}
		Ok(())
	}

	/// A union must be flat, and may not contain two branches of the same
	/// resolved kind unless they're distinctly-named types.
	fn validate_unions(&self) -> Result<(), SchemaError> {
		for node in &self.nodes {
			let SchemaNode::Union(union) = node else { continue };
			let mut seen = hashbrown::HashSet::with_capacity(union.variants.len());
			for &variant_key in &union.variants {
				let variant = &self.nodes[variant_key.idx()];
				if matches!(variant, SchemaNode::Union(_)) {
					return Err(SchemaError::new("a union may not directly contain another union"));
				}
				let signature = match variant.name() {
					Some(name) => UnionVariantSignature::Named(name.fully_qualified_name().to_owned()),
					None => UnionVariantSignature::Unnamed(std::mem::discriminant(variant)),
				};
				if !seen.insert(signature) {
					return Err(SchemaError::new(
						"a union may not contain two branches that resolve to the same type",
					));
				}
			}
		}
		Ok(())
	}

	/// Validates the "default values, when present, are type-compatible
	/// with the field/symbol type" invariant from the data model.
	fn validate_defaults(&self) -> Result<(), SchemaError> {
		for node in &self.nodes {
			match node {
				SchemaNode::Record(record) => {
					for field in &record.fields {
						if let Some(ref value) = field.default {
							if !default_matches_type(value, field.type_, &self.nodes) {
								return Err(SchemaError::msg(format_args!(
									"default value for field {:?} of record {} is not valid for its type",
									field.name,
									record.name.fully_qualified_name(),
								)));
							}
						}
					}
				}
				SchemaNode::Enum(enum_) => {
					if let Some(serde_json::Value::String(ref symbol)) = enum_.default {
						if !enum_.symbols.iter().any(|s| s == symbol) {
							return Err(SchemaError::msg(format_args!(
								"default symbol {symbol:?} is not a symbol of enum {}",
								enum_.name.fully_qualified_name(),
							)));
						}
					} else if !matches!(enum_.default, None | Some(serde_json::Value::Null)) {
						return Err(SchemaError::new("enum default must be a string symbol or null"));
					}
				}
				_ => {}
			}
		}
		Ok(())
	}
}

#[derive(PartialEq, Eq, Hash)]
enum UnionVariantSignature {
	Named(String),
	Unnamed(std::mem::Discriminant<SchemaNode>),
}

/// A field/enum default value must be shaped like a JSON rendering of its
/// declared type. This mirrors (a conservative reading of) the Avro
/// specification's rules for default values, recursing through arrays,
/// maps, records and the first branch of unions.
fn default_matches_type(value: &serde_json::Value, type_key: SchemaKey, nodes: &[SchemaNode]) -> bool {
	use serde_json::Value;
	match &nodes[type_key.idx()] {
		SchemaNode::Null => value.is_null(),
		SchemaNode::Boolean => value.is_boolean(),
		SchemaNode::Int | SchemaNode::Long => value.is_i64() || value.is_u64(),
		SchemaNode::Float | SchemaNode::Double => value.is_number(),
		SchemaNode::Bytes | SchemaNode::String => value.is_string(),
		SchemaNode::Array(array) => match value {
			Value::Array(items) => items.iter().all(|item| default_matches_type(item, array.items, nodes)),
			_ => false,
		},
		SchemaNode::Map(map) => match value {
			Value::Object(entries) => {
				entries.values().all(|entry| default_matches_type(entry, map.values, nodes))
			}
			_ => false,
		},
		SchemaNode::Record(record) => match value {
			Value::Object(members) => record.fields.iter().all(|field| match members.get(&field.name) {
				Some(v) => default_matches_type(v, field.type_, nodes),
				None => field.default.is_some(),
			}),
			_ => false,
		},
		SchemaNode::Enum(enum_) => match value {
			Value::String(s) => enum_.symbols.iter().any(|symbol| symbol == s),
			_ => false,
		},
		SchemaNode::Fixed(fixed) => match value {
			Value::String(s) => s.chars().count() == fixed.size,
			_ => false,
		},
		// Per the Avro specification, a union's default must match the type of
		// its *first* branch.
		SchemaNode::Union(union) => match union.variants.first() {
			Some(&first) => default_matches_type(value, first, nodes),
			None => false,
		},
	}
}

#[derive(PartialEq, Eq, Hash, Clone)]
struct NameKey {
	namespace: Option<String>,
	name: String,
}

impl NameKey {
	/// Build the lookup key for a name reference (either a bare `"Foo"`
	/// string occurring as a type, or the dotted form `"ns.Foo"`).
	fn parse(reference: &str, enclosing_namespace: Option<&str>) -> Self {
		match reference.rsplit_once('.') {
			Some((namespace, name)) => {
				Self { namespace: Some(namespace).filter(|s| !s.is_empty()).map(str::to_owned), name: name.to_owned() }
			}
			None => Self { namespace: enclosing_namespace.map(str::to_owned), name: reference.to_owned() },
		}
	}

	/// Build the lookup key for a named type *definition*, honoring an
	/// explicit `namespace` property or a dotted `name`, falling back to the
	/// enclosing namespace.
	fn for_definition(name: &str, explicit_namespace: Option<&str>, enclosing_namespace: Option<&str>) -> Self {
		match name.rsplit_once('.') {
			Some((namespace, name)) => {
				Self { namespace: Some(namespace).filter(|s| !s.is_empty()).map(str::to_owned), name: name.to_owned() }
			}
			None => Self {
				namespace: match explicit_namespace {
					// An explicit empty-string namespace means "no namespace".
					Some(ns) => Some(ns).filter(|s| !s.is_empty()).map(str::to_owned),
					None => enclosing_namespace.map(str::to_owned),
				},
				name: name.to_owned(),
			},
		}
	}

	fn qualified_name(&self) -> Name {
		match self.namespace {
			None => Name::from_fully_qualified_name(self.name.clone()),
			Some(ref namespace) => Name::from_fully_qualified_name(format!("{namespace}.{}", self.name)),
		}
	}
}

impl std::fmt::Display for NameKey {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self.namespace {
			None => self.name.fmt(f),
			Some(ref namespace) => write!(f, "{namespace}.{}", self.name),
		}
	}
}
