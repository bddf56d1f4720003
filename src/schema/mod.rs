//! The schema tree: an immutable, arena-indexed representation of an Avro
//! schema, built from sanitized JSON text by [`Schema::build`].

mod parsing;

use crate::error::SchemaError;

/// An immutable Avro schema tree.
///
/// Internally this is an arena (`Vec<SchemaNode>`) rather than a tree of
/// boxed nodes: Avro's named-reference mechanism means the schema graph can
/// be cyclic (a record can contain itself, directly or through a union), so
/// representing it as a flat vector addressed by [`SchemaKey`] is both the
/// simplest and the most efficient representation. The first node (index 0)
/// is always the root.
///
/// A `Schema` is cheap to build once and share: it carries no interior
/// mutability and no I/O handle, so it can be checked for compatibility
/// against arbitrarily many other schemas, concurrently, without
/// synchronization.
#[derive(Clone, Debug)]
pub struct Schema {
	pub(crate) nodes: Vec<SchemaNode>,
}

impl Schema {
	/// Parse already-[sanitized](crate::sanitize) Avro schema JSON into a
	/// schema tree.
	///
	/// Returns [`SchemaError`] if the JSON is malformed, or if it does not
	/// describe a structurally valid Avro schema (duplicate field/symbol
	/// names, an unresolved named reference, a nested union, an invalid
	/// default, ...).
	pub fn build(canonical_json_text: &str) -> Result<Self, SchemaError> {
		canonical_json_text.parse()
	}

	/// The root node of the schema.
	pub fn root(&self) -> &SchemaNode {
		&self.nodes[0]
	}

	/// Obtain the underlying arena storage.
	///
	/// The first node (index `0`) is the root of the schema.
	/// [`SchemaKey`]s can be converted to indices of this slice.
	pub fn nodes(&self) -> &[SchemaNode] {
		&self.nodes
	}

	/// Resolve a [`SchemaKey`] to the node it addresses.
	pub fn get(&self, key: SchemaKey) -> &SchemaNode {
		&self.nodes[key.idx]
	}
}

impl std::str::FromStr for Schema {
	type Err = SchemaError;
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		parsing::build(s)
	}
}

/// The location of a node in a [`Schema`]'s arena.
///
/// Can be used to [index](Schema::get) into the [`Schema`] it was produced
/// from. A `SchemaKey` obtained from one `Schema` is meaningless against a
/// different `Schema`.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SchemaKey {
	idx: usize,
}

impl SchemaKey {
	pub(crate) const fn from_idx(idx: usize) -> Self {
		Self { idx }
	}
	/// The index, in the [`nodes`](Schema::nodes) slice of a [`Schema`],
	/// that this key addresses.
	pub const fn idx(self) -> usize {
		self.idx
	}
	/// The key of the root of any [`Schema`] (always index `0`).
	pub const fn root() -> Self {
		Self { idx: 0 }
	}
}

impl std::fmt::Debug for SchemaKey {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		std::fmt::Debug::fmt(&self.idx, f)
	}
}

impl std::ops::Index<SchemaKey> for Schema {
	type Output = SchemaNode;
	fn index(&self, key: SchemaKey) -> &Self::Output {
		&self.nodes[key.idx]
	}
}

/// A node of an Avro schema tree, stored in a [`Schema`]'s arena.
///
/// This merges `spec.md`'s `kind` tag and kind-specific payload into one
/// Rust enum, as is idiomatic: the discriminant of the enum *is* the
/// `SchemaKind`, and each variant only carries the fields relevant to it.
#[derive(Clone, Debug)]
pub enum SchemaNode {
	Null,
	Boolean,
	Int,
	Long,
	Float,
	Double,
	Bytes,
	String,
	Array(Array),
	Map(Map),
	Union(Union),
	Record(Record),
	Enum(Enum),
	Fixed(Fixed),
}

impl SchemaNode {
	/// If this node is a named type, its qualified name.
	pub fn name(&self) -> Option<&Name> {
		match self {
			SchemaNode::Record(r) => Some(&r.name),
			SchemaNode::Enum(e) => Some(&e.name),
			SchemaNode::Fixed(f) => Some(&f.name),
			_ => None,
		}
	}
}

/// `array` schema component: the key of the schema of each element.
#[derive(Clone, Debug)]
pub struct Array {
	pub items: SchemaKey,
}

/// `map` schema component: the key of the schema of each value (Avro map
/// keys are always strings).
#[derive(Clone, Debug)]
pub struct Map {
	pub values: SchemaKey,
}

/// `union` schema component: the keys of each of the union's branches, in
/// declaration order.
#[derive(Clone, Debug)]
pub struct Union {
	pub variants: Vec<SchemaKey>,
}

/// `record` schema component.
#[derive(Clone, Debug)]
pub struct Record {
	pub name: Name,
	pub fields: Vec<Field>,
}

/// One field of a [`Record`].
#[derive(Clone, Debug)]
pub struct Field {
	/// The unqualified field name.
	pub name: String,
	pub type_: SchemaKey,
	/// The field's default value, if any, exactly as it appeared in the
	/// (canonical) schema JSON.
	///
	/// A default value whose JSON kind is `null` is, per the Avro tooling
	/// this crate's behavior is grounded on, indistinguishable from "no
	/// default" for compatibility purposes: see
	/// [`Field::has_non_null_default`].
	pub default: Option<serde_json::Value>,
}

impl Field {
	/// Whether this field has a default that is not JSON `null`.
	///
	/// Compatibility resolution treats a present-but-`null` default the
	/// same as no default at all (`spec.md` §9, "Default-value semantics
	/// on missing fields and enum symbols").
	pub fn has_non_null_default(&self) -> bool {
		!matches!(self.default, None | Some(serde_json::Value::Null))
	}
}

/// `enum` schema component.
#[derive(Clone, Debug)]
pub struct Enum {
	pub name: Name,
	pub symbols: Vec<String>,
	/// The enum's default symbol, if any. Subject to the same null-means-
	/// absent rule as [`Field::default`].
	pub default: Option<serde_json::Value>,
}

impl Enum {
	/// Whether this enum declares a default symbol that is not JSON `null`.
	pub fn has_non_null_default(&self) -> bool {
		!matches!(self.default, None | Some(serde_json::Value::Null))
	}
}

/// `fixed` schema component.
#[derive(Clone, Debug)]
pub struct Fixed {
	pub name: Name,
	pub size: usize,
}

/// The qualified name of a named Avro type: a namespace (possibly empty)
/// plus a local name.
///
/// Two qualified names compare equal iff both their namespace and local
/// name are byte-equal.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Name {
	fully_qualified_name: String,
	namespace_delimiter_idx: Option<usize>,
}

impl std::fmt::Debug for Name {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		std::fmt::Debug::fmt(&self.fully_qualified_name, f)
	}
}

impl Name {
	/// The rightmost component of the fully qualified name (e.g. in `a.b.c`
	/// it's `c`).
	pub fn name(&self) -> &str {
		match self.namespace_delimiter_idx {
			None => &self.fully_qualified_name,
			Some(idx) => &self.fully_qualified_name[idx + 1..],
		}
	}

	/// The namespace component of the fully qualified name (e.g. in `a.b.c`
	/// it's `a.b`), if any.
	pub fn namespace(&self) -> Option<&str> {
		self.namespace_delimiter_idx.map(|idx| &self.fully_qualified_name[..idx])
	}

	/// The fully qualified name (e.g. `a.b.c`).
	pub fn fully_qualified_name(&self) -> &str {
		&self.fully_qualified_name
	}

	pub(crate) fn from_fully_qualified_name(fully_qualified_name: impl Into<String>) -> Self {
		let fully_qualified_name = fully_qualified_name.into();
		Self {
			namespace_delimiter_idx: fully_qualified_name.rfind('.'),
			fully_qualified_name,
		}
	}
}
