//! The reader/writer compatibility predicate.
//!
//! `compatible(reader, writer)` decides whether data written under the
//! `writer` schema can be read back using the `reader` schema, following
//! [Avro's schema resolution rules](https://avro.apache.org/docs/current/specification/#schema-resolution).
//!
//! This is a pure function: it allocates only the small "visited pairs" set
//! needed to terminate on mutually-recursive record schemas, never panics,
//! and never explains a `false` verdict (there is no error channel — only
//! already-built [`Schema`]s can reach this function, and those are known
//! structurally sound).

use hashbrown::HashSet;

use crate::schema::{Schema, SchemaKey, SchemaNode};

/// Can the `reader` schema consume data written under the `writer` schema?
///
/// Traversal is strictly in declaration order: union branches are tried in
/// the order they're declared, and record fields are driven by the
/// *reader's* declared order (not the writer's).
pub fn compatible(reader: &Schema, writer: &Schema) -> bool {
	let mut visited = HashSet::new();
	resolve(reader, SchemaKey::root(), writer, SchemaKey::root(), &mut visited)
}

/// `(reader node index, writer node index)` pairs already being compared
/// along the current path, so that mutually-recursive records terminate
/// instead of recursing forever.
type VisitedPairs = HashSet<(usize, usize)>;

fn resolve(
	reader: &Schema,
	reader_key: SchemaKey,
	writer: &Schema,
	writer_key: SchemaKey,
	visited: &mut VisitedPairs,
) -> bool {
	let reader_node = reader.get(reader_key);
	let writer_node = writer.get(writer_key);

	// Case B: reader is a union, writer is not — compatible iff some reader
	// branch resolves the (whole) writer schema. First match wins, no
	// backtracking beyond that, since the predicate only yields a bool.
	if let (SchemaNode::Union(reader_union), false) =
		(reader_node, matches!(writer_node, SchemaNode::Union(_)))
	{
		return reader_union
			.variants
			.iter()
			.any(|&branch| resolve(reader, branch, writer, writer_key, visited));
	}

	// Case C: writer is a union, reader is not — compatible iff the reader
	// resolves *every* writer branch.
	if let (false, SchemaNode::Union(writer_union)) =
		(matches!(reader_node, SchemaNode::Union(_)), writer_node)
	{
		return writer_union
			.variants
			.iter()
			.all(|&branch| resolve(reader, reader_key, writer, branch, visited));
	}

	// Case A: same kind (including both being unions, handled by the
	// `union` arm of `same_kind`).
	if std::mem::discriminant(reader_node) == std::mem::discriminant(writer_node) {
		return same_kind(reader, reader_node, reader_key, writer, writer_node, writer_key, visited);
	}

	// Case D: different kinds, neither is a union — only the numeric
	// promotions and the string/bytes symmetry are allowed.
	primitive_promotion(reader_node, writer_node)
}

fn same_kind(
	reader: &Schema,
	reader_node: &SchemaNode,
	reader_key: SchemaKey,
	writer: &Schema,
	writer_node: &SchemaNode,
	writer_key: SchemaKey,
	visited: &mut VisitedPairs,
) -> bool {
	match (reader_node, writer_node) {
		(SchemaNode::Null, SchemaNode::Null)
		| (SchemaNode::Boolean, SchemaNode::Boolean)
		| (SchemaNode::Int, SchemaNode::Int)
		| (SchemaNode::Long, SchemaNode::Long)
		| (SchemaNode::Float, SchemaNode::Float)
		| (SchemaNode::Double, SchemaNode::Double)
		| (SchemaNode::Bytes, SchemaNode::Bytes)
		| (SchemaNode::String, SchemaNode::String) => true,

		(SchemaNode::Fixed(r), SchemaNode::Fixed(w)) => r.size == w.size && r.name == w.name,

		(SchemaNode::Array(r), SchemaNode::Array(w)) => {
			resolve(reader, r.items, writer, w.items, visited)
		}
		(SchemaNode::Map(r), SchemaNode::Map(w)) => {
			resolve(reader, r.values, writer, w.values, visited)
		}

		(SchemaNode::Union(r), SchemaNode::Union(w)) => {
			// Every writer branch must be absorbable by the reader union.
			w.variants.iter().all(|&w_branch| {
				r.variants.iter().any(|&r_branch| resolve(reader, r_branch, writer, w_branch, visited))
			})
		}

		(SchemaNode::Enum(r), SchemaNode::Enum(w)) => {
			// A reader default satisfies any writer symbol, even ones the
			// reader doesn't itself declare.
			if r.has_non_null_default() {
				return true;
			}
			w.symbols.iter().all(|symbol| r.symbols.contains(symbol))
		}

		(SchemaNode::Record(r), SchemaNode::Record(w)) => {
			let pair = (reader_key.idx(), writer_key.idx());
			if !visited.insert(pair) {
				// We've already started comparing this exact pair of named
				// types further up the call stack: a self-referential
				// schema (directly, or through a union). Returning `true`
				// here is what lets `compatible` terminate instead of
				// recursing forever.
				return true;
			}
			let result = r.fields.iter().all(|reader_field| {
				match w.fields.iter().find(|f| f.name == reader_field.name) {
					Some(writer_field) => {
						resolve(reader, reader_field.type_, writer, writer_field.type_, visited)
					}
					// Extra writer fields not present in the reader are
					// ignored; a missing writer field is only acceptable
					// if the reader declares a non-null default for it.
					None => reader_field.has_non_null_default(),
				}
			});
			visited.remove(&pair);
			result
		}

		// Unreachable given `resolve` only calls `same_kind` once the
		// discriminants have already been checked equal.
		_ => primitive_promotion(reader_node, writer_node),
	}
}

/// The primitive numeric promotions and the `string`/`bytes` symmetry that
/// Avro schema resolution allows between differing primitive kinds.
fn primitive_promotion(reader_node: &SchemaNode, writer_node: &SchemaNode) -> bool {
	use SchemaNode::*;
	matches!(
		(reader_node, writer_node),
		(Long, Int)
			| (Float, Int) | (Float, Long)
			| (Double, Int) | (Double, Long) | (Double, Float)
			| (String, Bytes)
			| (Bytes, String)
	)
}
