//! # Avro schema normalization and compatibility core
//!
//! This crate implements the part of a schema registry that is hard to get
//! wrong: turning Avro schema JSON submitted by a producer into a canonical,
//! structurally-sound form, and deciding whether a candidate *reader* schema
//! can consume data written under an older *writer* schema.
//!
//! ```
//! use avro_schema_core::{sanitize, schema::Schema, compatible};
//!
//! let writer_json = sanitize(
//! 	r#"{"type":"record","name":"com.acme.Widget","fields":[{"name":"id","type":"long"}]}"#,
//! )
//! .expect("writer schema should sanitize");
//! let reader_json = sanitize(
//! 	r#"{
//! 		"type": "record",
//! 		"name": "Widget",
//! 		"fields": [
//! 			{ "name": "id", "type": "long" },
//! 			{ "name": "label", "type": "string", "default": "" }
//! 		]
//! 	}"#,
//! )
//! .expect("reader schema should sanitize");
//!
//! let writer: Schema = writer_json.parse().expect("writer schema should build");
//! let reader: Schema = reader_json.parse().expect("reader schema should build");
//!
//! assert!(compatible(&reader, &writer));
//! ```
//!
//! Three operations are exposed, matching the three components described
//! below:
//!
//! - [`sanitize`] rewrites submitted schema JSON into canonical JSON.
//! - [`schema::Schema::build`] (or `str::parse`) turns canonical JSON into an
//!   immutable, arena-indexed schema tree.
//! - [`compatible`] decides, for two already-built schemas, whether the
//!   reader can consume data written under the writer.
//!
//! Nothing in this crate does I/O, retains global state, or blocks: every
//! operation is a pure function of its input, so schema handles can be
//! shared across threads and checked concurrently without synchronization.

mod error;
pub mod compat;
pub mod sanitize;
pub mod schema;

pub use compat::compatible;
pub use error::SchemaError;
pub use sanitize::sanitize;
pub use schema::Schema;
