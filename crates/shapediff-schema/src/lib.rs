//! Schema node contract for shapediff.
//!
//! The diff engine never inspects values on its own: it walks a declarative
//! description of their shape. This crate provides that description as a
//! small, serializable AST together with the [`Schema`] document that owns
//! named definitions for self-referential nodes.
//!
//! # Key Types
//!
//! - [`Node`] -- A schema node (primitive, struct, tuple, refinement, transform, recursive, ...)
//! - [`PrimitiveKind`] -- Leaf scalar category
//! - [`Field`] -- A declared struct field
//! - [`NodeKind`] -- The classification of a node, used in diagnostics
//! - [`Schema`] -- Root node plus named definitions resolved on demand

pub mod error;
pub mod node;
pub mod schema;

pub use error::{SchemaError, SchemaResult};
pub use node::{EnumMember, Field, Node, NodeKind, PrimitiveKind};
pub use schema::Schema;
