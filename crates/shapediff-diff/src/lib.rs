//! Schema-directed structural diff and patch.
//!
//! Given a [`Schema`] and two values of its root node, the differ produces a
//! [`Patch`] that the applier turns the old value into the new one with:
//!
//! ```text
//! apply(node, diff(node, old, new), old) == new
//! ```
//!
//! The schema, not the values, decides how values are compared: struct
//! fields are visited in declaration order, sequences positionally, leaves
//! by equality.
//!
//! # Key Types
//!
//! - [`Differ`] -- computes patches, configured by [`DiffConfig`]
//! - [`Applier`] -- applies patches to values
//! - [`normalize`] -- rewrites a patch into its canonical, fused form
//! - [`equivalent`] -- node-aware equality of two values
//! - [`DiffError`] / [`DiffResult`] -- failures of the engine

pub mod apply;
pub mod compose;
pub mod config;
pub mod differ;
pub mod equality;
pub mod error;
mod shape;

use serde_json::Value;
use shapediff_schema::{Node, Schema};
use shapediff_types::Patch;

pub use apply::Applier;
pub use compose::normalize;
pub use config::DiffConfig;
pub use differ::Differ;
pub use equality::equivalent;
pub use error::{DiffError, DiffResult};

/// Diff two values of the schema's root node with the default configuration.
pub fn diff(schema: &Schema, old: &Value, new: &Value) -> DiffResult<Patch> {
    Differ::new(schema).diff(old, new)
}

/// Diff two values of `node`, resolving recursive links against `schema`.
pub fn diff_node(schema: &Schema, node: &Node, old: &Value, new: &Value) -> DiffResult<Patch> {
    Differ::new(schema).diff_node(node, old, new)
}

/// Apply `patch` to a value of the schema's root node.
pub fn apply(schema: &Schema, patch: &Patch, old: &Value) -> DiffResult<Value> {
    Applier::new(schema).apply(patch, old)
}

pub fn apply_node(schema: &Schema, node: &Node, patch: &Patch, old: &Value) -> DiffResult<Value> {
    Applier::new(schema).apply_node(node, patch, old)
}
