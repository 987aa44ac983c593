//! Node-aware equality.
//!
//! Leaves compare as scalars; structs and tuples compare structurally through
//! their element nodes. A struct value carrying a key its node does not
//! declare is a type mismatch, as it is for the differ.

use serde_json::Value;
use shapediff_schema::{Node, Schema};

use crate::error::{DiffError, DiffResult};
use crate::shape::{concrete, expect_array, expect_declared, expect_object, expect_primitive, Shape};

/// Returns `true` if `a` and `b` are equal as values of `node`.
///
/// Fails with the same errors the differ would raise for these inputs.
pub fn equivalent(schema: &Schema, node: &Node, a: &Value, b: &Value) -> DiffResult<bool> {
    match concrete(schema, node)? {
        Shape::Primitive(kind) => {
            expect_primitive(kind, a)?;
            expect_primitive(kind, b)?;
            Ok(a == b)
        }
        Shape::Struct(fields) => {
            let (a, b) = (expect_object(a)?, expect_object(b)?);
            expect_declared(fields, a)?;
            expect_declared(fields, b)?;
            for field in fields {
                match (a.get(&field.name), b.get(&field.name)) {
                    (Some(x), Some(y)) => {
                        if !equivalent(schema, &field.node, x, y)? {
                            return Ok(false);
                        }
                    }
                    (None, None) if field.optional => {}
                    (None, None) => return Err(DiffError::FieldNotFound(field.name.clone())),
                    (Some(_), None) | (None, Some(_)) => return Ok(false),
                }
            }
            Ok(true)
        }
        Shape::Tuple(tuple) => {
            let (a, b) = (expect_array(a)?, expect_array(b)?);
            tuple.check_len(a.len())?;
            tuple.check_len(b.len())?;
            if a.len() != b.len() {
                return Ok(false);
            }
            for (index, (x, y)) in a.iter().zip(b).enumerate() {
                let Some(element) = tuple.element_at(index) else {
                    return Ok(false);
                };
                if !equivalent(schema, element, x, y)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
    }
}
