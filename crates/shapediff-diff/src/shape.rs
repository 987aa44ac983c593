//! Resolution of schema nodes to the three shapes the engine works on.
//!
//! Refinements and transforms are transparent: values are always handled in
//! their underlying (encoded) representation. Recursive links are resolved
//! here, on demand, against the schema's definitions.

use serde_json::{Map, Value};
use shapediff_schema::{Field, Node, NodeKind, PrimitiveKind, Schema, SchemaError};
use tracing::trace;

use crate::error::{DiffError, DiffResult};

/// A concrete node, after refinements, transforms and recursive links have
/// been looked through.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Shape<'a> {
    Primitive(&'a PrimitiveKind),
    Struct(&'a [Field]),
    Tuple(TupleShape<'a>),
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct TupleShape<'a> {
    pub elements: &'a [Node],
    pub rest: Option<&'a Node>,
}

impl<'a> TupleShape<'a> {
    /// The node for position `index`: the fixed slot inside the fixed arity,
    /// the rest element past it.
    pub fn element_at(&self, index: usize) -> Option<&'a Node> {
        self.elements.get(index).or(self.rest)
    }

    /// Fail unless every position below `len` has an element node.
    pub fn check_len(&self, len: usize) -> DiffResult<()> {
        if self.rest.is_none() && len > self.elements.len() {
            return Err(DiffError::TypeMismatch {
                kind: NodeKind::Tuple,
                expected: format!("at most {} elements", self.elements.len()),
                found: format!("{len} elements"),
            });
        }
        Ok(())
    }
}

/// Look through wrappers until a primitive, struct or tuple is reached.
///
/// Kinds without a diff rule fail here, before any value is inspected.
pub(crate) fn concrete<'a>(schema: &'a Schema, node: &'a Node) -> DiffResult<Shape<'a>> {
    let mut current = node;
    let mut links = 0usize;
    loop {
        match current {
            Node::Primitive(kind) => return Ok(Shape::Primitive(kind)),
            Node::Struct { fields } => return Ok(Shape::Struct(fields)),
            Node::Tuple { elements, rest } => {
                if rest.len() > 1 {
                    return Err(DiffError::UnsupportedSchemaKind(NodeKind::Tuple));
                }
                return Ok(Shape::Tuple(TupleShape {
                    elements,
                    rest: rest.first(),
                }));
            }
            Node::Refinement { inner, .. } => current = &**inner,
            Node::Transform { from, .. } => current = &**from,
            Node::Recursive { target } => {
                // Each definition may be entered once before a concrete node
                // appears; more than that means the links go round in a loop.
                if links > schema.definitions.len() {
                    return Err(SchemaError::CircularReference(target.clone()).into());
                }
                trace!(target = %target, "resolving recursive node");
                current = schema.definition(target)?;
                links += 1;
            }
            Node::Union { .. }
            | Node::Enums { .. }
            | Node::TemplateLiteral { .. }
            | Node::Declaration { .. }
            | Node::UniqueSymbol { .. }
            | Node::Unknown
            | Node::Any
            | Node::Never => return Err(DiffError::UnsupportedSchemaKind(current.kind())),
        }
    }
}

/// Name of a value's runtime shape, for diagnostics.
pub(crate) fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Fail unless `value` is a scalar (or null) that `kind` admits. Composite
/// values never sit under a primitive node, literals included.
pub(crate) fn expect_primitive(kind: &PrimitiveKind, value: &Value) -> DiffResult<()> {
    if !value.is_array() && !value.is_object() && kind.admits(value) {
        Ok(())
    } else {
        Err(DiffError::TypeMismatch {
            kind: NodeKind::Primitive,
            expected: kind.name().to_string(),
            found: describe(value).to_string(),
        })
    }
}

pub(crate) fn expect_object(value: &Value) -> DiffResult<&Map<String, Value>> {
    value.as_object().ok_or_else(|| mismatch(NodeKind::Struct, "object", value))
}

/// Fail if `map` carries a key that none of `fields` declares.
pub(crate) fn expect_declared(fields: &[Field], map: &Map<String, Value>) -> DiffResult<()> {
    match map.keys().find(|key| !fields.iter().any(|field| field.name == **key)) {
        Some(key) => Err(DiffError::TypeMismatch {
            kind: NodeKind::Struct,
            expected: "declared fields".to_string(),
            found: format!("undeclared field `{key}`"),
        }),
        None => Ok(()),
    }
}

pub(crate) fn expect_array(value: &Value) -> DiffResult<&Vec<Value>> {
    value.as_array().ok_or_else(|| mismatch(NodeKind::Tuple, "array", value))
}

pub(crate) fn into_object(value: Value) -> DiffResult<Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(mismatch(NodeKind::Struct, "object", &other)),
    }
}

pub(crate) fn into_array(value: Value) -> DiffResult<Vec<Value>> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(mismatch(NodeKind::Tuple, "array", &other)),
    }
}

fn mismatch(kind: NodeKind, expected: &str, found: &Value) -> DiffError {
    DiffError::TypeMismatch {
        kind,
        expected: expected.to_string(),
        found: describe(found).to_string(),
    }
}

/// The value a newly inserted field starts from before its `StructAdd`
/// patch is applied.
pub(crate) fn seed(shape: Shape<'_>) -> Value {
    match shape {
        Shape::Primitive(_) => Value::Null,
        Shape::Struct(_) => Value::Object(Map::new()),
        Shape::Tuple(_) => Value::Array(Vec::new()),
    }
}
