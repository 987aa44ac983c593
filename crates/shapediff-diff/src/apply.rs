//! The applier: `(node, patch, old) -> new`.
//!
//! Defined structurally on each patch variant. Struct and sequence variants
//! consult the node to find the child node for the addressed field or
//! element. `Replace` ignores the old value but only lands on a primitive
//! node, with a scalar the primitive admits. An `AndThen` chain is applied
//! step by step in a loop, however long it is.

use std::borrow::Cow;

use serde_json::Value;
use shapediff_schema::{Field, Node, Schema};
use shapediff_types::{Key, Patch};
use tracing::{debug, trace};

use crate::config::DiffConfig;
use crate::error::{DiffError, DiffResult};
use crate::shape::{concrete, expect_primitive, into_array, into_object, seed, Shape, TupleShape};

/// Applies patches to values of a schema.
#[derive(Clone, Debug)]
pub struct Applier<'s> {
    schema: &'s Schema,
    config: DiffConfig,
}

/// What to do once a struct path has been walked to its last key.
#[derive(Clone, Copy)]
enum FieldOp<'p> {
    Add(&'p Patch),
    Remove,
    Update(&'p Patch),
}

impl<'s> Applier<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        Self::with_config(schema, DiffConfig::default())
    }

    pub fn with_config(schema: &'s Schema, config: DiffConfig) -> Self {
        Self { schema, config }
    }

    /// Apply `patch` to a value of the schema's root node.
    pub fn apply(&self, patch: &Patch, old: &Value) -> DiffResult<Value> {
        self.apply_node(&self.schema.root, patch, old)
    }

    /// Apply `patch` to a value of `node`.
    pub fn apply_node(&self, node: &Node, patch: &Patch, old: &Value) -> DiffResult<Value> {
        let stats = patch.stats();
        debug!(kind = %node.kind(), changes = stats.changes(), "applying patch");
        self.apply_at(node, patch, old.clone(), 0)
    }

    fn apply_at(&self, node: &Node, patch: &Patch, value: Value, depth: usize) -> DiffResult<Value> {
        if depth > self.config.max_depth {
            return Err(DiffError::DepthLimitExceeded(self.config.max_depth));
        }
        match patch {
            Patch::Empty => Ok(value),
            Patch::AndThen { .. } => {
                let mut value = value;
                for step in patch.steps() {
                    value = self.apply_at(node, step, value, depth)?;
                }
                Ok(value)
            }
            Patch::Replace { value: replacement } => match concrete(self.schema, node)? {
                Shape::Primitive(kind) => {
                    expect_primitive(kind, replacement)?;
                    Ok(replacement.clone())
                }
                other => Err(unexpected_shape(node, other, "primitive")),
            },
            Patch::StructAdd { path, patch } => {
                self.apply_field(node, path.first(), path.rest(), FieldOp::Add(patch), value, depth)
            }
            Patch::StructRemove { path } => {
                self.apply_field(node, path.first(), path.rest(), FieldOp::Remove, value, depth)
            }
            Patch::StructUpdate { path, patch } => {
                self.apply_field(node, path.first(), path.rest(), FieldOp::Update(patch), value, depth)
            }
            Patch::ArrayAppend { values } => {
                let tuple = self.tuple(node)?;
                let mut items = into_array(value)?;
                items.extend(values.iter().cloned());
                tuple.check_len(items.len())?;
                Ok(Value::Array(items))
            }
            Patch::ArraySlice { from, until } => {
                self.tuple(node)?;
                let mut items = into_array(value)?;
                if from > until || *until > items.len() {
                    return Err(DiffError::InvalidSlice {
                        from: *from,
                        until: *until,
                        len: items.len(),
                    });
                }
                items.truncate(*until);
                items.drain(..*from);
                Ok(Value::Array(items))
            }
            Patch::ArrayUpdate { index, patch } => {
                let tuple = self.tuple(node)?;
                let mut items = into_array(value)?;
                let len = items.len();
                let (Some(slot), Some(element)) = (items.get_mut(*index), tuple.element_at(*index)) else {
                    return Err(DiffError::IndexOutOfBounds { index: *index, len });
                };
                trace!(index, depth, "apply array update");
                *slot = self.apply_at(element, patch, slot.take(), depth + 1)?;
                Ok(Value::Array(items))
            }
        }
    }

    /// Walk a struct path one level per key, then perform `op` on the field
    /// named by the last key.
    fn apply_field(
        &self,
        node: &Node,
        key: &Key,
        rest: &[Key],
        op: FieldOp<'_>,
        value: Value,
        depth: usize,
    ) -> DiffResult<Value> {
        let fields = self.fields(node)?;
        let name = key.as_field_name();
        let field = fields
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| DiffError::UnknownField(name.to_string()))?;
        let mut map = into_object(value)?;

        if let Some((next, rest)) = rest.split_first() {
            let current = take_field(&mut map, &name)?;
            let updated = self.apply_field(&field.node, next, rest, op, current, depth + 1)?;
            map.insert(name.into_owned(), updated);
            return Ok(Value::Object(map));
        }

        trace!(field = %name, depth, "apply field");
        match op {
            FieldOp::Update(patch) => {
                let current = take_field(&mut map, &name)?;
                let updated = self.apply_at(&field.node, patch, current, depth + 1)?;
                map.insert(name.into_owned(), updated);
            }
            FieldOp::Add(patch) => {
                if map.contains_key(name.as_ref()) {
                    return Err(DiffError::FieldAlreadyPresent(name.into_owned()));
                }
                let initial = seed(concrete(self.schema, &field.node)?);
                let created = self.apply_at(&field.node, patch, initial, depth + 1)?;
                map.insert(name.into_owned(), created);
            }
            FieldOp::Remove => {
                if !field.optional {
                    return Err(DiffError::RequiredField(name.into_owned()));
                }
                take_field(&mut map, &name)?;
            }
        }
        Ok(Value::Object(map))
    }

    fn fields<'n>(&self, node: &'n Node) -> DiffResult<&'n [Field]>
    where
        's: 'n,
    {
        match concrete(self.schema, node)? {
            Shape::Struct(fields) => Ok(fields),
            other => Err(unexpected_shape(node, other, "struct")),
        }
    }

    fn tuple<'n>(&self, node: &'n Node) -> DiffResult<TupleShape<'n>>
    where
        's: 'n,
    {
        match concrete(self.schema, node)? {
            Shape::Tuple(tuple) => Ok(tuple),
            other => Err(unexpected_shape(node, other, "tuple")),
        }
    }
}

fn take_field(map: &mut serde_json::Map<String, Value>, name: &Cow<'_, str>) -> DiffResult<Value> {
    map.remove(name.as_ref())
        .ok_or_else(|| DiffError::FieldNotFound(name.to_string()))
}

fn unexpected_shape(node: &Node, shape: Shape<'_>, expected: &str) -> DiffError {
    let found = match shape {
        Shape::Primitive(kind) => kind.name(),
        Shape::Struct(_) => "struct",
        Shape::Tuple(_) => "tuple",
    };
    DiffError::TypeMismatch {
        kind: node.kind(),
        expected: format!("{expected} node"),
        found: format!("{found} node"),
    }
}
