//! The differ: `(node, old, new) -> Patch`.
//!
//! The walk follows the schema, not the values. Struct fields are visited in
//! declaration order and sequences positionally; unchanged fields and
//! elements contribute no step, so equal inputs always diff to
//! [`Patch::Empty`]. Steps are chained left to right with
//! [`Patch::and_then`], which yields a left-leaning `AndThen` chain.

use serde_json::Value;
use shapediff_schema::{Field, Node, Schema};
use shapediff_types::Patch;
use tracing::{debug, trace};

use crate::apply::Applier;
use crate::compose::normalize;
use crate::config::DiffConfig;
use crate::error::{DiffError, DiffResult};
use crate::shape::{concrete, expect_array, expect_declared, expect_object, expect_primitive, Shape, TupleShape};

/// Computes patches between two values of a schema.
#[derive(Clone, Debug)]
pub struct Differ<'s> {
    schema: &'s Schema,
    config: DiffConfig,
}

impl<'s> Differ<'s> {
    /// A differ with the default configuration.
    pub fn new(schema: &'s Schema) -> Self {
        Self::with_config(schema, DiffConfig::default())
    }

    pub fn with_config(schema: &'s Schema, config: DiffConfig) -> Self {
        Self { schema, config }
    }

    pub fn schema(&self) -> &'s Schema {
        self.schema
    }

    pub fn config(&self) -> &DiffConfig {
        &self.config
    }

    /// Diff two values of the schema's root node.
    pub fn diff(&self, old: &Value, new: &Value) -> DiffResult<Patch> {
        self.diff_node(&self.schema.root, old, new)
    }

    /// Diff two values of `node`, which may be any node of this schema.
    pub fn diff_node(&self, node: &Node, old: &Value, new: &Value) -> DiffResult<Patch> {
        let mut patch = self.diff_at(node, old, new, 0)?;
        if self.config.normalize {
            patch = normalize(patch);
        }
        if self.config.verify_round_trip && self.apply_node(node, &patch, old)? != *new {
            return Err(DiffError::RoundTripMismatch);
        }
        debug!(kind = %node.kind(), steps = patch.steps().len(), depth = patch.depth(), "diff complete");
        Ok(patch)
    }

    /// Apply `patch` to a value of the root node, with this differ's limits.
    pub fn apply(&self, patch: &Patch, old: &Value) -> DiffResult<Value> {
        self.applier().apply(patch, old)
    }

    pub fn apply_node(&self, node: &Node, patch: &Patch, old: &Value) -> DiffResult<Value> {
        self.applier().apply_node(node, patch, old)
    }

    fn applier(&self) -> Applier<'s> {
        Applier::with_config(self.schema, self.config.clone())
    }

    fn diff_at(&self, node: &Node, old: &Value, new: &Value, depth: usize) -> DiffResult<Patch> {
        if depth > self.config.max_depth {
            return Err(DiffError::DepthLimitExceeded(self.config.max_depth));
        }
        trace!(kind = %node.kind(), depth, "diff node");
        match concrete(self.schema, node)? {
            Shape::Primitive(kind) => {
                expect_primitive(kind, old)?;
                expect_primitive(kind, new)?;
                if old == new {
                    Ok(Patch::Empty)
                } else {
                    Ok(Patch::Replace { value: new.clone() })
                }
            }
            Shape::Struct(fields) => self.diff_struct(fields, old, new, depth),
            Shape::Tuple(tuple) => self.diff_sequence(tuple, old, new, depth),
        }
    }

    fn diff_struct(&self, fields: &[Field], old: &Value, new: &Value, depth: usize) -> DiffResult<Patch> {
        let (old, new) = (expect_object(old)?, expect_object(new)?);
        expect_declared(fields, old)?;
        expect_declared(fields, new)?;
        let mut patch = Patch::Empty;

        for field in fields {
            let name = field.name.as_str();
            let step = match (old.get(name), new.get(name)) {
                (Some(o), Some(n)) => {
                    let child = self.diff_at(&field.node, o, n, depth + 1)?;
                    if child.is_empty() {
                        continue;
                    }
                    Patch::struct_update(name, child)
                }
                (None, None) if field.optional => continue,
                (None, Some(n)) if field.optional => {
                    Patch::struct_add(name, self.build(&field.node, n, depth + 1)?)
                }
                (Some(_), None) if field.optional => Patch::struct_remove(name),
                _ => return Err(DiffError::FieldNotFound(field.name.clone())),
            };
            patch = patch.and_then(step);
        }
        Ok(patch)
    }

    /// Positional sequence diff shared by tuples and free arrays: element
    /// updates over the common prefix, then one slice if the old value is
    /// longer, then one append if the new value is longer.
    fn diff_sequence(&self, tuple: TupleShape<'_>, old: &Value, new: &Value, depth: usize) -> DiffResult<Patch> {
        let (old, new) = (expect_array(old)?, expect_array(new)?);
        tuple.check_len(old.len())?;
        tuple.check_len(new.len())?;

        let common = old.len().min(new.len());
        let mut patch = Patch::Empty;

        for (index, (o, n)) in old.iter().zip(new).enumerate() {
            let Some(element) = tuple.element_at(index) else {
                break;
            };
            let child = self.diff_at(element, o, n, depth + 1)?;
            if child.is_empty() {
                continue;
            }
            patch = patch.and_then(Patch::array_update(index, child));
        }
        if old.len() > common {
            patch = patch.and_then(Patch::array_slice(0, common));
        }
        if new.len() > common {
            patch = patch.and_then(Patch::array_append(new[common..].iter().cloned()));
        }
        Ok(patch)
    }

    /// A patch that builds `value` from the seed of `node`: `null` for
    /// leaves, `{}` for structs and `[]` for sequences. Used for fields that
    /// appear in the new value only.
    fn build(&self, node: &Node, value: &Value, depth: usize) -> DiffResult<Patch> {
        if depth > self.config.max_depth {
            return Err(DiffError::DepthLimitExceeded(self.config.max_depth));
        }
        match concrete(self.schema, node)? {
            Shape::Primitive(kind) => {
                expect_primitive(kind, value)?;
                Ok(Patch::Replace { value: value.clone() })
            }
            Shape::Struct(fields) => {
                let map = expect_object(value)?;
                expect_declared(fields, map)?;
                let mut patch = Patch::Empty;
                for field in fields {
                    match map.get(&field.name) {
                        Some(v) => {
                            let child = self.build(&field.node, v, depth + 1)?;
                            patch = patch.and_then(Patch::struct_add(field.name.as_str(), child));
                        }
                        None if field.optional => {}
                        None => return Err(DiffError::FieldNotFound(field.name.clone())),
                    }
                }
                Ok(patch)
            }
            Shape::Tuple(tuple) => {
                let items = expect_array(value)?;
                tuple.check_len(items.len())?;
                if items.is_empty() {
                    Ok(Patch::Empty)
                } else {
                    Ok(Patch::array_append(items.iter().cloned()))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shapediff_schema::NodeKind;

    fn numbers() -> Schema {
        Schema::new(Node::array(Node::number()))
    }

    fn person() -> Schema {
        Schema::new(Node::structure([
            Field::required("age", Node::number()),
            Field::required("name", Node::string()),
            Field::required("aliases", Node::array(Node::string())),
        ]))
    }

    #[test]
    fn equal_leaves_diff_to_empty() {
        let schema = Schema::new(Node::string());
        let patch = Differ::new(&schema).diff(&json!("a"), &json!("a")).unwrap();
        assert_eq!(patch, Patch::Empty);
    }

    #[test]
    fn changed_leaf_is_replaced() {
        let schema = Schema::new(Node::boolean());
        let patch = Differ::new(&schema).diff(&json!(true), &json!(false)).unwrap();
        assert_eq!(patch, Patch::replace(false));
    }

    #[test]
    fn array_append() {
        let schema = numbers();
        let patch = Differ::new(&schema).diff(&json!([1, 2, 3]), &json!([1, 2, 3, 4])).unwrap();
        assert_eq!(patch, Patch::array_append([json!(4)]));
    }

    #[test]
    fn array_truncation() {
        let schema = numbers();
        let patch = Differ::new(&schema).diff(&json!([1, 2, 3]), &json!([1, 2])).unwrap();
        assert_eq!(patch, Patch::array_slice(0, 2));
    }

    #[test]
    fn array_element_replace() {
        let schema = numbers();
        let patch = Differ::new(&schema).diff(&json!([1, 2, 3]), &json!([9, 2, 3])).unwrap();
        assert_eq!(patch, Patch::array_update(0, Patch::replace(9)));
    }

    #[test]
    fn update_then_slice_order() {
        let schema = numbers();
        let patch = Differ::new(&schema).diff(&json!([1, 2, 3]), &json!([5])).unwrap();
        assert_eq!(
            patch,
            Patch::array_update(0, Patch::replace(5)).and_then(Patch::array_slice(0, 1))
        );
    }

    #[test]
    fn struct_with_nested_array() {
        let schema = person();
        let old = json!({"age": 0, "name": "foo", "aliases": ["foo"]});
        let new = json!({"age": 1, "name": "bar", "aliases": ["bar1", "bar2"]});
        let patch = Differ::new(&schema).diff(&old, &new).unwrap();

        let expected = Patch::struct_update("age", Patch::replace(1))
            .and_then(Patch::struct_update("name", Patch::replace("bar")))
            .and_then(Patch::struct_update(
                "aliases",
                Patch::array_update(0, Patch::replace("bar1"))
                    .and_then(Patch::array_append([json!("bar2")])),
            ));
        assert_eq!(patch, expected);
    }

    #[test]
    fn unchanged_fields_emit_no_step() {
        let schema = person();
        let old = json!({"age": 0, "name": "foo", "aliases": []});
        let new = json!({"age": 0, "name": "baz", "aliases": []});
        let patch = Differ::new(&schema).diff(&old, &new).unwrap();
        assert_eq!(patch, Patch::struct_update("name", Patch::replace("baz")));
    }

    #[test]
    fn optional_absent_on_both_sides_is_skipped() {
        // The optional field's node has no diff rule; it must never be consulted.
        let schema = Schema::new(Node::structure([
            Field::required("id", Node::integer()),
            Field::optional("meta", Node::union([Node::string(), Node::number()])),
        ]));
        let patch = Differ::new(&schema).diff(&json!({"id": 1}), &json!({"id": 2})).unwrap();
        assert_eq!(patch, Patch::struct_update("id", Patch::replace(2)));
    }

    #[test]
    fn optional_field_added() {
        let schema = Schema::new(Node::structure([Field::optional(
            "tags",
            Node::array(Node::string()),
        )]));
        let patch = Differ::new(&schema).diff(&json!({}), &json!({"tags": ["x"]})).unwrap();
        assert_eq!(patch, Patch::struct_add("tags", Patch::array_append([json!("x")])));
    }

    #[test]
    fn optional_field_removed() {
        let schema = Schema::new(Node::structure([Field::optional("nick", Node::string())]));
        let patch = Differ::new(&schema).diff(&json!({"nick": "a"}), &json!({})).unwrap();
        assert_eq!(patch, Patch::struct_remove("nick"));
    }

    #[test]
    fn missing_required_field() {
        let schema = person();
        let err = Differ::new(&schema)
            .diff(&json!({"age": 1, "name": "x"}), &json!({"age": 1, "name": "x", "aliases": []}))
            .unwrap_err();
        assert_eq!(err, DiffError::FieldNotFound("aliases".into()));
    }

    #[test]
    fn transform_diffs_source_representation() {
        // Dates travel as strings; the decoded form is irrelevant to the diff.
        let schema = Schema::new(Node::transform(Node::string(), Node::Declaration { name: "Date".into() }));
        let patch = Differ::new(&schema)
            .diff(&json!("2024-01-01"), &json!("2024-02-01"))
            .unwrap();
        assert_eq!(patch, Patch::replace("2024-02-01"));
    }

    #[test]
    fn fixed_tuple_positions_use_their_own_nodes() {
        let schema = Schema::new(Node::tuple([Node::string(), Node::number()]));
        let patch = Differ::new(&schema).diff(&json!(["a", 1]), &json!(["a", 2])).unwrap();
        assert_eq!(patch, Patch::array_update(1, Patch::replace(2)));

        let err = Differ::new(&schema).diff(&json!(["a", 1]), &json!([1, 1])).unwrap_err();
        assert!(matches!(err, DiffError::TypeMismatch { kind: NodeKind::Primitive, .. }));
    }

    #[test]
    fn tuple_with_rest_grows_like_an_array() {
        let schema = Schema::new(Node::tuple_with_rest([Node::string()], Node::number()));
        let patch = Differ::new(&schema).diff(&json!(["h"]), &json!(["h", 1, 2])).unwrap();
        assert_eq!(patch, Patch::array_append([json!(1), json!(2)]));
    }

    #[test]
    fn fixed_tuple_overflow_is_mismatch() {
        let schema = Schema::new(Node::tuple([Node::string()]));
        let err = Differ::new(&schema).diff(&json!(["a"]), &json!(["a", "b"])).unwrap_err();
        assert!(matches!(err, DiffError::TypeMismatch { kind: NodeKind::Tuple, .. }));
    }

    #[test]
    fn sequence_against_scalar_is_mismatch() {
        let schema = numbers();
        let err = Differ::new(&schema).diff(&json!([1]), &json!(1)).unwrap_err();
        assert!(matches!(err, DiffError::TypeMismatch { .. }));
    }

    #[test]
    fn composite_under_primitive_is_mismatch() {
        let schema = Schema::new(Node::string());
        let err = Differ::new(&schema).diff(&json!({"a": 1}), &json!("x")).unwrap_err();
        assert!(matches!(err, DiffError::TypeMismatch { kind: NodeKind::Primitive, .. }));
    }

    #[test]
    fn unsupported_kinds_fail_for_any_input() {
        for (node, kind) in [
            (Node::union([Node::string()]), NodeKind::Union),
            (Node::Enums { members: Vec::new() }, NodeKind::Enums),
            (Node::TemplateLiteral { pattern: "id-${number}".into() }, NodeKind::TemplateLiteral),
        ] {
            let schema = Schema::new(node);
            for (old, new) in [(json!(1), json!(1)), (json!("a"), json!([1])), (json!(null), json!({}))] {
                assert_eq!(
                    Differ::new(&schema).diff(&old, &new).unwrap_err(),
                    DiffError::UnsupportedSchemaKind(kind)
                );
            }
        }
    }

    #[test]
    fn recursive_schema_bounded_by_value_depth() {
        let schema = Schema::new(Node::recursive("Tree")).define(
            "Tree",
            Node::structure([
                Field::required("value", Node::integer()),
                Field::required("children", Node::array(Node::recursive("Tree"))),
            ]),
        );
        let old = json!({"value": 1, "children": [{"value": 2, "children": []}]});
        let new = json!({"value": 1, "children": [{"value": 3, "children": []}]});
        let patch = Differ::new(&schema).diff(&old, &new).unwrap();
        assert_eq!(
            patch,
            Patch::struct_update(
                "children",
                Patch::array_update(0, Patch::struct_update("value", Patch::replace(3)))
            )
        );
    }

    #[test]
    fn depth_limit() {
        let schema = Schema::new(Node::recursive("Nest")).define(
            "Nest",
            Node::structure([Field::optional("inner", Node::recursive("Nest"))]),
        );
        let config = DiffConfig {
            max_depth: 2,
            ..Default::default()
        };
        let deep_old = json!({"inner": {"inner": {"inner": {}}}});
        let deep_new = json!({"inner": {"inner": {"inner": {"inner": {}}}}});
        let err = Differ::with_config(&schema, config).diff(&deep_old, &deep_new).unwrap_err();
        assert_eq!(err, DiffError::DepthLimitExceeded(2));
    }

    #[test]
    fn undeclared_keys_are_rejected() {
        let schema = Schema::new(Node::structure([Field::required("a", Node::integer())]));
        let differ = Differ::new(&schema);
        let undeclared = |err: DiffError| {
            matches!(err, DiffError::TypeMismatch { kind: NodeKind::Struct, ref found, .. } if found.contains("`x`"))
        };

        let err = differ.diff(&json!({"a": 1, "x": 1}), &json!({"a": 1, "x": 2})).unwrap_err();
        assert!(undeclared(err));
        let err = differ.diff(&json!({"a": 1}), &json!({"a": 1, "x": 2})).unwrap_err();
        assert!(undeclared(err));
        let err = differ.diff(&json!({"a": 1, "x": 1}), &json!({"a": 1})).unwrap_err();
        assert!(undeclared(err));
    }

    #[test]
    fn undeclared_keys_in_added_field_are_rejected() {
        let schema = Schema::new(Node::structure([Field::optional(
            "inner",
            Node::structure([Field::required("a", Node::integer())]),
        )]));
        let err = Differ::new(&schema)
            .diff(&json!({}), &json!({"inner": {"a": 1, "x": 2}}))
            .unwrap_err();
        assert!(matches!(err, DiffError::TypeMismatch { kind: NodeKind::Struct, .. }));
    }

    #[test]
    fn unchanged_elements_emit_no_step() {
        let schema = Schema::new(Node::array(Node::structure([
            Field::required("id", Node::integer()),
            Field::optional("tag", Node::string()),
        ])));
        let old = json!([{"id": 1}, {"id": 2, "tag": "t"}, {"id": 3}]);
        let new = json!([{"id": 1}, {"id": 2}, {"id": 3}]);
        let patch = Differ::new(&schema).diff(&old, &new).unwrap();
        assert_eq!(patch, Patch::array_update(1, Patch::struct_remove("tag")));
    }

    #[test]
    fn long_arrays_diff_and_apply() {
        let schema = numbers();
        let differ = Differ::with_config(&schema, DiffConfig::strict());
        let len = 30_000;
        let old = Value::Array((0..len).map(Value::from).collect());
        let new = Value::Array((0..len).map(|i| Value::from(i + 1)).collect());
        let patch = differ.diff(&old, &new).unwrap();
        assert_eq!(patch.steps().len(), len as usize);
        assert_eq!(differ.apply(&patch, &old).unwrap(), new);
    }

    #[test]
    fn ten_thousand_step_patch_survives_json() {
        let schema = numbers();
        let differ = Differ::new(&schema);
        let old = Value::Array((0..10_000).map(Value::from).collect());
        let new = Value::Array((0..10_000).map(|i| Value::from(-i)).chain([json!(0.5)]).collect());
        let patch = differ.diff(&old, &new).unwrap();

        let back = Patch::from_json(&patch.to_json().unwrap()).unwrap();
        assert_eq!(back.steps().len(), patch.steps().len());
        assert_eq!(back, patch);
        assert_eq!(differ.apply(&back, &old).unwrap(), new);
    }

    #[test]
    fn strict_config_normalizes_and_verifies() {
        let schema = person();
        let old = json!({"age": 0, "name": "foo", "aliases": ["a", "b"]});
        let new = json!({"age": 0, "name": "foo", "aliases": ["a"]});
        let patch = Differ::with_config(&schema, DiffConfig::strict()).diff(&old, &new).unwrap();
        assert_eq!(patch, Patch::struct_update("aliases", Patch::array_slice(0, 1)));
    }
}
