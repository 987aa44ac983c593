//! The patch tree.
//!
//! On the wire a patch is a JSON object with a `_tag` discriminant and the
//! variant's fields, e.g. `{"_tag":"ArrayUpdate","index":0,"patch":{...}}`.
//! An `AndThen` chain is written flat, as `{"_tag":"AndThen","steps":[...]}`,
//! so the nesting of a document tracks the nesting of the schema rather than
//! the number of steps.
//!
//! Chains can hold tens of thousands of steps. Everything that walks the
//! `AndThen` spine (`steps`, `depth`, `stats`, equality, cloning and drop)
//! does so with an explicit stack.

use std::fmt;
use std::mem;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::TypeError;
use crate::key::{Key, KeyPath};

/// A serializable transformation from one value to another.
#[derive(Debug, Default)]
pub enum Patch {
    /// No change.
    #[default]
    Empty,
    /// Apply `first`, then `second` to its result.
    AndThen {
        first: Box<Patch>,
        second: Box<Patch>,
    },
    /// Insert a field whose value is built by `patch` from the field node's
    /// seed value.
    StructAdd { path: KeyPath, patch: Box<Patch> },
    /// Delete a field.
    StructRemove { path: KeyPath },
    /// Patch the value of an existing field.
    StructUpdate { path: KeyPath, patch: Box<Patch> },
    /// Append values verbatim to the end of a sequence.
    ArrayAppend { values: Vec<Value> },
    /// Keep only the index range `[from, until)`.
    ArraySlice { from: usize, until: usize },
    /// Patch the element at `index`.
    ArrayUpdate { index: usize, patch: Box<Patch> },
    /// Replace a leaf value outright.
    Replace { value: Value },
}

impl Patch {
    pub fn struct_add(key: impl Into<Key>, patch: Patch) -> Self {
        Patch::StructAdd {
            path: KeyPath::single(key),
            patch: Box::new(patch),
        }
    }

    pub fn struct_remove(key: impl Into<Key>) -> Self {
        Patch::StructRemove {
            path: KeyPath::single(key),
        }
    }

    pub fn struct_update(key: impl Into<Key>, patch: Patch) -> Self {
        Patch::StructUpdate {
            path: KeyPath::single(key),
            patch: Box::new(patch),
        }
    }

    pub fn array_append(values: impl IntoIterator<Item = Value>) -> Self {
        Patch::ArrayAppend {
            values: values.into_iter().collect(),
        }
    }

    pub fn array_slice(from: usize, until: usize) -> Self {
        Patch::ArraySlice { from, until }
    }

    pub fn array_update(index: usize, patch: Patch) -> Self {
        Patch::ArrayUpdate {
            index,
            patch: Box::new(patch),
        }
    }

    pub fn replace(value: impl Into<Value>) -> Self {
        Patch::Replace {
            value: value.into(),
        }
    }

    /// Decode a patch from its JSON wire form.
    pub fn from_json(text: &str) -> Result<Patch, TypeError> {
        serde_json::from_str(text).map_err(|e| TypeError::Serialization(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, TypeError> {
        serde_json::to_string(self).map_err(|e| TypeError::Serialization(e.to_string()))
    }

    /// Returns `true` for the identity patch.
    pub fn is_empty(&self) -> bool {
        matches!(self, Patch::Empty)
    }

    /// Sequential composition. `Empty` is absorbed on either side.
    pub fn and_then(self, next: Patch) -> Patch {
        match (self, next) {
            (Patch::Empty, next) => next,
            (first, Patch::Empty) => first,
            (first, second) => Patch::AndThen {
                first: Box::new(first),
                second: Box::new(second),
            },
        }
    }

    /// Left fold of `and_then` over `patches`.
    pub fn sequence(patches: impl IntoIterator<Item = Patch>) -> Patch {
        patches.into_iter().fold(Patch::Empty, Patch::and_then)
    }

    /// The non-empty top-level steps, in application order.
    pub fn steps(&self) -> Vec<&Patch> {
        let mut out = Vec::new();
        let mut pending = vec![self];
        while let Some(patch) = pending.pop() {
            match patch {
                Patch::Empty => {}
                Patch::AndThen { first, second } => {
                    pending.push(&**second);
                    pending.push(&**first);
                }
                other => out.push(other),
            }
        }
        out
    }

    /// Owned form of [`Patch::steps`].
    pub fn into_steps(mut self) -> Vec<Patch> {
        let mut out = Vec::new();
        let mut pending = vec![mem::take(&mut self)];
        while let Some(mut patch) = pending.pop() {
            if let Patch::AndThen { first, second } = &mut patch {
                pending.push(mem::take(&mut **second));
                pending.push(mem::take(&mut **first));
                continue;
            }
            if !patch.is_empty() {
                out.push(patch);
            }
        }
        out
    }

    /// Height of the patch tree. A leaf has depth 1.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 1)];
        while let Some((patch, level)) = pending.pop() {
            deepest = deepest.max(level);
            match patch {
                Patch::AndThen { first, second } => {
                    pending.push((&**first, level + 1));
                    pending.push((&**second, level + 1));
                }
                Patch::StructAdd { patch, .. }
                | Patch::StructUpdate { patch, .. }
                | Patch::ArrayUpdate { patch, .. } => pending.push((&**patch, level + 1)),
                Patch::Empty
                | Patch::StructRemove { .. }
                | Patch::ArrayAppend { .. }
                | Patch::ArraySlice { .. }
                | Patch::Replace { .. } => {}
            }
        }
        deepest
    }

    /// Count every variant in the tree.
    pub fn stats(&self) -> PatchStats {
        let mut stats = PatchStats::default();
        stats.record(self);
        stats
    }

    /// Move the direct children of `self` into `out`, leaving `Empty` behind.
    fn detach_children(&mut self, out: &mut Vec<Patch>) {
        match self {
            Patch::AndThen { first, second } => {
                out.push(mem::take(&mut **first));
                out.push(mem::take(&mut **second));
            }
            Patch::StructAdd { patch, .. }
            | Patch::StructUpdate { patch, .. }
            | Patch::ArrayUpdate { patch, .. } => out.push(mem::take(&mut **patch)),
            Patch::Empty
            | Patch::StructRemove { .. }
            | Patch::ArrayAppend { .. }
            | Patch::ArraySlice { .. }
            | Patch::Replace { .. } => {}
        }
    }
}

impl Drop for Patch {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.detach_children(&mut pending);
        while let Some(mut patch) = pending.pop() {
            patch.detach_children(&mut pending);
        }
    }
}

impl Clone for Patch {
    fn clone(&self) -> Self {
        enum Frame<'a> {
            Visit(&'a Patch),
            Build(&'a Patch),
        }

        let mut work = vec![Frame::Visit(self)];
        let mut built: Vec<Patch> = Vec::new();
        while let Some(frame) = work.pop() {
            match frame {
                Frame::Visit(patch) => match patch {
                    Patch::AndThen { first, second } => {
                        work.push(Frame::Build(patch));
                        work.push(Frame::Visit(&**second));
                        work.push(Frame::Visit(&**first));
                    }
                    Patch::StructAdd { patch: inner, .. }
                    | Patch::StructUpdate { patch: inner, .. }
                    | Patch::ArrayUpdate { patch: inner, .. } => {
                        work.push(Frame::Build(patch));
                        work.push(Frame::Visit(&**inner));
                    }
                    Patch::Empty => built.push(Patch::Empty),
                    Patch::StructRemove { path } => built.push(Patch::StructRemove { path: path.clone() }),
                    Patch::ArrayAppend { values } => built.push(Patch::ArrayAppend {
                        values: values.clone(),
                    }),
                    Patch::ArraySlice { from, until } => built.push(Patch::ArraySlice {
                        from: *from,
                        until: *until,
                    }),
                    Patch::Replace { value } => built.push(Patch::Replace { value: value.clone() }),
                },
                Frame::Build(patch) => {
                    let inner = Box::new(built.pop().unwrap_or_default());
                    let rebuilt = match patch {
                        Patch::AndThen { .. } => {
                            let first = Box::new(built.pop().unwrap_or_default());
                            Patch::AndThen { first, second: inner }
                        }
                        Patch::StructAdd { path, .. } => Patch::StructAdd {
                            path: path.clone(),
                            patch: inner,
                        },
                        Patch::StructUpdate { path, .. } => Patch::StructUpdate {
                            path: path.clone(),
                            patch: inner,
                        },
                        Patch::ArrayUpdate { index, .. } => Patch::ArrayUpdate {
                            index: *index,
                            patch: inner,
                        },
                        _ => Patch::Empty,
                    };
                    built.push(rebuilt);
                }
            }
        }
        built.pop().unwrap_or_default()
    }
}

impl PartialEq for Patch {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(self, other)];
        while let Some(pair) = pending.pop() {
            let same = match pair {
                (Patch::Empty, Patch::Empty) => true,
                (
                    Patch::AndThen { first: a1, second: a2 },
                    Patch::AndThen { first: b1, second: b2 },
                ) => {
                    pending.push((&**a2, &**b2));
                    pending.push((&**a1, &**b1));
                    true
                }
                (Patch::StructAdd { path: p, patch: a }, Patch::StructAdd { path: q, patch: b })
                | (Patch::StructUpdate { path: p, patch: a }, Patch::StructUpdate { path: q, patch: b }) => {
                    pending.push((&**a, &**b));
                    p == q
                }
                (Patch::StructRemove { path: p }, Patch::StructRemove { path: q }) => p == q,
                (Patch::ArrayAppend { values: a }, Patch::ArrayAppend { values: b }) => a == b,
                (Patch::ArraySlice { from: a, until: b }, Patch::ArraySlice { from: c, until: d }) => a == c && b == d,
                (Patch::ArrayUpdate { index: i, patch: a }, Patch::ArrayUpdate { index: j, patch: b }) => {
                    pending.push((&**a, &**b));
                    i == j
                }
                (Patch::Replace { value: a }, Patch::Replace { value: b }) => a == b,
                _ => false,
            };
            if !same {
                return false;
            }
        }
        true
    }
}

impl Serialize for Patch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Patch::Empty => {
                let mut s = serializer.serialize_struct("Patch", 1)?;
                s.serialize_field("_tag", "Empty")?;
                s.end()
            }
            Patch::AndThen { .. } => match self.steps().as_slice() {
                [] => Patch::Empty.serialize(serializer),
                [step] => step.serialize(serializer),
                steps => {
                    let mut s = serializer.serialize_struct("Patch", 2)?;
                    s.serialize_field("_tag", "AndThen")?;
                    s.serialize_field("steps", steps)?;
                    s.end()
                }
            },
            Patch::StructAdd { path, patch } => {
                let mut s = serializer.serialize_struct("Patch", 3)?;
                s.serialize_field("_tag", "StructAdd")?;
                s.serialize_field("path", path)?;
                s.serialize_field("patch", patch)?;
                s.end()
            }
            Patch::StructRemove { path } => {
                let mut s = serializer.serialize_struct("Patch", 2)?;
                s.serialize_field("_tag", "StructRemove")?;
                s.serialize_field("path", path)?;
                s.end()
            }
            Patch::StructUpdate { path, patch } => {
                let mut s = serializer.serialize_struct("Patch", 3)?;
                s.serialize_field("_tag", "StructUpdate")?;
                s.serialize_field("path", path)?;
                s.serialize_field("patch", patch)?;
                s.end()
            }
            Patch::ArrayAppend { values } => {
                let mut s = serializer.serialize_struct("Patch", 2)?;
                s.serialize_field("_tag", "ArrayAppend")?;
                s.serialize_field("values", values)?;
                s.end()
            }
            Patch::ArraySlice { from, until } => {
                let mut s = serializer.serialize_struct("Patch", 3)?;
                s.serialize_field("_tag", "ArraySlice")?;
                s.serialize_field("from", from)?;
                s.serialize_field("until", until)?;
                s.end()
            }
            Patch::ArrayUpdate { index, patch } => {
                let mut s = serializer.serialize_struct("Patch", 3)?;
                s.serialize_field("_tag", "ArrayUpdate")?;
                s.serialize_field("index", index)?;
                s.serialize_field("patch", patch)?;
                s.end()
            }
            Patch::Replace { value } => {
                let mut s = serializer.serialize_struct("Patch", 2)?;
                s.serialize_field("_tag", "Replace")?;
                s.serialize_field("value", value)?;
                s.end()
            }
        }
    }
}

/// Decoding shape of a patch document.
#[derive(Deserialize)]
#[serde(tag = "_tag")]
enum Wire {
    Empty,
    AndThen { steps: Vec<Patch> },
    StructAdd { path: KeyPath, patch: Box<Patch> },
    StructRemove { path: KeyPath },
    StructUpdate { path: KeyPath, patch: Box<Patch> },
    ArrayAppend { values: Vec<Value> },
    ArraySlice { from: usize, until: usize },
    ArrayUpdate { index: usize, patch: Box<Patch> },
    Replace { value: Value },
}

impl From<Wire> for Patch {
    fn from(wire: Wire) -> Self {
        match wire {
            Wire::Empty => Patch::Empty,
            Wire::AndThen { steps } => Patch::sequence(steps),
            Wire::StructAdd { path, patch } => Patch::StructAdd { path, patch },
            Wire::StructRemove { path } => Patch::StructRemove { path },
            Wire::StructUpdate { path, patch } => Patch::StructUpdate { path, patch },
            Wire::ArrayAppend { values } => Patch::ArrayAppend { values },
            Wire::ArraySlice { from, until } => Patch::ArraySlice { from, until },
            Wire::ArrayUpdate { index, patch } => Patch::ArrayUpdate { index, patch },
            Wire::Replace { value } => Patch::Replace { value },
        }
    }
}

impl<'de> Deserialize<'de> for Patch {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Wire::deserialize(deserializer).map(Patch::from)
    }
}

/// Per-variant counts over a patch tree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchStats {
    pub struct_adds: usize,
    pub struct_removes: usize,
    pub struct_updates: usize,
    pub array_appends: usize,
    pub array_slices: usize,
    pub array_updates: usize,
    pub replaces: usize,
    /// Elements carried by `ArrayAppend` steps.
    pub appended_values: usize,
}

impl PatchStats {
    fn record(&mut self, patch: &Patch) {
        let mut pending = vec![patch];
        while let Some(patch) = pending.pop() {
            match patch {
                Patch::Empty => {}
                Patch::AndThen { first, second } => {
                    pending.push(&**second);
                    pending.push(&**first);
                }
                Patch::StructAdd { patch, .. } => {
                    self.struct_adds += 1;
                    pending.push(&**patch);
                }
                Patch::StructRemove { .. } => self.struct_removes += 1,
                Patch::StructUpdate { patch, .. } => {
                    self.struct_updates += 1;
                    pending.push(&**patch);
                }
                Patch::ArrayAppend { values } => {
                    self.array_appends += 1;
                    self.appended_values += values.len();
                }
                Patch::ArraySlice { .. } => self.array_slices += 1,
                Patch::ArrayUpdate { patch, .. } => {
                    self.array_updates += 1;
                    pending.push(&**patch);
                }
                Patch::Replace { .. } => self.replaces += 1,
            }
        }
    }

    /// Number of leaf-level value changes (replacements, appends, slices,
    /// field insertions and removals).
    pub fn changes(&self) -> usize {
        self.replaces + self.array_appends + self.array_slices + self.struct_adds + self.struct_removes
    }
}

impl fmt::Display for Patch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Patch::Empty => f.write_str("Empty"),
            Patch::AndThen { .. } => match self.steps().as_slice() {
                [] => f.write_str("Empty"),
                [step] => write!(f, "{step}"),
                steps => {
                    f.write_str("AndThen(")?;
                    for (i, step) in steps.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{step}")?;
                    }
                    f.write_str(")")
                }
            },
            Patch::StructAdd { path, patch } => write!(f, "StructAdd({path}, {patch})"),
            Patch::StructRemove { path } => write!(f, "StructRemove({path})"),
            Patch::StructUpdate { path, patch } => write!(f, "StructUpdate({path}, {patch})"),
            Patch::ArrayAppend { values } => {
                f.write_str("ArrayAppend([")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str("])")
            }
            Patch::ArraySlice { from, until } => write!(f, "ArraySlice({from}, {until})"),
            Patch::ArrayUpdate { index, patch } => write!(f, "ArrayUpdate({index}, {patch})"),
            Patch::Replace { value } => write!(f, "Replace({value})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn empty_is_identity_for_and_then() {
        let p = Patch::replace(1);
        assert_eq!(Patch::Empty.and_then(p.clone()), p);
        assert_eq!(p.clone().and_then(Patch::Empty), p);
        assert_eq!(Patch::Empty.and_then(Patch::Empty), Patch::Empty);
    }

    #[test]
    fn sequence_is_left_leaning() {
        let p = Patch::sequence([
            Patch::struct_update("a", Patch::replace(1)),
            Patch::Empty,
            Patch::struct_update("b", Patch::replace(2)),
            Patch::struct_update("c", Patch::replace(3)),
        ]);
        match &p {
            Patch::AndThen { first, second } => {
                assert!(matches!(**first, Patch::AndThen { .. }));
                assert_eq!(**second, Patch::struct_update("c", Patch::replace(3)));
            }
            other => panic!("expected AndThen, got {other:?}"),
        }
        assert_eq!(p.steps().len(), 3);
    }

    #[test]
    fn wire_format() {
        let p = Patch::array_update(0, Patch::replace(9)).and_then(Patch::array_slice(0, 2));
        assert_eq!(
            serde_json::to_value(&p).unwrap(),
            json!({
                "_tag": "AndThen",
                "steps": [
                    {
                        "_tag": "ArrayUpdate",
                        "index": 0,
                        "patch": { "_tag": "Replace", "value": 9 }
                    },
                    { "_tag": "ArraySlice", "from": 0, "until": 2 }
                ]
            })
        );
    }

    #[test]
    fn nested_chains_encode_flat() {
        let right = Patch::AndThen {
            first: Box::new(Patch::struct_remove("a")),
            second: Box::new(Patch::struct_remove("b").and_then(Patch::struct_remove("c"))),
        };
        let encoded = serde_json::to_value(&right).unwrap();
        assert_eq!(encoded["steps"].as_array().map(Vec::len), Some(3));

        let back: Patch = serde_json::from_value(encoded).unwrap();
        let left = Patch::sequence([
            Patch::struct_remove("a"),
            Patch::struct_remove("b"),
            Patch::struct_remove("c"),
        ]);
        assert_eq!(back, left);
    }

    #[test]
    fn degenerate_chains_encode_as_their_step() {
        let lone = Patch::AndThen {
            first: Box::new(Patch::Empty),
            second: Box::new(Patch::replace(1)),
        };
        assert_eq!(serde_json::to_value(&lone).unwrap(), json!({"_tag": "Replace", "value": 1}));
        let hollow = Patch::AndThen {
            first: Box::new(Patch::Empty),
            second: Box::new(Patch::Empty),
        };
        assert_eq!(serde_json::to_value(&hollow).unwrap(), json!({"_tag": "Empty"}));
        let decoded: Patch = serde_json::from_value(json!({"_tag": "AndThen", "steps": []})).unwrap();
        assert_eq!(decoded, Patch::Empty);
    }

    fn long_chain(len: usize) -> Patch {
        Patch::sequence((0..len).map(|i| Patch::array_update(i, Patch::replace(i as u64))))
    }

    #[test]
    fn ten_thousand_steps_survive_json() {
        let p = long_chain(10_000);
        let text = p.to_json().unwrap();
        let back = Patch::from_json(&text).unwrap();
        assert_eq!(back.steps().len(), 10_000);
        assert_eq!(back, p);
    }

    #[test]
    fn long_chains_walk_without_recursion() {
        let p = long_chain(100_000);
        assert_eq!(p.steps().len(), 100_000);
        assert_eq!(p.depth(), 100_001);
        assert_eq!(p.stats().array_updates, 100_000);
        let copy = p.clone();
        assert_eq!(copy, p);
        assert!(copy.to_string().starts_with("AndThen(ArrayUpdate(0, Replace(0)), "));
        assert_eq!(copy.into_steps().len(), 100_000);
        drop(p);
    }

    #[test]
    fn decode_struct_update_with_integer_key() {
        let p: Patch = serde_json::from_value(json!({
            "_tag": "StructUpdate",
            "path": [7],
            "patch": { "_tag": "Empty" }
        }))
        .unwrap();
        assert_eq!(p, Patch::struct_update(7u64, Patch::Empty));
    }

    #[test]
    fn from_json_reports_bad_documents() {
        assert!(matches!(
            Patch::from_json(r#"{"_tag": "Nope"}"#),
            Err(TypeError::Serialization(_))
        ));
        let p = Patch::struct_remove("nick");
        assert_eq!(Patch::from_json(&p.to_json().unwrap()).unwrap(), p);
    }

    #[test]
    fn decode_rejects_empty_path() {
        let result = serde_json::from_value::<Patch>(json!({
            "_tag": "StructRemove",
            "path": []
        }));
        assert!(result.is_err());
    }

    #[test]
    fn stats_count_nested_variants() {
        let p = Patch::sequence([
            Patch::struct_update("age", Patch::replace(1)),
            Patch::struct_update(
                "aliases",
                Patch::array_update(0, Patch::replace("x")).and_then(Patch::array_append([json!("y"), json!("z")])),
            ),
            Patch::struct_remove("nick"),
        ]);
        let stats = p.stats();
        assert_eq!(stats.struct_updates, 2);
        assert_eq!(stats.array_updates, 1);
        assert_eq!(stats.replaces, 2);
        assert_eq!(stats.appended_values, 2);
        assert_eq!(stats.struct_removes, 1);
        assert_eq!(stats.changes(), 4);
    }

    #[test]
    fn depth_of_nested_update() {
        let p = Patch::struct_update("a", Patch::array_update(1, Patch::replace(true)));
        assert_eq!(p.depth(), 3);
        assert_eq!(Patch::Empty.depth(), 1);
        let chain = Patch::replace(1).and_then(Patch::struct_update("a", Patch::replace(2)));
        assert_eq!(chain.depth(), 3);
    }

    #[test]
    fn display_is_compact() {
        let p = Patch::struct_update("name", Patch::replace("bar")).and_then(Patch::array_append([json!(4)]));
        assert_eq!(p.to_string(), r#"AndThen(StructUpdate(name, Replace("bar")), ArrayAppend([4]))"#);
    }

    fn leaf() -> impl Strategy<Value = Patch> {
        prop_oneof![
            Just(Patch::Empty),
            any::<i64>().prop_map(Patch::replace),
            (0usize..8, 0usize..8).prop_map(|(a, b)| Patch::array_slice(a, b)),
            "[a-z]{1,4}".prop_map(Patch::struct_remove),
        ]
    }

    fn patch() -> impl Strategy<Value = Patch> {
        leaf().prop_recursive(4, 32, 2, |inner| {
            prop_oneof![
                (inner.clone(), inner.clone()).prop_map(|(a, b)| Patch::AndThen {
                    first: Box::new(a),
                    second: Box::new(b),
                }),
                (inner.clone(), inner.clone()).prop_map(|(a, b)| a.and_then(b)),
                ("[a-z]{1,4}", inner.clone()).prop_map(|(k, p)| Patch::struct_update(k, p)),
                (0usize..4, inner).prop_map(|(i, p)| Patch::array_update(i, p)),
            ]
        })
    }

    proptest! {
        #[test]
        fn json_encoding_is_stable(p in patch()) {
            let text = serde_json::to_string(&p).unwrap();
            let back: Patch = serde_json::from_str(&text).unwrap();
            prop_assert_eq!(back.steps().len(), p.steps().len());
            prop_assert_eq!(back.stats(), p.stats());
            prop_assert_eq!(serde_json::to_string(&back).unwrap(), text);
        }

        #[test]
        fn decoded_patches_decode_identically(ps in prop::collection::vec(patch(), 0..8)) {
            let p = Patch::from_json(&Patch::sequence(ps).to_json().unwrap()).unwrap();
            let back = Patch::from_json(&p.to_json().unwrap()).unwrap();
            prop_assert_eq!(back, p);
        }

        #[test]
        fn clone_is_structural(p in patch()) {
            let copy = p.clone();
            prop_assert_eq!(copy.to_string(), p.to_string());
            prop_assert_eq!(copy, p);
        }
    }
}
