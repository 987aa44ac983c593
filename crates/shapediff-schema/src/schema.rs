//! Schema documents: a root node plus the named definitions that
//! [`Node::Recursive`] links point at.
//!
//! Definitions form an arena addressed by name. A recursive link is resolved
//! only when traversal reaches it, so a self-referential schema never has to
//! be expanded; the depth of any walk is bounded by the value being walked.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{SchemaError, SchemaResult};
use crate::node::Node;

/// A root node together with its named definitions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub root: Node,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub definitions: BTreeMap<String, Node>,
}

impl Schema {
    /// A schema with no definitions.
    pub fn new(root: Node) -> Self {
        Self {
            root,
            definitions: BTreeMap::new(),
        }
    }

    /// Add (or replace) a named definition.
    pub fn define(mut self, name: impl Into<String>, node: Node) -> Self {
        self.definitions.insert(name.into(), node);
        self
    }

    /// Parse a schema document from JSON text.
    pub fn from_json(source: &str) -> SchemaResult<Self> {
        serde_json::from_str(source).map_err(|e| SchemaError::Invalid(e.to_string()))
    }

    /// Look up a named definition.
    pub fn definition(&self, name: &str) -> SchemaResult<&Node> {
        self.definitions
            .get(name)
            .ok_or_else(|| SchemaError::UndefinedReference(name.to_string()))
    }

    /// Follow recursive links until a non-recursive node is reached.
    ///
    /// A chain longer than the number of definitions must revisit one of
    /// them without ever producing a concrete node.
    pub fn resolve<'a>(&'a self, node: &'a Node) -> SchemaResult<&'a Node> {
        let mut current = node;
        let mut hops = 0usize;
        while let Node::Recursive { target } = current {
            if hops > self.definitions.len() {
                return Err(SchemaError::CircularReference(target.clone()));
            }
            current = self.definition(target)?;
            hops += 1;
        }
        Ok(current)
    }

    /// Check that every recursive link reachable from the root (or any
    /// definition) names an existing definition and that no definition is
    /// a pure cycle of links.
    pub fn validate(&self) -> SchemaResult<()> {
        let mut visited = BTreeSet::new();
        let mut pending: Vec<&Node> = vec![&self.root];
        pending.extend(self.definitions.values());

        while let Some(node) = pending.pop() {
            match node {
                Node::Recursive { target } => {
                    self.resolve(node)?;
                    if visited.insert(target.as_str()) {
                        pending.push(self.definition(target)?);
                    }
                }
                Node::Struct { fields } => pending.extend(fields.iter().map(|f| &f.node)),
                Node::Tuple { elements, rest } => {
                    pending.extend(elements.iter());
                    pending.extend(rest.iter());
                }
                Node::Refinement { inner, .. } => pending.push(&**inner),
                Node::Transform { from, to } => {
                    pending.push(&**from);
                    pending.push(&**to);
                }
                Node::Union { members } => pending.extend(members.iter()),
                Node::Primitive(_)
                | Node::Enums { .. }
                | Node::TemplateLiteral { .. }
                | Node::Declaration { .. }
                | Node::UniqueSymbol { .. }
                | Node::Unknown
                | Node::Any
                | Node::Never => {}
            }
        }
        Ok(())
    }
}
