//! Schema nodes: the structural contract the diff engine queries.
//!
//! A node only has to answer a handful of questions: what kind it is, which
//! fields a struct declares, which node describes a given tuple position, and
//! which node sits underneath a refinement or transform. Validation, branding
//! and encode/decode belong to whatever library produced the schema.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Leaf scalar category.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PrimitiveKind {
    String,
    Number,
    Integer,
    Boolean,
    Null,
    /// A single constant value.
    Literal { value: Value },
}

impl PrimitiveKind {
    /// Returns `true` if `value` has the runtime shape of this primitive.
    pub fn admits(&self, value: &Value) -> bool {
        match self {
            PrimitiveKind::String => value.is_string(),
            PrimitiveKind::Number => value.is_number(),
            PrimitiveKind::Integer => value.is_i64() || value.is_u64(),
            PrimitiveKind::Boolean => value.is_boolean(),
            PrimitiveKind::Null => value.is_null(),
            PrimitiveKind::Literal { value: literal } => literal == value,
        }
    }

    /// Short name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveKind::String => "string",
            PrimitiveKind::Number => "number",
            PrimitiveKind::Integer => "integer",
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Null => "null",
            PrimitiveKind::Literal { .. } => "literal",
        }
    }
}

/// A declared struct field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub node: Node,
    /// Optional fields may be absent from a value.
    #[serde(default)]
    pub optional: bool,
}

impl Field {
    /// A field that must be present in every value.
    pub fn required(name: impl Into<String>, node: Node) -> Self {
        Self {
            name: name.into(),
            node,
            optional: false,
        }
    }

    /// A field that may be absent.
    pub fn optional(name: impl Into<String>, node: Node) -> Self {
        Self {
            name: name.into(),
            node,
            optional: true,
        }
    }
}

/// A member of an enumeration node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnumMember {
    pub name: String,
    pub value: Value,
}

/// A node in the type-description tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    /// Leaf scalar.
    Primitive(PrimitiveKind),

    /// Fixed, declared field set. Declaration order is the traversal order.
    Struct { fields: Vec<Field> },

    /// Fixed-arity prefix plus an optional homogeneous suffix.
    ///
    /// `rest` holds at most one node; anything longer has no diff rule.
    Tuple {
        #[serde(default)]
        elements: Vec<Node>,
        #[serde(default)]
        rest: Vec<Node>,
    },

    /// A constraint layered over `inner` without changing its representation.
    Refinement {
        inner: Box<Node>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },

    /// An encode/decode boundary. Values are handled in the `from` form.
    Transform { from: Box<Node>, to: Box<Node> },

    /// A self-referential link, resolved by name against the schema's
    /// definitions when traversal reaches it.
    Recursive { target: String },

    Union { members: Vec<Node> },
    Enums { members: Vec<EnumMember> },
    TemplateLiteral { pattern: String },
    Declaration { name: String },
    UniqueSymbol { description: String },
    Unknown,
    Any,
    Never,
}

/// Classification of a [`Node`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Primitive,
    Struct,
    Tuple,
    Refinement,
    Transform,
    Recursive,
    Union,
    Enums,
    TemplateLiteral,
    Declaration,
    UniqueSymbol,
    Unknown,
    Any,
    Never,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Primitive => "primitive",
            NodeKind::Struct => "struct",
            NodeKind::Tuple => "tuple",
            NodeKind::Refinement => "refinement",
            NodeKind::Transform => "transform",
            NodeKind::Recursive => "recursive",
            NodeKind::Union => "union",
            NodeKind::Enums => "enums",
            NodeKind::TemplateLiteral => "template_literal",
            NodeKind::Declaration => "declaration",
            NodeKind::UniqueSymbol => "unique_symbol",
            NodeKind::Unknown => "unknown",
            NodeKind::Any => "any",
            NodeKind::Never => "never",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Node {
    pub fn string() -> Self {
        Node::Primitive(PrimitiveKind::String)
    }

    pub fn number() -> Self {
        Node::Primitive(PrimitiveKind::Number)
    }

    pub fn integer() -> Self {
        Node::Primitive(PrimitiveKind::Integer)
    }

    pub fn boolean() -> Self {
        Node::Primitive(PrimitiveKind::Boolean)
    }

    pub fn null() -> Self {
        Node::Primitive(PrimitiveKind::Null)
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        Node::Primitive(PrimitiveKind::Literal {
            value: value.into(),
        })
    }

    pub fn structure(fields: impl IntoIterator<Item = Field>) -> Self {
        Node::Struct {
            fields: fields.into_iter().collect(),
        }
    }

    /// A fixed-arity tuple.
    pub fn tuple(elements: impl IntoIterator<Item = Node>) -> Self {
        Node::Tuple {
            elements: elements.into_iter().collect(),
            rest: Vec::new(),
        }
    }

    /// A homogeneous variable-length array.
    pub fn array(item: Node) -> Self {
        Node::Tuple {
            elements: Vec::new(),
            rest: vec![item],
        }
    }

    /// A fixed prefix followed by a homogeneous suffix.
    pub fn tuple_with_rest(elements: impl IntoIterator<Item = Node>, rest: Node) -> Self {
        Node::Tuple {
            elements: elements.into_iter().collect(),
            rest: vec![rest],
        }
    }

    pub fn refine(inner: Node, description: impl Into<String>) -> Self {
        Node::Refinement {
            inner: Box::new(inner),
            description: Some(description.into()),
        }
    }

    pub fn transform(from: Node, to: Node) -> Self {
        Node::Transform {
            from: Box::new(from),
            to: Box::new(to),
        }
    }

    pub fn recursive(target: impl Into<String>) -> Self {
        Node::Recursive {
            target: target.into(),
        }
    }

    pub fn union(members: impl IntoIterator<Item = Node>) -> Self {
        Node::Union {
            members: members.into_iter().collect(),
        }
    }

    /// Classify this node.
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Primitive(_) => NodeKind::Primitive,
            Node::Struct { .. } => NodeKind::Struct,
            Node::Tuple { .. } => NodeKind::Tuple,
            Node::Refinement { .. } => NodeKind::Refinement,
            Node::Transform { .. } => NodeKind::Transform,
            Node::Recursive { .. } => NodeKind::Recursive,
            Node::Union { .. } => NodeKind::Union,
            Node::Enums { .. } => NodeKind::Enums,
            Node::TemplateLiteral { .. } => NodeKind::TemplateLiteral,
            Node::Declaration { .. } => NodeKind::Declaration,
            Node::UniqueSymbol { .. } => NodeKind::UniqueSymbol,
            Node::Unknown => NodeKind::Unknown,
            Node::Any => NodeKind::Any,
            Node::Never => NodeKind::Never,
        }
    }

    /// Declared fields, in declaration order, if this is a struct.
    pub fn fields(&self) -> Option<&[Field]> {
        match self {
            Node::Struct { fields } => Some(fields.as_slice()),
            _ => None,
        }
    }

    /// Look up a declared struct field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields()?.iter().find(|f| f.name == name)
    }

    /// The rest element of a tuple, if it has exactly one.
    pub fn rest_element(&self) -> Option<&Node> {
        match self {
            Node::Tuple { rest, .. } if rest.len() == 1 => rest.first(),
            _ => None,
        }
    }

    /// The node describing position `index` of a tuple: the fixed slot when
    /// `index` is inside the fixed arity, the rest element otherwise.
    pub fn element_at(&self, index: usize) -> Option<&Node> {
        match self {
            Node::Tuple { elements, .. } => elements
                .get(index)
                .or_else(|| self.rest_element()),
            _ => None,
        }
    }

    /// The node a refinement or transform delegates to.
    pub fn underlying(&self) -> Option<&Node> {
        match self {
            Node::Refinement { inner, .. } => Some(&**inner),
            Node::Transform { from, .. } => Some(&**from),
            _ => None,
        }
    }
}
