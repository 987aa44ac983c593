//! Error types for the diff crate.

use shapediff_schema::{NodeKind, SchemaError};

/// Errors that can occur while diffing or applying patches.
///
/// Every variant is fatal for the call that raised it: no partial patch or
/// partially-updated value is ever returned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DiffError {
    /// The schema node has no diff rule.
    #[error("unsupported schema kind: {0}")]
    UnsupportedSchemaKind(NodeKind),

    /// A value's runtime shape does not match what the node describes.
    #[error("type mismatch under {kind} node: expected {expected}, found {found}")]
    TypeMismatch {
        kind: NodeKind,
        expected: String,
        found: String,
    },

    /// A recursive link could not be resolved.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// A required field (or a field addressed by a patch) is missing from the value.
    #[error("field not found: {0}")]
    FieldNotFound(String),

    /// A patch addresses a field the struct node does not declare.
    #[error("field not declared by schema: {0}")]
    UnknownField(String),

    /// `StructAdd` targeted a field that is already present.
    #[error("field already present: {0}")]
    FieldAlreadyPresent(String),

    /// `StructRemove` targeted a field that is not optional.
    #[error("cannot remove required field: {0}")]
    RequiredField(String),

    #[error("index {index} out of bounds for sequence of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("invalid slice [{from}, {until}) for sequence of length {len}")]
    InvalidSlice { from: usize, until: usize, len: usize },

    /// The value nests deeper than the configured limit.
    #[error("value nesting exceeds depth limit of {0}")]
    DepthLimitExceeded(usize),

    /// Round-trip verification was requested and the patch did not
    /// reproduce the new value.
    #[error("patch does not reproduce the new value")]
    RoundTripMismatch,
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
