//! Error types for schema resolution.

use thiserror::Error;

/// Errors produced while resolving schema nodes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A recursive node names a definition the schema does not contain.
    #[error("undefined reference: {0}")]
    UndefinedReference(String),

    /// A chain of recursive links never reaches a concrete node.
    #[error("circular reference through {0}")]
    CircularReference(String),

    /// A schema document could not be parsed.
    #[error("invalid schema document: {0}")]
    Invalid(String),
}

/// Convenience alias for schema results.
pub type SchemaResult<T> = Result<T, SchemaError>;
