use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("key path must contain at least one key")]
    EmptyPath,

    #[error("serialization error: {0}")]
    Serialization(String),
}
