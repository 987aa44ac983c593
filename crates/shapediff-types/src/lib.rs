//! Foundation types for shapediff.
//!
//! A [`Patch`] is the serializable description of how one value of a schema
//! becomes another. It is a closed tagged tree: every consumer (the differ,
//! the composer and the applier) matches it exhaustively.
//!
//! # Key Types
//!
//! - [`Patch`] -- The transformation tree
//! - [`Key`] / [`KeyPath`] -- String-or-integer field keys and non-empty paths
//! - [`PatchStats`] -- Per-variant counts over a patch tree
//! - [`TypeError`] -- Errors raised while building or decoding these types

pub mod error;
pub mod key;
pub mod patch;

pub use error::TypeError;
pub use key::{Key, KeyPath};
pub use patch::{Patch, PatchStats};
