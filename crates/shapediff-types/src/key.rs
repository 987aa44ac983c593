use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// A single path element addressing one struct level.
///
/// Keys travel as plain JSON strings or non-negative integers.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Key {
    Index(u64),
    Name(String),
}

impl Key {
    /// The key as a struct field name. Integer keys address fields whose
    /// name is their decimal form.
    pub fn as_field_name(&self) -> Cow<'_, str> {
        match self {
            Key::Name(name) => Cow::Borrowed(name),
            Key::Index(index) => Cow::Owned(index.to_string()),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Name(name) => f.write_str(name),
            Key::Index(index) => write!(f, "{index}"),
        }
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::Name(name.to_string())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::Name(name)
    }
}

impl From<u64> for Key {
    fn from(index: u64) -> Self {
        Key::Index(index)
    }
}

/// A non-empty sequence of keys.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Key>", into = "Vec<Key>")]
pub struct KeyPath(Vec<Key>);

impl KeyPath {
    /// A path of exactly one key.
    pub fn single(key: impl Into<Key>) -> Self {
        Self(vec![key.into()])
    }

    /// Build a path from a head key and any number of following keys.
    pub fn new(head: impl Into<Key>, tail: impl IntoIterator<Item = Key>) -> Self {
        let mut keys = vec![head.into()];
        keys.extend(tail);
        Self(keys)
    }

    /// The key addressing the outermost struct level.
    pub fn first(&self) -> &Key {
        &self.0[0]
    }

    /// Keys below the first level.
    pub fn rest(&self) -> &[Key] {
        &self.0[1..]
    }

    pub fn keys(&self) -> &[Key] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; present for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl TryFrom<Vec<Key>> for KeyPath {
    type Error = TypeError;

    fn try_from(keys: Vec<Key>) -> Result<Self, Self::Error> {
        if keys.is_empty() {
            return Err(TypeError::EmptyPath);
        }
        Ok(Self(keys))
    }
}

impl From<KeyPath> for Vec<Key> {
    fn from(path: KeyPath) -> Self {
        path.0
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, key) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{key}")?;
        }
        Ok(())
    }
}
