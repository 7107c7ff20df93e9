//! Addressing values inside a settings tree.

use std::fmt;

/// Location of a value inside a settings mapping.
///
/// A [`KeyPath::Key`] names a top-level entry.  A [`KeyPath::Nested`] walks
/// through nested mappings: every key but the last must name a mapping, and
/// the last key is the entry to assign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyPath {
    /// A single top-level key.
    Key(String),
    /// An ordered sequence of keys, outermost first.
    Nested(Vec<String>),
}

impl KeyPath {
    /// Returns the keys of this path, outermost first.
    pub fn segments(&self) -> &[String] {
        match self {
            KeyPath::Key(key) => std::slice::from_ref(key),
            KeyPath::Nested(keys) => keys,
        }
    }
}

impl From<&str> for KeyPath {
    fn from(key: &str) -> Self {
        KeyPath::Key(key.to_owned())
    }
}

impl From<String> for KeyPath {
    fn from(key: String) -> Self {
        KeyPath::Key(key)
    }
}

impl From<Vec<String>> for KeyPath {
    fn from(keys: Vec<String>) -> Self {
        KeyPath::Nested(keys)
    }
}

impl From<Vec<&str>> for KeyPath {
    fn from(keys: Vec<&str>) -> Self {
        KeyPath::Nested(keys.into_iter().map(str::to_owned).collect())
    }
}

impl From<&[&str]> for KeyPath {
    fn from(keys: &[&str]) -> Self {
        KeyPath::Nested(keys.iter().map(|k| (*k).to_owned()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for KeyPath {
    fn from(keys: [&str; N]) -> Self {
        KeyPath::Nested(keys.iter().map(|k| (*k).to_owned()).collect())
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPath::Key(key) => write!(f, "{key}"),
            KeyPath::Nested(keys) => write!(f, "({})", keys.join(", ")),
        }
    }
}
