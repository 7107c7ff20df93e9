//! The mapping contract shared by settings containers.

use serde::de::DeserializeOwned;
use serde_yaml::{mapping, Mapping, Value};

use super::store::SettingsError;

/// A mutable, insertion-ordered mapping from string keys to settings values.
///
/// Implementors only provide access to the underlying [`Mapping`] plus the two
/// mutating operations; lookups, iteration and length are derived from the
/// mapping.  [`SettingsStore`](super::SettingsStore) persists on every
/// mutation, [`MemorySettings`] keeps everything in memory.
pub trait SettingsMap {
    /// Error returned by mutating operations.
    type Error;

    /// The current top-level mapping.
    fn mapping(&self) -> &Mapping;

    /// Sets a top-level key.
    fn set(&mut self, key: &str, value: Value) -> Result<(), Self::Error>;

    /// Removes a top-level key and returns its value.
    ///
    /// Fails when the key is absent.
    fn delete(&mut self, key: &str) -> Result<Value, Self::Error>;

    /// Looks up a top-level key.  Absent keys yield `None`.
    fn get(&self, key: &str) -> Option<&Value> {
        self.mapping().get(key)
    }

    /// Looks up a top-level key and deserializes it into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Type`] when the value is present but does not
    /// have the shape of `T`.
    fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, SettingsError> {
        self.get(key)
            .map(|value| {
                serde_yaml::from_value(value.clone()).map_err(|source| SettingsError::Type {
                    key: key.to_owned(),
                    source,
                })
            })
            .transpose()
    }

    fn contains_key(&self, key: &str) -> bool {
        self.mapping().contains_key(key)
    }

    fn len(&self) -> usize {
        self.mapping().len()
    }

    fn is_empty(&self) -> bool {
        self.mapping().is_empty()
    }

    /// Iterates over top-level entries in insertion order.
    fn iter(&self) -> mapping::Iter<'_> {
        self.mapping().iter()
    }

    /// Iterates over the top-level keys that are strings, in insertion order.
    fn keys(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        Box::new(self.mapping().keys().filter_map(Value::as_str))
    }
}

/// Settings held only in memory.
///
/// Useful for callers that want the settings contract without a backing
/// file, and for tests of code generic over [`SettingsMap`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemorySettings {
    store: Mapping,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }
}

impl From<Mapping> for MemorySettings {
    fn from(store: Mapping) -> Self {
        Self { store }
    }
}

impl SettingsMap for MemorySettings {
    type Error = SettingsError;

    fn mapping(&self) -> &Mapping {
        &self.store
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), SettingsError> {
        self.store.insert(Value::String(key.to_owned()), value);
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<Value, SettingsError> {
        self.store
            .shift_remove(key)
            .ok_or_else(|| SettingsError::KeyNotFound(key.to_owned()))
    }
}
