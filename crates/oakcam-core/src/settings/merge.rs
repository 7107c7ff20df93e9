//! Recursive merge of settings trees.
//!
//! Used by [`SettingsStore::update_defaults`](super::SettingsStore::update_defaults):
//! the new defaults are the target and the previously stored values are the
//! overrides, so anything the user already saved survives a defaults bump.

use serde_yaml::{Mapping, Value};

/// Merges `overrides` into `target`, key by key.
///
/// - A mapping in `overrides` is merged recursively into the mapping at the
///   same key in `target`.  If `target` has no mapping there, the override
///   mapping replaces whatever was present.
/// - Any other value in `overrides` replaces the value in `target`.
/// - Keys only present in `target` are left untouched.  Keys only present in
///   `overrides` are appended after the existing ones.
pub fn merge_mapping(target: &mut Mapping, overrides: Mapping) {
    for (key, value) in overrides {
        match value {
            Value::Mapping(nested) => match target.get_mut(&key) {
                Some(Value::Mapping(existing)) => merge_mapping(existing, nested),
                _ => {
                    target.insert(key, Value::Mapping(nested));
                }
            },
            other => {
                target.insert(key, other);
            }
        }
    }
}
