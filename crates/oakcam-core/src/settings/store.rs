//! YAML-file-backed settings store.
//!
//! [`SettingsStore`] keeps a fully materialized copy of its file in memory
//! and rewrites the whole file after every mutation.  There is no write
//! buffering and no file handle is held between calls.
//!
//! # Failure policy
//!
//! The store is used from long-running capture tools, so a missing or broken
//! settings file must never take them down:
//!
//! - Missing file: the parent directory and an empty file are created and the
//!   store starts empty.
//! - Empty or unparseable content: the store starts empty.
//! - Invalid nested path in [`SettingsStore::update_value`]: nothing changes,
//!   the failure is logged and reported through [`UpdateOutcome`].
//!
//! Only deleting an absent key, reading a value as the wrong type and genuine
//! I/O failures (permissions, full disk) surface as [`SettingsError`].

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::key_path::KeyPath;
use super::map::SettingsMap;
use super::merge::merge_mapping;

/// Error type for settings store operations.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing settings at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The mapping could not be serialized to YAML.
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] serde_yaml::Error),

    /// `delete` was called for a key that is not present.
    #[error("settings key not found: {0}")]
    KeyNotFound(String),

    /// A value is present but does not have the requested shape.
    #[error("settings key `{key}` has an unexpected type: {source}")]
    Type {
        key: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Why a nested path could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("empty key path")]
    Empty,

    #[error("missing key `{0}`")]
    MissingKey(String),

    #[error("value at `{0}` is not a mapping")]
    NotAMapping(String),
}

/// Result of [`SettingsStore::update_value`].
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The value was assigned and the store persisted.
    Updated,
    /// The path did not resolve; the store is unchanged.
    InvalidPath { path: KeyPath, reason: PathError },
}

impl UpdateOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, UpdateOutcome::Updated)
    }
}

/// Dictionary-like access to a persistent YAML settings file.
///
/// The mapping operations come from [`SettingsMap`]; bring the trait into
/// scope to call `get`, `set`, `delete`, `iter` and `len`.
///
/// # Example
///
/// ```no_run
/// use oakcam_core::{SettingsMap, SettingsStore};
///
/// let mut grey = SettingsStore::open("settings/grey.yaml")?;
/// grey.set("exp", 20000.into())?;
/// let outcome = grey.update_value(["crop", "x"], 0.5.into())?;
/// if !outcome.is_updated() {
///     // the `crop` section does not exist yet
/// }
/// # Ok::<(), oakcam_core::SettingsError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
    store: Mapping,
}

impl SettingsStore {
    /// Opens the store at `path`, loading the file or creating an empty one.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Io`] when the directory or file cannot be
    /// created or read for a reason other than "not found".
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
        let mut settings = Self {
            path: path.into(),
            store: Mapping::new(),
        };
        settings.load()?;
        Ok(settings)
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the in-memory mapping with the content of the backing file.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Io`] for file system failures other than a
    /// missing file.
    pub fn load(&mut self) -> Result<(), SettingsError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| SettingsError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        match fs::read_to_string(&self.path) {
            Ok(content) => {
                self.store = parse_mapping(&content, &self.path);
                debug!(
                    "loaded {} settings from {}",
                    self.store.len(),
                    self.path.display()
                );
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                error!(
                    "can't read {}, trying to create new...",
                    self.path.display()
                );
                fs::write(&self.path, "").map_err(|source| SettingsError::Io {
                    path: self.path.clone(),
                    source,
                })?;
                info!("created {}", self.path.display());
                self.store = Mapping::new();
            }
            Err(source) => {
                return Err(SettingsError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        }
        Ok(())
    }

    /// Writes the full mapping to the backing file.
    ///
    /// Output is block-style YAML in insertion order, so saving an unchanged
    /// store twice produces identical bytes.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Serialize`] or [`SettingsError::Io`].
    pub fn save(&self) -> Result<(), SettingsError> {
        let content = serde_yaml::to_string(&self.store)?;
        fs::write(&self.path, content).map_err(|source| SettingsError::Io {
            path: self.path.clone(),
            source,
        })
    }

    /// Assigns `value` at `path` and persists.
    ///
    /// A [`KeyPath::Key`] always succeeds.  For a [`KeyPath::Nested`] path,
    /// every key but the last must name an existing mapping; otherwise the
    /// store is left untouched, an error is logged and
    /// [`UpdateOutcome::InvalidPath`] is returned.
    ///
    /// # Errors
    ///
    /// Only persistence failures are returned as errors.
    pub fn update_value(
        &mut self,
        path: impl Into<KeyPath>,
        value: Value,
    ) -> Result<UpdateOutcome, SettingsError> {
        let path = path.into();
        let segments = path.segments().to_vec();
        let Some((last, parents)) = segments.split_last() else {
            return Ok(self.reject(path, PathError::Empty));
        };

        let assigned = resolve_parent(&mut self.store, parents).map(|parent| {
            parent.insert(Value::String(last.clone()), value);
        });
        if let Err(reason) = assigned {
            return Ok(self.reject(path, reason));
        }

        self.save()?;
        Ok(UpdateOutcome::Updated)
    }

    /// Makes `defaults` the baseline and re-applies the stored values on top.
    ///
    /// Stored values win at every depth, nested mappings are merged key by
    /// key, keys only present in `defaults` are added and keys only present in
    /// the store are kept.
    ///
    /// # Errors
    ///
    /// Returns persistence failures from [`SettingsStore::save`].
    pub fn update_defaults(&mut self, defaults: Mapping) -> Result<(), SettingsError> {
        let previous = std::mem::replace(&mut self.store, defaults);
        merge_mapping(&mut self.store, previous);
        self.save()
    }

    /// Assigns every top-level entry of `entries` and persists once.
    ///
    /// # Errors
    ///
    /// Returns persistence failures from [`SettingsStore::save`].
    pub fn update(&mut self, entries: Mapping) -> Result<(), SettingsError> {
        for (key, value) in entries {
            self.store.insert(key, value);
        }
        self.save()
    }

    fn reject(&self, path: KeyPath, reason: PathError) -> UpdateOutcome {
        error!(
            "can't update {path} in {}: {reason}",
            self.path.display()
        );
        UpdateOutcome::InvalidPath { path, reason }
    }
}

impl SettingsMap for SettingsStore {
    type Error = SettingsError;

    fn mapping(&self) -> &Mapping {
        &self.store
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), SettingsError> {
        self.store.insert(Value::String(key.to_owned()), value);
        self.save()
    }

    fn delete(&mut self, key: &str) -> Result<Value, SettingsError> {
        let removed = self
            .store
            .shift_remove(key)
            .ok_or_else(|| SettingsError::KeyNotFound(key.to_owned()))?;
        self.save()?;
        Ok(removed)
    }
}

impl fmt::Display for SettingsStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_flow_mapping(f, &self.store)
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Parses file content into a mapping, falling back to an empty mapping.
fn parse_mapping(content: &str, path: &Path) -> Mapping {
    if content.trim().is_empty() {
        return Mapping::new();
    }
    match serde_yaml::from_str::<Value>(content) {
        Ok(Value::Mapping(mapping)) => mapping,
        Ok(Value::Null) => Mapping::new(),
        Ok(_) => {
            warn!(
                "{} does not contain a mapping, starting with empty settings",
                path.display()
            );
            Mapping::new()
        }
        Err(e) => {
            warn!(
                "failed to parse {}: {e}, starting with empty settings",
                path.display()
            );
            Mapping::new()
        }
    }
}

/// Walks `parents` from `root` and returns the innermost mapping.
fn resolve_parent<'a>(
    root: &'a mut Mapping,
    parents: &[String],
) -> Result<&'a mut Mapping, PathError> {
    let mut current = root;
    for key in parents {
        current = match current.get_mut(key.as_str()) {
            Some(Value::Mapping(next)) => next,
            Some(_) => return Err(PathError::NotAMapping(key.clone())),
            None => return Err(PathError::MissingKey(key.clone())),
        };
    }
    Ok(current)
}

fn write_flow_mapping(f: &mut fmt::Formatter<'_>, mapping: &Mapping) -> fmt::Result {
    f.write_str("{")?;
    for (i, (key, value)) in mapping.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write_flow_value(f, key)?;
        f.write_str(": ")?;
        write_flow_value(f, value)?;
    }
    f.write_str("}")
}

fn write_flow_value(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::Null => f.write_str("null"),
        Value::Bool(b) => write!(f, "{b}"),
        Value::Number(n) => write!(f, "{n}"),
        Value::String(s) => write!(f, "{s:?}"),
        Value::Sequence(items) => {
            f.write_str("[")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write_flow_value(f, item)?;
            }
            f.write_str("]")
        }
        Value::Mapping(mapping) => write_flow_mapping(f, mapping),
        Value::Tagged(tagged) => {
            write!(f, "{} ", tagged.tag)?;
            write_flow_value(f, &tagged.value)
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_settings_path(file: &str) -> (PathBuf, PathBuf) {
        let dir = std::env::temp_dir().join(format!("oakcam_settings_{}", Uuid::new_v4()));
        let path = dir.join(file);
        (dir, path)
    }

    fn yaml(text: &str) -> Mapping {
        serde_yaml::from_str(text).expect("test YAML must parse")
    }

    // ── Loading ───────────────────────────────────────────────────────────────

    #[test]
    fn test_open_missing_file_creates_directory_and_empty_file() {
        // Arrange
        let (dir, path) = temp_settings_path("nested/grey.yaml");

        // Act
        let settings = SettingsStore::open(&path).expect("open");

        // Assert
        assert!(path.exists(), "empty settings file must be created");
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
        assert_eq!(settings.len(), 0);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_open_empty_file_yields_empty_store() {
        let (dir, path) = temp_settings_path("empty.yaml");
        fs::create_dir_all(&dir).unwrap();
        fs::write(&path, "").unwrap();

        let settings = SettingsStore::open(&path).expect("open");

        assert!(settings.is_empty());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_open_non_mapping_content_yields_empty_store() {
        let (dir, path) = temp_settings_path("list.yaml");
        fs::create_dir_all(&dir).unwrap();
        fs::write(&path, "- 1\n- 2\n").unwrap();

        let settings = SettingsStore::open(&path).expect("open");

        assert!(settings.is_empty());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_open_malformed_yaml_yields_empty_store() {
        let (dir, path) = temp_settings_path("broken.yaml");
        fs::create_dir_all(&dir).unwrap();
        fs::write(&path, "exp: [unterminated\n").unwrap();

        let settings = SettingsStore::open(&path).expect("open");

        assert!(settings.is_empty());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_open_existing_file_loads_values() {
        // Arrange
        let (dir, path) = temp_settings_path("grey.yaml");
        fs::create_dir_all(&dir).unwrap();
        fs::write(&path, "exp: 20000\niso: 800\n").unwrap();

        // Act
        let settings = SettingsStore::open(&path).expect("open");

        // Assert
        assert_eq!(settings.get("exp"), Some(&Value::from(20000)));
        assert_eq!(settings.get("iso"), Some(&Value::from(800)));
        assert!(settings.get("focus").is_none());

        fs::remove_dir_all(&dir).ok();
    }

    // ── Mutation ──────────────────────────────────────────────────────────────

    #[test]
    fn test_set_persists_immediately() {
        // Arrange
        let (dir, path) = temp_settings_path("color.yaml");
        let mut settings = SettingsStore::open(&path).unwrap();

        // Act
        settings.set("autofocus", Value::Bool(false)).unwrap();

        // Assert
        let reloaded = SettingsStore::open(&path).unwrap();
        assert_eq!(reloaded.get("autofocus"), Some(&Value::Bool(false)));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_delete_present_key_removes_and_persists() {
        let (dir, path) = temp_settings_path("grey.yaml");
        let mut settings = SettingsStore::open(&path).unwrap();
        settings.set("exp", Value::from(100)).unwrap();

        let removed = settings.delete("exp").unwrap();

        assert_eq!(removed, Value::from(100));
        assert!(!settings.contains_key("exp"));
        assert!(!SettingsStore::open(&path).unwrap().contains_key("exp"));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_delete_absent_key_returns_key_not_found() {
        let (dir, path) = temp_settings_path("grey.yaml");
        let mut settings = SettingsStore::open(&path).unwrap();

        let result = settings.delete("missing");

        assert!(matches!(result, Err(SettingsError::KeyNotFound(ref k)) if k == "missing"));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_update_value_nested_path_assigns_and_persists() {
        // Arrange
        let (dir, path) = temp_settings_path("grey.yaml");
        let mut settings = SettingsStore::open(&path).unwrap();
        settings.update(yaml("b:\n  x: 1\n")).unwrap();

        // Act
        let outcome = settings.update_value(["b", "x"], Value::from(5)).unwrap();

        // Assert
        assert_eq!(outcome, UpdateOutcome::Updated);
        assert_eq!(settings.mapping(), &yaml("b:\n  x: 5\n"));
        let reloaded = SettingsStore::open(&path).unwrap();
        assert_eq!(reloaded.mapping(), &yaml("b:\n  x: 5\n"));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_update_value_missing_intermediate_key_leaves_store_unchanged() {
        // Arrange
        let (dir, path) = temp_settings_path("grey.yaml");
        let mut settings = SettingsStore::open(&path).unwrap();
        settings.update(yaml("b:\n  x: 1\n")).unwrap();
        let before = fs::read_to_string(&path).unwrap();

        // Act
        let outcome = settings.update_value(["z", "x"], Value::from(5)).unwrap();

        // Assert
        assert_eq!(
            outcome,
            UpdateOutcome::InvalidPath {
                path: KeyPath::from(["z", "x"]),
                reason: PathError::MissingKey("z".to_string()),
            }
        );
        assert_eq!(settings.mapping(), &yaml("b:\n  x: 1\n"));
        assert_eq!(fs::read_to_string(&path).unwrap(), before);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_update_value_through_scalar_is_rejected() {
        let (dir, path) = temp_settings_path("grey.yaml");
        let mut settings = SettingsStore::open(&path).unwrap();
        settings.set("exp", Value::from(100)).unwrap();

        let outcome = settings
            .update_value(["exp", "min"], Value::from(1))
            .unwrap();

        assert!(matches!(
            outcome,
            UpdateOutcome::InvalidPath { reason: PathError::NotAMapping(ref k), .. } if k == "exp"
        ));
        assert_eq!(settings.get("exp"), Some(&Value::from(100)));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_update_value_empty_path_is_rejected() {
        let (dir, path) = temp_settings_path("grey.yaml");
        let mut settings = SettingsStore::open(&path).unwrap();

        let outcome = settings
            .update_value(Vec::<String>::new(), Value::from(1))
            .unwrap();

        assert!(!outcome.is_updated());
        assert!(settings.is_empty());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_update_value_single_key_sets_top_level() {
        let (dir, path) = temp_settings_path("grey.yaml");
        let mut settings = SettingsStore::open(&path).unwrap();

        let outcome = settings.update_value("iso", Value::from(400)).unwrap();

        assert!(outcome.is_updated());
        assert_eq!(settings.get("iso"), Some(&Value::from(400)));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_update_defaults_keeps_previous_values() {
        // Arrange
        let (dir, path) = temp_settings_path("grey.yaml");
        let mut settings = SettingsStore::open(&path).unwrap();
        settings.update(yaml("a: 1\nb:\n  x: 1\n")).unwrap();

        // Act
        settings
            .update_defaults(yaml("a: 9\nb:\n  x: 9\n  y: 9\nc: 9\n"))
            .unwrap();

        // Assert
        let expected = yaml("a: 1\nb:\n  x: 1\n  y: 9\nc: 9\n");
        assert_eq!(settings.mapping(), &expected);
        assert_eq!(SettingsStore::open(&path).unwrap().mapping(), &expected);

        fs::remove_dir_all(&dir).ok();
    }

    // ── Persistence format ────────────────────────────────────────────────────

    #[test]
    fn test_save_uses_block_style_and_insertion_order() {
        // Arrange
        let (dir, path) = temp_settings_path("grey.yaml");
        let mut settings = SettingsStore::open(&path).unwrap();

        // Act
        settings.set("zeta", Value::from(1)).unwrap();
        settings
            .set("alpha", Value::Mapping(yaml("x: 1\ny: 2\n")))
            .unwrap();

        // Assert
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "zeta: 1\nalpha:\n  x: 1\n  y: 2\n");

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_save_twice_is_byte_identical() {
        let (dir, path) = temp_settings_path("grey.yaml");
        let mut settings = SettingsStore::open(&path).unwrap();
        settings
            .update(yaml("exp: 20000\nmodes:\n- a\n- b\nnested:\n  k: v\n"))
            .unwrap();

        settings.save().unwrap();
        let first = fs::read(&path).unwrap();
        settings.save().unwrap();
        let second = fs::read(&path).unwrap();

        assert_eq!(first, second);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_display_renders_flow_mapping() {
        let (dir, path) = temp_settings_path("grey.yaml");
        let mut settings = SettingsStore::open(&path).unwrap();
        settings
            .update(yaml("test: OMG\ntest_dict:\n  a: 1\n  b: [2, 3]\n"))
            .unwrap();

        assert_eq!(
            settings.to_string(),
            r#"{"test": "OMG", "test_dict": {"a": 1, "b": [2, 3]}}"#
        );
        fs::remove_dir_all(&dir).ok();
    }
}
