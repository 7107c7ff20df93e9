//! Persistent YAML settings.
//!
//! A settings file holds one logical settings domain (for example the grey
//! mono cameras in `grey.yaml` and the color camera in `color.yaml`).  The
//! content is free-form: any tree of mappings, sequences and scalars
//! round-trips through [`SettingsStore::load`] and [`SettingsStore::save`].
//!
//! ```yaml
//! exp: 20000
//! iso: 800
//! crop:
//!   x: 0.0
//!   y: 0.0
//! ```
//!
//! # Sub-modules
//!
//! - **`store`**    – [`SettingsStore`], the file-backed mapping.
//! - **`map`**      – The [`SettingsMap`] trait shared by every mapping-like
//!   settings container, plus the in-memory [`MemorySettings`].
//! - **`key_path`** – [`KeyPath`], a single key or a nested key sequence.
//! - **`merge`**    – Recursive merge used when applying new defaults.

pub mod key_path;
pub mod map;
pub mod merge;
pub mod store;

pub use key_path::KeyPath;
pub use map::{MemorySettings, SettingsMap};
pub use store::{PathError, SettingsError, SettingsStore, UpdateOutcome};
