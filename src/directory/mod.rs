//! Plugin identity directory: 4-character plugin id → display name.
//!
//! The table is a built-in JSON table (normally `assets/plugins.json`) merged
//! with an optional user override file. Override entries win. After the
//! merge the legacy placeholder key (`""`) is dropped, and the override file
//! is rewritten in canonical form (sorted keys, pretty JSON).
//!
//! The override file is best effort: an unreadable or malformed file is
//! logged and ignored, and a failed write-back is logged. Neither stops
//! conversions.
//!
//! Lookups never fail. Unknown ids and non-string values resolve to `""`.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use serde_json::Value;
use thiserror::Error;

/// Built-in table, compiled in.
pub const BUILTIN_TABLE: &str = include_str!("../../assets/plugins.json");

/// Suffix of the plugin module file derived from its display name.
pub const MODULE_SUFFIX: &str = "dll";

/// Key written by older versions of the override file as a placeholder.
const LEGACY_PLACEHOLDER_KEY: &str = "";

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("IO error on plugin table {path}: {source}")]
    Io { path: String, source: io::Error },
    #[error("Invalid JSON in plugin table {origin}: {source}")]
    Json { origin: String, source: serde_json::Error },
    #[error("Plugin table {origin} must be a JSON object")]
    NotAnObject { origin: String },
    #[error("Failed to serialize plugin table: {0}")]
    Serialize(serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PluginDirectory {
    entries: BTreeMap<String, Value>,
}

impl PluginDirectory {
    /// Parse a JSON object table. `origin` names the source in errors.
    pub fn from_json(json: &str, origin: &str) -> Result<Self, DirectoryError> {
        let value: Value = serde_json::from_str(json).map_err(|source| DirectoryError::Json {
            origin: origin.to_owned(),
            source,
        })?;
        match value {
            Value::Object(map) => Ok(Self { entries: map.into_iter().collect() }),
            _ => Err(DirectoryError::NotAnObject { origin: origin.to_owned() }),
        }
    }

    pub fn builtin() -> Result<Self, DirectoryError> {
        Self::from_json(BUILTIN_TABLE, "<builtin>")
    }

    /// Build the process-wide directory from the `builtin` table text and an
    /// optional override file.
    ///
    /// Only a broken `builtin` table is an error. When the override file
    /// exists, parses, and `write_back` is set, the merged table is saved
    /// back to it.
    pub fn load(builtin: &str, override_path: Option<&Path>, write_back: bool) -> Result<Self, DirectoryError> {
        Self::load_with(builtin, override_path, write_back.then_some(|p: &Path| File::create(p)))
    }

    /// [`load`](Self::load) with the write-back target opened by `open`.
    pub fn load_with<W, F>(builtin: &str, override_path: Option<&Path>, open: Option<F>) -> Result<Self, DirectoryError>
    where
        W: Write,
        F: FnOnce(&Path) -> io::Result<W>,
    {
        let mut dir = Self::from_json(builtin, "<builtin>")?;

        let Some(path) = override_path else {
            return Ok(dir);
        };
        if !path.exists() {
            log::debug!("plugin table: no override file at {}", path.display());
            return Ok(dir);
        }

        let overrides = match Self::read_override(path) {
            Ok(o) => o,
            Err(e) => {
                log::warn!("plugin table: ignoring override file: {e}");
                return Ok(dir);
            }
        };
        log::info!(
            "plugin table: merging {} override(s) from {}",
            overrides.len(),
            path.display()
        );
        dir.merge(overrides);

        if let Some(open) = open {
            if let Err(e) = dir.write_back(path, open) {
                log::warn!("plugin table: write-back skipped: {e}");
            }
        }
        Ok(dir)
    }

    fn read_override(path: &Path) -> Result<Self, DirectoryError> {
        let text = std::fs::read_to_string(path).map_err(|source| DirectoryError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text, &path.display().to_string())
    }

    /// Merge `other` over `self` and normalize the result.
    pub fn merge(&mut self, other: PluginDirectory) {
        self.entries.extend(other.entries);
        self.normalize();
    }

    /// Drop the legacy placeholder key.
    pub fn normalize(&mut self) {
        if self.entries.remove(LEGACY_PLACEHOLDER_KEY).is_some() {
            log::debug!("plugin table: dropped legacy placeholder entry");
        }
    }

    /// Canonical text form: pretty JSON, sorted keys, trailing newline.
    pub fn to_canonical_json(&self) -> Result<String, DirectoryError> {
        // BTreeMap serializes in key order.
        let mut out = serde_json::to_string_pretty(&self.entries).map_err(DirectoryError::Serialize)?;
        out.push('\n');
        Ok(out)
    }

    /// Write the canonical form to `w`.
    pub fn save_to<W: Write>(&self, mut w: W) -> Result<(), DirectoryError> {
        let text = self.to_canonical_json()?;
        w.write_all(text.as_bytes())
            .and_then(|_| w.flush())
            .map_err(|source| DirectoryError::Io { path: "<writer>".into(), source })
    }

    pub fn save(&self, path: &Path) -> Result<(), DirectoryError> {
        self.write_back(path, |p: &Path| File::create(p))
    }

    /// Serialize first, then open and write, so a serialization failure
    /// leaves the existing file untouched.
    fn write_back<W, F>(&self, path: &Path, open: F) -> Result<(), DirectoryError>
    where
        W: Write,
        F: FnOnce(&Path) -> io::Result<W>,
    {
        let io_err = |source| DirectoryError::Io { path: path.display().to_string(), source };
        let text = self.to_canonical_json()?;
        let mut w = open(path).map_err(io_err)?;
        w.write_all(text.as_bytes())
            .and_then(|_| w.flush())
            .map_err(io_err)?;
        log::debug!("plugin table: wrote {} entries to {}", self.len(), path.display());
        Ok(())
    }

    pub fn insert(&mut self, id: impl Into<String>, name: impl Into<String>) {
        self.entries.insert(id.into(), Value::String(name.into()));
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Display name for `id`, or `""` when unknown or not a string.
    pub fn resolve_name(&self, id: &str) -> &str {
        self.entries.get(id).and_then(Value::as_str).unwrap_or("")
    }

    /// Module file name for `id` (`<name>.dll`), or `""` when the name does
    /// not resolve.
    pub fn resolve_filename(&self, id: &str) -> String {
        match self.resolve_name(id) {
            ""   => String::new(),
            name => format!("{name}.{MODULE_SUFFIX}"),
        }
    }
}
