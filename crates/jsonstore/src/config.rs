//! Store configuration and lookup modes.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::DEFAULT_FILE_NAME;

/// How reads decide whether a key is present.
///
/// - `Presence`: a key is present whenever the document holds it, whatever its value
/// - `Truthy`: `null`, `false`, `0` and `""` are reported as missing, matching stores that test
///   values for truthiness instead of existence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LookupMode {
    /// Absent and present-but-falsy are distinct (default)
    #[default]
    Presence,
    /// Falsy values are treated as missing
    Truthy,
}

impl std::str::FromStr for LookupMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "presence" => Ok(LookupMode::Presence),
            "truthy" => Ok(LookupMode::Truthy),
            _ => Err(format!("Invalid lookup mode: {}", s)),
        }
    }
}

impl std::fmt::Display for LookupMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupMode::Presence => write!(f, "presence"),
            LookupMode::Truthy => write!(f, "truthy"),
        }
    }
}

/// Configuration for a [`Store`](crate::Store).
///
/// The base directory is supplied by the host application (typically its per-user data
/// directory); the store never tries to discover it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding the storage file
    pub base_dir:    PathBuf,
    /// Name of the storage file inside `base_dir`
    pub file_name:   String,
    /// How reads decide whether a key is present
    pub lookup:      LookupMode,
    /// Write indented JSON instead of a single line
    pub pretty:      bool,
    /// Create missing parent directories before writing
    pub create_dirs: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_dir:    PathBuf::from("."),
            file_name:   DEFAULT_FILE_NAME.to_owned(),
            lookup:      LookupMode::default(),
            pretty:      true,
            create_dirs: true,
        }
    }
}

impl StoreConfig {
    /// Creates a configuration for `storage.json` inside `base_dir`.
    pub fn new<P>(base_dir: P) -> Self
    where
        P: AsRef<Path>,
    {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    /// Uses `file_name` instead of the default `storage.json`.
    #[must_use]
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    #[must_use]
    pub fn with_lookup(mut self, lookup: LookupMode) -> Self {
        self.lookup = lookup;
        self
    }

    #[must_use]
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    #[must_use]
    pub fn with_create_dirs(mut self, create_dirs: bool) -> Self {
        self.create_dirs = create_dirs;
        self
    }

    /// Absolute (or base-relative) path of the backing file.
    pub fn file_path(&self) -> PathBuf { self.base_dir.join(&self.file_name) }
}
