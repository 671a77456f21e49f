//! File access used by the store.
//!
//! The store only needs three primitives from its environment: an existence check, "read the
//! whole file as JSON" and "write a JSON value to the file". They sit behind
//! [`StorageBackend`] so hosts can substitute their own I/O (and tests can simulate failures).

use std::{
    collections::HashMap,
    io,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use serde_json::Value;
use tokio::fs as tokio_fs;
use tracing::{debug, trace};

/// JSON file primitives consumed by [`Store`](crate::Store).
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync + std::fmt::Debug {
    /// Returns true when a file exists at `path`.
    async fn exists(&self, path: &Path) -> bool;

    /// Reads and parses the whole file at `path`.
    async fn read_json(&self, path: &Path) -> io::Result<Value>;

    /// Serializes `value` and replaces the contents of `path` with it.
    async fn write_json(&self, path: &Path, value: &Value) -> io::Result<()>;
}

/// Backend writing real files through `tokio::fs`.
#[derive(Debug, Clone)]
pub struct FsBackend {
    /// Write indented JSON
    pretty:      bool,
    /// Create missing parent directories before writing
    create_dirs: bool,
}

impl FsBackend {
    pub const fn new(pretty: bool, create_dirs: bool) -> Self {
        Self {
            pretty,
            create_dirs,
        }
    }
}

impl Default for FsBackend {
    fn default() -> Self { Self::new(true, true) }
}

#[async_trait::async_trait]
impl StorageBackend for FsBackend {
    async fn exists(&self, path: &Path) -> bool { tokio_fs::try_exists(path).await.unwrap_or(false) }

    async fn read_json(&self, path: &Path) -> io::Result<Value> {
        trace!("Reading JSON file {:?}", path);
        let content = tokio_fs::read_to_string(path).await?;
        let value = serde_json::from_str(&content)?;
        debug!("Read {} bytes from {:?}", content.len(), path);
        Ok(value)
    }

    async fn write_json(&self, path: &Path, value: &Value) -> io::Result<()> {
        trace!("Writing JSON file {:?}", path);
        if self.create_dirs {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio_fs::create_dir_all(parent).await?;
            }
        }

        let mut json = if self.pretty {
            serde_json::to_string_pretty(value)?
        }
        else {
            serde_json::to_string(value)?
        };
        json.push('\n');

        tokio_fs::write(path, &json).await?;
        debug!("Wrote {} bytes to {:?}", json.len(), path);
        Ok(())
    }
}

/// Backend keeping files in memory.
///
/// Values are stored as written, so a later `read_json` returns an equal value. Writes can be
/// switched to fail, which leaves the previously stored value in place.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    /// Stored files
    files:       Mutex<HashMap<PathBuf, Value>>,
    /// When set, every write fails with this error kind
    fail_writes: Mutex<Option<io::ErrorKind>>,
}

impl MemoryBackend {
    pub fn new() -> Self { Self::default() }

    /// Pre-populates `path` with `value`.
    pub fn insert_file(&self, path: impl Into<PathBuf>, value: Value) {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.into(), value);
    }

    /// Returns the value last written to `path`.
    pub fn file(&self, path: &Path) -> Option<Value> {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
    }

    /// Makes subsequent writes fail with `kind`, or succeed again with `None`.
    pub fn set_fail_writes(&self, kind: Option<io::ErrorKind>) {
        *self
            .fail_writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = kind;
    }
}

#[async_trait::async_trait]
impl StorageBackend for MemoryBackend {
    async fn exists(&self, path: &Path) -> bool {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(path)
    }

    async fn read_json(&self, path: &Path) -> io::Result<Value> {
        self.file(path).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} does not exist", path.display()),
            )
        })
    }

    async fn write_json(&self, path: &Path, value: &Value) -> io::Result<()> {
        let fail = *self
            .fail_writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(kind) = fail {
            return Err(io::Error::new(kind, "simulated write failure"));
        }
        self.insert_file(path, value.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::tempdir;

    use super::*;

    #[tokio::test]
    async fn test_fs_backend_round_trip() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("storage.json");
        let backend = FsBackend::default();

        assert!(!backend.exists(&path).await);
        backend
            .write_json(&path, &json!({"name": "John", "tags": ["a", "b"]}))
            .await
            .unwrap();
        assert!(backend.exists(&path).await);

        let value = backend.read_json(&path).await.unwrap();
        assert_eq!(value, json!({"name": "John", "tags": ["a", "b"]}));
    }

    #[tokio::test]
    async fn test_fs_backend_compact_output() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("storage.json");
        let backend = FsBackend::new(false, false);

        backend.write_json(&path, &json!({"a": 1})).await.unwrap();
        let content = tokio_fs::read_to_string(&path).await.unwrap();
        assert_eq!(content, "{\"a\":1}\n");
    }

    #[tokio::test]
    async fn test_fs_backend_without_create_dirs_fails_on_missing_parent() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("missing").join("storage.json");
        let backend = FsBackend::new(true, false);

        let err = backend.write_json(&path, &json!({})).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_fs_backend_invalid_json() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("storage.json");
        tokio_fs::write(&path, "{ not json").await.unwrap();

        let err = FsBackend::default().read_json(&path).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[tokio::test]
    async fn test_memory_backend_failing_writes() {
        let backend = MemoryBackend::new();
        let path = Path::new("/virtual/storage.json");

        backend.write_json(path, &json!({"a": 1})).await.unwrap();
        backend.set_fail_writes(Some(io::ErrorKind::PermissionDenied));
        let err = backend.write_json(path, &json!({"a": 2})).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
        assert_eq!(backend.file(path), Some(json!({"a": 1})));

        backend.set_fail_writes(None);
        backend.write_json(path, &json!({"a": 3})).await.unwrap();
        assert_eq!(backend.read_json(path).await.unwrap(), json!({"a": 3}));
    }
}
