use std::{
    io,
    path::{Path, PathBuf},
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard},
};

use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::{debug, error, trace, warn};

use crate::{FsBackend, LookupMode, Result, StorageBackend, StoreConfig, StoreError};

/// A key/value store mirrored to a single JSON file.
///
/// `Store` owns one in-memory JSON object (the document) and the path of the file it is
/// persisted to. Reads are served from memory. Every mutation updates memory first and then
/// writes the whole document to disk, resolving once that write has completed.
///
/// # Examples
///
/// ```no_run
/// use jsonstore::{Store, StoreConfig};
/// use serde_json::json;
///
/// # async fn example() -> jsonstore::Result<()> {
/// let store = Store::open(StoreConfig::new("/home/user/.config/my-app")).await?;
///
/// store.set("theme", json!("dark")).await?;
/// store.set_path("window.size", json!([800, 600])).await?;
///
/// assert_eq!(store.get("theme")?, json!("dark"));
/// assert_eq!(store.get_path(["window", "size"])?, json!([800, 600]));
/// # Ok(())
/// # }
/// ```
///
/// # Sharing
///
/// There is no global instance: the host constructs a store and hands it out, usually as an
/// `Arc<Store>`. All methods take `&self`. Mutations are applied to memory in call order and
/// flushes are serialized, so the file always ends up holding the latest document. Two stores
/// opened on the same file are not coordinated and will overwrite each other.
#[derive(Debug)]
pub struct Store {
    /// Path of the backing file.
    pub(crate) path:       PathBuf,
    /// How reads decide whether a key is present.
    pub(crate) lookup:     LookupMode,
    /// The in-memory document. `None` when the backing file held `null`.
    pub(crate) document:   RwLock<Option<Map<String, Value>>>,
    /// Serializes flushes so a later flush never completes before an earlier one.
    pub(crate) flush_gate: Mutex<()>,
    /// File primitives.
    pub(crate) backend:    Arc<dyn StorageBackend>,
}

impl Store {
    /// Opens the store described by `config`, using the real filesystem.
    ///
    /// If the backing file exists it is read and parsed; otherwise the store starts empty and
    /// an empty object is written to create the file.
    ///
    /// # Errors
    ///
    /// * `StoreError::Load` - the file exists but cannot be read, is not valid JSON, or its root is
    ///   neither an object nor `null`
    ///
    /// Failing to create a missing file is logged and does not fail the call, since the
    /// in-memory document is usable regardless.
    pub async fn open(config: StoreConfig) -> Result<Self> {
        let backend = Arc::new(FsBackend::new(config.pretty, config.create_dirs));
        Self::open_with_backend(config, backend).await
    }

    /// Opens `storage.json` inside `base_dir` with default settings.
    pub async fn at<P>(base_dir: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        Self::open(StoreConfig::new(base_dir)).await
    }

    /// Opens the store described by `config` on top of a custom backend.
    pub async fn open_with_backend(config: StoreConfig, backend: Arc<dyn StorageBackend>) -> Result<Self> {
        let path = config.file_path();
        trace!("Opening store at path: {:?}", path);

        if !backend.exists(&path).await {
            debug!("Storage file {:?} not found, creating it", path);
            let store = Self::with_document(path, config.lookup, backend, Some(Map::new()));
            if let Err(e) = store.persist().await {
                warn!("Failed to create storage file: {}", e);
            }
            return Ok(store);
        }

        let value = backend.read_json(&path).await.map_err(|source| {
            error!("Failed to load storage file {:?}: {}", path, source);
            StoreError::Load {
                path: path.clone(),
                source,
            }
        })?;

        let document = match value {
            Value::Object(map) => {
                debug!("Loaded {} keys from {:?}", map.len(), path);
                Some(map)
            },
            Value::Null => {
                warn!("Storage file {:?} holds null, store is uninitialized", path);
                None
            },
            other => {
                error!("Storage file {:?} does not hold a JSON object", path);
                return Err(StoreError::Load {
                    path,
                    source: io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("expected a JSON object at the root, found {}", json_type(&other)),
                    ),
                });
            },
        };

        Ok(Self::with_document(path, config.lookup, backend, document))
    }

    /// Assembles a store around an already loaded document.
    fn with_document(
        path: PathBuf,
        lookup: LookupMode,
        backend: Arc<dyn StorageBackend>,
        document: Option<Map<String, Value>>,
    ) -> Self {
        Self {
            path,
            lookup,
            document: RwLock::new(document),
            flush_gate: Mutex::new(()),
            backend,
        }
    }

    /// Returns the path of the backing file.
    pub fn file(&self) -> &Path { &self.path }

    /// Returns the lookup mode reads are using.
    pub const fn lookup_mode(&self) -> LookupMode { self.lookup }

    /// Read access to the document. A poisoned lock is recovered since every writer leaves the
    /// map consistent.
    pub(crate) fn read_document(&self) -> RwLockReadGuard<'_, Option<Map<String, Value>>> {
        self.document.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Clones the document as a JSON value, `None` when uninitialized.
    pub(crate) fn snapshot(&self) -> Option<Value> {
        self.read_document()
            .as_ref()
            .map(|document| Value::Object(document.clone()))
    }

    /// Applies `op` to the document in memory, without touching disk.
    pub(crate) fn mutate<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&mut Map<String, Value>) -> Result<T>,
    {
        let mut guard = self.document.write().unwrap_or_else(PoisonError::into_inner);
        let document = guard.as_mut().ok_or_else(|| self.uninitialized())?;
        op(document)
    }

    /// Replaces the whole document in memory.
    pub(crate) fn reset(&self, document: Map<String, Value>) {
        *self.document.write().unwrap_or_else(PoisonError::into_inner) = Some(document);
    }

    pub(crate) fn uninitialized(&self) -> StoreError {
        StoreError::StoreUninitialized {
            path: self.path.clone(),
        }
    }

    /// Writes the current document to the backing file.
    ///
    /// The snapshot is taken after the flush gate is acquired, so whichever flush finishes last
    /// carries the newest in-memory state.
    pub(crate) async fn persist(&self) -> Result<()> {
        let _gate = self.flush_gate.lock().await;

        let snapshot = self.snapshot().ok_or_else(|| self.uninitialized())?;

        self.backend
            .write_json(&self.path, &snapshot)
            .await
            .map_err(|source| {
                error!("Failed to write storage file {:?}: {}", self.path, source);
                StoreError::Persistence {
                    path: self.path.clone(),
                    source,
                }
            })?;

        debug!("Storage file {:?} flushed", self.path);
        Ok(())
    }
}

/// Human-readable name of a JSON value's type.
fn json_type(value: &Value) -> &'static str {
    match *value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
