use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::{resolve_read, resolve_remove, resolve_write, KeyPath, Result, StoreError};
use super::stor::Store;

impl Store {
    /// Returns the value stored under the top-level `key`.
    ///
    /// # Errors
    ///
    /// * `StoreError::KeyNotFound` - the key is absent, or holds a falsy value under
    ///   [`LookupMode::Truthy`](crate::LookupMode::Truthy)
    /// * `StoreError::StoreUninitialized` - the store holds no document
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::sync::Arc;
    ///
    /// use jsonstore::{MemoryBackend, Store, StoreConfig};
    /// use serde_json::json;
    ///
    /// # async fn example() -> jsonstore::Result<()> {
    /// let store = Store::open_with_backend(StoreConfig::new("/app"), Arc::new(MemoryBackend::new())).await?;
    /// store.set("name", json!("John")).await?;
    ///
    /// assert_eq!(store.get("name")?, json!("John"));
    /// assert!(store.get("age").is_err());
    /// # Ok(())
    /// # }
    /// ```
    pub fn get(&self, key: &str) -> Result<Value> {
        trace!("Getting key: {}", key);
        let guard = self.read_document();
        let document = guard.as_ref().ok_or_else(|| self.uninitialized())?;
        document
            .get(key)
            .filter(|value| self.lookup.admits(value))
            .cloned()
            .ok_or_else(|| {
                StoreError::KeyNotFound {
                    key: key.to_owned(),
                }
            })
    }

    /// Returns true when the document holds `key`, whatever its value and lookup mode.
    pub fn has(&self, key: &str) -> Result<bool> {
        let guard = self.read_document();
        let document = guard.as_ref().ok_or_else(|| self.uninitialized())?;
        Ok(document.contains_key(key))
    }

    /// Returns a copy of the whole document, `Value::Null` if the store is uninitialized.
    pub fn get_all(&self) -> Value { self.snapshot().unwrap_or(Value::Null) }

    /// Returns the value at a nested `path`, given as `"a.b.c"` or `["a", "b", "c"]`.
    ///
    /// # Errors
    ///
    /// * `StoreError::KeyNotFound` - a segment is missing or cannot be descended into
    /// * `StoreError::InvalidArgument` - the path has no segments
    /// * `StoreError::StoreUninitialized` - the store holds no document
    pub fn get_path<P>(&self, path: P) -> Result<Value>
    where
        P: Into<KeyPath>,
    {
        let path = path.into();
        trace!("Getting path: {}", path);
        let guard = self.read_document();
        let document = guard.as_ref().ok_or_else(|| self.uninitialized())?;
        resolve_read(&path, document, self.lookup).cloned()
    }

    /// Stores `value` under the top-level `key` and flushes the document.
    ///
    /// # Errors
    ///
    /// * `StoreError::Persistence` - the file write failed. The new value stays in memory, so
    ///   memory is ahead of disk until a later flush succeeds.
    /// * `StoreError::StoreUninitialized` - the store holds no document
    pub async fn set(&self, key: &str, value: Value) -> Result<()> {
        trace!("Setting key: {}", key);
        self.mutate(|document| {
            document.insert(key.to_owned(), value);
            Ok(())
        })?;
        self.persist().await?;
        debug!("Key {} saved", key);
        Ok(())
    }

    /// Merges every top-level entry of `entries` into the document, then flushes once.
    ///
    /// Existing keys are overwritten, new keys are added and unrelated keys are left alone.
    ///
    /// # Errors
    ///
    /// * `StoreError::InvalidArgument` - `entries` is not a JSON object
    /// * `StoreError::Persistence` - the file write failed
    /// * `StoreError::StoreUninitialized` - the store holds no document
    pub async fn set_all(&self, entries: Value) -> Result<()> {
        let Value::Object(entries) = entries
        else {
            return Err(StoreError::invalid_argument(
                "entries must be a JSON object",
            ));
        };
        trace!("Setting {} keys", entries.len());

        self.mutate(|document| {
            document.extend(entries);
            Ok(())
        })?;
        self.persist().await
    }

    /// Stores `value` at a nested `path`, creating missing intermediate objects, then flushes.
    ///
    /// # Errors
    ///
    /// * `StoreError::InvalidArgument` - the path has no segments
    /// * `StoreError::Persistence` - the file write failed
    /// * `StoreError::StoreUninitialized` - the store holds no document
    pub async fn set_path<P>(&self, path: P, value: Value) -> Result<()>
    where
        P: Into<KeyPath>,
    {
        let path = path.into();
        trace!("Setting path: {}", path);
        self.mutate(|document| resolve_write(&path, document, value))?;
        self.persist().await
    }

    /// Removes the top-level `key`, then flushes. Removing an absent key is not an error.
    pub async fn delete(&self, key: &str) -> Result<()> {
        trace!("Deleting key: {}", key);
        let removed = self.mutate(|document| Ok(document.remove(key)))?;
        if removed.is_none() {
            debug!("Key {} was not present", key);
        }
        self.persist().await
    }

    /// Removes every listed key, then flushes once. Absent keys are skipped.
    pub async fn delete_all<I, S>(&self, keys: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let removed = self.mutate(|document| {
            Ok(keys
                .into_iter()
                .filter(|key| {
                    let key: &str = key.as_ref();
                    document.remove(key).is_some()
                })
                .count())
        })?;
        trace!("Deleted {} keys", removed);
        self.persist().await
    }

    /// Like [`delete_all`](Self::delete_all) for keys given as a JSON array of strings.
    ///
    /// # Errors
    ///
    /// * `StoreError::InvalidArgument` - `keys` is not an array of strings; nothing is removed
    pub async fn delete_all_value(&self, keys: &Value) -> Result<()> {
        let keys = keys
            .as_array()
            .and_then(|items| items.iter().map(Value::as_str).collect::<Option<Vec<_>>>())
            .ok_or_else(|| StoreError::invalid_argument("keys must be an array of strings"))?;
        self.delete_all(keys).await
    }

    /// Removes the value at a nested `path` and returns it, then flushes.
    ///
    /// Missing segments make this a no-op returning `None`; intermediates are never created.
    pub async fn delete_path<P>(&self, path: P) -> Result<Option<Value>>
    where
        P: Into<KeyPath>,
    {
        let path = path.into();
        trace!("Deleting path: {}", path);
        let removed = self.mutate(|document| resolve_remove(&path, document))?;
        self.persist().await?;
        Ok(removed)
    }

    /// Empties the document and flushes an empty object to disk.
    ///
    /// Unlike other mutators this also works on an uninitialized store, which it initializes.
    /// The call resolves after the flush, reporting its failure like every other mutator.
    pub async fn clear(&self) -> Result<()> {
        trace!("Clearing store {:?}", self.path);
        self.reset(Map::new());
        self.persist().await
    }

    /// Writes the current document to disk without changing it.
    ///
    /// Useful to retry after a `StoreError::Persistence`.
    pub async fn flush(&self) -> Result<()> { self.persist().await }
}
