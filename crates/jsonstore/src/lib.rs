//! A persistent key/value store backed by a single JSON document.
//!
//! The store loads its file once, serves reads from memory and rewrites the whole file after
//! every mutation. Values are arbitrary JSON; nested values can be addressed with dotted paths
//! (`"user.name"`) or segment lists (`["user", "name"]`).
//!
//! ```no_run
//! use jsonstore::Store;
//! use serde_json::json;
//!
//! # async fn example() -> jsonstore::Result<()> {
//! let store = Store::at("/home/user/.local/share/my-app").await?;
//! store.set_all(json!({"name": "John", "age": 20})).await?;
//! println!("{}", store.get("name")?);
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod config;
pub mod constants;
pub mod error;
pub mod lookup;
pub mod path;
pub mod store;

pub use backend::{FsBackend, MemoryBackend, StorageBackend};
pub use config::{LookupMode, StoreConfig};
pub use constants::*;
pub use error::{Result, StoreError};
pub use lookup::is_truthy;
pub use path::{resolve_read, resolve_remove, resolve_write, KeyPath};
pub use store::Store;
