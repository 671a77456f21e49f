//! Names and defaults shared across the crate.

/// Default name of the storage file inside the base directory.
pub const DEFAULT_FILE_NAME: &str = "storage.json";

/// Separator used to split dotted key paths into segments.
pub const PATH_SEPARATOR: char = '.';
