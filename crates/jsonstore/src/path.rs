//! Deep key addressing inside a JSON document.
//!
//! A [`KeyPath`] is built either from a dotted string (`"user.name"`) or from a list of
//! segments (`["user", "name"]`). Reads never create anything; writes create empty objects for
//! every missing intermediate segment.

use serde_json::{Map, Value};

use crate::{LookupMode, Result, StoreError, PATH_SEPARATOR};

/// An ordered list of object keys addressing a nested location.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPath {
    /// Path segments, outermost first.
    segments: Vec<String>,
}

impl KeyPath {
    /// Splits a dotted string into a path. Empty pieces are kept as empty keys.
    pub fn parse(dotted: &str) -> Self {
        Self {
            segments: dotted.split(PATH_SEPARATOR).map(str::to_owned).collect(),
        }
    }

    /// Builds a path from segments taken verbatim (dots inside a segment are not split).
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn segments(&self) -> &[String] { &self.segments }

    pub fn is_empty(&self) -> bool { self.segments.is_empty() }

    /// Error reported when this path does not resolve.
    fn not_found(&self) -> StoreError {
        StoreError::KeyNotFound {
            key: self.to_string(),
        }
    }
}

impl std::fmt::Display for KeyPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

impl From<&str> for KeyPath {
    fn from(dotted: &str) -> Self { Self::parse(dotted) }
}

impl From<&String> for KeyPath {
    fn from(dotted: &String) -> Self { Self::parse(dotted) }
}

impl From<String> for KeyPath {
    fn from(dotted: String) -> Self { Self::parse(&dotted) }
}

impl From<Vec<String>> for KeyPath {
    fn from(segments: Vec<String>) -> Self {
        Self {
            segments,
        }
    }
}

impl From<&[&str]> for KeyPath {
    fn from(segments: &[&str]) -> Self { Self::from_segments(segments.iter().copied()) }
}

impl<const N: usize> From<[&str; N]> for KeyPath {
    fn from(segments: [&str; N]) -> Self { Self::from_segments(segments) }
}

impl TryFrom<&Value> for KeyPath {
    type Error = StoreError;

    /// Accepts a dotted string or an array of strings.
    fn try_from(value: &Value) -> Result<Self> {
        match value {
            Value::String(dotted) => Ok(Self::parse(dotted)),
            Value::Array(items) => {
                items
                    .iter()
                    .map(|item| {
                        item.as_str().map(str::to_owned).ok_or_else(|| {
                            StoreError::invalid_argument(format!("path segment {} is not a string", item))
                        })
                    })
                    .collect::<Result<Vec<_>>>()
                    .map(Self::from)
            },
            other => {
                Err(StoreError::invalid_argument(format!(
                    "path must be a string or an array of strings, got {}",
                    other
                )))
            },
        }
    }
}

/// Error reported for a path without segments.
fn empty_path() -> StoreError { StoreError::invalid_argument("path must contain at least one segment") }

/// Resolves `path` against `document` for reading.
///
/// Every segment descends one object level. A missing key, a `null` intermediate or a
/// non-object intermediate stops the walk with `KeyNotFound`. The final value is then
/// filtered through `lookup`.
pub fn resolve_read<'a>(path: &KeyPath, document: &'a Map<String, Value>, lookup: LookupMode) -> Result<&'a Value> {
    let (first, rest) = path.segments.split_first().ok_or_else(empty_path)?;

    let mut current = document.get(first).ok_or_else(|| path.not_found())?;
    for segment in rest {
        current = current
            .as_object()
            .and_then(|map| map.get(segment))
            .ok_or_else(|| path.not_found())?;
    }

    if lookup.admits(current) {
        Ok(current)
    }
    else {
        Err(path.not_found())
    }
}

/// Assigns `value` at `path`, creating empty objects for missing intermediates.
///
/// An intermediate holding anything other than an object is replaced by an empty object.
pub fn resolve_write(path: &KeyPath, document: &mut Map<String, Value>, value: Value) -> Result<()> {
    let (last, parents) = path.segments.split_last().ok_or_else(empty_path)?;

    let mut current = document;
    for segment in parents {
        let slot = current
            .entry(segment.as_str())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        current = slot
            .as_object_mut()
            .ok_or_else(|| StoreError::invalid_argument(format!("segment '{}' of {} is not an object", segment, path)))?;
    }

    current.insert(last.clone(), value);
    Ok(())
}

/// Removes the value at `path` and returns it. Missing intermediates make this a no-op.
pub fn resolve_remove(path: &KeyPath, document: &mut Map<String, Value>) -> Result<Option<Value>> {
    let (last, parents) = path.segments.split_last().ok_or_else(empty_path)?;

    let mut current = document;
    for segment in parents {
        match current.get_mut(segment).and_then(Value::as_object_mut) {
            Some(next) => current = next,
            None => return Ok(None),
        }
    }

    Ok(current.remove(last))
}
