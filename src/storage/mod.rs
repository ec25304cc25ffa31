// Flat key-value persistence; one value per key, no multi-key atomicity.

mod file;
#[cfg(test)]
mod memory;

pub use file::FileStore;
#[cfg(test)]
pub use memory::MemoryStore;

use std::{fmt, io, path::PathBuf};

use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store root {0:?} does not exist")]
    PathNotFound(PathBuf),

    #[error("store root {0:?} is not a directory")]
    NotADirectory(PathBuf),

    #[error("key {0:?} not found")]
    NotFound(String),

    #[error("invalid store key {key:?}: {reason}")]
    InvalidKey { key: String, reason: &'static str },

    /// Any I/O failure other than the key being absent.
    #[error("I/O error on {key:?}: {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

/// A key used verbatim as a single file name under the store root.
///
/// Two keys are equal iff their strings are equal; nothing is normalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoreKey(String);

impl StoreKey {
    pub fn new(key: impl Into<String>) -> StoreResult<Self> {
        let key = key.into();
        let reason = if key.is_empty() {
            Some("key is empty")
        } else if key.contains('\0') {
            Some("key contains NUL")
        } else if key.contains('/') || key.contains('\\') {
            Some("key contains a path separator")
        } else if key.starts_with('.') {
            // hidden names are reserved for temp files
            Some("key starts with '.'")
        } else {
            None
        };
        match reason {
            Some(reason) => Err(StoreError::InvalidKey { key, reason }),
            None => Ok(StoreKey(key)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Get/set by exact key. Implementations must be shareable across request
/// handlers; they hold no locks across calls.
pub trait KvStore: Send + Sync {
    /// Returns the stored value with surrounding whitespace trimmed, or
    /// [`StoreError::NotFound`] if the key was never written.
    fn get(&self, key: &StoreKey) -> StoreResult<String>;

    /// Creates or fully replaces the value under `key`.
    fn set(&self, key: &StoreKey, value: &str) -> StoreResult<()>;
}
