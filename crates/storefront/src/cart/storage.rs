//! Persisted slot backing the cart.
//!
//! The cart never caches its items: every operation reads the slot, mutates
//! in memory, and writes the slot back. The slot itself is reached through
//! the [`CartStorage`] port so the medium can be swapped:
//!
//! - [`MemoryStorage`] - an in-process slot
//! - [`FileStorage`] - a JSON file on disk
//! - [`NullStorage`] - no medium at all; reads are empty and writes vanish

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use thiserror::Error;

use super::CART_STORAGE_KEY;

/// Errors raised by a storage medium.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A previous writer panicked while holding the slot.
    #[error("storage lock poisoned")]
    Poisoned,

    /// The medium refused the write (quota, permissions, ...).
    #[error("write rejected: {0}")]
    Rejected(String),
}

/// Key/value slot holding the serialized cart.
pub trait CartStorage: Send + Sync {
    /// Read the raw slot contents. `Ok(None)` means nothing was ever stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the medium cannot be read.
    fn read(&self) -> Result<Option<String>, StorageError>;

    /// Overwrite the slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the medium rejects the write.
    fn write(&self, value: &str) -> Result<(), StorageError>;

    /// Whether a medium exists at all. When it does not, the cart performs
    /// no writes and publishes no events.
    fn is_available(&self) -> bool {
        true
    }
}

impl<T: CartStorage + ?Sized> CartStorage for Arc<T> {
    fn read(&self) -> Result<Option<String>, StorageError> {
        (**self).read()
    }

    fn write(&self, value: &str) -> Result<(), StorageError> {
        (**self).write(value)
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }
}

impl<T: CartStorage + ?Sized> CartStorage for Box<T> {
    fn read(&self) -> Result<Option<String>, StorageError> {
        (**self).read()
    }

    fn write(&self, value: &str) -> Result<(), StorageError> {
        (**self).write(value)
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }
}

/// Storage for contexts that have no persistence medium.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStorage;

impl CartStorage for NullStorage {
    fn read(&self) -> Result<Option<String>, StorageError> {
        Ok(None)
    }

    fn write(&self, _value: &str) -> Result<(), StorageError> {
        Ok(())
    }

    fn is_available(&self) -> bool {
        false
    }
}

/// In-process slot.
///
/// Wrap it in an `Arc` to share one slot between several stores.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slot: Mutex<Option<String>>,
}

impl MemoryStorage {
    /// Create an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a slot that already holds raw contents.
    #[must_use]
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(contents.into())),
        }
    }
}

impl CartStorage for MemoryStorage {
    fn read(&self) -> Result<Option<String>, StorageError> {
        let slot = self.slot.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(slot.clone())
    }

    fn write(&self, value: &str) -> Result<(), StorageError> {
        let mut slot = self.slot.lock().map_err(|_| StorageError::Poisoned)?;
        *slot = Some(value.to_owned());
        Ok(())
    }
}

/// Slot persisted as a JSON file.
///
/// Writes go to a sibling temp file which is then renamed over the target,
/// so readers never observe a half-written cart.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Use an explicit file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Use `<dir>/gmexpress-cart.json`.
    #[must_use]
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(format!("{CART_STORAGE_KEY}.json")))
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl CartStorage for FileStorage {
    fn read(&self) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn write(&self, value: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, value).map_err(|e| self.io_error(e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))
    }
}
