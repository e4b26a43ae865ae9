//! Storage
//!
//! Durable key/value storage backing the cart and saved customer details. Values are plain
//! text; callers own the encoding.

use std::io;

use thiserror::Error;

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying IO failure.
    #[error("storage IO failed: {0}")]
    Io(#[from] io::Error),

    /// The key cannot be represented by this backend.
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),

    /// Writing the value would exceed the backend's capacity (needed, limit), in bytes.
    #[error("storage quota exceeded: {0} bytes needed, limit is {1} bytes")]
    QuotaExceeded(usize, usize),
}

/// Durable key/value store.
#[cfg_attr(test, mockall::automock)]
pub trait Storage {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the value could not be written.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete the value under `key`. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend cannot be written.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}
