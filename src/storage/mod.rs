//! Persisted key-value slot holding the bearer token.
//!
//! SYSTEM CONTEXT
//! ==============
//! Mirrors browser local storage: string keys, string values, synchronous
//! access. Only [`crate::session::SessionStore`] holds a [`TokenStorage`]; other
//! components read the token through the store.

mod file;
mod memory;

pub use file::FileTokenStorage;
pub use memory::MemoryTokenStorage;

/// The single well-known key the token lives under.
pub const TOKEN_KEY: &str = "token";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("token storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("token storage is corrupt: {0}")]
    Corrupt(String),
}

/// Synchronous string key-value persistence.
pub trait TokenStorage: Send + Sync {
    /// Read `key`, `None` when absent.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing medium cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Deleting an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing medium cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
