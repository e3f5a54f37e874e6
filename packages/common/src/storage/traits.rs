use std::time::Duration;

use async_trait::async_trait;

use super::error::StorageError;

/// One object reported by a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectEntry {
    /// Full object key, relative to the bucket (or store root).
    pub key: String,
}

impl ObjectEntry {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// Last path segment of the key, or the whole key if it has no `/`.
    pub fn file_name(&self) -> &str {
        self.key.rsplit('/').next().unwrap_or(&self.key)
    }
}

/// Key-addressed object storage.
///
/// Keys are plain strings; a prefix is a raw string prefix, not a directory,
/// so `"n1"` also matches `"n10/a.pdf"`.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List objects whose key starts with `prefix`.
    ///
    /// With `recursive == false` only keys with no further `/` after the
    /// prefix are returned. Order is stable within one call.
    async fn list(&self, prefix: &str, recursive: bool) -> Result<Vec<ObjectEntry>, StorageError>;

    /// Remove an object. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Issue a time-limited URL granting read access to `key`.
    async fn signed_url(&self, key: &str, ttl: Duration) -> Result<String, StorageError>;

    /// Short backend name for logs.
    fn backend_name(&self) -> &'static str;
}
