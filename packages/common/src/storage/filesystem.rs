use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::fs;

use super::error::StorageError;
use super::signing::{UrlSigner, encode_key_path};
use super::traits::{ObjectEntry, ObjectStore};
use crate::config::FilesystemStorageConfig;

/// Reserved directory under the root for in-flight writes. Never listed.
const TEMP_DIR: &str = ".tmp";

/// Filesystem-backed object store.
///
/// An object key maps directly to a path relative to `root`
/// (`"n1/sub/b.pdf"` -> `{root}/n1/sub/b.pdf`). Signed URLs point at the
/// server's download route and are verified with the same [`UrlSigner`].
pub struct FilesystemObjectStore {
    root: PathBuf,
    public_base_url: String,
    signer: UrlSigner,
}

impl FilesystemObjectStore {
    /// Create a new filesystem object store, creating `root` if needed.
    pub async fn new(
        root: PathBuf,
        public_base_url: impl Into<String>,
        signer: UrlSigner,
    ) -> Result<Self, StorageError> {
        fs::create_dir_all(&root).await?;
        fs::create_dir_all(root.join(TEMP_DIR)).await?;
        Ok(Self {
            root,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
            signer,
        })
    }

    pub async fn from_config(config: &FilesystemStorageConfig) -> Result<Self, StorageError> {
        let signer = UrlSigner::new(&config.signing_secret)?;
        Self::new(config.root.clone(), config.public_base_url.clone(), signer).await
    }

    pub fn signer(&self) -> &UrlSigner {
        &self.signer
    }

    fn object_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }

    fn temp_path(&self) -> PathBuf {
        self.root
            .join(TEMP_DIR)
            .join(uuid::Uuid::new_v4().to_string())
    }

    /// Write an object, replacing any existing one atomically.
    pub async fn put(&self, key: &str, data: &[u8]) -> Result<(), StorageError> {
        let object_path = self.object_path(key)?;
        let temp_path = self.temp_path();

        if let Err(e) = fs::write(&temp_path, data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Some(parent) = object_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        if let Err(e) = fs::rename(&temp_path, &object_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(())
    }

    /// Open an object for streaming, returning the file and its size.
    pub async fn open(&self, key: &str) -> Result<(fs::File, u64), StorageError> {
        let object_path = self.object_path(key)?;
        let file = match fs::File::open(&object_path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(key.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        let meta = file.metadata().await?;
        if !meta.is_file() {
            return Err(StorageError::NotFound(key.to_string()));
        }
        Ok((file, meta.len()))
    }
}

#[async_trait]
impl ObjectStore for FilesystemObjectStore {
    async fn list(&self, prefix: &str, recursive: bool) -> Result<Vec<ObjectEntry>, StorageError> {
        validate_prefix(prefix)?;

        // Start at the deepest directory the prefix fully names.
        let start_key = match prefix.rfind('/') {
            Some(idx) => &prefix[..=idx],
            None => "",
        };

        let mut entries = Vec::new();
        let mut pending = vec![(self.root.join(start_key), start_key.to_string())];

        while let Some((dir, dir_key)) = pending.pop() {
            let mut read_dir = match fs::read_dir(&dir).await {
                Ok(rd) => rd,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) if e.kind() == std::io::ErrorKind::NotADirectory => continue,
                Err(e) => return Err(e.into()),
            };

            while let Some(entry) = read_dir.next_entry().await? {
                let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                    tracing::warn!(path = %entry.path().display(), "Skipping non UTF-8 object name");
                    continue;
                };
                if dir_key.is_empty() && name == TEMP_DIR {
                    continue;
                }

                let file_type = entry.file_type().await?;
                if file_type.is_dir() {
                    let child_key = format!("{dir_key}{name}/");
                    let descend = if recursive {
                        child_key.starts_with(prefix) || prefix.starts_with(&child_key)
                    } else {
                        prefix.starts_with(&child_key)
                    };
                    if descend {
                        pending.push((entry.path(), child_key));
                    }
                } else if file_type.is_file() {
                    let key = format!("{dir_key}{name}");
                    let Some(rest) = key.strip_prefix(prefix) else {
                        continue;
                    };
                    if !recursive && rest.contains('/') {
                        continue;
                    }
                    entries.push(ObjectEntry { key });
                }
            }
        }

        // Match S3's lexicographic listing order.
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let object_path = self.object_path(key)?;
        match fs::remove_file(&object_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn signed_url(&self, key: &str, ttl: Duration) -> Result<String, StorageError> {
        validate_key(key)?;
        let ttl_secs = i64::try_from(ttl.as_secs())
            .map_err(|_| StorageError::Backend("TTL out of range".into()))?;
        let expires = Utc::now().timestamp().saturating_add(ttl_secs);
        let signature = self.signer.sign(key, expires);
        Ok(format!(
            "{}/{}?expires={expires}&signature={signature}",
            self.public_base_url,
            encode_key_path(key)
        ))
    }

    fn backend_name(&self) -> &'static str {
        "filesystem"
    }
}

/// Reject keys that could escape the root or collide with reserved paths.
fn validate_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("key cannot be empty".into()));
    }
    if key.ends_with('/') {
        return Err(StorageError::InvalidKey(format!("'{key}' names a directory")));
    }
    validate_prefix(key)
}

fn validate_prefix(prefix: &str) -> Result<(), StorageError> {
    if prefix.starts_with('/') {
        return Err(StorageError::InvalidKey(format!(
            "'{prefix}' must be relative"
        )));
    }
    if prefix.contains('\\') || prefix.contains('\0') {
        return Err(StorageError::InvalidKey(format!(
            "'{}' contains a forbidden character",
            prefix.escape_default()
        )));
    }
    let mut segments = prefix.split('/').peekable();
    while let Some(segment) = segments.next() {
        let is_last = segments.peek().is_none();
        if segment == ".." || segment == "." {
            return Err(StorageError::InvalidKey(format!(
                "'{prefix}' contains a relative segment"
            )));
        }
        if segment.is_empty() && !is_last {
            return Err(StorageError::InvalidKey(format!(
                "'{prefix}' contains an empty segment"
            )));
        }
    }
    if prefix == TEMP_DIR || prefix.starts_with(".tmp/") {
        return Err(StorageError::InvalidKey(format!("'{prefix}' is reserved")));
    }
    Ok(())
}
