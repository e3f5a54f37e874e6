mod error;
mod signing;
mod traits;

pub mod filesystem;
#[cfg(feature = "object-storage")]
pub mod s3;

use std::sync::Arc;

pub use error::StorageError;
pub use signing::{SignatureError, UrlSigner, encode_key_path};
pub use traits::{ObjectEntry, ObjectStore};

use crate::config::{StorageBackendKind, StorageConfig};
use filesystem::FilesystemObjectStore;

/// Handles produced by [`open_store`].
///
/// `local` is set only for the filesystem backend, whose signed URLs are
/// served by this application rather than by the store itself.
pub struct OpenedStore {
    pub store: Arc<dyn ObjectStore>,
    pub local: Option<Arc<FilesystemObjectStore>>,
}

/// Build the configured object store backend.
pub async fn open_store(config: &StorageConfig) -> Result<OpenedStore, StorageError> {
    match config.backend {
        StorageBackendKind::Filesystem => {
            let fs_store = Arc::new(FilesystemObjectStore::from_config(&config.filesystem).await?);
            Ok(OpenedStore {
                store: fs_store.clone(),
                local: Some(fs_store),
            })
        }
        #[cfg(feature = "object-storage")]
        StorageBackendKind::S3 => Ok(OpenedStore {
            store: Arc::new(s3::S3ObjectStore::from_config(&config.s3)?),
            local: None,
        }),
        #[cfg(not(feature = "object-storage"))]
        StorageBackendKind::S3 => Err(StorageError::Unsupported(
            "s3 backend requires the `object-storage` feature",
        )),
    }
}
