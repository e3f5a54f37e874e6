use std::time::Duration;

use async_trait::async_trait;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::{Bucket, Region};

use super::error::StorageError;
use super::traits::{ObjectEntry, ObjectStore};
use crate::config::S3StorageConfig;

/// Longest presigned URL lifetime S3 accepts (7 days).
pub const MAX_PRESIGN_SECS: u64 = 7 * 24 * 60 * 60;

/// S3-compatible object store backed by `rust-s3`.
pub struct S3ObjectStore {
    bucket: Box<Bucket>,
}

impl S3ObjectStore {
    pub fn from_config(config: &S3StorageConfig) -> Result<Self, StorageError> {
        let region = match &config.endpoint {
            Some(endpoint) => Region::Custom {
                region: config.region.clone(),
                endpoint: endpoint.clone(),
            },
            None => config
                .region
                .parse()
                .map_err(|e| StorageError::Backend(format!("invalid region: {e}")))?,
        };

        let credentials = Credentials::new(
            config.access_key.as_deref(),
            config.secret_key.as_deref(),
            None,
            None,
            None,
        )
        .map_err(|e| StorageError::Backend(format!("invalid S3 credentials: {e}")))?;

        let mut bucket = Bucket::new(&config.bucket, region, credentials).map_err(map_s3_error)?;
        if config.path_style {
            bucket = bucket.with_path_style();
        }
        bucket.set_request_timeout(Some(Duration::from_secs(config.request_timeout_secs)));

        Ok(Self { bucket })
    }
}

fn map_s3_error(err: S3Error) -> StorageError {
    StorageError::Backend(err.to_string())
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn list(&self, prefix: &str, recursive: bool) -> Result<Vec<ObjectEntry>, StorageError> {
        let delimiter = (!recursive).then(|| "/".to_string());
        let pages = self
            .bucket
            .list(prefix.to_string(), delimiter)
            .await
            .map_err(map_s3_error)?;

        Ok(pages
            .into_iter()
            .flat_map(|page| page.contents)
            .map(|object| ObjectEntry::new(object.key))
            .collect())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let response = self.bucket.delete_object(key).await.map_err(map_s3_error)?;
        match response.status_code() {
            200..=299 | 404 => Ok(()),
            status => Err(StorageError::Backend(format!(
                "delete of '{key}' returned HTTP {status}"
            ))),
        }
    }

    async fn signed_url(&self, key: &str, ttl: Duration) -> Result<String, StorageError> {
        let secs = ttl.as_secs();
        if secs == 0 || secs > MAX_PRESIGN_SECS {
            return Err(StorageError::Backend(format!(
                "presign TTL must be 1..={MAX_PRESIGN_SECS} seconds, got {secs}"
            )));
        }
        self.bucket
            .presign_get(key, secs as u32, None)
            .await
            .map_err(map_s3_error)
    }

    fn backend_name(&self) -> &'static str {
        "s3"
    }
}
