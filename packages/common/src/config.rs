use std::path::PathBuf;

use serde::Deserialize;

/// Which object store implementation backs drawing storage.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackendKind {
    #[default]
    Filesystem,
    S3,
}

/// App-level object storage configuration.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct StorageConfig {
    /// Selected backend. Default: "filesystem".
    #[serde(default)]
    pub backend: StorageBackendKind,
    #[serde(default)]
    pub filesystem: FilesystemStorageConfig,
    #[serde(default)]
    pub s3: S3StorageConfig,
}

/// Local directory store, used for development and tests.
#[derive(Debug, Deserialize, Clone)]
pub struct FilesystemStorageConfig {
    /// Root directory; object keys are paths relative to it. Default: "./data/objects".
    #[serde(default = "default_fs_root")]
    pub root: PathBuf,
    /// URL under which the server exposes signed downloads; the encoded key is appended.
    /// Default: "http://127.0.0.1:3000/api/v1/files/download".
    #[serde(default = "default_fs_public_base_url")]
    pub public_base_url: String,
    /// Secret used to sign download links. Must be overridden outside development.
    #[serde(default = "default_fs_signing_secret")]
    pub signing_secret: String,
}

fn default_fs_root() -> PathBuf {
    PathBuf::from("./data/objects")
}
fn default_fs_public_base_url() -> String {
    "http://127.0.0.1:3000/api/v1/files/download".into()
}
fn default_fs_signing_secret() -> String {
    "dev-only-signing-secret".into()
}

impl Default for FilesystemStorageConfig {
    fn default() -> Self {
        Self {
            root: default_fs_root(),
            public_base_url: default_fs_public_base_url(),
            signing_secret: default_fs_signing_secret(),
        }
    }
}

/// S3-compatible bucket (AWS, MinIO, Supabase storage, ...).
#[derive(Debug, Deserialize, Clone)]
pub struct S3StorageConfig {
    /// Bucket name. Default: "drawings".
    #[serde(default = "default_s3_bucket")]
    pub bucket: String,
    /// Region name. Default: "us-east-1".
    #[serde(default = "default_s3_region")]
    pub region: String,
    /// Custom endpoint for non-AWS providers. When unset the AWS endpoint for `region` is used.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub access_key: Option<String>,
    #[serde(default)]
    pub secret_key: Option<String>,
    /// Use path-style addressing (required by most self-hosted providers). Default: true.
    #[serde(default = "default_s3_path_style")]
    pub path_style: bool,
    /// Per-request timeout in seconds. Default: 30.
    #[serde(default = "default_s3_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_s3_bucket() -> String {
    "drawings".into()
}
fn default_s3_region() -> String {
    "us-east-1".into()
}
fn default_s3_path_style() -> bool {
    true
}
fn default_s3_request_timeout_secs() -> u64 {
    30
}

impl Default for S3StorageConfig {
    fn default() -> Self {
        Self {
            bucket: default_s3_bucket(),
            region: default_s3_region(),
            endpoint: None,
            access_key: None,
            secret_key: None,
            path_style: default_s3_path_style(),
            request_timeout_secs: default_s3_request_timeout_secs(),
        }
    }
}
