//! Object storage for built sites.

pub mod bucket;
pub mod uploader;

use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;

pub use bucket::BucketStore;
pub use uploader::{AssetUploader, UploadedAssets, PORTFOLIO_PREFIX};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage API error: {0}")]
    Api(String),

    #[error("Storage configuration error: {0}")]
    Configuration(String),
}

impl From<object_store::Error> for StorageError {
    fn from(e: object_store::Error) -> Self {
        StorageError::Api(e.to_string())
    }
}

/// One object to write.
#[derive(Debug, Clone)]
pub struct PutObject {
    pub key: String,
    pub body: Vec<u8>,
    pub content_type: String,
    pub cache_control: String,
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub etag: Option<String>,
}

/// Minimal object storage surface the pipeline needs.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put_object(&self, object: PutObject) -> Result<StoredObject, StorageError>;

    /// Keys under `prefix`, in no particular order.
    async fn list_objects(&self, prefix: &str) -> Result<Vec<String>, StorageError>;

    async fn delete_object(&self, key: &str) -> Result<(), StorageError>;

    /// Public URL for `key`. Does not check that the object exists.
    fn public_url(&self, key: &str) -> String;
}
