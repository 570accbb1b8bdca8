use std::sync::Arc;

use async_trait::async_trait;
use futures_util::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::memory::InMemory;
use object_store::path::Path as StorePath;
use object_store::{
    Attribute, AttributeValue, Attributes, ObjectStore as BackendStore, PutOptions, PutPayload,
};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use super::{ObjectStore, PutObject, StorageError, StoredObject};
use crate::config::StorageConfig;

/// [`ObjectStore`] backed by any `object_store` backend.
pub struct BucketStore {
    inner: Arc<dyn BackendStore>,
    public_base_url: String,
}

impl BucketStore {
    pub fn new(inner: Arc<dyn BackendStore>, public_base_url: &str) -> Self {
        Self {
            inner,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// S3 or S3-compatible bucket.
    pub fn s3(
        config: &StorageConfig,
        access_key_id: SecretString,
        secret_access_key: SecretString,
    ) -> Result<Self, StorageError> {
        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(&config.bucket)
            .with_region(&config.region)
            .with_access_key_id(access_key_id.expose_secret())
            .with_secret_access_key(secret_access_key.expose_secret());

        if let Some(endpoint) = &config.endpoint {
            builder = builder
                .with_endpoint(endpoint)
                .with_allow_http(endpoint.starts_with("http://"));
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::Configuration(e.to_string()))?;

        Ok(Self::new(Arc::new(store), &config.public_base_url()))
    }

    /// Process-local store for offline runs and tests.
    pub fn in_memory(public_base_url: &str) -> Self {
        Self::new(Arc::new(InMemory::new()), public_base_url)
    }

    /// The underlying backend, for reading objects back.
    pub fn backend(&self) -> Arc<dyn BackendStore> {
        self.inner.clone()
    }
}

#[async_trait]
impl ObjectStore for BucketStore {
    async fn put_object(&self, object: PutObject) -> Result<StoredObject, StorageError> {
        let location = StorePath::from(object.key.as_str());

        let mut attributes = Attributes::new();
        attributes.insert(
            Attribute::ContentType,
            AttributeValue::from(object.content_type),
        );
        attributes.insert(
            Attribute::CacheControl,
            AttributeValue::from(object.cache_control),
        );
        for (key, value) in object.metadata {
            attributes.insert(Attribute::Metadata(key.into()), AttributeValue::from(value));
        }

        let opts = PutOptions {
            attributes,
            ..Default::default()
        };

        let size = object.body.len();
        let result = self
            .inner
            .put_opts(&location, PutPayload::from(object.body), opts)
            .await?;

        debug!(key = %location, size, "Stored object");

        Ok(StoredObject {
            key: location.to_string(),
            etag: result.e_tag,
        })
    }

    async fn list_objects(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let prefix = StorePath::from(prefix);
        let objects: Vec<_> = self.inner.list(Some(&prefix)).try_collect().await?;
        Ok(objects.into_iter().map(|m| m.location.to_string()).collect())
    }

    async fn delete_object(&self, key: &str) -> Result<(), StorageError> {
        self.inner.delete(&StorePath::from(key)).await?;
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key.trim_start_matches('/'))
    }
}
