use std::collections::BTreeMap;
use std::sync::Arc;

use futures_util::future::try_join_all;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{ObjectStore, PutObject, StorageError};
use crate::assets::{AssetBundle, AssetFile, HTML_PATH};

pub const PORTFOLIO_PREFIX: &str = "portfolios";

/// HTML must revalidate so redeploys show up immediately.
const HTML_CACHE_CONTROL: &str = "public, max-age=0, must-revalidate";
const STATIC_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// Public locations of an uploaded bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedAssets {
    pub html_url: String,
    pub css_url: String,
    pub js_url: String,
    pub image_urls: Vec<String>,
    pub font_urls: Vec<String>,
    /// Every key written, html first.
    pub keys: Vec<String>,
}

#[derive(Clone)]
pub struct AssetUploader {
    store: Arc<dyn ObjectStore>,
}

pub fn portfolio_prefix(portfolio_id: &str) -> String {
    format!("{}/{}", PORTFOLIO_PREFIX, portfolio_id)
}

impl AssetUploader {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    fn put_request(portfolio_id: &str, job_id: &str, file: &AssetFile) -> PutObject {
        let cache_control = if file.path == HTML_PATH {
            HTML_CACHE_CONTROL
        } else {
            STATIC_CACHE_CONTROL
        };
        PutObject {
            key: format!("{}/{}", portfolio_prefix(portfolio_id), file.path),
            body: file.bytes.clone(),
            content_type: file.content_type.clone(),
            cache_control: cache_control.to_string(),
            metadata: BTreeMap::from([
                ("portfolio-id".to_string(), portfolio_id.to_string()),
                ("job-id".to_string(), job_id.to_string()),
            ]),
        }
    }

    /// Uploads every file of `bundle` under `portfolios/{portfolio_id}/`.
    /// Files go up concurrently; the first failure fails the upload and
    /// nothing already written is removed.
    pub async fn upload(
        &self,
        portfolio_id: &str,
        job_id: &str,
        bundle: &AssetBundle,
    ) -> Result<UploadedAssets, StorageError> {
        let requests: Vec<PutObject> = bundle
            .files()
            .map(|f| Self::put_request(portfolio_id, job_id, f))
            .collect();
        let keys: Vec<String> = requests.iter().map(|r| r.key.clone()).collect();

        try_join_all(requests.into_iter().map(|r| self.store.put_object(r))).await?;

        let url_of = |file: &AssetFile| {
            self.store
                .public_url(&format!("{}/{}", portfolio_prefix(portfolio_id), file.path))
        };

        info!(
            portfolio_id,
            files = keys.len(),
            bytes = bundle.total_size(),
            "Uploaded portfolio assets"
        );

        Ok(UploadedAssets {
            html_url: url_of(&bundle.html),
            css_url: url_of(&bundle.css),
            js_url: url_of(&bundle.js),
            image_urls: bundle.images.iter().map(url_of).collect(),
            font_urls: bundle.fonts.iter().map(url_of).collect(),
            keys,
        })
    }

    /// Deletes everything under the portfolio prefix. Returns the number of
    /// objects removed.
    pub async fn remove_portfolio(&self, portfolio_id: &str) -> Result<usize, StorageError> {
        let keys = self
            .store
            .list_objects(&portfolio_prefix(portfolio_id))
            .await?;
        for key in &keys {
            self.store.delete_object(key).await?;
        }
        if keys.is_empty() {
            warn!(portfolio_id, "No objects found to remove");
        } else {
            info!(portfolio_id, removed = keys.len(), "Removed portfolio assets");
        }
        Ok(keys.len())
    }
}
